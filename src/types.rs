//! Core identity and mode types for the asset cache.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::AssetError;

/// Opaque 128-bit content identifier.
///
/// Rendered as the canonical hyphenated lowercase UUID string; that string is
/// what a [`CacheManager`](crate::CacheManager) receives when resolving paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetId(Uuid);

impl AssetId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero id.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns `true` for the all-zero id.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for AssetId {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| AssetError::InvalidAssetId {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<Uuid> for AssetId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Content category of a cached asset.
///
/// The set is closed; each variant has a stable short name used in cache
/// filenames and log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetType {
    /// Compressed texture.
    Texture,
    /// Compressed sound clip.
    Sound,
    /// Calling card.
    CallingCard,
    /// Landmark.
    Landmark,
    /// Compiled script.
    Script,
    /// Clothing item.
    Clothing,
    /// Serialized object.
    Object,
    /// Notecard text.
    Notecard,
    /// Inventory category.
    Category,
    /// LSL source text.
    LslText,
    /// LSL bytecode.
    LslBytecode,
    /// Uncompressed TGA texture.
    TextureTga,
    /// Body part.
    Bodypart,
    /// Uncompressed WAV sound.
    SoundWav,
    /// TGA image.
    ImageTga,
    /// JPEG image.
    ImageJpeg,
    /// Animation.
    Animation,
    /// Gesture.
    Gesture,
    /// Simulator state.
    Simstate,
    /// Mesh geometry.
    Mesh,
    /// Environment settings.
    Settings,
    /// Render material.
    Material,
}

impl AssetType {
    /// Every asset type, in declaration order.
    pub const ALL: [AssetType; 22] = [
        AssetType::Texture,
        AssetType::Sound,
        AssetType::CallingCard,
        AssetType::Landmark,
        AssetType::Script,
        AssetType::Clothing,
        AssetType::Object,
        AssetType::Notecard,
        AssetType::Category,
        AssetType::LslText,
        AssetType::LslBytecode,
        AssetType::TextureTga,
        AssetType::Bodypart,
        AssetType::SoundWav,
        AssetType::ImageTga,
        AssetType::ImageJpeg,
        AssetType::Animation,
        AssetType::Gesture,
        AssetType::Simstate,
        AssetType::Mesh,
        AssetType::Settings,
        AssetType::Material,
    ];

    /// Short stable name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AssetType::Texture => "texture",
            AssetType::Sound => "sound",
            AssetType::CallingCard => "callcard",
            AssetType::Landmark => "landmark",
            AssetType::Script => "script",
            AssetType::Clothing => "clothing",
            AssetType::Object => "object",
            AssetType::Notecard => "notecard",
            AssetType::Category => "category",
            AssetType::LslText => "lsltext",
            AssetType::LslBytecode => "lslbyte",
            AssetType::TextureTga => "txtr_tga",
            AssetType::Bodypart => "bodypart",
            AssetType::SoundWav => "snd_wav",
            AssetType::ImageTga => "img_tga",
            AssetType::ImageJpeg => "jpeg",
            AssetType::Animation => "animatn",
            AssetType::Gesture => "gesture",
            AssetType::Simstate => "simstate",
            AssetType::Mesh => "mesh",
            AssetType::Settings => "settings",
            AssetType::Material => "material",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AssetError::UnknownAssetType {
                name: s.to_string(),
            })
    }
}

/// Content identity: the (identifier, category) pair naming one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetKey {
    /// Content identifier.
    pub id: AssetId,
    /// Content category.
    pub asset_type: AssetType,
}

impl AssetKey {
    /// Creates a key from its parts.
    pub const fn new(id: AssetId, asset_type: AssetType) -> Self {
        Self { id, asset_type }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.asset_type)
    }
}

/// Open intent of an [`AssetFile`](crate::AssetFile) session.
///
/// The mode only governs how [`write`](crate::AssetFile::write) opens the
/// store and where it lands. Reads are permitted under every mode.
///
/// | Mode | Write discipline |
/// |------|------------------|
/// | [`Read`](OpenMode::Read) | truncating create (same as `Write`) |
/// | [`Write`](OpenMode::Write) | truncating create, write from offset 0 |
/// | [`ReadWrite`](OpenMode::ReadWrite) | in-place at the cursor, no truncation |
/// | [`Append`](OpenMode::Append) | always at end of store |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenMode {
    /// Read intent. Opening in this mode refreshes the store's access time.
    #[default]
    Read,
    /// Truncating write.
    Write,
    /// In-place update without truncation.
    ReadWrite,
    /// Append to end of store.
    Append,
}

impl OpenMode {
    /// Legacy bitflag encoding of each mode.
    pub const fn bits(&self) -> u32 {
        match self {
            OpenMode::Read => 0x1,
            OpenMode::Write => 0x2,
            OpenMode::ReadWrite => 0x3,
            OpenMode::Append => 0x6,
        }
    }

    /// Decodes a legacy bitflag value; `None` for unknown combinations.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0x1 => Some(OpenMode::Read),
            0x2 => Some(OpenMode::Write),
            0x3 => Some(OpenMode::ReadWrite),
            0x6 => Some(OpenMode::Append),
            _ => None,
        }
    }
}

/// Base a [`seek`](crate::AssetFile::seek) offset is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekOrigin {
    /// An absolute byte offset.
    Absolute(i64),
    /// The session's current cursor.
    Current,
}

impl SeekOrigin {
    /// Start of the store.
    pub const START: SeekOrigin = SeekOrigin::Absolute(0);
}

impl Default for SeekOrigin {
    fn default() -> Self {
        SeekOrigin::START
    }
}

/// Legacy integer origins: `-1` means the current cursor, any other value is
/// an absolute base.
impl From<i64> for SeekOrigin {
    fn from(raw: i64) -> Self {
        match raw {
            -1 => SeekOrigin::Current,
            base => SeekOrigin::Absolute(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_display_is_hyphenated_lowercase() {
        let id: AssetId = "6A8E0E4C-1F2B-4C3D-9E8F-0123456789AB".parse().unwrap();
        assert_eq!(id.to_string(), "6a8e0e4c-1f2b-4c3d-9e8f-0123456789ab");
    }

    #[test]
    fn asset_id_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<AssetId>().unwrap_err();
        assert!(matches!(err, AssetError::InvalidAssetId { .. }));
    }

    #[test]
    fn asset_id_new_is_unique_and_not_nil() {
        let a = AssetId::new();
        let b = AssetId::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
        assert!(AssetId::nil().is_nil());
        assert_eq!(AssetId::default(), AssetId::nil());
    }

    #[test]
    fn asset_type_names_round_trip() {
        for t in AssetType::ALL {
            assert_eq!(t.as_str().parse::<AssetType>().unwrap(), t);
        }
    }

    #[test]
    fn asset_type_names_are_unique() {
        let mut names: Vec<_> = AssetType::ALL.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AssetType::ALL.len());
    }

    #[test]
    fn asset_type_unknown_name() {
        let err = "hologram".parse::<AssetType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown asset type: hologram");
    }

    #[test]
    fn asset_key_display() {
        let key = AssetKey::new(AssetId::nil(), AssetType::Mesh);
        assert_eq!(
            key.to_string(),
            "00000000-0000-0000-0000-000000000000/mesh"
        );
    }

    #[test]
    fn open_mode_bits() {
        for mode in [
            OpenMode::Read,
            OpenMode::Write,
            OpenMode::ReadWrite,
            OpenMode::Append,
        ] {
            assert_eq!(OpenMode::from_bits(mode.bits()), Some(mode));
        }
        assert_eq!(OpenMode::ReadWrite.bits(), OpenMode::Read.bits() | OpenMode::Write.bits());
        assert_eq!(OpenMode::from_bits(0x4), None);
    }

    #[test]
    fn seek_origin_from_legacy_integer() {
        assert_eq!(SeekOrigin::from(-1), SeekOrigin::Current);
        assert_eq!(SeekOrigin::from(0), SeekOrigin::START);
        assert_eq!(SeekOrigin::from(12), SeekOrigin::Absolute(12));
        assert_eq!(SeekOrigin::default(), SeekOrigin::Absolute(0));
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AssetId>();
        assert_send_sync::<AssetType>();
        assert_send_sync::<AssetKey>();
        assert_send_sync::<OpenMode>();
        assert_send_sync::<SeekOrigin>();
    }
}
