//! Basic usage of the asset accessor.
//!
//! Streams an asset into a disk cache in chunks, reads it back, renames it
//! to its final identity and purges the cache.
//!
//! Run with: `cargo run --example basic_usage`

use asset_file::*;

fn main() -> Result<(), AssetError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let root = std::env::temp_dir().join(format!("asset-file-demo-{}", AssetId::new()));
    let cache = DiskCache::open(DiskCacheConfig::new(&root).with_max_size(64 * 1024))?;

    // =========================================================================
    // Step 1: stream an upload into a temporary identity
    // =========================================================================

    let staging = AssetKey::new(AssetId::new(), AssetType::TextureTga);
    let mut upload = AssetFile::open(&cache, staging, OpenMode::Append);
    let chunks: [&[u8]; 4] = [b"header:", b"pixels-", b"pixels-", b"footer"];
    for chunk in chunks {
        if !upload.write(chunk) {
            eprintln!("write failed for {staging}");
        }
    }
    println!("staged {} bytes at {}", upload.tell(), upload.path().display());

    // =========================================================================
    // Step 2: promote it to its final identity
    // =========================================================================

    let final_key = AssetKey::new(AssetId::new(), AssetType::Texture);
    upload.rename(final_key);
    println!("staging exists: {}", staging.exists(&cache));
    println!("final exists: {} ({} bytes)", final_key.exists(&cache), final_key.size(&cache));

    // =========================================================================
    // Step 3: read it back in chunks
    // =========================================================================

    let mut reader = AssetFile::open(&cache, final_key, OpenMode::Read);
    let mut chunk = [0u8; 8];
    let mut body = Vec::new();
    while reader.read(&mut chunk) {
        body.extend_from_slice(&chunk[..reader.last_bytes_read()]);
    }
    println!("read back: {}", String::from_utf8_lossy(&body));

    // Skip the header and re-read the payload.
    reader.seek(7, SeekOrigin::START);
    let mut payload = [0u8; 14];
    if reader.read(&mut payload) {
        println!("payload: {}", String::from_utf8_lossy(&payload[..reader.last_bytes_read()]));
    }

    // =========================================================================
    // Step 4: housekeeping
    // =========================================================================

    let report = cache.purge()?;
    println!("purge: {report:?}");

    final_key.remove(&cache, None);
    std::fs::remove_dir_all(&root).map_err(|e| AssetError::io("remove_dir", &root, e))?;
    Ok(())
}
