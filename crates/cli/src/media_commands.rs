use std::path::Path;

use {
    anyhow::{Context, Result},
    msgbridge_media::{mime::OCTET_STREAM, probe_dimensions, sniff_mime},
    msgbridge_msgconv::{ThumbnailDimensions, parse_geo_uri},
};

pub fn geo(uri: &str) -> Result<()> {
    let (latitude, longitude) = parse_geo_uri(uri).with_context(|| format!("invalid {uri:?}"))?;
    println!("latitude:  {latitude}");
    println!("longitude: {longitude}");
    Ok(())
}

pub async fn probe(file: &Path) -> Result<()> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mime = sniff_mime(&data).unwrap_or(OCTET_STREAM);
    println!("mime:      {mime}");
    println!("bytes:     {}", data.len());

    let meta = probe_dimensions(&data)?;
    let thumbnail = ThumbnailDimensions::resolve(meta.width, meta.height, true);
    println!("size:      {}x{}", meta.width, meta.height);
    println!("thumbnail: {}x{}", thumbnail.width, thumbnail.height);
    Ok(())
}
