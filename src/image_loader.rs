use std::io::Cursor;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use image::codecs::gif::GifDecoder;
use image::imageops::FilterType;
use image::AnimationDecoder;
use image::{DynamicImage, ImageFormat};

use crate::models::{MediaItem, MediaType};

pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let format = image::guess_format(&bytes).ok();

    if format == Some(ImageFormat::Gif) {
        let decoder = GifDecoder::new(Cursor::new(bytes))
            .with_context(|| format!("Failed to decode GIF: {:?}", path))?;
        let mut frames = decoder.into_frames();
        if let Some(frame) = frames.next() {
            let frame = frame.context("Failed to decode GIF frame")?;
            return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
        }
        return Err(anyhow!("GIF has no frames: {:?}", path));
    }

    match format {
        Some(fmt) => image::load_from_memory_with_format(&bytes, fmt)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
        None => image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
    }
}

/// Decodes a media item into an RGBA buffer cropped and scaled to
/// exactly tile size, ready to upload as a slot texture.
///
/// Stills decode in-process; videos go through a poster-frame grab.
pub fn decode_tile(item: &MediaItem, tile_width: i32, tile_height: i32) -> Result<Vec<u8>> {
    let img = match item.media_type {
        MediaType::Image => open_image(&item.path)?,
        MediaType::Video => extract_video_poster(&item.path)
            .ok_or_else(|| anyhow!("Failed to extract poster frame: {:?}", item.path))?,
    };

    let tile = img.resize_to_fill(tile_width as u32, tile_height as u32, FilterType::Triangle);
    Ok(tile.to_rgba8().into_raw())
}

fn extract_video_poster(path: &Path) -> Option<DynamicImage> {
    // Try a frame slightly into the stream first (many videos start with black).
    ffmpeg_extract_frame(path, "00:00:01.000").or_else(|| ffmpeg_extract_frame(path, "00:00:00.000"))
}

fn ffmpeg_extract_frame(path: &Path, timestamp: &str) -> Option<DynamicImage> {
    let output = Command::new("ffmpeg")
        .arg("-v")
        .arg("error")
        .arg("-ss")
        .arg(timestamp)
        .arg("-i")
        .arg(path)
        .arg("-frames:v")
        .arg("1")
        .arg("-f")
        .arg("image2pipe")
        .arg("-vcodec")
        .arg("png")
        .arg("-")
        .output()
        .ok()?;

    if !output.status.success() || output.stdout.is_empty() {
        return None;
    }

    image::load_from_memory(&output.stdout).ok()
}
