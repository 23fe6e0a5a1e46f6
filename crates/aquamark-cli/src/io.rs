//! Image I/O at the CLI boundary: the codec itself never opens files.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use aquamark::{Image, Plane};

use crate::Result;

/// Load an image as interleaved BGR, or BGRA when it has an alpha channel.
pub fn load_bgr(path: &Path) -> Result<Image> {
    let decoded = image::open(path)?;
    let image = if decoded.color().has_alpha() {
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let bgra = rgba
            .as_raw()
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], px[3]])
            .collect();
        Image::from_vec(width as usize, height as usize, 4, bgra)
    } else {
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        let bgr = rgb
            .as_raw()
            .chunks_exact(3)
            .flat_map(|px| [px[2], px[1], px[0]])
            .collect();
        Image::from_vec(width as usize, height as usize, 3, bgr)
    };
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        "Loaded image"
    );
    Ok(image)
}

/// Load an image as a grayscale plane (for bitmap payloads and recovery).
pub fn load_gray(path: &Path) -> Result<Plane<u8>> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = gray.dimensions();
    Ok(Plane::from_vec(
        width as usize,
        height as usize,
        gray.into_raw(),
    ))
}

/// Save a BGR(A) image; the format follows the file extension, with an
/// optional JPEG quality override.
pub fn save_bgr(path: &Path, img: &Image, jpeg_quality: Option<u8>) -> Result<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        let rgb = to_rgb(img);
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(writer, jpeg_quality.unwrap_or(90));
        encoder.encode(
            &rgb,
            img.width() as u32,
            img.height() as u32,
            image::ExtendedColorType::Rgb8,
        )?;
        return Ok(());
    }
    if jpeg_quality.is_some() {
        tracing::warn!("--jpeg-quality only applies to .jpg/.jpeg outputs; ignoring");
    }

    if img.channels() == 4 {
        let rgba: Vec<u8> = img
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[2], px[1], px[0], px[3]])
            .collect();
        image::save_buffer(
            path,
            &rgba,
            img.width() as u32,
            img.height() as u32,
            image::ExtendedColorType::Rgba8,
        )?;
    } else {
        image::save_buffer(
            path,
            &to_rgb(img),
            img.width() as u32,
            img.height() as u32,
            image::ExtendedColorType::Rgb8,
        )?;
    }
    Ok(())
}

/// Save a grayscale plane (extracted bitmap payloads).
pub fn save_gray(path: &Path, plane: &Plane<u8>) -> Result<()> {
    image::save_buffer(
        path,
        plane.buf(),
        plane.width() as u32,
        plane.height() as u32,
        image::ExtendedColorType::L8,
    )?;
    Ok(())
}

fn to_rgb(img: &Image) -> Vec<u8> {
    img.data()
        .chunks_exact(img.channels())
        .flat_map(|px| [px[2], px[1], px[0]])
        .collect()
}
