//! Pixel-space attack simulators: the incidental distortions the watermark
//! is expected to survive.
use aquamark::pixel::clamp_u8;
use aquamark::Image;
use rand::Rng;

use crate::recover::{channel_plane, resize, CropBox};

/// Scale all channel values by `ratio`, clamping to [0, 255].
pub fn brightness(img: &Image, ratio: f32) -> Image {
    let data = img
        .data()
        .iter()
        .map(|&v| clamp_u8(v as f32 * ratio))
        .collect();
    Image::from_vec(img.width(), img.height(), img.channels(), data)
}

/// Set a random `ratio` of pixels to white across all channels.
pub fn salt_pepper<R: Rng>(img: &Image, ratio: f64, rng: &mut R) -> Image {
    let step = img.channels();
    let mut data = img.data().to_vec();
    for px in data.chunks_exact_mut(step) {
        if rng.gen::<f64>() < ratio {
            px.fill(u8::MAX);
        }
    }
    Image::from_vec(img.width(), img.height(), step, data)
}

/// Paint `count` random white rectangles, each covering `ratio` of either
/// dimension.
pub fn shelter<R: Rng>(img: &Image, ratio: f64, count: usize, rng: &mut R) -> Image {
    let (width, height) = (img.width(), img.height());
    let step = img.channels();
    let mut data = img.data().to_vec();
    for _ in 0..count {
        let x_ratio = rng.gen::<f64>() * (1.0 - ratio);
        let y_ratio = rng.gen::<f64>() * (1.0 - ratio);
        let x1 = (x_ratio * width as f64) as usize;
        let x2 = (((x_ratio + ratio) * width as f64) as usize).min(width);
        let y1 = (y_ratio * height as f64) as usize;
        let y2 = (((y_ratio + ratio) * height as f64) as usize).min(height);
        for y in y1..y2 {
            data[(y * width + x1) * step..(y * width + x2) * step].fill(u8::MAX);
        }
    }
    Image::from_vec(width, height, step, data)
}

/// Cut out a crop box.
///
/// # Panics
/// Panics if the box exceeds the image.
pub fn crop(img: &Image, crop: CropBox) -> Image {
    assert!(crop.x2 <= img.width() && crop.y2 <= img.height());
    assert!(crop.x1 < crop.x2 && crop.y1 < crop.y2);
    let step = img.channels();
    let mut data = Vec::with_capacity(crop.width() * crop.height() * step);
    for y in crop.y1..crop.y2 {
        let row_start = (y * img.width() + crop.x1) * step;
        let row_end = (y * img.width() + crop.x2) * step;
        data.extend_from_slice(&img.data()[row_start..row_end]);
    }
    Image::from_vec(crop.width(), crop.height(), step, data)
}

/// Bilinear resize of all channels.
pub fn scale_to(img: &Image, new_w: usize, new_h: usize) -> Image {
    let step = img.channels();
    let mut data = vec![0u8; new_w * new_h * step];
    for c in 0..step {
        let resized = resize(&channel_plane(img, c), new_w, new_h);
        for y in 0..new_h {
            for x in 0..new_w {
                data[(y * new_w + x) * step + c] = clamp_u8(resized.row(y)[x]);
            }
        }
    }
    Image::from_vec(new_w, new_h, step, data)
}

/// Rotate about the image centre by `angle` degrees, sampling bilinearly
/// and filling uncovered corners with black.
pub fn rotate(img: &Image, angle: f32) -> Image {
    let (width, height) = (img.width(), img.height());
    let step = img.channels();
    let (cx, cy) = ((width as f32 - 1.0) / 2.0, (height as f32 - 1.0) / 2.0);
    let (sin, cos) = angle.to_radians().sin_cos();

    let planes: Vec<_> = (0..step).map(|c| channel_plane(img, c)).collect();
    let mut data = vec![0u8; width * height * step];
    for y in 0..height {
        for x in 0..width {
            // inverse mapping into the source image
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let sx = cos * dx - sin * dy + cx;
            let sy = sin * dx + cos * dy + cy;
            if sx < 0.0 || sy < 0.0 || sx > (width - 1) as f32 || sy > (height - 1) as f32 {
                continue;
            }
            let x0 = sx as usize;
            let y0 = sy as usize;
            let x1 = (x0 + 1).min(width - 1);
            let y1 = (y0 + 1).min(height - 1);
            let (fx, fy) = (sx - x0 as f32, sy - y0 as f32);
            for (c, plane) in planes.iter().enumerate() {
                let top = plane.row(y0)[x0] * (1.0 - fx) + plane.row(y0)[x1] * fx;
                let bottom = plane.row(y1)[x0] * (1.0 - fx) + plane.row(y1)[x1] * fx;
                data[(y * width + x) * step + c] = clamp_u8(top * (1.0 - fy) + bottom * fy);
            }
        }
    }
    Image::from_vec(width, height, step, data)
}
