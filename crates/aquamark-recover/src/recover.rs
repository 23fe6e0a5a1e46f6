//! Sub-pixel crop+scale estimation by normalised cross-correlation.
use std::collections::HashMap;
use std::collections::VecDeque;

use aquamark::Image;
use aquamark_grid::Plane;

use crate::{Error, Result};

/// Windows with less energy than this are treated as flat and score zero.
const MIN_VARIANCE: f64 = 1e-9;
/// Bound on the per-size score cache.
const CACHE_CAP: usize = 512;

/// Crop box in pixel coordinates, end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl CropBox {
    pub fn width(&self) -> usize {
        self.x2 - self.x1
    }

    pub fn height(&self) -> usize {
        self.y2 - self.y1
    }
}

/// Outcome of a crop/scale estimation.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryResult {
    pub crop: CropBox,
    /// (width, height) of the original image.
    pub original_size: (usize, usize),
    /// Normalised cross-correlation of the best match, in [-1, 1].
    pub score: f64,
    pub scale: f64,
}

/// Template matcher owning the grayscale original and attacked images.
///
/// Match scores per resized-template size are cached, bounded by
/// [`CACHE_CAP`]; the two search phases revisit many sizes.
pub struct RecoveryEngine {
    original: Plane<f32>,
    template: Plane<f32>,
    cache: HashMap<(usize, usize), ((usize, usize), f64)>,
    cache_order: VecDeque<(usize, usize)>,
}

impl RecoveryEngine {
    pub fn new(original: Plane<f32>, template: Plane<f32>) -> Result<Self> {
        if original.width() == 0
            || original.height() == 0
            || template.width() == 0
            || template.height() == 0
        {
            return Err(Error::EmptyImage);
        }
        Ok(Self {
            original,
            template,
            cache: HashMap::new(),
            cache_order: VecDeque::new(),
        })
    }

    /// Build an engine from colour images, converting to luma.
    pub fn from_images(original: &Image, template: &Image) -> Result<Self> {
        Self::new(grayscale(original), grayscale(template))
    }

    /// Find the scale and offset at which the template best matches the
    /// original.
    ///
    /// A coarse sweep of `search_num` evenly spaced scales over
    /// `scale_range` is refined around the best hit; the scale is clamped
    /// so the resized template always fits inside the original.
    pub fn estimate(&mut self, scale_range: (f64, f64), search_num: usize) -> Result<RecoveryResult> {
        let original_size = (self.original.width(), self.original.height());

        if scale_range.0 == 1.0 && scale_range.1 == 1.0 {
            let (w, h) = (self.template.width(), self.template.height());
            let ((x, y), score) = self.match_at_size(w, h)?;
            return Ok(RecoveryResult {
                crop: CropBox {
                    x1: x,
                    y1: y,
                    x2: x + w,
                    y2: y + h,
                },
                original_size,
                score,
                scale: 1.0,
            });
        }

        let fit = (self.original.width() as f64 / self.template.width() as f64)
            .min(self.original.height() as f64 / self.template.height() as f64);
        let lo = scale_range.0;
        let hi = scale_range.1.min(fit);
        if lo > hi {
            return Err(Error::TemplateTooLarge {
                original: original_size,
                template: (self.template.width(), self.template.height()),
            });
        }

        let mut best = None::<((usize, usize), f64, f64)>;
        let coarse = linspace(lo, hi, search_num.max(2));
        let step = if search_num > 1 { (hi - lo) / (search_num - 1) as f64 } else { 0.0 };
        for scale in coarse {
            self.probe(scale, &mut best)?;
        }
        let best_scale = best
            .map(|(_, _, scale)| scale)
            .unwrap_or(1.0);

        // refine around the coarse best
        let fine_lo = (best_scale - step).max(lo);
        let fine_hi = (best_scale + step).min(hi);
        let longest = self.template.width().max(self.template.height());
        let fine_num = 2 * ((fine_hi - fine_lo) * longest as f64) as usize + 1;
        tracing::debug!(fine_lo, fine_hi, fine_num, "Refining scale estimate");
        for scale in linspace(fine_lo, fine_hi, fine_num.max(2)) {
            self.probe(scale, &mut best)?;
        }

        let ((x, y), score, scale) = best.ok_or(Error::TemplateTooLarge {
            original: original_size,
            template: (self.template.width(), self.template.height()),
        })?;
        let w = (self.template.width() as f64 * scale).round() as usize;
        let h = (self.template.height() as f64 * scale).round() as usize;
        Ok(RecoveryResult {
            crop: CropBox {
                x1: x,
                y1: y,
                x2: x + w,
                y2: y + h,
            },
            original_size,
            score,
            scale,
        })
    }

    fn probe(
        &mut self,
        scale: f64,
        best: &mut Option<((usize, usize), f64, f64)>,
    ) -> Result<()> {
        let w = (self.template.width() as f64 * scale).round() as usize;
        let h = (self.template.height() as f64 * scale).round() as usize;
        if w == 0 || h == 0 || w > self.original.width() || h > self.original.height() {
            return Ok(());
        }
        let (pos, score) = self.match_at_size(w, h)?;
        if best.map_or(true, |(_, best_score, _)| score > best_score) {
            *best = Some((pos, score, scale));
        }
        Ok(())
    }

    /// Best match position and score for the template resized to `w x h`.
    fn match_at_size(&mut self, w: usize, h: usize) -> Result<((usize, usize), f64)> {
        if w > self.original.width() || h > self.original.height() {
            return Err(Error::TemplateTooLarge {
                original: (self.original.width(), self.original.height()),
                template: (w, h),
            });
        }
        if let Some(&hit) = self.cache.get(&(w, h)) {
            return Ok(hit);
        }

        let resized = resize(&self.template, w, h);
        let result = match_template(&self.original, &resized);

        if self.cache.len() >= CACHE_CAP {
            if let Some(oldest) = self.cache_order.pop_front() {
                self.cache.remove(&oldest);
            }
        }
        self.cache.insert((w, h), result);
        self.cache_order.push_back((w, h));
        Ok(result)
    }
}

/// Convenience wrapper matching the one-shot estimation entry point.
pub fn estimate_crop(
    original: &Image,
    attacked: &Image,
    scale_range: (f64, f64),
    search_num: usize,
) -> Result<RecoveryResult> {
    RecoveryEngine::from_images(original, attacked)?.estimate(scale_range, search_num)
}

/// Paint `template`, resized to the crop box, into a zero canvas of
/// `output_size` (width, height); the inverse of a crop attack.
pub fn recover_crop(template: &Image, crop: CropBox, output_size: (usize, usize)) -> Image {
    let (out_w, out_h) = output_size;
    let channels = template.channels();
    let mut data = vec![0u8; out_w * out_h * channels];

    let box_w = crop.width().min(out_w.saturating_sub(crop.x1));
    let box_h = crop.height().min(out_h.saturating_sub(crop.y1));
    if box_w == 0 || box_h == 0 {
        return Image::from_vec(out_w, out_h, channels, data);
    }

    for c in 0..channels {
        let plane = channel_plane(template, c);
        let resized = resize(&plane, crop.width(), crop.height());
        for y in 0..box_h {
            for x in 0..box_w {
                let value = resized.row(y)[x].clamp(0.0, 255.0).round() as u8;
                data[((crop.y1 + y) * out_w + crop.x1 + x) * channels + c] = value;
            }
        }
    }

    Image::from_vec(out_w, out_h, channels, data)
}

/// BT.601 luma plane of a BGR(A) image.
pub fn grayscale(img: &Image) -> Plane<f32> {
    let step = img.channels();
    let buf = img
        .data()
        .chunks_exact(step)
        .map(|px| 0.114 * px[0] as f32 + 0.587 * px[1] as f32 + 0.299 * px[2] as f32)
        .collect();
    Plane::from_vec(img.width(), img.height(), buf)
}

pub(crate) fn channel_plane(img: &Image, channel: usize) -> Plane<f32> {
    let step = img.channels();
    let buf = img
        .data()
        .chunks_exact(step)
        .map(|px| px[channel] as f32)
        .collect();
    Plane::from_vec(img.width(), img.height(), buf)
}

/// Bilinear resampling with half-pixel centre alignment.
pub fn resize(plane: &Plane<f32>, new_w: usize, new_h: usize) -> Plane<f32> {
    if new_w == plane.width() && new_h == plane.height() {
        return plane.clone();
    }
    let mut out = Plane::new(new_w, new_h);
    let x_ratio = plane.width() as f32 / new_w as f32;
    let y_ratio = plane.height() as f32 / new_h as f32;
    for y in 0..new_h {
        let sy = ((y as f32 + 0.5) * y_ratio - 0.5).max(0.0);
        let y0 = (sy as usize).min(plane.height() - 1);
        let y1 = (y0 + 1).min(plane.height() - 1);
        let fy = sy - y0 as f32;
        for x in 0..new_w {
            let sx = ((x as f32 + 0.5) * x_ratio - 0.5).max(0.0);
            let x0 = (sx as usize).min(plane.width() - 1);
            let x1 = (x0 + 1).min(plane.width() - 1);
            let fx = sx - x0 as f32;
            let top = plane.row(y0)[x0] * (1.0 - fx) + plane.row(y0)[x1] * fx;
            let bottom = plane.row(y1)[x0] * (1.0 - fx) + plane.row(y1)[x1] * fx;
            out.row_mut(y)[x] = top * (1.0 - fy) + bottom * fy;
        }
    }
    out
}

/// `TM_CCOEFF_NORMED`-compatible match: zero-mean correlation normalised by
/// template and window energy. Returns the best (x, y) and its score.
fn match_template(image: &Plane<f32>, template: &Plane<f32>) -> ((usize, usize), f64) {
    let (iw, ih) = (image.width(), image.height());
    let (tw, th) = (template.width(), template.height());
    let n = (tw * th) as f64;

    let t_mean = template.buf().iter().map(|&v| v as f64).sum::<f64>() / n;
    let t_prime: Vec<f64> = template.buf().iter().map(|&v| v as f64 - t_mean).collect();
    let t_energy: f64 = t_prime.iter().map(|v| v * v).sum();
    if t_energy < MIN_VARIANCE {
        return ((0, 0), 0.0);
    }

    // integral images over the search image and its squares
    let mut sum = vec![0.0f64; (iw + 1) * (ih + 1)];
    let mut sum_sq = vec![0.0f64; (iw + 1) * (ih + 1)];
    for y in 0..ih {
        let row = image.row(y);
        for x in 0..iw {
            let v = row[x] as f64;
            let idx = (y + 1) * (iw + 1) + x + 1;
            sum[idx] = v + sum[idx - 1] + sum[idx - (iw + 1)] - sum[idx - (iw + 1) - 1];
            sum_sq[idx] =
                v * v + sum_sq[idx - 1] + sum_sq[idx - (iw + 1)] - sum_sq[idx - (iw + 1) - 1];
        }
    }
    let window = |table: &[f64], x: usize, y: usize| -> f64 {
        table[(y + th) * (iw + 1) + x + tw] + table[y * (iw + 1) + x]
            - table[(y + th) * (iw + 1) + x]
            - table[y * (iw + 1) + x + tw]
    };

    let mut best = ((0usize, 0usize), f64::NEG_INFINITY);
    for y in 0..=ih - th {
        for x in 0..=iw - tw {
            let mut cross = 0.0f64;
            for v in 0..th {
                let img_row = &image.row(y + v)[x..x + tw];
                let t_row = &t_prime[v * tw..(v + 1) * tw];
                for (i_val, t_val) in img_row.iter().zip(t_row) {
                    cross += *i_val as f64 * t_val;
                }
            }
            let w_sum = window(&sum, x, y);
            let w_energy = window(&sum_sq, x, y) - w_sum * w_sum / n;
            let score = if w_energy < MIN_VARIANCE {
                0.0
            } else {
                cross / (t_energy * w_energy).sqrt()
            };
            if score > best.1 {
                best = ((x, y), score);
            }
        }
    }
    (best.0, best.1)
}

fn linspace(lo: f64, hi: f64, num: usize) -> Vec<f64> {
    if num <= 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (num - 1) as f64;
    (0..num).map(|i| lo + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: usize, height: usize) -> Plane<f32> {
        let buf = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x as f32 * 0.37).sin() * 60.0
                    + (y as f32 * 0.23).cos() * 50.0
                    + ((x * 7 + y * 13) % 31) as f32)
                    + 120.0
            })
            .collect();
        Plane::from_vec(width, height, buf)
    }

    fn crop_plane(plane: &Plane<f32>, x1: usize, y1: usize, w: usize, h: usize) -> Plane<f32> {
        let mut buf = Vec::with_capacity(w * h);
        for y in 0..h {
            buf.extend_from_slice(&plane.row(y1 + y)[x1..x1 + w]);
        }
        Plane::from_vec(w, h, buf)
    }

    #[test]
    fn exact_subregion_matches_perfectly() {
        let image = textured(96, 80);
        let template = crop_plane(&image, 23, 11, 40, 32);
        let ((x, y), score) = match_template(&image, &template);
        assert_eq!((x, y), (23, 11));
        assert!(score > 0.999, "score = {score}");
    }

    #[test]
    fn estimate_without_scaling_finds_the_box() {
        let image = textured(96, 80);
        let template = crop_plane(&image, 30, 20, 48, 40);
        let mut engine = RecoveryEngine::new(image, template).unwrap();
        let result = engine.estimate((1.0, 1.0), 1).unwrap();
        assert_eq!(
            result.crop,
            CropBox {
                x1: 30,
                y1: 20,
                x2: 78,
                y2: 60
            }
        );
        assert_eq!(result.original_size, (96, 80));
        assert!(result.score > 0.999);
    }

    #[test]
    fn scale_sweep_converges_to_unit_scale() {
        let image = textured(100, 90);
        let template = crop_plane(&image, 17, 25, 50, 40);
        let mut engine = RecoveryEngine::new(image, template).unwrap();
        let result = engine.estimate((0.8, 1.2), 9).unwrap();
        assert!((result.scale - 1.0).abs() < 0.02, "scale = {}", result.scale);
        assert_eq!((result.crop.x1, result.crop.y1), (17, 25));
        assert!(result.score > 0.99);
    }

    #[test]
    fn oversized_template_is_rejected() {
        let image = textured(32, 32);
        let template = textured(64, 64);
        let mut engine = RecoveryEngine::new(image, template).unwrap();
        assert!(matches!(
            engine.estimate((1.0, 1.0), 1),
            Err(Error::TemplateTooLarge { .. })
        ));
        assert!(matches!(
            engine.estimate((2.0, 4.0), 10),
            Err(Error::TemplateTooLarge { .. })
        ));
    }

    #[test]
    fn resize_preserves_flat_regions_and_dimensions() {
        let flat = Plane::from_vec(10, 8, vec![42.0f32; 80]);
        let up = resize(&flat, 25, 13);
        assert_eq!((up.width(), up.height()), (25, 13));
        for v in up.buf() {
            assert!((v - 42.0).abs() < 1e-4);
        }
        let same = resize(&flat, 10, 8);
        assert_eq!(same, flat);
    }

    #[test]
    fn recover_crop_paints_at_the_box() {
        let template = Image::from_vec(2, 2, 3, vec![10; 12]);
        let out = recover_crop(
            &template,
            CropBox {
                x1: 3,
                y1: 1,
                x2: 5,
                y2: 3,
            },
            (8, 6),
        );
        assert_eq!(out.width(), 8);
        assert_eq!(out.height(), 6);
        // inside the box
        assert_eq!(out.data()[(1 * 8 + 3) * 3], 10);
        assert_eq!(out.data()[(2 * 8 + 4) * 3 + 2], 10);
        // outside stays zero
        assert_eq!(out.data()[0], 0);
        assert_eq!(out.data()[(5 * 8 + 7) * 3], 0);
    }
}
