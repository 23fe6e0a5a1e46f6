//! Interleaved 8-bit images and the pixel-space transforms around the codec:
//! BGR/YUV conversion, even-dimension padding, clamping and alpha handling.
use aquamark_grid::Plane;

/// Interleaved 8-bit image in BGR or BGRA channel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap an interleaved buffer.
    ///
    /// # Panics
    /// Panics if `channels` is not 3 or 4 or the buffer length does not
    /// match.
    pub fn from_vec(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Self {
        assert!(channels == 3 || channels == 4);
        assert_eq!(data.len(), width * height * channels);
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Split an image into f32 BGR planes, detaching the alpha plane.
///
/// A 4th channel is preserved only when it actually carries transparency
/// (some value below 255); an all-opaque alpha is dropped.
pub fn split_channels(img: &Image) -> ([Plane<f32>; 3], Option<Plane<u8>>) {
    let (width, height) = (img.width(), img.height());
    let mut planes = [
        Plane::<f32>::new(width, height),
        Plane::<f32>::new(width, height),
        Plane::<f32>::new(width, height),
    ];
    let data = img.data();
    let step = img.channels();
    for (i, px) in data.chunks_exact(step).enumerate() {
        let (x, y) = (i % width, i / width);
        for (c, plane) in planes.iter_mut().enumerate() {
            plane.row_mut(y)[x] = px[c] as f32;
        }
    }

    let alpha = if step == 4 {
        let alpha: Vec<u8> = data.chunks_exact(4).map(|px| px[3]).collect();
        alpha
            .iter()
            .any(|&a| a < u8::MAX)
            .then(|| Plane::from_vec(width, height, alpha))
    } else {
        None
    };

    (planes, alpha)
}

/// Merge f32 BGR planes back into an 8-bit image, clamping to [0, 255] with
/// round-to-nearest, and reattach a detached alpha plane verbatim.
pub fn merge_channels(planes: &[Plane<f32>; 3], alpha: Option<&Plane<u8>>) -> Image {
    let width = planes[0].width();
    let height = planes[0].height();
    let channels = if alpha.is_some() { 4 } else { 3 };
    let mut data = Vec::with_capacity(width * height * channels);
    for y in 0..height {
        for x in 0..width {
            for plane in planes {
                data.push(clamp_u8(plane.row(y)[x]));
            }
            if let Some(alpha) = alpha {
                data.push(alpha.row(y)[x]);
            }
        }
    }
    Image::from_vec(width, height, channels, data)
}

#[inline]
pub fn clamp_u8(value: f32) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

/// In-place OpenCV-compatible full-range BGR -> YUV conversion.
pub fn bgr_to_yuv(planes: &mut [Plane<f32>; 3]) {
    let [b_plane, g_plane, r_plane] = planes;
    let (b, g, r) = (b_plane.buf_mut(), g_plane.buf_mut(), r_plane.buf_mut());
    for i in 0..b.len() {
        let (bv, gv, rv) = (b[i], g[i], r[i]);
        let y = 0.299 * rv + 0.587 * gv + 0.114 * bv;
        b[i] = y;
        g[i] = 0.492 * (bv - y) + 128.0;
        r[i] = 0.877 * (rv - y) + 128.0;
    }
}

/// Inverse of [`bgr_to_yuv`]; an exact inversion of its coefficients.
pub fn yuv_to_bgr(planes: &mut [Plane<f32>; 3]) {
    let [y_plane, u_plane, v_plane] = planes;
    let (yb, ub, vb) = (y_plane.buf_mut(), u_plane.buf_mut(), v_plane.buf_mut());
    for i in 0..yb.len() {
        let (y, u, v) = (yb[i], ub[i], vb[i]);
        let b = y + (u - 128.0) / 0.492;
        let r = y + (v - 128.0) / 0.877;
        let g = (y - 0.299 * r - 0.114 * b) / 0.587;
        yb[i] = b;
        ub[i] = g;
        vb[i] = r;
    }
}

/// Append at most one zero row and one zero column so both dimensions are
/// even, as the Haar decomposition requires.
pub fn pad_to_even(plane: &Plane<f32>) -> Plane<f32> {
    let width = plane.width();
    let height = plane.height();
    if width % 2 == 0 && height % 2 == 0 {
        return plane.clone();
    }
    let new_w = width + width % 2;
    let new_h = height + height % 2;
    let mut padded = Plane::new(new_w, new_h);
    for y in 0..height {
        padded.row_mut(y)[..width].copy_from_slice(plane.row(y));
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv_roundtrip_is_tight() {
        let bgr = [
            (0u8, 0u8, 0u8),
            (255, 255, 255),
            (12, 200, 96),
            (250, 3, 77),
        ];
        for (b, g, r) in bgr {
            let mut planes = [
                Plane::from_vec(1, 1, vec![b as f32]),
                Plane::from_vec(1, 1, vec![g as f32]),
                Plane::from_vec(1, 1, vec![r as f32]),
            ];
            bgr_to_yuv(&mut planes);
            yuv_to_bgr(&mut planes);
            assert!((planes[0].buf()[0] - b as f32).abs() < 1e-2);
            assert!((planes[1].buf()[0] - g as f32).abs() < 1e-2);
            assert!((planes[2].buf()[0] - r as f32).abs() < 1e-2);
        }
    }

    #[test]
    fn luma_weights_match_bt601() {
        let mut planes = [
            Plane::from_vec(1, 1, vec![0.0]),
            Plane::from_vec(1, 1, vec![0.0]),
            Plane::from_vec(1, 1, vec![100.0]),
        ];
        bgr_to_yuv(&mut planes);
        assert!((planes[0].buf()[0] - 29.9).abs() < 1e-3);
    }

    #[test]
    fn padding_appends_at_most_one_row_and_column() {
        let plane = Plane::from_vec(3, 5, vec![1.0f32; 15]);
        let padded = pad_to_even(&plane);
        assert_eq!((padded.width(), padded.height()), (4, 6));
        assert_eq!(padded.row(0)[3], 0.0);
        assert_eq!(padded.row(5)[0], 0.0);
        assert_eq!(padded.row(4)[2], 1.0);

        let even = Plane::from_vec(4, 4, vec![2.0f32; 16]);
        assert_eq!(pad_to_even(&even), even);
    }

    #[test]
    fn opaque_alpha_is_dropped_translucent_alpha_is_kept() {
        let opaque = Image::from_vec(2, 1, 4, vec![1, 2, 3, 255, 4, 5, 6, 255]);
        let (_, alpha) = split_channels(&opaque);
        assert!(alpha.is_none());

        let translucent = Image::from_vec(2, 1, 4, vec![1, 2, 3, 255, 4, 5, 6, 128]);
        let (planes, alpha) = split_channels(&translucent);
        let alpha = alpha.unwrap();
        assert_eq!(alpha.buf(), &[255, 128]);

        let merged = merge_channels(&planes, Some(&alpha));
        assert_eq!(merged.channels(), 4);
        assert_eq!(merged.data(), translucent.data());
    }

    #[test]
    fn clamp_rounds_to_nearest() {
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(300.0), 255);
        assert_eq!(clamp_u8(17.4), 17);
        assert_eq!(clamp_u8(17.6), 18);
    }
}
