use aquamark_grid::Plane;

/// Result of a one-level 2-D Haar decomposition.
///
/// Only `ll` is ever modified by the codec; the detail bands are carried
/// through verbatim and recombined on reconstruction.
#[derive(Debug, Clone)]
pub struct Subbands {
    pub ll: Plane<f32>,
    pub hl: Plane<f32>,
    pub lh: Plane<f32>,
    pub hh: Plane<f32>,
}

/// One-level 2-D Haar DWT.
///
/// Normalisation follows the `haar` filter bank: a constant plane of value v
/// yields an LL band of constant 2v.
///
/// # Panics
/// Panics if either dimension is odd.
pub fn decompose(plane: &Plane<f32>) -> Subbands {
    let width = plane.width();
    let height = plane.height();
    assert!(width % 2 == 0 && height % 2 == 0);
    let (half_w, half_h) = (width / 2, height / 2);

    let mut ll = Plane::new(half_w, half_h);
    let mut hl = Plane::new(half_w, half_h);
    let mut lh = Plane::new(half_w, half_h);
    let mut hh = Plane::new(half_w, half_h);

    for y in 0..half_h {
        let top = plane.row(2 * y);
        let bottom = plane.row(2 * y + 1);
        for x in 0..half_w {
            let a = top[2 * x];
            let b = top[2 * x + 1];
            let c = bottom[2 * x];
            let d = bottom[2 * x + 1];
            ll.row_mut(y)[x] = (a + b + c + d) / 2.0;
            lh.row_mut(y)[x] = (a + b - c - d) / 2.0;
            hl.row_mut(y)[x] = (a - b + c - d) / 2.0;
            hh.row_mut(y)[x] = (a - b - c + d) / 2.0;
        }
    }

    Subbands { ll, hl, lh, hh }
}

/// Inverse of [`decompose`].
pub fn reconstruct(bands: &Subbands) -> Plane<f32> {
    let half_w = bands.ll.width();
    let half_h = bands.ll.height();
    let mut plane = Plane::new(half_w * 2, half_h * 2);

    for y in 0..half_h {
        for x in 0..half_w {
            let ll = bands.ll.row(y)[x];
            let lh = bands.lh.row(y)[x];
            let hl = bands.hl.row(y)[x];
            let hh = bands.hh.row(y)[x];
            plane.row_mut(2 * y)[2 * x] = (ll + lh + hl + hh) / 2.0;
            plane.row_mut(2 * y)[2 * x + 1] = (ll + lh - hl - hh) / 2.0;
            plane.row_mut(2 * y + 1)[2 * x] = (ll - lh + hl - hh) / 2.0;
            plane.row_mut(2 * y + 1)[2 * x + 1] = (ll - lh - hl + hh) / 2.0;
        }
    }

    plane
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plane(width: usize, height: usize) -> Plane<f32> {
        let buf = (0..width * height)
            .map(|i| ((i * 2654435761) % 251) as f32)
            .collect();
        Plane::from_vec(width, height, buf)
    }

    #[test]
    fn roundtrip_is_lossless() {
        let plane = sample_plane(16, 10);
        let bands = decompose(&plane);
        let restored = reconstruct(&bands);
        for (a, b) in plane.buf().iter().zip(restored.buf()) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn constant_plane_has_flat_ll_and_zero_details() {
        let plane = Plane::from_vec(8, 8, vec![100.0f32; 64]);
        let bands = decompose(&plane);
        for v in bands.ll.buf() {
            assert!((v - 200.0).abs() < 1e-5);
        }
        for v in bands.hl.buf().iter().chain(bands.lh.buf()).chain(bands.hh.buf()) {
            assert!(v.abs() < 1e-5);
        }
    }

    #[test]
    fn ll_modification_survives_reconstruction() {
        let plane = sample_plane(12, 12);
        let mut bands = decompose(&plane);
        for v in bands.ll.buf_mut() {
            *v += 8.0;
        }
        let restored = reconstruct(&bands);
        let bands2 = decompose(&restored);
        for (a, b) in bands.ll.buf().iter().zip(bands2.ll.buf()) {
            assert!((a - b).abs() < 1e-3);
        }
    }
}
