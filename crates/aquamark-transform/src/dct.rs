#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DctDirection {
    Forward,
    Inverse,
}

/// 2-D orthonormal DCT-II (and its DCT-III inverse) over fixed-size blocks.
///
/// Scaling matches OpenCV's `dct`/`idct`: the basis is orthonormal, so the
/// inverse is the exact transpose and round trips are lossless up to
/// floating-point error.
#[derive(Debug, Clone)]
pub struct Dct2d {
    width: usize,
    height: usize,
    // cos_w[k * width + n] = w(k) * cos(pi * (2n + 1) * k / (2 * width))
    cos_w: Vec<f64>,
    cos_h: Vec<f64>,
}

fn basis(n: usize) -> Vec<f64> {
    let mut table = vec![0.0f64; n * n];
    let w0 = (1.0 / n as f64).sqrt();
    let wk = (2.0 / n as f64).sqrt();
    for k in 0..n {
        let w = if k == 0 { w0 } else { wk };
        for x in 0..n {
            table[k * n + x] =
                w * (std::f64::consts::PI * (2 * x + 1) as f64 * k as f64 / (2 * n) as f64).cos();
        }
    }
    table
}

impl Dct2d {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            cos_w: basis(width),
            cos_h: basis(height),
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

    /// Transform a row-major `width x height` buffer in place.
    pub fn apply(&self, io: &mut [f64], direction: DctDirection) {
        assert_eq!(io.len(), self.width * self.height);
        let mut scratch = vec![0.0f64; self.width.max(self.height)];

        // rows
        for y in 0..self.height {
            let row = &mut io[y * self.width..(y + 1) * self.width];
            dct_1d(row, &mut scratch[..self.width], &self.cos_w, direction);
        }

        // columns
        let mut column = vec![0.0f64; self.height];
        for x in 0..self.width {
            for y in 0..self.height {
                column[y] = io[y * self.width + x];
            }
            dct_1d(&mut column, &mut scratch[..self.height], &self.cos_h, direction);
            for y in 0..self.height {
                io[y * self.width + x] = column[y];
            }
        }
    }

    pub fn forward(&self, io: &mut [f64]) {
        self.apply(io, DctDirection::Forward);
    }

    pub fn inverse(&self, io: &mut [f64]) {
        self.apply(io, DctDirection::Inverse);
    }
}

fn dct_1d(io: &mut [f64], scratch: &mut [f64], cos: &[f64], direction: DctDirection) {
    let n = io.len();
    debug_assert_eq!(scratch.len(), n);
    debug_assert_eq!(cos.len(), n * n);

    match direction {
        DctDirection::Forward => {
            for k in 0..n {
                let mut acc = 0.0;
                for (x, value) in io.iter().enumerate() {
                    acc += value * cos[k * n + x];
                }
                scratch[k] = acc;
            }
        }
        DctDirection::Inverse => {
            for (x, slot) in scratch.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, value) in io.iter().enumerate() {
                    acc += value * cos[k * n + x];
                }
                *slot = acc;
            }
        }
    }
    io.copy_from_slice(scratch);
}
