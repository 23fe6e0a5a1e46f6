//! Keyed permutations: the payload-order scramble and the per-block
//! coefficient shuffle table. Both are derived from NumPy-compatible
//! [`RandomState`] streams so embeddings interoperate with the reference
//! implementation.
use aquamark_rand::RandomState;

/// Scramble payload bits with the watermark key (embed side).
pub fn scramble<T: Copy>(values: &[T], wm_key: u32) -> Vec<T> {
    let mut out = values.to_vec();
    RandomState::new(wm_key).shuffle(&mut out);
    out
}

/// Invert [`scramble`] (extract side).
///
/// Regenerates the same permutation and scatters each value back to its
/// pre-shuffle position.
pub fn unscramble<T: Copy + Default>(values: &[T], wm_key: u32) -> Vec<T> {
    let perm = RandomState::new(wm_key).permutation(values.len());
    let mut out = vec![T::default(); values.len()];
    for (value, &slot) in values.iter().zip(&perm) {
        out[slot as usize] = *value;
    }
    out
}

/// Per-block coefficient permutations keyed by the image key.
///
/// Row `i` is the argsort of the `i`-th row of
/// `RandomState(img_key).random((rows, row_len))`, matching the reference
/// shuffle-table construction.
#[derive(Debug, Clone)]
pub struct ShuffleTable {
    indices: Vec<u32>,
    row_len: usize,
}

impl ShuffleTable {
    pub fn generate(img_key: u32, rows: usize, row_len: usize) -> Self {
        let mut rng = RandomState::new(img_key);
        let mut draws = vec![0.0f64; row_len];
        let mut indices = Vec::with_capacity(rows * row_len);
        let mut order: Vec<u32> = (0..row_len as u32).collect();
        for _ in 0..rows {
            rng.fill_f64(&mut draws);
            order.sort_unstable_by(|&a, &b| draws[a as usize].total_cmp(&draws[b as usize]));
            indices.extend_from_slice(&order);
            for (i, slot) in order.iter_mut().enumerate() {
                *slot = i as u32;
            }
        }
        Self { indices, row_len }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.indices.len() / self.row_len
    }

    #[inline]
    pub fn row(&self, index: usize) -> &[u32] {
        &self.indices[index * self.row_len..(index + 1) * self.row_len]
    }
}
