//! Frequency-domain transforms used by the watermark codec: the per-block
//! orthonormal 2-D DCT and the one-level 2-D Haar wavelet transform applied
//! to each colour channel.
mod dct;
mod haar;

pub use dct::*;
pub use haar::*;
