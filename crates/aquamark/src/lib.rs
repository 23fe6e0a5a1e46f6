//! aquamark is a blind image watermarking library. It hides a payload
//! (text, a small bitmap, or a raw bit array) in a cover image by
//! quantising singular values of blockwise DCT coefficients inside the LL
//! sub-band of a one-level Haar decomposition, independently on all three
//! YUV channels. The payload survives lossy compression, brightness shifts
//! and moderate geometric attacks, and extraction needs only the keys and
//! the payload length, not the original cover.
//!
//! ```
//! use aquamark::{Image, Watermarker, WatermarkConfig};
//!
//! # fn main() -> aquamark::Result<()> {
//! let cover = Image::from_vec(128, 128, 3, vec![96; 128 * 128 * 3]);
//! let marker = Watermarker::new(WatermarkConfig::default())?;
//! let (marked, len) = marker.embed_text(&cover, "hi")?;
//! assert_eq!(marker.extract_text(&marked, len)?, "hi");
//! # Ok(())
//! # }
//! ```
mod block;
mod engine;
mod error;
pub mod kmeans;
pub mod payload;
pub mod pixel;
pub mod scramble;

pub use aquamark_grid::{BlockShape, Plane};
pub use aquamark_threadpool::PoolMode;
use aquamark_threadpool::WorkerPool;
pub use block::BlockCodec;
pub use engine::Engine;
pub use error::{Error, Result};
pub use pixel::Image;

/// Keys and tuning of a [`Watermarker`].
///
/// `d1`/`d2` trade robustness for visibility; `d2 = 0` disables the
/// secondary band entirely.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Key scrambling the payload bit order.
    pub wm_key: u32,
    /// Key deriving the per-block coefficient permutations.
    pub img_key: u32,
    /// Quantisation step of the leading singular value.
    pub d1: f64,
    /// Quantisation step of the second singular value; 0 disables it.
    pub d2: f64,
    pub block: BlockShape,
    pub pool_mode: PoolMode,
    /// Worker count for the threaded modes; `None` uses all cores.
    pub workers: Option<usize>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            wm_key: 1,
            img_key: 1,
            d1: 36.0,
            d2: 20.0,
            block: BlockShape::default(),
            pool_mode: PoolMode::Serial,
            workers: None,
        }
    }
}

/// Blind watermark embedder/extractor.
pub struct Watermarker {
    wm_key: u32,
    engine: Engine,
}

impl Watermarker {
    pub fn new(config: WatermarkConfig) -> Result<Self> {
        if !(config.d1 > 0.0) || !config.d1.is_finite() {
            return Err(Error::InvalidParameter("d1 must be positive and finite"));
        }
        if !(config.d2 >= 0.0) || !config.d2.is_finite() {
            return Err(Error::InvalidParameter("d2 must be non-negative and finite"));
        }
        if config.block.is_empty() {
            return Err(Error::InvalidParameter("block dimensions must be non-zero"));
        }
        let pool = WorkerPool::with_mode(config.pool_mode, config.workers);
        Ok(Self {
            wm_key: config.wm_key,
            engine: Engine::new(config.img_key, config.d1, config.d2, config.block, pool),
        })
    }

    /// Number of blocks a cover of the given size provides; the payload must
    /// stay strictly below this.
    pub fn capacity(&self, width: usize, height: usize) -> Result<usize> {
        self.engine.capacity(width, height)
    }

    /// Embed a raw bit payload.
    pub fn embed_bits(&self, cover: &Image, bits: &[bool]) -> Result<Image> {
        if bits.is_empty() {
            return Err(Error::InvalidParameter("payload must not be empty"));
        }
        let scrambled = scramble::scramble(bits, self.wm_key);
        self.engine.embed(cover, &scrambled)
    }

    /// Embed a text payload; returns the marked image and the bit length
    /// the caller must persist for extraction.
    pub fn embed_text(&self, cover: &Image, text: &str) -> Result<(Image, usize)> {
        let bits = payload::text_to_bits(text);
        let image = self.embed_bits(cover, &bits)?;
        Ok((image, bits.len()))
    }

    /// Embed a grayscale bitmap payload (thresholded at mid-gray).
    pub fn embed_bitmap(&self, cover: &Image, bitmap: &Plane<u8>) -> Result<Image> {
        self.embed_bits(cover, &payload::bitmap_to_bits(bitmap))
    }

    /// Extract the soft estimate vector, one value in [0, 1] per payload
    /// bit, in original payload order.
    pub fn extract_soft(&self, img: &Image, len: usize) -> Result<Vec<f64>> {
        let soft = self.engine.extract_soft(img, len)?;
        Ok(scramble::unscramble(&soft, self.wm_key))
    }

    /// Extract a bit payload, binarised with the 1-D k-means classifier.
    pub fn extract_bits(&self, img: &Image, len: usize) -> Result<Vec<bool>> {
        let soft = self.engine.extract_soft(img, len)?;
        let bits = kmeans::binarise(&soft);
        Ok(scramble::unscramble(&bits, self.wm_key))
    }

    /// Extract a text payload embedded with [`Self::embed_text`].
    pub fn extract_text(&self, img: &Image, len: usize) -> Result<String> {
        Ok(payload::bits_to_text(&self.extract_bits(img, len)?))
    }

    /// Extract a bitmap payload; the shape must match the embedded bitmap.
    pub fn extract_bitmap(&self, img: &Image, width: usize, height: usize) -> Result<Plane<u8>> {
        let soft = self.extract_soft(img, width * height)?;
        let bits: Vec<bool> = soft.iter().map(|&v| v >= 0.5).collect();
        payload::bits_to_bitmap(&bits, width, height)
    }
}
