//! The codec orchestrator: per-channel Haar decomposition, blockwise
//! embed/extract over the LL sub-band, and the channel/cycle averaging of
//! extraction estimates.
use aquamark_grid::{BlockLayout, BlockShape, Plane};
use aquamark_threadpool::WorkerPool;
use aquamark_transform::{decompose, reconstruct};

use crate::block::BlockCodec;
use crate::pixel::{self, Image};
use crate::scramble::ShuffleTable;
use crate::{Error, Result};

const CHANNELS: usize = 3;

/// Image-keyed embed/extract engine.
///
/// Owns nothing across calls: working planes and shuffle tables live for a
/// single embed or extract.
#[derive(Debug, Clone)]
pub struct Engine {
    img_key: u32,
    codec: BlockCodec,
    pool: WorkerPool,
}

impl Engine {
    pub fn new(img_key: u32, d1: f64, d2: f64, block: BlockShape, pool: WorkerPool) -> Self {
        Self {
            img_key,
            codec: BlockCodec::new(block, d1, d2),
            pool,
        }
    }

    /// Number of payload-carrying blocks for a cover of the given size.
    pub fn capacity(&self, width: usize, height: usize) -> Result<usize> {
        let layout = self.layout_for(width, height)?;
        Ok(layout.block_count())
    }

    fn layout_for(&self, width: usize, height: usize) -> Result<BlockLayout> {
        let padded_w = width + width % 2;
        let padded_h = height + height % 2;
        Ok(BlockLayout::new(
            padded_w / 2,
            padded_h / 2,
            self.codec.shape(),
        )?)
    }

    /// Embed already-scrambled payload bits into a cover image.
    ///
    /// Bits are tiled cyclically over all blocks of each YUV channel; the
    /// payload must be strictly smaller than the block count.
    pub fn embed(&self, cover: &Image, bits: &[bool]) -> Result<Image> {
        if bits.is_empty() {
            return Err(Error::InvalidParameter("payload must not be empty"));
        }
        let layout = self.layout_for(cover.width(), cover.height())?;
        let block_count = layout.block_count();
        if bits.len() >= block_count {
            return Err(Error::WatermarkTooLarge {
                required: bits.len(),
                capacity: block_count,
            });
        }

        tracing::debug!(
            blocks = block_count,
            payload = bits.len(),
            "Embedding watermark"
        );

        let (mut planes, alpha) = pixel::split_channels(cover);
        pixel::bgr_to_yuv(&mut planes);
        let mut padded = planes.map(|plane| pixel::pad_to_even(&plane));

        let table = ShuffleTable::generate(self.img_key, block_count, self.codec.shape().len());

        for plane in &mut padded {
            let mut bands = decompose(plane);
            let tasks: Vec<(usize, Vec<f64>)> = (0..block_count)
                .map(|i| (i, read_block(&bands.ll, &layout, i)))
                .collect();
            let coded = self.pool.map(tasks, |(i, mut block)| {
                self.codec
                    .embed(&mut block, table.row(i), bits[i % bits.len()]);
                block
            });
            for (i, block) in coded.iter().enumerate() {
                write_block(&mut bands.ll, &layout, i, block);
            }
            *plane = reconstruct(&bands);
        }

        let mut out = padded.map(|plane| plane.crop(cover.width(), cover.height()));
        pixel::yuv_to_bgr(&mut out);
        Ok(pixel::merge_channels(&out, alpha.as_ref()))
    }

    /// Per-channel raw estimates, one value in [0, 1] per block.
    fn extract_raw(&self, img: &Image, layout: &BlockLayout) -> [Vec<f64>; CHANNELS] {
        let block_count = layout.block_count();
        let table = ShuffleTable::generate(self.img_key, block_count, self.codec.shape().len());

        let (mut planes, _) = pixel::split_channels(img);
        pixel::bgr_to_yuv(&mut planes);
        let padded = planes.map(|plane| pixel::pad_to_even(&plane));

        padded.map(|plane| {
            let bands = decompose(&plane);
            let tasks: Vec<(usize, Vec<f64>)> = (0..block_count)
                .map(|i| (i, read_block(&bands.ll, layout, i)))
                .collect();
            self.pool.map(tasks, |(i, mut block)| {
                self.codec.extract(&mut block, table.row(i))
            })
        })
    }

    /// Extract the averaged soft estimate vector for a payload of `len`
    /// bits. Values stay in the scrambled payload order.
    pub fn extract_soft(&self, img: &Image, len: usize) -> Result<Vec<f64>> {
        if len == 0 {
            return Err(Error::InvalidParameter("payload length must be non-zero"));
        }
        let layout = self.layout_for(img.width(), img.height())?;
        let raw = self.extract_raw(img, &layout);
        tracing::debug!(
            blocks = layout.block_count(),
            payload = len,
            "Extracted raw block estimates"
        );
        Ok(average(&raw, len))
    }
}

fn read_block(plane: &Plane<f32>, layout: &BlockLayout, index: usize) -> Vec<f64> {
    let mut buf = vec![0.0f32; layout.block().len()];
    layout.copy_block_into(plane, index, &mut buf);
    buf.into_iter().map(f64::from).collect()
}

fn write_block(plane: &mut Plane<f32>, layout: &BlockLayout, index: usize, block: &[f64]) {
    let buf: Vec<f32> = block.iter().map(|&v| v as f32).collect();
    layout.write_block_from(plane, index, &buf);
}

/// Average raw estimates across channels and cyclic payload repetitions.
///
/// Complete cycles are averaged uniformly; a partial trailing cycle is
/// folded in with weight 1/(cycles + 1), so the first `n mod len` positions
/// include the tail blocks. When there are fewer blocks than payload bits,
/// only channels are averaged and positions past the block count are
/// neutral.
fn average(raw: &[Vec<f64>; CHANNELS], len: usize) -> Vec<f64> {
    let n = raw[0].len();
    let mut avg = vec![0.5f64; len];

    if n >= len {
        let cycles = n / len;
        let remainder = n % len;
        for (j, slot) in avg.iter_mut().enumerate() {
            let mut sum = 0.0;
            for channel in raw {
                for k in 0..cycles {
                    sum += channel[k * len + j];
                }
            }
            *slot = sum / (CHANNELS * cycles) as f64;
        }
        for (j, slot) in avg.iter_mut().enumerate().take(remainder) {
            let tail: f64 = raw.iter().map(|channel| channel[cycles * len + j]).sum();
            *slot = (*slot * cycles as f64 + tail / CHANNELS as f64) / (cycles + 1) as f64;
        }
    } else {
        for (j, slot) in avg.iter_mut().enumerate().take(n) {
            *slot = raw.iter().map(|channel| channel[j]).sum::<f64>() / CHANNELS as f64;
        }
    }

    avg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_over_complete_cycles() {
        let raw = [
            vec![1.0, 0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0, 0.0],
            vec![1.0, 0.0, 1.0, 1.0],
        ];
        let avg = average(&raw, 2);
        assert!((avg[0] - 5.0 / 6.0).abs() < 1e-12);
        assert!((avg[1] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn partial_cycle_reweights_head_positions() {
        // 5 blocks, 2-bit payload: positions 0 gets the tail block folded in
        let raw = [
            vec![1.0, 0.0, 1.0, 0.0, 0.4],
            vec![1.0, 0.0, 1.0, 0.0, 0.4],
            vec![1.0, 0.0, 1.0, 0.0, 0.4],
        ];
        let avg = average(&raw, 2);
        // two complete cycles give 1.0; the tail is 0.4 with weight 1/3
        assert!((avg[0] - (1.0 * 2.0 + 0.4) / 3.0).abs() < 1e-12);
        assert!((avg[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn more_bits_than_blocks_pads_with_neutral() {
        let raw = [vec![1.0, 0.0], vec![0.8, 0.2], vec![0.9, 0.1]];
        let avg = average(&raw, 4);
        assert!((avg[0] - 0.9).abs() < 1e-12);
        assert!((avg[1] - 0.1).abs() < 1e-12);
        assert_eq!(&avg[2..], &[0.5, 0.5]);
    }
}
