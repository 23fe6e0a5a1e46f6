use crate::{Error, Plane, Result};

/// Dimensions of a single coefficient block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    pub height: usize,
    pub width: usize,
}

impl Default for BlockShape {
    fn default() -> Self {
        Self {
            height: 4,
            width: 4,
        }
    }
}

impl BlockShape {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Number of samples in one block.
    pub const fn len(&self) -> usize {
        self.height * self.width
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The grid of non-overlapping blocks over the top-left part of a plane.
///
/// Blocks are addressed by a linear index in raster order; the mapping
/// `index -> (index / cols, index % cols)` is stable and is the contract the
/// keyed shuffle tables are generated against.
#[derive(Debug, Clone, Copy)]
pub struct BlockLayout {
    rows: usize,
    cols: usize,
    block: BlockShape,
}

impl BlockLayout {
    /// Compute the block grid for a plane of the given dimensions.
    ///
    /// # Panics
    /// Panics if either block dimension is zero.
    pub fn new(plane_width: usize, plane_height: usize, block: BlockShape) -> Result<Self> {
        assert!(block.height > 0 && block.width > 0);
        let rows = plane_height / block.height;
        let cols = plane_width / block.width;
        if rows == 0 || cols == 0 {
            return Err(Error::GridTooSmall {
                width: plane_width,
                height: plane_height,
                block,
            });
        }
        tracing::trace!(rows, cols, "Computed block grid");
        Ok(Self { rows, cols, block })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn block(&self) -> BlockShape {
        self.block
    }

    /// Total number of blocks in the grid.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Grid position of the block with the given linear index.
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Width of the coded top-left rectangle; the remainder of the plane is
    /// kept but never touched.
    #[inline]
    pub fn used_width(&self) -> usize {
        self.cols * self.block.width
    }

    /// Height of the coded top-left rectangle.
    #[inline]
    pub fn used_height(&self) -> usize {
        self.rows * self.block.height
    }

    /// Copy block `index` out of `plane` into `out`, row-major.
    ///
    /// # Panics
    /// Panics if `out` is shorter than the block or `index` is out of range.
    pub fn copy_block_into<S: Copy>(&self, plane: &Plane<S>, index: usize, out: &mut [S]) {
        assert!(index < self.block_count());
        assert!(out.len() >= self.block.len());
        let (row, col) = self.position(index);
        let x0 = col * self.block.width;
        let y0 = row * self.block.height;
        for by in 0..self.block.height {
            let src = &plane.row(y0 + by)[x0..x0 + self.block.width];
            out[by * self.block.width..(by + 1) * self.block.width].copy_from_slice(src);
        }
    }

    /// Write `block` back into `plane` at block position `index`.
    ///
    /// Each block covers a disjoint rectangle, so per-block writes never
    /// alias.
    pub fn write_block_from<S: Copy>(&self, plane: &mut Plane<S>, index: usize, block: &[S]) {
        assert!(index < self.block_count());
        assert!(block.len() >= self.block.len());
        let (row, col) = self.position(index);
        let x0 = col * self.block.width;
        let y0 = row * self.block.height;
        for by in 0..self.block.height {
            let dst = &mut plane.row_mut(y0 + by)[x0..x0 + self.block.width];
            dst.copy_from_slice(&block[by * self.block.width..(by + 1) * self.block.width]);
        }
    }
}
