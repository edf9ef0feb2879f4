//! Physical layouts for point coordinates.
//!
//! Kernel evaluation reads two coordinate rows per matrix entry, so the
//! layout of those rows matters for cache locality. [`PointStorage`] is the
//! capability a layout must provide; [`Points`](crate::points::Points) is
//! generic over it, so the hot loop is monomorphized per layout.
//!
//! [`DefaultStorage`] is [`RowMajorStorage`] unless the `nested-storage`
//! feature selects [`NestedStorage`].

/// Indexed row storage for `len` points of dimension `dim`.
pub trait PointStorage: Default + Clone + Send + Sync {
    /// Zero-filled storage for `len` rows of `dim` values.
    fn with_shape(len: usize, dim: usize) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn dim(&self) -> usize;

    fn row(&self, index: usize) -> &[f64];

    fn row_mut(&mut self, index: usize) -> &mut [f64];

    /// Grow or shrink to `len` rows; new rows are zero.
    fn resize(&mut self, len: usize);
}

/// All rows in one contiguous buffer, row after row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMajorStorage {
    data: Vec<f64>,
    len: usize,
    dim: usize,
}

impl PointStorage for RowMajorStorage {
    fn with_shape(len: usize, dim: usize) -> Self {
        Self {
            data: vec![0.0; len * dim],
            len,
            dim,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn row(&self, index: usize) -> &[f64] {
        debug_assert!(index < self.len, "row {} out of {}", index, self.len);
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }

    #[inline]
    fn row_mut(&mut self, index: usize) -> &mut [f64] {
        debug_assert!(index < self.len, "row {} out of {}", index, self.len);
        let start = index * self.dim;
        &mut self.data[start..start + self.dim]
    }

    fn resize(&mut self, len: usize) {
        self.data.resize(len * self.dim, 0.0);
        self.len = len;
    }
}

/// One heap allocation per row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedStorage {
    rows: Vec<Vec<f64>>,
    dim: usize,
}

impl PointStorage for NestedStorage {
    fn with_shape(len: usize, dim: usize) -> Self {
        Self {
            rows: vec![vec![0.0; dim]; len],
            dim,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    fn row(&self, index: usize) -> &[f64] {
        &self.rows[index]
    }

    #[inline]
    fn row_mut(&mut self, index: usize) -> &mut [f64] {
        &mut self.rows[index]
    }

    fn resize(&mut self, len: usize) {
        self.rows.resize(len, vec![0.0; self.dim]);
    }
}

#[cfg(not(feature = "nested-storage"))]
pub type DefaultStorage = RowMajorStorage;

#[cfg(feature = "nested-storage")]
pub type DefaultStorage = NestedStorage;
