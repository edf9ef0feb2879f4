//! Parallel/sequential iteration switch.
//!
//! With the `parallel` feature the matrix fills split their output into
//! disjoint column slices and hand them to rayon. Without it the very same
//! closures run sequentially, which keeps the crate usable on targets where
//! threads are unavailable (WASM, embedded hosts).
//!
//! # Usage
//!
//! ```ignore
//! use crate::maybe_par_chunks_mut_enumerate;
//!
//! maybe_par_chunks_mut_enumerate!(matrix.as_mut_slice(), nrows, |(col, column)| {
//!     // fill column `col`
//! });
//! ```

/// Macro for enumerated parallel/sequential chunk iteration on mutable slices.
///
/// Chunk size must be non-zero.
#[macro_export]
macro_rules! maybe_par_chunks_mut_enumerate {
    ($slice:expr, $chunk_size:expr, $closure:expr) => {{
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            $slice
                .par_chunks_mut($chunk_size)
                .enumerate()
                .for_each($closure);
        }
        #[cfg(not(feature = "parallel"))]
        {
            $slice
                .chunks_mut($chunk_size)
                .enumerate()
                .for_each($closure);
        }
    }};
}

pub use maybe_par_chunks_mut_enumerate;
