//! Block-parallel iteration, the only parallel primitive used inside the
//! library.
//!
//! The input range is split into contiguous blocks which are dispatched to
//! the worker pool; the call returns after all blocks completed. With the
//! `rayon` feature disabled everything degrades to sequential execution with
//! identical semantics.

use std::ops::Range;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::Result;

/// Splits `len` items into contiguous blocks.
///
/// With `block_size == 0` the number of blocks equals the hardware
/// parallelism hint and block lengths differ by at most one; otherwise
/// `ceil(len / block_size)` blocks are formed.
fn split_blocks(len: usize, block_size: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let num_blocks = if block_size == 0 {
        let hw = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        hw.min(len)
    } else {
        len.div_ceil(block_size)
    };

    let mut blocks = Vec::with_capacity(num_blocks);
    let mut begin = 0;
    for iblock in 0..num_blocks {
        let rest_len = len - begin;
        let rest_blocks = num_blocks - iblock;
        let mut size = rest_len / rest_blocks;
        if size * rest_blocks < rest_len {
            size += 1;
        }
        blocks.push(begin..begin + size);
        begin += size;
    }
    blocks
}

/// Calls `body` for every index of `range`, in parallel blocks.
///
/// No ordering holds between blocks; within a block iteration is sequential
/// in index order. After the call returns, all writes performed by the body
/// are visible to the caller. A panicking body fails the whole call once all
/// workers are joined.
pub fn parallel_for<F>(range: Range<usize>, body: F, block_size: usize)
where
    F: Fn(usize) + Sync,
{
    let start = range.start;
    let blocks = split_blocks(range.len(), block_size);

    #[cfg(feature = "rayon")]
    blocks.into_par_iter().for_each(|block| {
        for i in block {
            body(start + i);
        }
    });

    #[cfg(not(feature = "rayon"))]
    for block in blocks {
        for i in block {
            body(start + i);
        }
    }
}

/// Like [`parallel_for`], for fallible bodies. The first error observed is
/// returned after all workers completed; remaining blocks may or may not
/// have run.
pub fn try_parallel_for<F>(range: Range<usize>, body: F, block_size: usize) -> Result<()>
where
    F: Fn(usize) -> Result<()> + Sync,
{
    let start = range.start;
    let blocks = split_blocks(range.len(), block_size);

    #[cfg(feature = "rayon")]
    return blocks.into_par_iter().try_for_each(|block| {
        for i in block {
            body(start + i)?;
        }
        Ok(())
    });

    #[cfg(not(feature = "rayon"))]
    {
        for block in blocks {
            for i in block {
                body(start + i)?;
            }
        }
        Ok(())
    }
}

/// Calls `body` with a mutable reference to every element of `items`, in
/// parallel blocks. Blocks receive disjoint sub-slices, so the bodies never
/// alias.
pub fn parallel_for_slice_mut<T, F>(items: &mut [T], body: F, block_size: usize)
where
    T: Send,
    F: Fn(&mut T) + Sync,
{
    let blocks = split_blocks(items.len(), block_size);

    #[cfg(feature = "rayon")]
    {
        let body = &body;
        rayon::scope(|scope| {
            let mut rest = items;
            for block in blocks {
                let (head, tail) = rest.split_at_mut(block.len());
                rest = tail;
                scope.spawn(move |_| {
                    for item in head {
                        body(item);
                    }
                });
            }
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = blocks;
        for item in items {
            body(item);
        }
    }
}
