// Copyright 2019-2024 linprog developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Eta store
//!
//! An arena-backed chain of elementary transforms, one per pivot. The chain is stored
//! in append order as index ranges into shared payload arenas, so iteration in either
//! direction is `O(k)` and cache friendly; there is no pointer chasing. Payload
//! capacity grows in doubling chunks up to a 64 KiB cap, and chunks are retained for
//! reuse across [`EtaStore::reset`].

use crate::core::{Error, LpFloat};

/// Initial payload chunk, in entries of the value arena.
const INITIAL_CHUNK: usize = 128;

/// Payload growth cap: 64 KiB worth of `f64` entries.
const MAX_CHUNK: usize = (64 << 10) / std::mem::size_of::<f64>();

/// One eta factor: the transform recorded by a single pivot.
#[derive(Debug, Clone, Copy)]
struct EtaNode {
    /// Pivot row
    row: usize,
    /// Offset of the off-diagonal payload
    start: usize,
    /// Number of off-diagonal entries
    len: usize,
}

/// Borrowed view of one eta factor.
#[derive(Debug, Clone, Copy)]
pub struct EtaView<'a, F> {
    /// Pivot row index
    pub row: usize,
    /// Pivot element value
    pub pivot: F,
    /// Off-diagonal row indices
    pub idx: &'a [usize],
    /// Off-diagonal values
    pub val: &'a [F],
}

/// Arena-allocated chain of eta factors.
#[derive(Debug, Clone)]
pub struct EtaStore<F> {
    nodes: Vec<EtaNode>,
    pivots: Vec<F>,
    idx: Vec<usize>,
    val: Vec<F>,
    next_chunk: usize,
}

impl<F> EtaStore<F>
where
    F: LpFloat,
{
    /// Create an empty store.
    pub fn new() -> Self {
        EtaStore {
            nodes: Vec::new(),
            pivots: Vec::new(),
            idx: Vec::new(),
            val: Vec::new(),
            next_chunk: INITIAL_CHUNK,
        }
    }

    /// Number of eta factors in the chain.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Accumulated payload memory in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.val.len() * std::mem::size_of::<F>() + self.idx.len() * std::mem::size_of::<usize>()
    }

    /// Total number of off-diagonal entries across the chain.
    pub fn total_nnz(&self) -> usize {
        self.val.len()
    }

    /// Append an eta factor recorded from a pivot.
    ///
    /// `indices` and `values` are the off-diagonal entries; `pivot` must be nonzero
    /// (the caller enforces its pivot tolerance). On allocation failure the store is
    /// left unchanged and an error is returned; a partially written node never
    /// becomes visible.
    pub fn append(
        &mut self,
        row: usize,
        pivot: F,
        indices: &[usize],
        values: &[F],
    ) -> Result<(), Error> {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(!pivot.is_zero());
        let nnz = indices.len();
        self.reserve_payload(nnz)?;
        if let Err(e) = self.nodes.try_reserve(1) {
            return Err(lp_error!(
                OutOfMemory,
                format!("`EtaStore`: cannot grow node arena ({}).", e)
            ));
        }
        if let Err(e) = self.pivots.try_reserve(1) {
            return Err(lp_error!(
                OutOfMemory,
                format!("`EtaStore`: cannot grow pivot arena ({}).", e)
            ));
        }
        let start = self.idx.len();
        self.idx.extend_from_slice(indices);
        self.val.extend_from_slice(values);
        self.pivots.push(pivot);
        self.nodes.push(EtaNode {
            row,
            start,
            len: nnz,
        });
        Ok(())
    }

    /// Drop the whole chain, retaining the allocated chunks for reuse.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.pivots.clear();
        self.idx.clear();
        self.val.clear();
    }

    /// Iterate the chain oldest to newest (FTRAN order).
    pub fn iter(&self) -> impl Iterator<Item = EtaView<'_, F>> {
        self.nodes.iter().enumerate().map(move |(k, node)| EtaView {
            row: node.row,
            pivot: self.pivots[k],
            idx: &self.idx[node.start..node.start + node.len],
            val: &self.val[node.start..node.start + node.len],
        })
    }

    /// Iterate the chain newest to oldest (BTRAN order).
    pub fn iter_rev(&self) -> impl Iterator<Item = EtaView<'_, F>> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .map(move |(k, node)| EtaView {
                row: node.row,
                pivot: self.pivots[k],
                idx: &self.idx[node.start..node.start + node.len],
                val: &self.val[node.start..node.start + node.len],
            })
    }

    /// Grow the payload arenas ahead of an append.
    ///
    /// Chunks double up to [`MAX_CHUNK`]; `try_reserve` keeps the arenas untouched on
    /// failure.
    fn reserve_payload(&mut self, additional: usize) -> Result<(), Error> {
        let free = self.idx.capacity() - self.idx.len();
        if free < additional {
            let grow = self.next_chunk.max(additional);
            if let Err(e) = self.idx.try_reserve(grow) {
                return Err(lp_error!(
                    OutOfMemory,
                    format!("`EtaStore`: cannot grow index arena ({}).", e)
                ));
            }
        }
        let free = self.val.capacity() - self.val.len();
        if free < additional {
            let grow = self.next_chunk.max(additional);
            if let Err(e) = self.val.try_reserve(grow) {
                return Err(lp_error!(
                    OutOfMemory,
                    format!("`EtaStore`: cannot grow value arena ({}).", e)
                ));
            }
            self.next_chunk = (self.next_chunk * 2).min(MAX_CHUNK);
        }
        Ok(())
    }
}

impl<F: LpFloat> Default for EtaStore<F> {
    fn default() -> Self {
        EtaStore::new()
    }
}
