//! Bucket-tree geometry and slot storage.
//!
//! The ORAM tree is an implicit complete binary tree packed into a flat
//! array. This module provides:
//! 1. **Geometry:** Bucket/leaf/level counts derived once from the byte
//!    sizes, plus the parent rule and root-bound path walks.
//! 2. **Slot storage:** The flat `bucket * Z + j` slot array holding block
//!    ids, with read-and-clear support for path reads.
//!
//! Buckets are numbered `0..bucket_count` with bucket 0 as the root; the
//! children of bucket `b` are `2b + 1` and `2b + 2`, and the leaves occupy
//! the last `leaf_count` indices. The parent rule special-cases bucket 1
//! landing on the root; a walk from any leaf therefore visits exactly
//! `level_count` buckets and terminates at bucket 0.

use crate::common::{BlockId, ConfigError, EMPTY_SLOT};

/// Derived geometry of one bucket tree.
///
/// Created once at configuration time and immutable thereafter. All other
/// components borrow it for index arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    /// Requested working-set size in bytes.
    pub data_set_size: u64,
    /// Backing-store size in bytes after rounding to a full tree.
    pub oram_size: u64,
    /// Block size in bytes.
    pub block_size: u64,
    /// Blocks per bucket (Z).
    pub blocks_per_bucket: usize,
    /// Number of buckets (`2^level_count - 1`).
    pub bucket_count: usize,
    /// Number of tree slots (`bucket_count * Z`).
    pub block_count: usize,
    /// Number of real blocks the working set occupies.
    pub real_block_count: usize,
    /// Number of leaves (`(bucket_count + 1) / 2`).
    pub leaf_count: usize,
    /// Tree depth: buckets on any root-to-leaf path.
    pub level_count: usize,
}

impl Geometry {
    /// Derives a tree geometry from byte sizes.
    ///
    /// The bucket count implied by `oram_size` is rounded up to the next
    /// complete tree (`2^L - 1` buckets), which grows the backing store; the
    /// stored `oram_size` reflects the rounded value.
    ///
    /// # Arguments
    ///
    /// * `data_set_size` - Working-set size in bytes.
    /// * `oram_size` - Requested backing-store size in bytes.
    /// * `block_size` - Block size in bytes.
    /// * `blocks_per_bucket` - Bucket capacity (Z).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OramTooSmall`] unless `oram_size` strictly
    /// exceeds `data_set_size`, and [`ConfigError::InvalidParameter`] for
    /// zero sizes or a backing store smaller than one bucket.
    pub fn derive(
        data_set_size: u64,
        oram_size: u64,
        block_size: u64,
        blocks_per_bucket: usize,
    ) -> Result<Self, ConfigError> {
        if block_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "block_size",
                value: block_size.to_string(),
            });
        }
        if blocks_per_bucket == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "blocks_per_bucket",
                value: blocks_per_bucket.to_string(),
            });
        }
        if oram_size <= data_set_size {
            return Err(ConfigError::OramTooSmall {
                oram_size,
                data_set_size,
            });
        }

        let block_count = (oram_size / block_size) as usize;
        let real_block_count = data_set_size.div_ceil(block_size) as usize;
        let bucket_count = block_count / blocks_per_bucket;
        if bucket_count == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "oram_size",
                value: oram_size.to_string(),
            });
        }

        // Round up to a complete tree: level_count = ceil(log2(buckets + 1)).
        let level_count = (usize::BITS - bucket_count.leading_zeros()) as usize;
        let bucket_count = (1usize << level_count) - 1;
        let block_count = bucket_count * blocks_per_bucket;
        let leaf_count = (bucket_count + 1) / 2;
        let oram_size = block_count as u64 * block_size;

        Ok(Self {
            data_set_size,
            oram_size,
            block_size,
            blocks_per_bucket,
            bucket_count,
            block_count,
            real_block_count,
            leaf_count,
            level_count,
        })
    }

    /// Parent of bucket `b`.
    ///
    /// Bucket 1's parent computation lands on the root slot 0; every other
    /// bucket follows `ceil((b - 2) / 2)`. The rule is load-bearing for the
    /// path length and the root-to-leaf write ordering.
    pub fn parent(bucket: usize) -> usize {
        debug_assert!(bucket >= 1, "the root has no parent");
        if bucket == 1 { 0 } else { (bucket - 1) / 2 }
    }

    /// Index of the leftmost leaf.
    pub fn first_leaf(&self) -> usize {
        self.leaf_count - 1
    }

    /// Index of the rightmost leaf.
    pub fn last_leaf(&self) -> usize {
        self.bucket_count - 1
    }

    /// Whether `bucket` is a leaf.
    pub fn is_leaf(&self, bucket: usize) -> bool {
        bucket >= self.first_leaf()
    }

    /// Ordinal of a leaf bucket within `0..leaf_count`.
    pub fn leaf_ordinal(&self, leaf: usize) -> usize {
        debug_assert!(self.is_leaf(leaf));
        leaf - self.first_leaf()
    }

    /// Leaf bucket index for an ordinal in `0..leaf_count`.
    pub fn leaf_from_ordinal(&self, ordinal: usize) -> usize {
        debug_assert!(ordinal < self.leaf_count);
        ordinal + self.first_leaf()
    }

    /// Slots on one root-to-leaf path (`Z * level_count`).
    pub fn path_slots(&self) -> usize {
        self.blocks_per_bucket * self.level_count
    }

    /// Walks the path from `leaf` to the root.
    ///
    /// Yields exactly `level_count` buckets, starting at `leaf` and ending
    /// at bucket 0.
    pub fn path(&self, leaf: usize) -> PathWalk {
        debug_assert!(self.is_leaf(leaf));
        PathWalk {
            bucket: leaf,
            remaining: self.level_count,
        }
    }
}

/// Iterator over the buckets of one leaf-to-root path.
#[derive(Debug, Clone)]
pub struct PathWalk {
    bucket: usize,
    remaining: usize,
}

impl Iterator for PathWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.bucket;
        if current != 0 {
            self.bucket = Geometry::parent(current);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PathWalk {}

/// Flat slot storage for the bucket tree.
///
/// Slot `bucket * Z + j` holds the id of the block resident in position `j`
/// of `bucket`, or [`EMPTY_SLOT`]. Payloads are not stored here; the tree
/// records placement only.
#[derive(Debug, Clone)]
pub struct TreeSlots {
    slots: Vec<BlockId>,
    blocks_per_bucket: usize,
}

impl TreeSlots {
    /// Creates storage with every slot empty.
    pub fn new(block_count: usize, blocks_per_bucket: usize) -> Self {
        Self {
            slots: vec![EMPTY_SLOT; block_count],
            blocks_per_bucket,
        }
    }

    /// Id stored in `slot`, or [`EMPTY_SLOT`].
    pub fn get(&self, slot: usize) -> BlockId {
        self.slots[slot]
    }

    /// Stores `id` in `slot`.
    pub fn set(&mut self, slot: usize, id: BlockId) {
        self.slots[slot] = id;
    }

    /// Clears `slot` back to empty.
    pub fn clear(&mut self, slot: usize) {
        self.slots[slot] = EMPTY_SLOT;
    }

    /// First slot index of `bucket`.
    pub fn bucket_base(&self, bucket: usize) -> usize {
        bucket * self.blocks_per_bucket
    }

    /// Count of empty slots in `bucket`.
    pub fn empty_in_bucket(&self, bucket: usize) -> usize {
        let base = self.bucket_base(bucket);
        self.slots[base..base + self.blocks_per_bucket]
            .iter()
            .filter(|&&id| id == EMPTY_SLOT)
            .count()
    }

    /// Count of occupied slots in the whole tree.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|&&id| id != EMPTY_SLOT).count()
    }

    /// Whether `id` currently sits in some tree slot.
    pub fn contains(&self, id: BlockId) -> bool {
        self.slots.contains(&id)
    }
}
