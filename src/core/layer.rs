//! A single counting layer: a power-of-two array of saturating counters
//! sharing one bit width.
//!
//! Layers are the unit the cascading filter stacks: probe indices are
//! masked against the layer's `capacity - 1`, counters saturate at the
//! width's exact maximum value, and a saturated counter diverts further
//! increments for that probe to the next layer in the stack.

use crate::core::config::{BitWidth, LayerConfig};
use crate::core::store::CounterStore;
use crate::error::{GlobimapError, Result};

/// Full-layer reduction over every counter.
///
/// Commutative and associative, so partitions of the counter array can be
/// reduced independently and merged in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStats {
    /// Number of zero counters.
    pub zeros: u64,
    /// Smallest counter value.
    pub min: u64,
    /// Largest counter value.
    pub max: u64,
    /// Sum of all counter values (wrapping; a saturated 64-bit layer can
    /// exceed `u64` in aggregate).
    pub sum: u64,
}

impl LayerStats {
    fn identity() -> Self {
        Self {
            zeros: 0,
            min: u64::MAX,
            max: 0,
            sum: 0,
        }
    }

    fn observe(mut self, value: u64) -> Self {
        self.zeros += u64::from(value == 0);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum = self.sum.wrapping_add(value);
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            zeros: self.zeros + other.zeros,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum.wrapping_add(other.sum),
        }
    }
}

/// Fixed-capacity array of saturating counters, all at one bit width.
///
/// Capacity is always `2^log2_size`; `mask()` is `capacity - 1`, applied by
/// callers to probe values before any counter access.
#[derive(Debug)]
pub struct CounterLayer {
    width: BitWidth,
    log2_size: u32,
    capacity: u64,
    mask: u64,
    store: CounterStore,
}

impl CounterLayer {
    /// Allocate a zeroed layer of `2^log2_size` counters.
    ///
    /// # Panics
    ///
    /// Panics if `log2_size >= 64`; [`FilterConfig`](crate::FilterConfig)
    /// validation rejects such configurations before they reach a layer.
    #[must_use]
    pub fn new(width: BitWidth, log2_size: u32) -> Self {
        assert!(log2_size < 64, "layer log2_size must be below 64");
        let capacity = 1u64 << log2_size;
        Self {
            width,
            log2_size,
            capacity,
            mask: capacity - 1,
            store: CounterStore::new(width, capacity),
        }
    }

    /// Allocate a layer from a validated [`LayerConfig`].
    ///
    /// # Errors
    ///
    /// Same validation as [`FilterConfig::new`](crate::FilterConfig::new)
    /// for a single entry.
    pub fn from_config(config: LayerConfig) -> Result<Self> {
        let width = BitWidth::from_bits(config.bits)?;
        if config.log2_size >= 64 {
            return Err(GlobimapError::invalid_log_size(config.log2_size));
        }
        Ok(Self::new(width, config.log2_size))
    }

    /// Counter bit width.
    #[must_use]
    #[inline]
    pub fn width(&self) -> BitWidth {
        self.width
    }

    /// Log2 of the capacity.
    #[must_use]
    #[inline]
    pub fn log2_size(&self) -> u32 {
        self.log2_size
    }

    /// Number of counters (`2^log2_size`).
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Index mask (`capacity - 1`), to be applied to probe values before
    /// any access.
    #[must_use]
    #[inline]
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Load a counter, widened to 64 bits.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity()` — a contract violation by a caller
    /// that skipped masking, treated as fatal.
    #[must_use]
    #[inline]
    pub fn get(&self, index: u64) -> u64 {
        self.store.get(index as usize)
    }

    /// Increment the counter at `index` by one unless it is saturated.
    ///
    /// Returns `true` if the increment took effect, `false` if the counter
    /// was already at the saturation threshold (it is left unchanged and
    /// never wraps). Safe to call concurrently; the saturation check and
    /// increment are a single atomic step.
    #[inline]
    pub fn increment(&self, index: u64) -> bool {
        self.store.try_increment(index as usize)
    }

    /// Whether the counter at `index` equals the bit width's maximum
    /// representable value.
    #[must_use]
    #[inline]
    pub fn is_saturated(&self, index: u64) -> bool {
        self.store.is_saturated(index as usize)
    }

    /// Packed storage size in bytes: `ceil(capacity / 8)` for 1-bit
    /// layers, `capacity * bits / 8` otherwise.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        match self.width {
            BitWidth::B1 => (self.capacity + 7) / 8,
            width => self.capacity * u64::from(width.bits() / 8),
        }
    }

    /// Reduce every counter into [`LayerStats`].
    ///
    /// With the `rayon` feature the counter array is partitioned across
    /// threads and the partial results merged; the reduction is
    /// commutative so the merge order does not matter.
    #[must_use]
    pub fn stats(&self) -> LayerStats {
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;

            (0..self.capacity)
                .into_par_iter()
                .fold(LayerStats::identity, |acc, i| acc.observe(self.get(i)))
                .reduce(LayerStats::identity, LayerStats::merge)
        }

        #[cfg(not(feature = "rayon"))]
        {
            (0..self.capacity)
                .fold(LayerStats::identity(), |acc, i| acc.observe(self.get(i)))
        }
    }

    /// Serialize all counters into a packed byte sequence.
    ///
    /// 1-bit layers pack 8 counters per byte least-significant-bit first;
    /// wider layers emit fixed-width little-endian counters.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.store.to_bytes()
    }

    /// Rebuild a layer of the given shape from its packed byte encoding.
    ///
    /// # Errors
    ///
    /// `SerializationError` if `bytes.len()` does not match the byte size
    /// implied by `(width, log2_size)`.
    pub fn from_bytes(width: BitWidth, log2_size: u32, bytes: &[u8]) -> Result<Self> {
        assert!(log2_size < 64, "layer log2_size must be below 64");
        let capacity = 1u64 << log2_size;
        let expected = match width {
            BitWidth::B1 => (capacity + 7) / 8,
            w => capacity * u64::from(w.bits() / 8),
        } as usize;
        if bytes.len() != expected {
            return Err(GlobimapError::serialization_error(expected, bytes.len()));
        }
        Ok(Self {
            width,
            log2_size,
            capacity,
            mask: capacity - 1,
            store: CounterStore::from_bytes(width, capacity, bytes),
        })
    }
}
