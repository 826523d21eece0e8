//! Filter configuration: layer shapes, hash count, and the canonical
//! configuration string.
//!
//! A [`FilterConfig`] is immutable once constructed: [`FilterConfig::new`]
//! validates every layer up front (fail fast, before any counter storage is
//! allocated) so the rest of the crate never re-checks bit widths or sizes.
//!
//! # Canonical configuration string
//!
//! External tooling deduplicates configuration permutations (and names cache
//! files) by the exact textual form
//! `k_<K>bits_<b1>.<b2>.…logsize_<l1>.<l2>.…`, with a trailing `.` after
//! every numeric entry. [`FilterConfig::canonical_string`] reproduces that
//! form byte for byte; do not "clean it up".

use crate::error::{GlobimapError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2-D point in the filter's coordinate space.
///
/// Ordered lexicographically by `(x, y)` so it can key the ordered
/// ground-truth map used by audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    /// Horizontal component.
    pub x: u64,
    /// Vertical component.
    pub y: u64,
}

impl Coordinate {
    /// Create a coordinate from its two components.
    #[must_use]
    #[inline]
    pub const fn new(x: u64, y: u64) -> Self {
        Self { x, y }
    }
}

impl From<(u64, u64)> for Coordinate {
    #[inline]
    fn from((x, y): (u64, u64)) -> Self {
        Self { x, y }
    }
}

/// Counter bit width of a layer.
///
/// Each layer stores all of its counters at a single width; the width is
/// fixed at construction and never branched on per access (the backing
/// store is selected once — see [`CounterStore`](crate::core::CounterStore)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitWidth {
    /// 1-bit counters, packed 8 per byte. Saturate at 1.
    B1,
    /// 8-bit counters. Saturate at `u8::MAX`.
    B8,
    /// 16-bit counters. Saturate at `u16::MAX`.
    B16,
    /// 32-bit counters. Saturate at `u32::MAX`.
    B32,
    /// 64-bit counters. Saturate at `u64::MAX`.
    B64,
}

impl BitWidth {
    /// Parse a numeric bit width.
    ///
    /// # Errors
    ///
    /// `InvalidBitWidth` for anything outside {1, 8, 16, 32, 64}.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(Self::B1),
            8 => Ok(Self::B8),
            16 => Ok(Self::B16),
            32 => Ok(Self::B32),
            64 => Ok(Self::B64),
            other => Err(GlobimapError::invalid_bit_width(other)),
        }
    }

    /// Numeric bit width.
    #[must_use]
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::B1 => 1,
            Self::B8 => 8,
            Self::B16 => 16,
            Self::B32 => 32,
            Self::B64 => 64,
        }
    }

    /// Saturation threshold: the maximum representable unsigned value for
    /// this width. Counters never exceed it and never wrap.
    #[must_use]
    #[inline]
    pub const fn saturation_threshold(self) -> u64 {
        match self {
            Self::B1 => 1,
            Self::B8 => u8::MAX as u64,
            Self::B16 => u16::MAX as u64,
            Self::B32 => u32::MAX as u64,
            Self::B64 => u64::MAX,
        }
    }
}

/// Shape of a single counter layer: bit width and log2 of its capacity.
///
/// Plain data; validation happens when the layer list is assembled into a
/// [`FilterConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerConfig {
    /// Counter bit width; must be one of 1, 8, 16, 32, 64.
    pub bits: u32,
    /// Log2 of the layer capacity; capacity is `2^log2_size`.
    pub log2_size: u32,
}

impl LayerConfig {
    /// Create a layer shape.
    #[must_use]
    #[inline]
    pub const fn new(bits: u32, log2_size: u32) -> Self {
        Self { bits, log2_size }
    }
}

/// Policy for inserts whose cascade finds every layer saturated.
///
/// The reference implementations disagreed here (some asserted, most
/// silently continued); the choice is explicit per filter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExhaustionPolicy {
    /// Silently drop the exhausted probe's update, preserving every other
    /// probe's effect. Drops are counted in
    /// [`Globimap::dropped_probes`](crate::Globimap::dropped_probes).
    #[default]
    Lenient,
    /// Abort the insert with [`GlobimapError::CapacityExhausted`] on the
    /// first exhausted probe. Probes already placed stay placed — counters
    /// are monotone and cannot be rolled back.
    FailFast,
}

/// Immutable filter configuration: hash count plus an ordered layer stack.
///
/// Only `Serialize` is derived: deserializing a config directly would
/// bypass the validation in [`FilterConfig::new`], so decoded configs are
/// rebuilt through the constructor instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FilterConfig {
    hash_count: u64,
    layers: Vec<LayerConfig>,
}

impl FilterConfig {
    /// Validate and freeze a configuration.
    ///
    /// # Errors
    ///
    /// - `InvalidHashCount` if `hash_count == 0`
    /// - `EmptyLayerStack` if `layers` is empty
    /// - `InvalidBitWidth` / `InvalidLogSize` for any malformed layer
    pub fn new(hash_count: u64, layers: Vec<LayerConfig>) -> Result<Self> {
        if hash_count == 0 {
            return Err(GlobimapError::invalid_hash_count(hash_count));
        }
        if layers.is_empty() {
            return Err(GlobimapError::EmptyLayerStack);
        }
        for layer in &layers {
            BitWidth::from_bits(layer.bits)?;
            if layer.log2_size >= 64 {
                return Err(GlobimapError::invalid_log_size(layer.log2_size));
            }
        }
        Ok(Self { hash_count, layers })
    }

    /// Number of hash probes `k` applied to every layer.
    #[must_use]
    #[inline]
    pub fn hash_count(&self) -> u64 {
        self.hash_count
    }

    /// The ordered layer shapes.
    #[must_use]
    #[inline]
    pub fn layers(&self) -> &[LayerConfig] {
        &self.layers
    }

    /// The canonical configuration string consumed by external tooling.
    ///
    /// Format: `k_<K>bits_<b1>.<b2>.…logsize_<l1>.<l2>.…` — every numeric
    /// entry is followed by a `.`, including the last.
    ///
    /// # Examples
    ///
    /// ```
    /// use globimap::{FilterConfig, LayerConfig};
    ///
    /// let config = FilterConfig::new(
    ///     4,
    ///     vec![LayerConfig::new(1, 16), LayerConfig::new(8, 10)],
    /// )
    /// .unwrap();
    /// assert_eq!(config.canonical_string(), "k_4bits_1.8.logsize_16.10.");
    /// ```
    #[must_use]
    pub fn canonical_string(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let _ = write!(s, "k_{}bits_", self.hash_count);
        for layer in &self.layers {
            let _ = write!(s, "{}.", layer.bits);
        }
        s.push_str("logsize_");
        for layer in &self.layers {
            let _ = write!(s, "{}.", layer.log2_size);
        }
        s
    }
}
