//! GloBiMap: a memory-bounded probabilistic map for very large 2-D
//! coordinate sets.
//!
//! A [`Globimap`] represents hundreds of millions of inserted coordinates
//! in a fixed, configurable memory footprint, trading a controllable
//! false-positive rate and tunable count-estimation error for never
//! storing the points themselves. The workload it targets: ingest a
//! GPS/point-cloud stream, then test membership or estimate per-cell
//! density without the original data.
//!
//! # How it works
//!
//! The filter is a stack of [`CounterLayer`]s — power-of-two arrays of
//! saturating counters, each layer at one bit width from {1, 8, 16, 32,
//! 64}. A coordinate is hashed once into 128 bits; k probe indices are
//! derived arithmetically from the two hash words (the "hashing trick").
//! Each probe's increment cascades: it lands in the first layer whose
//! counter at the probe's masked index is not yet saturated, so a narrow
//! first layer absorbs the bulk of the traffic and wider layers catch the
//! overflow.
//!
//! - [`Globimap::get_bool`] — Bloom-style membership: no false negatives,
//!   tunable false positives.
//! - [`Globimap::get_min`] — count-min frequency estimate: minimum over
//!   the per-probe cascade sums.
//!
//! # Quick start
//!
//! ```
//! use globimap::{Coordinate, Globimap, LayerConfig};
//!
//! let filter = Globimap::builder()
//!     .hash_count(4)
//!     .layer(LayerConfig::new(1, 20))  // 1 Mbit membership layer
//!     .layer(LayerConfig::new(8, 16))  // overflow counters
//!     .build()
//!     .unwrap();
//!
//! filter.put(Coordinate::new(1024, 2048)).unwrap();
//! assert!(filter.get_bool(Coordinate::new(1024, 2048)));
//! assert!(!filter.get_bool(Coordinate::new(3, 5)));
//! ```
//!
//! # Feeding the filter from polygons
//!
//! The [`raster`] module converts vector polygons into pixel streams with
//! a scanline even-odd fill; it is the standard generator for exercising
//! filter accuracy on realistic spatial data:
//!
//! ```
//! use globimap::{raster, Coordinate, Globimap, LayerConfig};
//!
//! let filter = Globimap::builder()
//!     .hash_count(2)
//!     .layer(LayerConfig::new(8, 16))
//!     .build()
//!     .unwrap();
//!
//! let ring = [(10.0, 10.0), (20.0, 10.0), (20.0, 20.0), (10.0, 20.0)];
//! raster::rasterize(&ring, |x, y| {
//!     filter.put(Coordinate::new(x as u64, y as u64)).unwrap();
//! });
//! assert!(filter.get_bool(Coordinate::new(15, 15)));
//! ```
//!
//! # Auditing accuracy
//!
//! A filter built with ground-truth collection keeps an exact map of its
//! inputs; [`Globimap::detect_errors`] sweeps a region and grades every
//! cell against it. See the [`filter::audit`] module.
//!
//! # Concurrency
//!
//! Inserts and queries take `&self`: every counter mutation is one atomic
//! compare-and-increment, queries are atomic loads, and the probabilistic
//! contract tolerates queries racing inserts. Layer statistics, audits and
//! region estimation parallelize across threads with the `rayon` feature.
//!
//! # Feature flags
//!
//! | Feature  | Enables                                              |
//! |----------|------------------------------------------------------|
//! | `rayon`  | Parallel `stats()`, audits, region estimation (default) |
//! | `serde`  | `Serialize`/`Deserialize` on config and summary types |
//!
//! # Determinism
//!
//! Hashing is a fixed deterministic function with fixed seeds: two filters
//! built from the same [`FilterConfig`] place any coordinate identically,
//! and golden-vector tests pin the exact hash output.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::manual_range_contains)]

pub mod core;
pub mod error;
pub mod filter;
pub mod hash;
pub mod raster;

pub use crate::core::{
    BitWidth, CancelToken, Coordinate, CounterLayer, ExhaustionPolicy,
    FilterConfig, LayerConfig, LayerStats,
};
pub use crate::error::{GlobimapError, Result};
pub use crate::filter::audit::ErrorStats;
pub use crate::filter::summary::{ErrorSummary, FilterSummary, LayerSummary};
pub use crate::filter::{Globimap, GlobimapBuilder};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use globimap::prelude::*;
///
/// let filter = Globimap::builder()
///     .hash_count(2)
///     .layer(LayerConfig::new(8, 12))
///     .build()
///     .unwrap();
/// filter.put(Coordinate::new(1, 2)).unwrap();
/// assert!(filter.get_bool(Coordinate::new(1, 2)));
/// ```
pub mod prelude {
    pub use crate::core::{
        BitWidth, CancelToken, Coordinate, ExhaustionPolicy, FilterConfig,
        LayerConfig,
    };
    pub use crate::error::{GlobimapError, Result};
    pub use crate::filter::{Globimap, GlobimapBuilder};
    pub use crate::raster;
}
