//! The GloBiMap filter: an ordered stack of counting layers behind one
//! hashing scheme.
//!
//! # Structure
//!
//! A filter owns k hash probes and an ordered list of [`CounterLayer`]s.
//! Inserting a coordinate walks each probe's cascade: the probe index is
//! masked against each layer in turn and the first non-saturated counter is
//! incremented. A narrow first layer therefore absorbs the bulk of the
//! traffic while saturated slots spill into the wider layers behind it.
//!
//! Queries mirror that walk exactly, so the read and write paths agree on
//! which layer "holds" a given probe:
//!
//! - [`Globimap::get_bool`] is the classic Bloom membership test against
//!   the first layer only.
//! - [`Globimap::get_min`] replays the cascade per probe, sums the counters
//!   along the path and takes the minimum across probes (count-min
//!   aggregation).
//!
//! # Concurrency
//!
//! [`Globimap::put`] takes `&self`: every counter mutation is a single
//! atomic compare-and-increment, so inserts for different coordinates can
//! run on as many threads as desired. Queries may run concurrently with
//! inserts; individual counter loads are atomic, and the structure's
//! probabilistic contract tolerates the lack of a cross-counter snapshot.
//!
//! # Examples
//!
//! ```
//! use globimap::{Coordinate, Globimap, LayerConfig};
//!
//! let filter = Globimap::builder()
//!     .hash_count(4)
//!     .layer(LayerConfig::new(8, 16))
//!     .layer(LayerConfig::new(32, 12))
//!     .build()
//!     .unwrap();
//!
//! filter.put(Coordinate::new(7, 11)).unwrap();
//! assert!(filter.get_bool(Coordinate::new(7, 11)));
//! assert_eq!(filter.get_min(Coordinate::new(7, 11)), 1);
//! ```

pub mod audit;
pub mod summary;

use crate::core::{
    Coordinate, CounterLayer, ExhaustionPolicy, FilterConfig, LayerConfig,
};
use crate::error::{GlobimapError, Result};
use crate::hash::{hash_coordinate, probe_index};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Multi-layer counting membership/estimation filter ("Global Binary Map").
///
/// Constructed once from a [`FilterConfig`]; all layer storage is allocated
/// and zero-initialized up front and never resized. Counters only grow,
/// except through [`Globimap::compaction`].
#[derive(Debug)]
pub struct Globimap {
    config: FilterConfig,
    hash_count: u64,
    layers: Vec<CounterLayer>,
    policy: ExhaustionPolicy,
    dropped_probes: AtomicU64,
    ground_truth: Option<Mutex<BTreeMap<Coordinate, u64>>>,
    error_map: BTreeMap<Coordinate, u64>,
    error_rate: f64,
}

impl Globimap {
    /// Build a filter from a validated configuration with the default
    /// (lenient) exhaustion policy and no ground-truth collection.
    #[must_use]
    pub fn new(config: FilterConfig) -> Self {
        Self::with_options(config, ExhaustionPolicy::default(), false)
    }

    /// Build a filter choosing the exhaustion policy and whether to
    /// maintain the exact ground-truth map used by
    /// [`detect_errors`](Self::detect_errors).
    ///
    /// Ground-truth collection stores every inserted coordinate exactly and
    /// is meant for accuracy audits on bounded test datasets, not for
    /// production ingest.
    #[must_use]
    pub fn with_options(
        config: FilterConfig,
        policy: ExhaustionPolicy,
        collect_ground_truth: bool,
    ) -> Self {
        let layers = config
            .layers()
            .iter()
            .map(|lc| {
                CounterLayer::from_config(*lc)
                    .expect("FilterConfig construction validates every layer")
            })
            .collect();
        Self {
            hash_count: config.hash_count(),
            layers,
            policy,
            dropped_probes: AtomicU64::new(0),
            ground_truth: collect_ground_truth
                .then(|| Mutex::new(BTreeMap::new())),
            error_map: BTreeMap::new(),
            error_rate: 0.0,
            config,
        }
    }

    /// Start building a filter fluently.
    #[must_use]
    pub fn builder() -> GlobimapBuilder {
        GlobimapBuilder::default()
    }

    /// The configuration this filter was built from.
    ///
    /// Stays as constructed even after [`compaction`](Self::compaction) —
    /// external tooling keys caches on
    /// [`FilterConfig::canonical_string`], which must not drift.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Number of hash probes per coordinate.
    #[must_use]
    pub fn hash_count(&self) -> u64 {
        self.hash_count
    }

    /// The live layer stack (may be shorter than the configured stack
    /// after [`compaction`](Self::compaction)).
    #[must_use]
    pub fn layers(&self) -> &[CounterLayer] {
        &self.layers
    }

    /// Total packed storage across all live layers, in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.layers.iter().map(CounterLayer::byte_size).sum()
    }

    /// Whether this filter maintains a ground-truth map for auditing.
    #[must_use]
    pub fn collects_ground_truth(&self) -> bool {
        self.ground_truth.is_some()
    }

    /// Number of probe updates dropped under the lenient exhaustion
    /// policy since construction.
    #[must_use]
    pub fn dropped_probes(&self) -> u64 {
        self.dropped_probes.load(Ordering::Relaxed)
    }

    /// Insert a coordinate.
    ///
    /// For each of the k probes, the cascade walks the layer stack in
    /// order and increments the first non-saturated counter at that
    /// probe's masked index. A probe that finds every layer saturated
    /// mutates nothing; what happens next is the configured
    /// [`ExhaustionPolicy`]:
    ///
    /// # Errors
    ///
    /// `CapacityExhausted` under [`ExhaustionPolicy::FailFast`]; never
    /// fails under [`ExhaustionPolicy::Lenient`] (the drop is counted in
    /// [`dropped_probes`](Self::dropped_probes) instead).
    pub fn put(&self, coordinate: Coordinate) -> Result<()> {
        let (h1, h2) = hash_coordinate(coordinate);

        if let Some(truth) = &self.ground_truth {
            *truth.lock().entry(coordinate).or_insert(0) += 1;
        }

        for probe in 0..self.hash_count {
            let placed = self.layers.iter().any(|layer| {
                let idx = probe_index(h1, h2, probe, layer.mask());
                layer.increment(idx)
            });
            if !placed {
                match self.policy {
                    ExhaustionPolicy::Lenient => {
                        self.dropped_probes.fetch_add(1, Ordering::Relaxed);
                    }
                    ExhaustionPolicy::FailFast => {
                        return Err(GlobimapError::capacity_exhausted(probe));
                    }
                }
            }
        }
        Ok(())
    }

    /// Insert every coordinate from an iterator.
    ///
    /// # Errors
    ///
    /// Stops at the first `CapacityExhausted` under the fail-fast policy;
    /// coordinates already inserted stay inserted.
    pub fn put_all<I, C>(&self, coordinates: I) -> Result<()>
    where
        I: IntoIterator<Item = C>,
        C: Into<Coordinate>,
    {
        for c in coordinates {
            self.put(c.into())?;
        }
        Ok(())
    }

    /// Classic Bloom membership test against the first layer only.
    ///
    /// Returns `true` iff all k probe slots in the first layer are
    /// non-zero. `false` means the coordinate was definitely never
    /// inserted (no false negatives); `true` may be a false positive.
    #[must_use]
    pub fn get_bool(&self, coordinate: Coordinate) -> bool {
        let (h1, h2) = hash_coordinate(coordinate);
        let first = &self.layers[0];
        (0..self.hash_count)
            .all(|probe| first.get(probe_index(h1, h2, probe, first.mask())) != 0)
    }

    /// Count-min frequency estimate for a coordinate.
    ///
    /// Each probe replays the insert cascade, summing counters along its
    /// path and stopping at the first non-saturated layer; the estimate is
    /// the minimum of the per-probe sums, an upper bound on the true
    /// insertion count under collisions.
    ///
    /// A zero counter anywhere along any probe's path makes the whole
    /// estimate 0 immediately. For never-inserted coordinates this
    /// correctly signals absence, but a first-layer slot saturated by
    /// colliding neighbors can route the walk onto an untouched deeper
    /// slot and underestimate a true positive. That asymmetry is
    /// deliberately preserved from the reference implementation and pinned
    /// by tests; do not "fix" it without revisiting the callers that
    /// depend on 0 meaning "absent".
    #[must_use]
    pub fn get_min(&self, coordinate: Coordinate) -> u64 {
        let (h1, h2) = hash_coordinate(coordinate);
        self.get_min_hashed(h1, h2)
    }

    /// [`get_min`](Self::get_min) for a coordinate hashed up front with
    /// [`hash_coordinate`](crate::hash::hash_coordinate).
    ///
    /// Lets batch drivers hash each point once and query many filters.
    #[must_use]
    pub fn get_min_hashed(&self, h1: u64, h2: u64) -> u64 {
        let mut min_v = u64::MAX;
        for probe in 0..self.hash_count {
            let mut sum = 0u64;
            for layer in &self.layers {
                let idx = probe_index(h1, h2, probe, layer.mask());
                let v = layer.get(idx);
                if v == 0 {
                    return 0;
                }
                sum = sum.saturating_add(v);
                if !layer.is_saturated(idx) {
                    break;
                }
            }
            min_v = min_v.min(sum);
        }
        min_v
    }

    /// Estimate every cell of the rectangle `[x, x+width) × [y, y+height)`.
    ///
    /// Returns `get_min` values in row-major order: the value for
    /// `(x + col, y + row)` is at `row * width + col`. Rows are processed
    /// in parallel with the `rayon` feature.
    #[must_use]
    pub fn estimate_region(&self, x: u64, y: u64, width: u64, height: u64) -> Vec<u64> {
        let row = |r: u64| -> Vec<u64> {
            (0..width)
                .map(|c| self.get_min(Coordinate::new(x + c, y + r)))
                .collect()
        };

        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            (0..height).into_par_iter().flat_map_iter(row).collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            (0..height).flat_map(row).collect()
        }
    }

    /// Release trailing layers that never received a single increment.
    ///
    /// A layer is reachable only through saturation of its predecessor, so
    /// an all-zero layer implies everything behind it is all-zero too; the
    /// reverse scan finds the last layer with a non-zero maximum and
    /// truncates the stack after it. The first layer is always kept — the
    /// membership path and serialization depend on it.
    pub fn compaction(&mut self) {
        let keep = self
            .layers
            .iter()
            .rposition(|layer| layer.stats().max != 0)
            .map_or(1, |i| i + 1);
        self.layers.truncate(keep);
    }

    /// Serialize the first layer's counters as a packed byte buffer.
    ///
    /// Only the first layer is encoded — multi-layer state does not travel
    /// through this path. That is a deliberate scope limitation inherited
    /// from the reference implementation: the buffer feeds external
    /// membership-only consumers, which read nothing but the first layer.
    #[must_use]
    pub fn to_buffer(&self) -> Vec<u8> {
        self.layers[0].to_bytes()
    }

    /// Replace the first layer's counters from a buffer produced by
    /// [`to_buffer`](Self::to_buffer) on an identically configured filter.
    ///
    /// # Errors
    ///
    /// `SerializationError` if the buffer length does not match the
    /// configured first layer; the filter is left unchanged.
    pub fn from_buffer(&mut self, bytes: &[u8]) -> Result<()> {
        let first = &self.layers[0];
        let restored =
            CounterLayer::from_bytes(first.width(), first.log2_size(), bytes)?;
        self.layers[0] = restored;
        Ok(())
    }
}

/// Fluent builder for [`Globimap`].
///
/// # Examples
///
/// ```
/// use globimap::{ExhaustionPolicy, Globimap, LayerConfig};
///
/// let filter = Globimap::builder()
///     .hash_count(2)
///     .layer(LayerConfig::new(1, 20))
///     .layer(LayerConfig::new(16, 14))
///     .exhaustion_policy(ExhaustionPolicy::FailFast)
///     .collect_ground_truth(true)
///     .build()
///     .unwrap();
/// assert!(filter.collects_ground_truth());
/// ```
#[derive(Debug, Default)]
pub struct GlobimapBuilder {
    hash_count: u64,
    layers: Vec<LayerConfig>,
    policy: ExhaustionPolicy,
    collect_ground_truth: bool,
}

impl GlobimapBuilder {
    /// Set the number of hash probes (must be at least 1).
    #[must_use]
    pub fn hash_count(mut self, k: u64) -> Self {
        self.hash_count = k;
        self
    }

    /// Append a layer to the cascade.
    #[must_use]
    pub fn layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }

    /// Choose what happens when a probe's cascade finds every layer
    /// saturated. Default: [`ExhaustionPolicy::Lenient`].
    #[must_use]
    pub fn exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Maintain the exact ground-truth map for later error audits.
    /// Default: off.
    #[must_use]
    pub fn collect_ground_truth(mut self, collect: bool) -> Self {
        self.collect_ground_truth = collect;
        self
    }

    /// Validate the accumulated configuration and allocate the filter.
    ///
    /// # Errors
    ///
    /// The same validation as [`FilterConfig::new`].
    pub fn build(self) -> Result<Globimap> {
        let config = FilterConfig::new(self.hash_count, self.layers)?;
        Ok(Globimap::with_options(
            config,
            self.policy,
            self.collect_ground_truth,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(k: u64, layers: &[(u32, u32)]) -> Globimap {
        let configs = layers
            .iter()
            .map(|&(bits, log2)| LayerConfig::new(bits, log2))
            .collect();
        Globimap::new(FilterConfig::new(k, configs).unwrap())
    }

    #[test]
    fn inserted_coordinates_are_members() {
        let f = filter(4, &[(1, 16)]);
        for i in 0..50 {
            f.put(Coordinate::new(i, i * 3)).unwrap();
        }
        for i in 0..50 {
            assert!(f.get_bool(Coordinate::new(i, i * 3)));
        }
    }

    #[test]
    fn fresh_filter_reports_absence() {
        let f = filter(4, &[(8, 16)]);
        assert!(!f.get_bool(Coordinate::new(1, 2)));
        assert_eq!(f.get_min(Coordinate::new(1, 2)), 0);
    }

    #[test]
    fn get_min_counts_repeated_inserts() {
        let f = filter(3, &[(8, 16)]);
        let c = Coordinate::new(100, 200);
        for expect in 1..=10u64 {
            f.put(c).unwrap();
            assert_eq!(f.get_min(c), expect);
        }
    }

    #[test]
    fn cascade_spills_into_second_layer() {
        // capacity-1 first layer: every probe saturates it instantly and
        // spills into the second layer
        let f = filter(1, &[(1, 0), (8, 0)]);
        let a = Coordinate::new(1, 1);
        let b = Coordinate::new(2, 2);
        f.put(a).unwrap();
        assert_eq!(f.layers()[0].get(0), 1);
        assert_eq!(f.layers()[1].get(0), 0);
        f.put(b).unwrap();
        assert_eq!(f.layers()[1].get(0), 1);
        // estimate walks the same path: 1 (saturated) + 1 = 2
        assert_eq!(f.get_min(a), 2);
    }

    #[test]
    fn lenient_policy_counts_dropped_probes() {
        let f = filter(1, &[(1, 0)]);
        f.put(Coordinate::new(1, 1)).unwrap();
        assert_eq!(f.dropped_probes(), 0);
        f.put(Coordinate::new(2, 2)).unwrap();
        f.put(Coordinate::new(3, 3)).unwrap();
        assert_eq!(f.dropped_probes(), 2);
    }

    #[test]
    fn fail_fast_policy_surfaces_exhaustion() {
        let config =
            FilterConfig::new(1, vec![LayerConfig::new(1, 0)]).unwrap();
        let f = Globimap::with_options(config, ExhaustionPolicy::FailFast, false);
        f.put(Coordinate::new(1, 1)).unwrap();
        assert_eq!(
            f.put(Coordinate::new(2, 2)).unwrap_err(),
            GlobimapError::capacity_exhausted(0)
        );
    }

    #[test]
    fn put_all_ingests_tuples() {
        let f = filter(2, &[(8, 14)]);
        f.put_all([(1u64, 2u64), (3, 4), (5, 6)]).unwrap();
        assert!(f.get_bool(Coordinate::new(3, 4)));
    }

    #[test]
    fn estimate_region_is_row_major() {
        let f = filter(2, &[(8, 16)]);
        f.put(Coordinate::new(10, 21)).unwrap();
        let grid = f.estimate_region(10, 20, 3, 2);
        assert_eq!(grid.len(), 6);
        // (10, 21) is col 0 of row 1
        assert_eq!(grid[3], 1);
        assert_eq!(grid.iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn compaction_drops_untouched_tail_layers() {
        let mut f = filter(2, &[(8, 10), (16, 10), (32, 10)]);
        f.put(Coordinate::new(5, 5)).unwrap();
        f.compaction();
        assert_eq!(f.layers().len(), 1);
        assert!(f.get_bool(Coordinate::new(5, 5)));
        // config stays as constructed
        assert_eq!(f.config().layers().len(), 3);
    }

    #[test]
    fn compaction_keeps_empty_first_layer() {
        let mut f = filter(2, &[(8, 10), (16, 10)]);
        f.compaction();
        assert_eq!(f.layers().len(), 1);
    }

    #[test]
    fn buffer_round_trip_restores_first_layer() {
        let f = filter(3, &[(1, 12)]);
        for i in 0..100 {
            f.put(Coordinate::new(i, i + 7)).unwrap();
        }
        let buf = f.to_buffer();
        assert_eq!(buf.len(), 512);

        let mut g = filter(3, &[(1, 12)]);
        g.from_buffer(&buf).unwrap();
        assert_eq!(g.to_buffer(), buf);
        for i in 0..100 {
            assert!(g.get_bool(Coordinate::new(i, i + 7)));
        }
    }

    #[test]
    fn from_buffer_rejects_wrong_length() {
        let mut f = filter(3, &[(1, 12)]);
        let err = f.from_buffer(&[0u8; 3]).unwrap_err();
        assert_eq!(err, GlobimapError::serialization_error(512, 3));
    }

    #[test]
    fn builder_validates_at_build() {
        let err = Globimap::builder()
            .layer(LayerConfig::new(8, 10))
            .build()
            .unwrap_err();
        assert_eq!(err, GlobimapError::invalid_hash_count(0));
    }

    #[test]
    fn concurrent_puts_preserve_membership() {
        use std::sync::Arc;
        use std::thread;

        let f = Arc::new(filter(4, &[(8, 16)]));
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let f = Arc::clone(&f);
                thread::spawn(move || {
                    for i in 0..250u64 {
                        f.put(Coordinate::new(t * 1000 + i, i)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        for t in 0..4u64 {
            for i in 0..250u64 {
                assert!(f.get_bool(Coordinate::new(t * 1000 + i, i)));
            }
        }
    }
}
