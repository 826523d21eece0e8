//! Structured diagnostic summaries.
//!
//! [`Globimap::summary`] produces a plain-data record — byte sizes,
//! per-layer statistics and (in audit mode) error statistics with a
//! magnitude histogram — for external reporting. Formatting (JSON or
//! otherwise) is the consumer's job; with the `serde` feature every record
//! derives `Serialize` so that is one call away.

use crate::core::layer::CounterLayer;
use crate::filter::audit::ErrorStats;
use crate::filter::Globimap;

/// Default bucket count for the error-magnitude histogram.
const HISTOGRAM_BUCKETS: usize = 1024;

/// Per-layer diagnostic record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayerSummary {
    /// Counter bit width.
    pub bits: u32,
    /// Number of counters.
    pub size: u64,
    /// Packed storage size in bytes.
    pub byte_size: u64,
    /// Fraction of zero counters.
    pub foz: f64,
    /// Number of zero counters.
    pub zeros: u64,
    /// Sum of all counters.
    pub sum: u64,
    /// Smallest counter.
    pub min: u64,
    /// Largest counter.
    pub max: u64,
    /// Mean counter value.
    pub mean: f64,
}

impl LayerSummary {
    fn of(layer: &CounterLayer) -> Self {
        let stats = layer.stats();
        let size = layer.capacity();
        Self {
            bits: layer.width().bits(),
            size,
            byte_size: layer.byte_size(),
            foz: stats.zeros as f64 / size as f64,
            zeros: stats.zeros,
            sum: stats.sum,
            min: stats.min,
            max: stats.max,
            mean: stats.sum as f64 / size as f64,
        }
    }
}

/// Audit-mode error record: aggregate stats plus a magnitude histogram.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorSummary {
    /// Coordinates still held in the ground-truth map (0 once an audit
    /// has consumed it).
    pub unique_input: u64,
    /// Aggregate error statistics.
    pub stats: ErrorStats,
    /// Bucketed means of the sorted error magnitudes.
    pub histogram: Vec<f64>,
}

/// Whole-filter diagnostic record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FilterSummary {
    /// Total packed storage in bytes.
    pub byte_size: u64,
    /// `byte_size` in KiB.
    pub kb_size: f64,
    /// `byte_size` in MiB.
    pub mb_size: f64,
    /// Whether the filter collects ground truth for audits.
    pub audit_enabled: bool,
    /// Probe updates dropped under the lenient exhaustion policy.
    pub dropped_probes: u64,
    /// Error statistics; present only in audit mode.
    pub error: Option<ErrorSummary>,
    /// Per-layer statistics, in stack order.
    pub layers: Vec<LayerSummary>,
}

/// Average sorted `values` into at most `buckets` equal-count buckets.
///
/// Returns one mean per bucket; fewer buckets than requested when there
/// are fewer values, and an empty vector for empty input.
#[must_use]
pub fn make_histogram(values: &[u64], buckets: usize) -> Vec<f64> {
    if values.is_empty() || buckets == 0 {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let buckets = buckets.min(sorted.len());
    let mut result = Vec::with_capacity(buckets);
    for i in 0..buckets {
        let start = i * sorted.len() / buckets;
        let end = (i + 1) * sorted.len() / buckets;
        let slice = &sorted[start..end];
        let sum: u64 = slice.iter().sum();
        result.push(sum as f64 / slice.len() as f64);
    }
    result
}

impl Globimap {
    /// Produce the full diagnostic record. Pure read; runs the per-layer
    /// reductions, so cost is proportional to total counter capacity.
    #[must_use]
    pub fn summary(&self) -> FilterSummary {
        let byte_size = self.byte_size();
        let error = self.collects_ground_truth().then(|| ErrorSummary {
            unique_input: self.ground_truth_len(),
            stats: self.error_stats(),
            histogram: make_histogram(&self.error_magnitudes(), HISTOGRAM_BUCKETS),
        });
        FilterSummary {
            byte_size,
            kb_size: byte_size as f64 / 1024.0,
            mb_size: byte_size as f64 / (1024.0 * 1024.0),
            audit_enabled: self.collects_ground_truth(),
            dropped_probes: self.dropped_probes(),
            error,
            layers: self.layers().iter().map(LayerSummary::of).collect(),
        }
    }

    fn ground_truth_len(&self) -> u64 {
        self.ground_truth
            .as_ref()
            .map_or(0, |m| m.lock().len() as u64)
    }
}
