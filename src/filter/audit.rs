//! Ground-truth-assisted error auditing.
//!
//! A filter built with ground-truth collection keeps an exact ordered map
//! of every inserted coordinate. [`Globimap::detect_errors`] sweeps a
//! rectangular region comparing the filter's answers against that map:
//!
//! - a never-inserted cell that passes [`Globimap::get_bool`] is a false
//!   positive, recorded with magnitude 1;
//! - an inserted cell whose [`Globimap::get_min`] estimate differs from
//!   its exact count is recorded with magnitude `|estimate - truth|`.
//!
//! The sweep is one-shot: on completion the ground-truth map is cleared
//! and the error map plus aggregate `error_rate` take its place. Results
//! accumulate privately and commit only when the whole region has been
//! scanned, so a cancelled audit leaves the filter's audit state exactly
//! as it was and can simply be retried.
//!
//! With the `rayon` feature rows are scanned in parallel; each worker
//! fills its own accumulator and the per-row results are merged at the
//! end, which keeps the sweep free of shared mutable state.

use crate::core::{CancelToken, Coordinate};
use crate::error::{GlobimapError, Result};
use crate::filter::Globimap;
use std::collections::BTreeMap;

/// Aggregate statistics over recorded error magnitudes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorStats {
    /// Number of erroneous cells.
    pub errors: u64,
    /// Erroneous cells divided by swept cells.
    pub error_rate: f64,
    /// Smallest recorded magnitude (`u64::MAX` when there are none).
    pub magnitude_min: u64,
    /// Largest recorded magnitude.
    pub magnitude_max: u64,
    /// Sum of all magnitudes.
    pub magnitude_sum: u64,
    /// Mean magnitude (0 when there are none).
    pub magnitude_mean: f64,
}

impl Globimap {
    /// Audit the rectangle `[x, x+width) × [y, y+height)` against the
    /// collected ground truth.
    ///
    /// No-op unless the filter was built with ground-truth collection and
    /// at least one coordinate has been inserted since the last audit.
    /// On completion the per-cell magnitudes are available through
    /// [`error_map`](Self::error_map), the aggregate rate through
    /// [`error_rate`](Self::error_rate), and the ground-truth map has been
    /// cleared (single-use per audit pass).
    pub fn detect_errors(&mut self, x: u64, y: u64, width: u64, height: u64) {
        // infallible without a token
        let _ = self.run_audit(x, y, width, height, None);
    }

    /// [`detect_errors`](Self::detect_errors) with cooperative
    /// cancellation, checked between rows.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the token fires mid-sweep; the filter's audit state
    /// (ground truth, error map, error rate) is left untouched.
    pub fn detect_errors_cancellable(
        &mut self,
        x: u64,
        y: u64,
        width: u64,
        height: u64,
        token: &CancelToken,
    ) -> Result<()> {
        self.run_audit(x, y, width, height, Some(token))
    }

    fn run_audit(
        &mut self,
        x: u64,
        y: u64,
        width: u64,
        height: u64,
        token: Option<&CancelToken>,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let truth = match self.ground_truth.as_mut() {
            Some(m) => std::mem::take(m.get_mut()),
            None => return Ok(()),
        };
        if truth.is_empty() {
            return Ok(());
        }

        match self.scan_region(&truth, x, y, width, height, token) {
            Ok(errors) => {
                self.error_rate = errors.len() as f64 / (width * height) as f64;
                self.error_map = errors;
                // ground truth stays cleared: the audit consumed it
                Ok(())
            }
            Err(err) => {
                // put the ground truth back so the audit can be retried
                *self
                    .ground_truth
                    .as_mut()
                    .expect("ground truth presence checked above")
                    .get_mut() = truth;
                Err(err)
            }
        }
    }

    fn scan_region(
        &self,
        truth: &BTreeMap<Coordinate, u64>,
        x: u64,
        y: u64,
        width: u64,
        height: u64,
        token: Option<&CancelToken>,
    ) -> Result<BTreeMap<Coordinate, u64>> {
        let scan_row = |row: u64| -> Result<Vec<(Coordinate, u64)>> {
            if token.is_some_and(CancelToken::is_cancelled) {
                return Err(GlobimapError::Cancelled);
            }
            let mut found = Vec::new();
            for col in 0..width {
                let p = Coordinate::new(x + col, y + row);
                match truth.get(&p) {
                    None => {
                        if self.get_bool(p) {
                            found.push((p, 1));
                        }
                    }
                    Some(&exact) => {
                        let estimate = self.get_min(p);
                        let magnitude = estimate.abs_diff(exact);
                        if magnitude != 0 {
                            found.push((p, magnitude));
                        }
                    }
                }
            }
            Ok(found)
        };

        #[cfg(feature = "rayon")]
        let rows: Result<Vec<_>> = {
            use rayon::prelude::*;
            (0..height).into_par_iter().map(scan_row).collect()
        };

        #[cfg(not(feature = "rayon"))]
        let rows: Result<Vec<_>> = (0..height).map(scan_row).collect();

        Ok(rows?.into_iter().flatten().collect())
    }

    /// Per-cell error magnitudes recorded by the last completed audit.
    #[must_use]
    pub fn error_map(&self) -> &BTreeMap<Coordinate, u64> {
        &self.error_map
    }

    /// Erroneous cells divided by swept cells, from the last completed
    /// audit (0.0 before any audit).
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// The recorded error magnitudes, in coordinate order.
    #[must_use]
    pub fn error_magnitudes(&self) -> Vec<u64> {
        self.error_map.values().copied().collect()
    }

    /// Aggregate statistics over the recorded error magnitudes.
    #[must_use]
    pub fn error_stats(&self) -> ErrorStats {
        let magnitudes = self.error_magnitudes();
        let mut min = u64::MAX;
        let mut max = 0u64;
        let mut sum = 0u64;
        for &m in &magnitudes {
            min = min.min(m);
            max = max.max(m);
            sum += m;
        }
        let mean = if magnitudes.is_empty() {
            0.0
        } else {
            sum as f64 / magnitudes.len() as f64
        };
        ErrorStats {
            errors: magnitudes.len() as u64,
            error_rate: self.error_rate,
            magnitude_min: min,
            magnitude_max: max,
            magnitude_sum: sum,
            magnitude_mean: mean,
        }
    }
}
