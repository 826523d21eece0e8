//! Scanline polygon rasterization.
//!
//! Converts a simple polygon (an ordered ring of floating-point vertices,
//! no self-intersection assumed) into the exact set of integer pixels
//! covering its interior. Standalone: the filter consumes the emitted
//! pixel stream like any other coordinate source, but nothing here depends
//! on the filter.
//!
//! # Pixel-center convention
//!
//! Pixel `(px, py)` is emitted iff its center `(px + 0.5, py + 0.5)` lies
//! inside the polygon under the even-odd rule. Edge y-spans are half-open
//! (`[y_min, y_max)`), so a scanline through a shared vertex crosses each
//! incident edge chain exactly once and crossing counts stay even.
//!
//! # Algorithm
//!
//! Classical edge-table scanline fill: non-horizontal edges are sorted by
//! their lower y; an active list admits edges as the sweep reaches them
//! and retires them as it passes. Each active edge carries its current
//! x-intercept, advanced by `slope = dx/dy` per scanline instead of
//! re-intersecting geometrically every row — the incremental variant, with
//! the intercept seeded exactly at admission so the two are numerically
//! equivalent at admission and drift-free for the short spans polygons
//! produce.
//!
//! Degenerate input is not an error: rings with fewer than 3 vertices or
//! zero vertical extent rasterize to nothing.
//!
//! # Examples
//!
//! ```
//! use globimap::raster;
//!
//! let square = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
//! let pixels = raster::pixels(&square);
//! assert_eq!(pixels.len(), 16); // the 4×4 block of covered centers
//! ```

use crate::core::CancelToken;
use crate::error::{GlobimapError, Result};

/// One non-horizontal polygon edge, oriented bottom-to-top.
#[derive(Debug, Clone, Copy)]
struct Edge {
    y_min: f64,
    y_max: f64,
    x_at_y_min: f64,
    /// dx/dy; finite because horizontal edges never become `Edge`s.
    slope: f64,
    /// x-intercept of the current scanline, advanced incrementally.
    current_x: f64,
}

impl Edge {
    fn new(a: (f64, f64), b: (f64, f64)) -> Option<Self> {
        if a.1 == b.1 {
            return None; // zero vertical extent contributes no crossings
        }
        let (lo, hi) = if a.1 < b.1 { (a, b) } else { (b, a) };
        Some(Self {
            y_min: lo.1,
            y_max: hi.1,
            x_at_y_min: lo.0,
            slope: (hi.0 - lo.0) / (hi.1 - lo.1),
            current_x: lo.0,
        })
    }
}

fn build_edge_table(ring: &[(f64, f64)]) -> Vec<Edge> {
    let mut edges: Vec<Edge> = (0..ring.len())
        .filter_map(|i| Edge::new(ring[i], ring[(i + 1) % ring.len()]))
        .collect();
    edges.sort_by(|a, b| a.y_min.total_cmp(&b.y_min));
    edges
}

/// Rasterize one polygon, invoking `put_pixel(px, py)` for every covered
/// pixel, scanline by scanline bottom-up and left to right within a line.
///
/// Rings with fewer than 3 vertices or with no vertical extent emit
/// nothing. The closing edge back to the first vertex is implicit; a ring
/// that repeats its first vertex at the end works too (the duplicate edge
/// is horizontal-degenerate and drops out).
pub fn rasterize<F: FnMut(i64, i64)>(ring: &[(f64, f64)], put_pixel: F) {
    // infallible without a token
    let _ = scan(ring, None, put_pixel);
}

/// [`rasterize`] with cooperative cancellation, checked between scanlines.
///
/// # Errors
///
/// `Cancelled` if the token fires mid-sweep. Pixels already emitted stay
/// emitted; no pixel from an unfinished scanline is.
pub fn rasterize_cancellable<F: FnMut(i64, i64)>(
    ring: &[(f64, f64)],
    token: &CancelToken,
    put_pixel: F,
) -> Result<()> {
    scan(ring, Some(token), put_pixel)
}

/// Collect the covered pixels of one polygon in emission order.
#[must_use]
pub fn pixels(ring: &[(f64, f64)]) -> Vec<(i64, i64)> {
    let mut out = Vec::new();
    rasterize(ring, |x, y| out.push((x, y)));
    out
}

fn scan<F: FnMut(i64, i64)>(
    ring: &[(f64, f64)],
    token: Option<&CancelToken>,
    mut put_pixel: F,
) -> Result<()> {
    if ring.len() < 3 {
        return Ok(());
    }
    let edges = build_edge_table(ring);
    let Some(first) = edges.first() else {
        return Ok(());
    };

    let y_top = edges.iter().map(|e| e.y_max).fold(f64::MIN, f64::max);
    // rows whose center y + 0.5 falls inside [y_min, y_top)
    let py_start = (first.y_min - 0.5).ceil() as i64;
    let py_end = (y_top - 0.5).ceil() as i64 - 1;

    let mut active: Vec<Edge> = Vec::new();
    let mut crossings: Vec<f64> = Vec::new();
    let mut next = 0;

    for py in py_start..=py_end {
        if token.is_some_and(CancelToken::is_cancelled) {
            return Err(GlobimapError::Cancelled);
        }
        let yc = py as f64 + 0.5;

        // admit edges whose span has begun, seeding the exact intercept
        while next < edges.len() && edges[next].y_min <= yc {
            let mut e = edges[next];
            e.current_x = e.x_at_y_min + (yc - e.y_min) * e.slope;
            active.push(e);
            next += 1;
        }
        // retire edges whose half-open span has ended
        active.retain(|e| e.y_max > yc);
        if active.is_empty() {
            continue;
        }

        crossings.clear();
        crossings.extend(active.iter().map(|e| e.current_x));
        crossings.sort_by(f64::total_cmp);

        // even-odd fill between consecutive crossing pairs
        for pair in crossings.chunks_exact(2) {
            let px_start = (pair[0] - 0.5).ceil() as i64;
            let px_end = (pair[1] - 0.5).ceil() as i64 - 1;
            for px in px_start..=px_end {
                put_pixel(px, py);
            }
        }

        for e in &mut active {
            e.current_x += e.slope;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_pixels(ring: &[(f64, f64)]) -> Vec<(i64, i64)> {
        let mut p = pixels(ring);
        p.sort_unstable();
        p
    }

    #[test]
    fn axis_aligned_square_fills_exact_block() {
        let square = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let got = sorted_pixels(&square);
        let mut want = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                want.push((x, y));
            }
        }
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn closed_ring_matches_open_ring() {
        let open = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let closed = [
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
            (0.0, 0.0),
        ];
        assert_eq!(sorted_pixels(&open), sorted_pixels(&closed));
    }

    #[test]
    fn right_triangle_staircase() {
        // hypotenuse x = 8 - y: row py covers centers with x + 0.5 < 7.5 - py
        let triangle = [(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)];
        let got = sorted_pixels(&triangle);
        let mut want = Vec::new();
        for py in 0..8i64 {
            for px in 0..(7 - py) {
                want.push((px, py));
            }
        }
        want.sort_unstable();
        assert_eq!(got, want);
    }

    #[test]
    fn concave_ring_fills_two_spans_per_row() {
        // a "U": two prongs joined at the bottom
        let u_shape = [
            (0.0, 0.0),
            (6.0, 0.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ];
        let got = sorted_pixels(&u_shape);
        // below y=2 the full width fills, above it only the prongs
        for py in 0..2i64 {
            for px in 0..6 {
                assert!(got.contains(&(px, py)), "missing ({px}, {py})");
            }
        }
        for py in 2..6i64 {
            for px in [0, 1, 4, 5] {
                assert!(got.contains(&(px, py)), "missing prong ({px}, {py})");
            }
            for px in [2, 3] {
                assert!(!got.contains(&(px, py)), "gap filled at ({px}, {py})");
            }
        }
        assert_eq!(got.len(), 2 * 6 + 4 * 4);
    }

    #[test]
    fn too_few_vertices_is_empty_not_an_error() {
        assert!(pixels(&[]).is_empty());
        assert!(pixels(&[(1.0, 1.0)]).is_empty());
        assert!(pixels(&[(1.0, 1.0), (5.0, 5.0)]).is_empty());
    }

    #[test]
    fn zero_area_rings_are_empty() {
        // all horizontal
        assert!(pixels(&[(0.0, 1.0), (4.0, 1.0), (8.0, 1.0)]).is_empty());
        // collapsed vertical sliver
        assert!(pixels(&[(2.0, 0.0), (2.0, 6.0), (2.0, 3.0)]).is_empty());
    }

    #[test]
    fn fractional_vertices_respect_centers() {
        // covers centers with 0.5 <= x,y: exactly the 2x2 block (0..2)^2
        // shifted square [0.25, 2.25)
        let square = [(0.25, 0.25), (2.25, 0.25), (2.25, 2.25), (0.25, 2.25)];
        let got = sorted_pixels(&square);
        assert_eq!(got, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn negative_coordinates_rasterize() {
        let square = [(-2.0, -2.0), (0.0, -2.0), (0.0, 0.0), (-2.0, 0.0)];
        let got = sorted_pixels(&square);
        assert_eq!(got, vec![(-2, -2), (-2, -1), (-1, -2), (-1, -1)]);
    }

    #[test]
    fn cancelled_sweep_stops_and_reports() {
        let square = [(0.0, 0.0), (64.0, 0.0), (64.0, 64.0), (0.0, 64.0)];
        let token = CancelToken::new();
        token.cancel();
        let mut emitted = 0usize;
        let err = rasterize_cancellable(&square, &token, |_, _| emitted += 1)
            .unwrap_err();
        assert_eq!(err, GlobimapError::Cancelled);
        assert_eq!(emitted, 0);
    }

    #[test]
    fn emission_order_is_scanline_major() {
        let square = [(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (0.0, 2.0)];
        assert_eq!(
            pixels(&square),
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }
}
