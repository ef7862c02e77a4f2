//! Spectrum Display Curve Generation
//!
//! Converts dB magnitude frames into pixel-space polylines. The x axis is
//! logarithmic over the audible range [20 Hz, 20 kHz]; the y axis maps dB
//! linearly between the bottom (floor) and top (0 dB) of the target
//! rectangle. Geometry only; the widget layer just strokes the points.

use crate::fifo::{fifo, FifoConsumer, FifoProducer};

/// Bins skipped between successive curve points.
const PATH_RESOLUTION: usize = 2;

/// Queued curves before the producer starts dropping.
const CURVE_QUEUE_CAPACITY: usize = 8;

/// Pixel-space target rectangle for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Map a frequency onto [0, 1] with logarithmic spacing over [min, max].
pub fn map_from_log10(freq: f32, min: f32, max: f32) -> f32 {
    (freq / min).log10() / (max / min).log10()
}

/// Inverse of [`map_from_log10`]: a [0, 1] position back to a frequency.
pub fn map_to_log10(normalized: f32, min: f32, max: f32) -> f32 {
    10.0_f32.powf(min.log10() + normalized * (max.log10() - min.log10()))
}

/// Map a dB value over [min_db, max_db] linearly onto [bottom, top].
pub fn map_db_to_y(db: f32, min_db: f32, max_db: f32, top: f32, bottom: f32) -> f32 {
    bottom + (db - min_db) / (max_db - min_db) * (top - bottom)
}

/// One finished polyline, regenerated wholesale each analysis cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayCurve {
    points: Vec<(f32, f32)>,
}

impl DisplayCurve {
    pub(crate) fn from_points(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Turns magnitude frames into queued [`DisplayCurve`]s.
pub struct CurveGenerator {
    floor_db: f32,
    curves_in: FifoProducer<DisplayCurve>,
    curves_out: FifoConsumer<DisplayCurve>,
}

impl CurveGenerator {
    /// `floor_db` must match the magnitude generator's floor so the
    /// curve's bottom edge lines up with silent bins.
    pub fn new(floor_db: f32) -> Self {
        let (curves_in, curves_out) = fifo(CURVE_QUEUE_CAPACITY);
        Self {
            floor_db,
            curves_in,
            curves_out,
        }
    }

    /// Build one curve from a magnitude frame and queue it.
    ///
    /// Bin 0 becomes the first point, pinned to the left edge; its y is
    /// clamped to the bottom edge if the value is not finite. Subsequent
    /// bins are sampled every [`PATH_RESOLUTION`] bins, skipping
    /// non-finite values, with x from the bin's frequency on the log
    /// axis.
    pub fn generate(&mut self, render_data: &[f32], bounds: Bounds, fft_size: usize, bin_width: f32) {
        let num_bins = (fft_size / 2).min(render_data.len());
        if num_bins == 0 {
            return;
        }

        let top = bounds.top();
        let bottom = bounds.bottom();
        let left = bounds.left();
        let width = bounds.width;
        let floor_db = self.floor_db;
        let map_y = move |db: f32| map_db_to_y(db, floor_db, 0.0, top, bottom);

        let mut points = Vec::with_capacity(num_bins / PATH_RESOLUTION + 1);

        let first_y = map_y(render_data[0]);
        points.push((left, if first_y.is_finite() { first_y } else { bottom }));

        let mut bin = PATH_RESOLUTION;
        while bin < num_bins {
            let y = map_y(render_data[bin]);
            if y.is_finite() {
                let bin_freq = bin as f32 * bin_width;
                let normalized_x = map_from_log10(bin_freq, 20.0, 20_000.0);
                let x = (normalized_x * width).floor();
                points.push((left + x, y));
            }
            bin += PATH_RESOLUTION;
        }

        self.curves_in.try_push(DisplayCurve { points });
    }

    pub fn curves_available(&self) -> usize {
        self.curves_out.available()
    }

    /// Pull the oldest queued curve.
    pub fn pull_curve(&mut self) -> Option<DisplayCurve> {
        self.curves_out.try_pull()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR_DB: f32 = -48.0;

    fn test_bounds() -> Bounds {
        Bounds::new(10.0, 0.0, 800.0, 200.0)
    }

    #[test]
    fn test_db_to_y_midpoint_and_extremes() {
        assert_eq!(map_db_to_y(0.0, -24.0, 24.0, 0.0, 100.0), 50.0);
        assert_eq!(map_db_to_y(-24.0, -24.0, 24.0, 0.0, 100.0), 100.0);
        assert_eq!(map_db_to_y(24.0, -24.0, 24.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn test_log_axis_endpoints_and_center() {
        assert!(map_from_log10(20.0, 20.0, 20_000.0).abs() < 1e-6);
        assert!((map_from_log10(20_000.0, 20.0, 20_000.0) - 1.0).abs() < 1e-6);
        // Geometric center of the axis.
        let center = (20.0_f32 * 20_000.0).sqrt();
        assert!((map_from_log10(center, 20.0, 20_000.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_log_maps_are_inverses() {
        for &freq in &[20.0, 100.0, 1_000.0, 7_500.0, 20_000.0] {
            let norm = map_from_log10(freq, 20.0, 20_000.0);
            let back = map_to_log10(norm, 20.0, 20_000.0);
            assert!((back - freq).abs() / freq < 1e-4, "{freq} -> {norm} -> {back}");
        }
    }

    #[test]
    fn test_flat_floor_frame_hugs_bottom_edge() {
        let mut gen = CurveGenerator::new(FLOOR_DB);
        let bounds = test_bounds();
        let frame = vec![FLOOR_DB; 1024];

        gen.generate(&frame, bounds, 2048, 48_000.0 / 2048.0);
        let curve = gen.pull_curve().unwrap();

        assert!(!curve.is_empty());
        assert_eq!(curve.points()[0].0, bounds.left());
        let mut prev_x = f32::NEG_INFINITY;
        for &(x, y) in curve.points() {
            assert_eq!(y, bounds.bottom());
            assert!(x >= prev_x, "x must be non-decreasing");
            prev_x = x;
        }
    }

    #[test]
    fn test_elevated_bin_lands_at_log_mapped_x() {
        let mut gen = CurveGenerator::new(FLOOR_DB);
        let bounds = test_bounds();
        let bin_width = 48_000.0 / 2048.0;

        // A lone 0 dB bin near 1 kHz; bin index must be even so the
        // resolution-2 scan samples it.
        let bin = 42;
        let mut frame = vec![FLOOR_DB; 1024];
        frame[bin] = 0.0;
        gen.generate(&frame, bounds, 2048, bin_width);
        let curve = gen.pull_curve().unwrap();

        let (peak_x, peak_y) = curve
            .points()
            .iter()
            .copied()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert_eq!(peak_y, bounds.top(), "0 dB maps to the top edge");

        let expected_x = bounds.left()
            + (map_from_log10(bin as f32 * bin_width, 20.0, 20_000.0) * bounds.width).floor();
        assert_eq!(peak_x, expected_x);
    }

    #[test]
    fn test_non_finite_first_point_clamps_to_bottom() {
        let mut gen = CurveGenerator::new(FLOOR_DB);
        let bounds = test_bounds();
        let mut frame = vec![FLOOR_DB; 1024];
        frame[0] = f32::NAN;

        gen.generate(&frame, bounds, 2048, 48_000.0 / 2048.0);
        let curve = gen.pull_curve().unwrap();
        assert_eq!(curve.points()[0], (bounds.left(), bounds.bottom()));
    }

    #[test]
    fn test_non_finite_interior_points_are_skipped() {
        let mut gen = CurveGenerator::new(FLOOR_DB);
        let bounds = test_bounds();
        let mut frame = vec![FLOOR_DB; 1024];
        frame[10] = f32::INFINITY;

        gen.generate(&frame, bounds, 2048, 48_000.0 / 2048.0);
        let with_gap = gen.pull_curve().unwrap();

        gen.generate(&vec![FLOOR_DB; 1024], bounds, 2048, 48_000.0 / 2048.0);
        let full = gen.pull_curve().unwrap();
        assert_eq!(with_gap.points().len(), full.points().len() - 1);
    }

    #[test]
    fn test_one_curve_queued_per_generate() {
        let mut gen = CurveGenerator::new(FLOOR_DB);
        let bounds = test_bounds();
        let frame = vec![FLOOR_DB; 1024];

        assert_eq!(gen.curves_available(), 0);
        gen.generate(&frame, bounds, 2048, 23.4375);
        gen.generate(&frame, bounds, 2048, 23.4375);
        assert_eq!(gen.curves_available(), 2);
        assert!(gen.pull_curve().is_some());
        assert!(gen.pull_curve().is_some());
        assert!(gen.pull_curve().is_none());
    }
}
