//! Filter Frequency-Response Curve
//!
//! Evaluates the chain's composite magnitude response from a coefficient
//! snapshot, one point per pixel column, over the fixed [-24, +24] dB
//! display range. This is the static overlay drawn above the live
//! spectrum; it only changes when parameters do, so the frontend
//! regenerates it on the dirty flag rather than every frame.

use rustfft::num_complex::Complex;

use crate::coefficients::{ChainUpdate, SectionCoefficients};
use crate::curve::{map_db_to_y, map_to_log10, Bounds, DisplayCurve};

/// dB extent of the response display, symmetric around unity gain.
pub const RESPONSE_RANGE_DB: f32 = 24.0;

/// Magnitude of one section's transfer function at `freq`.
///
/// Evaluates `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`
/// at `z = e^{jw}` on the unit circle.
pub fn section_magnitude(coeffs: &SectionCoefficients, freq: f32, sample_rate: f32) -> f32 {
    let w = 2.0 * core::f32::consts::PI * freq / sample_rate;
    let z1 = Complex::from_polar(1.0, -w);
    let z2 = z1 * z1;

    let numerator = Complex::new(coeffs.b0, 0.0) + z1 * coeffs.b1 + z2 * coeffs.b2;
    let denominator = Complex::new(1.0, 0.0) + z1 * coeffs.a1 + z2 * coeffs.a2;
    (numerator / denominator).norm()
}

/// Composite linear magnitude of the whole chain at `freq`, skipping
/// bypassed stages.
pub fn chain_magnitude(update: &ChainUpdate, freq: f32, sample_rate: f32) -> f32 {
    let mut magnitude = 1.0;

    if !update.low_cut_bypassed {
        for section in update.low_cut.active_sections() {
            magnitude *= section_magnitude(section, freq, sample_rate);
        }
    }
    if !update.peak_bypassed {
        magnitude *= section_magnitude(&update.peak, freq, sample_rate);
    }
    if !update.high_cut_bypassed {
        for section in update.high_cut.active_sections() {
            magnitude *= section_magnitude(section, freq, sample_rate);
        }
    }

    magnitude
}

/// Build the response polyline: one point per pixel column, frequency
/// swept logarithmically over [20 Hz, 20 kHz], dB mapped linearly over
/// [-24, +24] between the bottom and top edges.
pub fn response_curve(update: &ChainUpdate, bounds: Bounds, sample_rate: f32) -> DisplayCurve {
    let columns = bounds.width.max(0.0) as usize;
    let mut points = Vec::with_capacity(columns);

    for column in 0..columns {
        let normalized = column as f32 / bounds.width;
        let freq = map_to_log10(normalized, 20.0, 20_000.0);
        let magnitude = chain_magnitude(update, freq, sample_rate);

        let db = if magnitude > 0.0 && magnitude.is_finite() {
            (20.0 * magnitude.log10()).clamp(-RESPONSE_RANGE_DB, RESPONSE_RANGE_DB)
        } else {
            -RESPONSE_RANGE_DB
        };
        let y = map_db_to_y(
            db,
            -RESPONSE_RANGE_DB,
            RESPONSE_RANGE_DB,
            bounds.top(),
            bounds.bottom(),
        );
        points.push((bounds.left() + column as f32, y));
    }

    DisplayCurve::from_points(points)
}
