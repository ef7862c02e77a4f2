//! Filter Coefficient Calculator
//!
//! Pure math: parameter values in, biquad coefficients out. Nothing here
//! touches filter state or threads, which is what makes whole-chain
//! coefficient snapshots cheap to compute on the render thread and hand
//! to the audio thread by value.
//!
//! The peak stage uses the RBJ peaking-EQ formulation. The cut stages
//! realize an order-2N Butterworth response as N cascaded second-order
//! sections, where N comes from the selected slope (12 dB/oct per section).

use biquad::Coefficients;
use serde::{Deserialize, Serialize};

use crate::error::DspError;

/// Coefficients for one second-order section, already normalized by a0.
pub type SectionCoefficients = Coefficients<f32>;

/// Minimum representable filter frequency in Hz.
pub const MIN_FREQ: f32 = 20.0;

/// Maximum representable filter frequency in Hz.
pub const MAX_FREQ: f32 = 20_000.0;

/// Steepness of a cut filter, 12 dB/octave per cascaded section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Slope {
    #[default]
    Db12,
    Db24,
    Db36,
    Db48,
}

impl Slope {
    /// Number of second-order sections needed to realize this slope.
    pub fn sections(self) -> usize {
        match self {
            Slope::Db12 => 1,
            Slope::Db24 => 2,
            Slope::Db36 => 3,
            Slope::Db48 => 4,
        }
    }
}

/// User-facing settings for the three-band chain.
///
/// Frequencies are in Hz within [20, 20000], peak gain in dB within
/// [-24, +24], Q nominally within [0.1, 10]. Out-of-range values are
/// clamped by the calculator rather than rejected, so a settings value
/// is always renderable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSettings {
    pub low_cut_freq: f32,
    pub high_cut_freq: f32,
    pub peak_freq: f32,
    pub peak_gain_db: f32,
    pub peak_q: f32,
    pub low_cut_slope: Slope,
    pub high_cut_slope: Slope,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl Default for BandSettings {
    fn default() -> Self {
        Self {
            low_cut_freq: 20.0,
            high_cut_freq: 20_000.0,
            peak_freq: 750.0,
            peak_gain_db: 0.0,
            peak_q: 1.0,
            low_cut_slope: Slope::Db12,
            high_cut_slope: Slope::Db12,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }
}

/// Coefficients for a cut cascade: up to four sections, `active` of which
/// are in use for the current slope.
///
/// A plain Copy value so replacing one on the audio thread moves no heap
/// memory.
#[derive(Debug, Clone, Copy)]
pub struct CutCoefficients {
    pub sections: [SectionCoefficients; 4],
    pub active: usize,
}

impl CutCoefficients {
    /// The sections that are in use for the current slope.
    pub fn active_sections(&self) -> &[SectionCoefficients] {
        &self.sections[..self.active]
    }
}

/// Complete coefficient + bypass snapshot for the whole chain.
///
/// Computed once per parameter change and applied to both channels, so
/// left and right always run identical filters. Published to the audio
/// thread as a single value; the chain sees the old snapshot or the new
/// one, never a mix.
#[derive(Debug, Clone, Copy)]
pub struct ChainUpdate {
    pub low_cut: CutCoefficients,
    pub peak: SectionCoefficients,
    pub high_cut: CutCoefficients,
    pub low_cut_bypassed: bool,
    pub peak_bypassed: bool,
    pub high_cut_bypassed: bool,
}

impl ChainUpdate {
    /// Compute a full snapshot from settings.
    ///
    /// Frequencies are clamped to [20 Hz, 0.999 x Nyquist] and Q to a
    /// small positive epsilon before use. A non-positive sample rate is
    /// a configuration error and is rejected here, at prepare time.
    pub fn compute(settings: &BandSettings, sample_rate: f32) -> Result<Self, DspError> {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            return Err(DspError::InvalidSampleRate(sample_rate));
        }

        Ok(Self {
            low_cut: low_cut_cascade(sample_rate, settings.low_cut_freq, settings.low_cut_slope),
            peak: peak_coefficients(
                sample_rate,
                settings.peak_freq,
                settings.peak_q,
                settings.peak_gain_db,
            ),
            high_cut: high_cut_cascade(
                sample_rate,
                settings.high_cut_freq,
                settings.high_cut_slope,
            ),
            low_cut_bypassed: settings.low_cut_bypassed,
            peak_bypassed: settings.peak_bypassed,
            high_cut_bypassed: settings.high_cut_bypassed,
        })
    }
}

/// Unity-gain pass-through section.
pub fn identity_coefficients() -> SectionCoefficients {
    Coefficients {
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    }
}

fn clamp_freq(freq: f32, sample_rate: f32) -> f32 {
    let nyquist_guard = 0.999 * sample_rate / 2.0;
    freq.clamp(MIN_FREQ, nyquist_guard.max(MIN_FREQ))
}

/// RBJ peaking-EQ section.
///
/// `gain_db` of 0 yields an exact unity pass-through response.
pub fn peak_coefficients(sample_rate: f32, freq: f32, q: f32, gain_db: f32) -> SectionCoefficients {
    let freq = clamp_freq(freq, sample_rate);
    let q = q.max(1e-6);

    // RBJ uses the square root of the linear amplitude.
    let a = 10.0_f32.powf(gain_db / 40.0);
    let w0 = 2.0 * core::f32::consts::PI * freq / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    let a0 = 1.0 + alpha / a;
    Coefficients {
        b0: (1.0 + alpha * a) / a0,
        b1: (-2.0 * cos_w0) / a0,
        b2: (1.0 - alpha * a) / a0,
        a1: (-2.0 * cos_w0) / a0,
        a2: (1.0 - alpha / a) / a0,
    }
}

/// RBJ second-order high-pass with an explicit section Q.
fn high_pass_section(sample_rate: f32, freq: f32, q: f32) -> SectionCoefficients {
    let w0 = 2.0 * core::f32::consts::PI * freq / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    let a0 = 1.0 + alpha;
    Coefficients {
        b0: ((1.0 + cos_w0) / 2.0) / a0,
        b1: (-(1.0 + cos_w0)) / a0,
        b2: ((1.0 + cos_w0) / 2.0) / a0,
        a1: (-2.0 * cos_w0) / a0,
        a2: (1.0 - alpha) / a0,
    }
}

/// RBJ second-order low-pass with an explicit section Q.
fn low_pass_section(sample_rate: f32, freq: f32, q: f32) -> SectionCoefficients {
    let w0 = 2.0 * core::f32::consts::PI * freq / sample_rate;
    let (sin_w0, cos_w0) = w0.sin_cos();
    let alpha = sin_w0 / (2.0 * q);

    let a0 = 1.0 + alpha;
    Coefficients {
        b0: ((1.0 - cos_w0) / 2.0) / a0,
        b1: (1.0 - cos_w0) / a0,
        b2: ((1.0 - cos_w0) / 2.0) / a0,
        a1: (-2.0 * cos_w0) / a0,
        a2: (1.0 - alpha) / a0,
    }
}

/// Section Q for a cascade of `n` second-order sections realizing an
/// order-2n Butterworth response: Q_k = 1 / (2 cos(pi (2k+1) / (4n))).
fn butterworth_q(k: usize, n: usize) -> f32 {
    let angle = core::f32::consts::PI * (2 * k + 1) as f32 / (4 * n) as f32;
    1.0 / (2.0 * angle.cos())
}

/// Butterworth high-pass cascade for the low-cut stage.
pub fn low_cut_cascade(sample_rate: f32, freq: f32, slope: Slope) -> CutCoefficients {
    let freq = clamp_freq(freq, sample_rate);
    let n = slope.sections();

    let mut sections = [identity_coefficients(); 4];
    for (k, section) in sections.iter_mut().take(n).enumerate() {
        *section = high_pass_section(sample_rate, freq, butterworth_q(k, n));
    }
    CutCoefficients {
        sections,
        active: n,
    }
}

/// Butterworth low-pass cascade for the high-cut stage.
pub fn high_cut_cascade(sample_rate: f32, freq: f32, slope: Slope) -> CutCoefficients {
    let freq = clamp_freq(freq, sample_rate);
    let n = slope.sections();

    let mut sections = [identity_coefficients(); 4];
    for (k, section) in sections.iter_mut().take(n).enumerate() {
        *section = low_pass_section(sample_rate, freq, butterworth_q(k, n));
    }
    CutCoefficients {
        sections,
        active: n,
    }
}
