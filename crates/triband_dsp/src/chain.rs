//! Three-Band Filter Chain
//!
//! One `FilterChain` per audio channel: a low-cut Butterworth cascade,
//! a parametric peak section, and a high-cut cascade, processed in that
//! fixed order. Stages can be bypassed individually; a bypassed stage
//! leaves samples bit-exact.
//!
//! # Real-time Safety
//!
//! `process` and `apply_update` run on the audio thread. Neither
//! allocates, locks, or logs. Coefficients arrive as a complete
//! `ChainUpdate` value, so a block is always filtered with one coherent
//! coefficient set.

use biquad::{Biquad, DirectForm2Transposed};

use crate::coefficients::{identity_coefficients, ChainUpdate};

/// Identifies one stage of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LowCut,
    Peak,
    HighCut,
}

/// Cascaded IIR chain for a single channel.
pub struct FilterChain {
    low_cut: [DirectForm2Transposed<f32>; 4],
    low_cut_active: usize,
    peak: DirectForm2Transposed<f32>,
    high_cut: [DirectForm2Transposed<f32>; 4],
    high_cut_active: usize,
    low_cut_bypassed: bool,
    peak_bypassed: bool,
    high_cut_bypassed: bool,
}

impl FilterChain {
    /// A chain that passes audio through unchanged until the first
    /// `apply_update`.
    pub fn new() -> Self {
        let identity = identity_coefficients();
        Self {
            low_cut: core::array::from_fn(|_| DirectForm2Transposed::<f32>::new(identity)),
            low_cut_active: 0,
            peak: DirectForm2Transposed::<f32>::new(identity),
            high_cut: core::array::from_fn(|_| DirectForm2Transposed::<f32>::new(identity)),
            high_cut_active: 0,
            low_cut_bypassed: false,
            peak_bypassed: false,
            high_cut_bypassed: false,
        }
    }

    /// Install a complete coefficient + bypass snapshot.
    ///
    /// Sections that become active with a steeper slope start from
    /// cleared delay-line state so they cannot replay stale energy.
    pub fn apply_update(&mut self, update: &ChainUpdate) {
        for (i, section) in self.low_cut.iter_mut().enumerate() {
            section.update_coefficients(update.low_cut.sections[i]);
            if i >= self.low_cut_active {
                section.reset_state();
            }
        }
        self.low_cut_active = update.low_cut.active;

        self.peak.update_coefficients(update.peak);

        for (i, section) in self.high_cut.iter_mut().enumerate() {
            section.update_coefficients(update.high_cut.sections[i]);
            if i >= self.high_cut_active {
                section.reset_state();
            }
        }
        self.high_cut_active = update.high_cut.active;

        self.low_cut_bypassed = update.low_cut_bypassed;
        self.peak_bypassed = update.peak_bypassed;
        self.high_cut_bypassed = update.high_cut_bypassed;
    }

    pub fn set_bypassed(&mut self, stage: Stage, bypassed: bool) {
        match stage {
            Stage::LowCut => self.low_cut_bypassed = bypassed,
            Stage::Peak => self.peak_bypassed = bypassed,
            Stage::HighCut => self.high_cut_bypassed = bypassed,
        }
    }

    pub fn is_bypassed(&self, stage: Stage) -> bool {
        match stage {
            Stage::LowCut => self.low_cut_bypassed,
            Stage::Peak => self.peak_bypassed,
            Stage::HighCut => self.high_cut_bypassed,
        }
    }

    /// Filter a block in place.
    ///
    /// # Real-time Safety
    /// Zero allocation; pure per-sample arithmetic.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let mut x = *sample;

            if !self.low_cut_bypassed {
                for section in &mut self.low_cut[..self.low_cut_active] {
                    x = section.run(x);
                }
            }
            if !self.peak_bypassed {
                x = self.peak.run(x);
            }
            if !self.high_cut_bypassed {
                for section in &mut self.high_cut[..self.high_cut_active] {
                    x = section.run(x);
                }
            }

            *sample = x;
        }
    }

    /// Clear all delay-line state, keeping coefficients and bypass flags.
    pub fn reset(&mut self) {
        for section in &mut self.low_cut {
            section.reset_state();
        }
        self.peak.reset_state();
        for section in &mut self.high_cut {
            section.reset_state();
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}
