//! Triband DSP - Digital Signal Processing Module
//!
//! This crate provides the signal path for Triband, including:
//! - Three-band EQ chain (low-cut cascade, parametric peak, high-cut cascade)
//! - Filter coefficient calculation (RBJ peak, Butterworth cut cascades)
//! - FFT magnitude generator and display-curve geometry for the analyzer
//! - Generic lock-free SPSC FIFO used for every cross-thread hand-off
//!
//! # Architecture
//!
//! The processing path follows a strict "no allocation in audio callback"
//! rule. Coefficients are computed off-thread as whole-chain snapshots and
//! handed to the audio thread by value, so a block is always filtered with
//! one coherent coefficient set.

mod chain;
mod coefficients;
mod curve;
mod error;
mod fft;
mod fifo;
mod response;

pub use chain::{FilterChain, Stage};
pub use coefficients::{
    high_cut_cascade, identity_coefficients, low_cut_cascade, peak_coefficients, BandSettings,
    ChainUpdate, CutCoefficients, SectionCoefficients, Slope, MAX_FREQ, MIN_FREQ,
};
pub use curve::{
    map_db_to_y, map_from_log10, map_to_log10, Bounds, CurveGenerator, DisplayCurve,
};
pub use error::DspError;
pub use fft::{FftMagnitudeGenerator, FftOrder, DEFAULT_FLOOR_DB};
pub use fifo::{fifo, FifoConsumer, FifoProducer};
pub use response::{chain_magnitude, response_curve, section_magnitude, RESPONSE_RANGE_DB};
