//! Triband Core - Processing Pipeline and Thread Wiring
//!
//! This crate connects the DSP primitives into the two-thread system:
//! - `EqProcessor`: the audio-thread half, filtering stereo blocks in
//!   place and feeding the analyzer taps
//! - `SpectrumFrontend`: the render-thread half, driving the analysis
//!   pipelines and publishing coefficient updates
//! - `ParameterStore`: lock-free shared parameters with a dirty flag
//! - `AnalyzerConfig`: validated, serializable configuration
//!
//! # Architecture
//!
//! Call [`prepare`] once to get both halves, already wired together by
//! SPSC queues. Hand `EqProcessor` to the audio callback and drive
//! `SpectrumFrontend` from a display timer; nothing else is shared.

mod analyzer;
mod collector;
mod config;
mod error;
mod params;
mod processor;

pub use analyzer::{Channel, ChannelAnalyzer, SpectrumFrontend};
pub use collector::{sample_tap, BlockReceiver, SampleCollector};
pub use config::AnalyzerConfig;
pub use error::{CoreError, CoreResult};
pub use params::ParameterStore;
pub use processor::{prepare, EqProcessor};

// The host-facing geometry and settings types come from the DSP crate.
pub use triband_dsp::{BandSettings, Bounds, DisplayCurve, FftOrder, Slope};
