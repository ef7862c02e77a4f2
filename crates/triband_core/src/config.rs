//! Analyzer Configuration

use serde::{Deserialize, Serialize};
use triband_dsp::FftOrder;

use crate::error::CoreError;

/// Spectrum analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// FFT transform size
    pub fft_order: FftOrder,

    /// Display refresh rate in Hz; the host timer should call
    /// `SpectrumFrontend::drive` at this cadence
    pub refresh_hz: u32,

    /// dB value substituted for silent spectrum bins, also the bottom
    /// edge of the spectrum display
    pub floor_db: f32,

    /// Sample blocks the audio tap can queue before dropping
    pub tap_capacity_blocks: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_order: FftOrder::Order2048,
            refresh_hz: 60,
            floor_db: triband_dsp::DEFAULT_FLOOR_DB,
            tap_capacity_blocks: 8,
        }
    }
}

impl AnalyzerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.refresh_hz == 0 || self.refresh_hz > 240 {
            return Err(CoreError::ConfigError(format!(
                "Invalid refresh rate: {} Hz",
                self.refresh_hz
            )));
        }
        if !self.floor_db.is_finite() || self.floor_db >= 0.0 {
            return Err(CoreError::ConfigError(format!(
                "Spectrum floor must be negative and finite, got {}",
                self.floor_db
            )));
        }
        if self.tap_capacity_blocks == 0 {
            return Err(CoreError::ConfigError(
                "Tap capacity must be at least one block".into(),
            ));
        }
        Ok(())
    }

    /// Timer interval for the configured refresh rate, in milliseconds
    pub fn refresh_interval_ms(&self) -> f32 {
        1000.0 / self.refresh_hz as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fft_order, FftOrder::Order2048);
        assert_eq!(config.refresh_hz, 60);
        assert_eq!(config.floor_db, -48.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_interval() {
        let config = AnalyzerConfig::default();
        assert!((config.refresh_interval_ms() - 16.666).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let zero_refresh = AnalyzerConfig {
            refresh_hz: 0,
            ..Default::default()
        };
        assert!(zero_refresh.validate().is_err());

        let positive_floor = AnalyzerConfig {
            floor_db: 6.0,
            ..Default::default()
        };
        assert!(positive_floor.validate().is_err());

        let no_capacity = AnalyzerConfig {
            tap_capacity_blocks: 0,
            ..Default::default()
        };
        assert!(no_capacity.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AnalyzerConfig {
            fft_order: FftOrder::Order8192,
            refresh_hz: 30,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: AnalyzerConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.fft_order, FftOrder::Order8192);
        assert_eq!(deserialized.refresh_hz, 30);
    }
}
