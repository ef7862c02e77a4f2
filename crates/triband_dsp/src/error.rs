//! DSP Error Types

use thiserror::Error;

/// Errors that can occur during DSP configuration
///
/// All of these surface at prepare/configuration time. Nothing on the
/// audio path returns an error; out-of-range parameters are clamped
/// inside the coefficient calculator instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("FFT order must be 11, 12, or 13, got {0}")]
    InvalidFftOrder(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DspError::InvalidSampleRate(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = DspError::InvalidFftOrder(7);
        assert!(err.to_string().contains("7"));
    }
}
