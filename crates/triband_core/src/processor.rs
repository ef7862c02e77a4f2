//! Processor Facade and Pipeline Wiring
//!
//! `prepare` builds both halves of the system in one call: the
//! audio-thread `EqProcessor` and the render-thread `SpectrumFrontend`,
//! already connected by their SPSC queues. The two halves are plain
//! owned values; hand each to its thread and drop both to tear down.

use std::sync::Arc;

use tracing::debug;
use triband_dsp::{ChainUpdate, FifoConsumer, FilterChain};

use crate::analyzer::{update_queue, ChannelAnalyzer, SpectrumFrontend};
use crate::collector::{sample_tap, SampleCollector};
use crate::config::AnalyzerConfig;
use crate::error::CoreError;
use crate::params::ParameterStore;

const MAX_BLOCK_SIZE: usize = 8192;

/// Build a connected processor/frontend pair.
///
/// Validates the configuration, computes initial coefficients from the
/// store's current settings, and wires the sample taps and the
/// coefficient queue. `max_block_size` is the largest slice length the
/// host will ever pass to [`EqProcessor::process`]; it also sets the
/// analyzer hand-off granularity.
pub fn prepare(
    config: &AnalyzerConfig,
    params: Arc<ParameterStore>,
    sample_rate: f32,
    max_block_size: usize,
) -> Result<(EqProcessor, SpectrumFrontend), CoreError> {
    config.validate()?;
    if max_block_size == 0 || max_block_size > MAX_BLOCK_SIZE {
        return Err(CoreError::InvalidBlockSize(max_block_size));
    }

    let initial = ChainUpdate::compute(&params.snapshot(), sample_rate)?;

    let (left_tap, left_rx) = sample_tap(max_block_size, config.tap_capacity_blocks);
    let (right_tap, right_rx) = sample_tap(max_block_size, config.tap_capacity_blocks);
    let (updates_tx, updates_rx) = update_queue();

    let mut left_chain = FilterChain::new();
    let mut right_chain = FilterChain::new();
    left_chain.apply_update(&initial);
    right_chain.apply_update(&initial);

    let processor = EqProcessor {
        left_chain,
        right_chain,
        left_tap,
        right_tap,
        updates: updates_rx,
    };
    let frontend = SpectrumFrontend::new(
        params,
        sample_rate,
        ChannelAnalyzer::new(left_rx, config.fft_order, config.floor_db),
        ChannelAnalyzer::new(right_rx, config.fft_order, config.floor_db),
        updates_tx,
        initial,
    );

    debug!(
        sample_rate,
        max_block_size,
        fft_size = config.fft_order.size(),
        "pipeline prepared"
    );
    Ok((processor, frontend))
}

/// Audio-thread half: filters stereo blocks in place and feeds the
/// analyzer taps.
pub struct EqProcessor {
    left_chain: FilterChain,
    right_chain: FilterChain,
    left_tap: SampleCollector,
    right_tap: SampleCollector,
    updates: FifoConsumer<ChainUpdate>,
}

impl EqProcessor {
    /// Process one stereo block in place.
    ///
    /// Pending coefficient snapshots are drained first, keeping only the
    /// newest, so the whole block runs under one coherent coefficient
    /// set. Processed samples are then copied to the analyzer taps.
    ///
    /// # Real-time Safety
    /// No allocation, no locks, no logging. Safe to call from an audio
    /// callback.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let mut newest = None;
        while let Some(update) = self.updates.try_pull() {
            newest = Some(update);
        }
        if let Some(update) = newest {
            self.left_chain.apply_update(&update);
            self.right_chain.apply_update(&update);
        }

        self.left_chain.process(left);
        self.right_chain.process(right);

        self.left_tap.push(left);
        self.right_tap.push(right);
    }

    /// Clear filter delay lines on both channels, keeping coefficients.
    pub fn reset(&mut self) {
        self.left_chain.reset();
        self.right_chain.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triband_dsp::{BandSettings, Slope};

    fn store_with(settings: BandSettings) -> Arc<ParameterStore> {
        Arc::new(ParameterStore::from_settings(&settings))
    }

    #[test]
    fn test_prepare_default() {
        let params = Arc::new(ParameterStore::new());
        let result = prepare(&AnalyzerConfig::default(), params, 48_000.0, 512);
        assert!(result.is_ok());
    }

    #[test]
    fn test_prepare_rejects_bad_inputs() {
        let params = Arc::new(ParameterStore::new());
        assert!(matches!(
            prepare(&AnalyzerConfig::default(), Arc::clone(&params), 48_000.0, 0),
            Err(CoreError::InvalidBlockSize(0))
        ));
        assert!(matches!(
            prepare(&AnalyzerConfig::default(), Arc::clone(&params), 0.0, 512),
            Err(CoreError::DspError(_))
        ));

        let bad_config = AnalyzerConfig {
            refresh_hz: 0,
            ..Default::default()
        };
        assert!(matches!(
            prepare(&bad_config, params, 48_000.0, 512),
            Err(CoreError::ConfigError(_))
        ));
    }

    #[test]
    fn test_initial_coefficients_come_from_store() {
        // A steep low cut from the stored settings must act on the very
        // first block, before any frontend drive.
        let params = store_with(BandSettings {
            low_cut_freq: 2_000.0,
            low_cut_slope: Slope::Db48,
            ..Default::default()
        });
        let (mut processor, _frontend) =
            prepare(&AnalyzerConfig::default(), params, 48_000.0, 512).unwrap();

        let mut left: Vec<f32> = (0..48_000)
            .map(|n| (2.0 * core::f32::consts::PI * 60.0 * n as f32 / 48_000.0).sin())
            .collect();
        let mut right = left.clone();
        for i in 0..(48_000 / 512) {
            let range = i * 512..(i + 1) * 512;
            processor.process(&mut left[range.clone()], &mut right[range]);
        }

        let tail = &left[40_000..];
        let rms = (tail.iter().map(|x| x * x).sum::<f32>() / tail.len() as f32).sqrt();
        assert!(rms < 0.01, "60 Hz should be cut, rms {rms}");
    }

    #[test]
    fn test_both_channels_get_identical_filtering() {
        let params = store_with(BandSettings {
            peak_gain_db: 9.0,
            peak_freq: 500.0,
            ..Default::default()
        });
        let (mut processor, _frontend) =
            prepare(&AnalyzerConfig::default(), params, 48_000.0, 256).unwrap();

        let block: Vec<f32> = (0..256)
            .map(|n| (2.0 * core::f32::consts::PI * 500.0 * n as f32 / 48_000.0).sin())
            .collect();
        let mut left = block.clone();
        let mut right = block;
        processor.process(&mut left, &mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn test_reset_silences_tails() {
        let params = store_with(BandSettings {
            low_cut_freq: 1_000.0,
            low_cut_slope: Slope::Db24,
            ..Default::default()
        });
        let (mut processor, _frontend) =
            prepare(&AnalyzerConfig::default(), params, 48_000.0, 256).unwrap();

        let mut left = vec![1.0; 256];
        let mut right = vec![1.0; 256];
        processor.process(&mut left, &mut right);
        processor.reset();

        // After reset, silence in gives exact silence out.
        let mut l = vec![0.0; 256];
        let mut r = vec![0.0; 256];
        processor.process(&mut l, &mut r);
        assert!(l.iter().all(|&x| x == 0.0));
        assert!(r.iter().all(|&x| x == 0.0));
    }
}
