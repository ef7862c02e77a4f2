//! Analyzer Pipeline Driver
//!
//! Render-thread side of the spectrum analyzer. Each drive cycle drains
//! every stage of the per-channel pipeline to exhaustion: queued sample
//! blocks roll into the FFT window and produce magnitude frames, frames
//! become display curves, and only the newest curve is kept. Because
//! each drain loop empties its queue, displayed data is never older
//! than one drive period plus one FFT window.
//!
//! `SpectrumFrontend` owns both channel pipelines plus the parameter
//! path: it polls the store's dirty flag, recomputes one coefficient
//! snapshot for both channels, publishes it to the audio thread, and
//! regenerates the static response overlay.

use std::sync::Arc;

use tracing::{debug, warn};
use triband_dsp::{
    response_curve, Bounds, ChainUpdate, CurveGenerator, DisplayCurve, FftMagnitudeGenerator,
    FftOrder, FifoProducer,
};

use crate::collector::BlockReceiver;
use crate::params::ParameterStore;

/// Which side of the stereo pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

/// One channel's sample-to-curve pipeline.
pub struct ChannelAnalyzer {
    receiver: BlockReceiver,
    fft: FftMagnitudeGenerator,
    curves: CurveGenerator,
    /// Rolling mono window; always holds the most recent `fft.size()`
    /// samples, oldest first.
    window: Vec<f32>,
    block: Vec<f32>,
    frame: Vec<f32>,
    latest: DisplayCurve,
    reported_drops: u64,
}

impl ChannelAnalyzer {
    pub(crate) fn new(receiver: BlockReceiver, order: FftOrder, floor_db: f32) -> Self {
        let fft = FftMagnitudeGenerator::with_floor(order, floor_db);
        let block = vec![0.0; receiver.block_size()];
        Self {
            receiver,
            window: vec![0.0; fft.size()],
            curves: CurveGenerator::new(floor_db),
            fft,
            block,
            frame: Vec::new(),
            latest: DisplayCurve::default(),
            reported_drops: 0,
        }
    }

    /// Run one analysis cycle: drain blocks, frames, and curves.
    pub fn drive(&mut self, bounds: Bounds, sample_rate: f32) {
        while self.receiver.read_block(&mut self.block) {
            self.roll_in_block();
            self.fft.produce(&self.window);
        }

        let fft_size = self.fft.size();
        let bin_width = self.fft.bin_width(sample_rate);
        while self.fft.pull_magnitudes(&mut self.frame) {
            self.curves.generate(&self.frame, bounds, fft_size, bin_width);
        }

        while let Some(curve) = self.curves.pull_curve() {
            self.latest = curve;
        }
    }

    /// Shift the rolling window left by one block and append the new one.
    fn roll_in_block(&mut self) {
        let size = self.window.len();
        let n = self.block.len().min(size);
        self.window.copy_within(n.., 0);
        self.window[size - n..].copy_from_slice(&self.block[self.block.len() - n..]);
    }

    /// Most recent finished curve; empty until the first full window.
    pub fn curve(&self) -> &DisplayCurve {
        &self.latest
    }

    fn take_new_drops(&mut self) -> u64 {
        let total = self.receiver.dropped();
        let new = total - self.reported_drops;
        self.reported_drops = total;
        new
    }
}

/// Queued coefficient snapshots before the producer starts dropping.
const UPDATE_QUEUE_CAPACITY: usize = 16;

pub(crate) fn update_queue() -> (
    FifoProducer<ChainUpdate>,
    triband_dsp::FifoConsumer<ChainUpdate>,
) {
    triband_dsp::fifo(UPDATE_QUEUE_CAPACITY)
}

/// Render-thread facade over both channel analyzers and the parameter
/// path. Drive this from the host's display timer.
pub struct SpectrumFrontend {
    params: Arc<ParameterStore>,
    sample_rate: f32,
    left: ChannelAnalyzer,
    right: ChannelAnalyzer,
    updates: FifoProducer<ChainUpdate>,
    /// Snapshot currently in force; the response overlay derives from it.
    current: ChainUpdate,
    pending: Option<ChainUpdate>,
    response: DisplayCurve,
    response_bounds: Option<Bounds>,
}

impl SpectrumFrontend {
    pub(crate) fn new(
        params: Arc<ParameterStore>,
        sample_rate: f32,
        left: ChannelAnalyzer,
        right: ChannelAnalyzer,
        updates: FifoProducer<ChainUpdate>,
        initial: ChainUpdate,
    ) -> Self {
        Self {
            params,
            sample_rate,
            left,
            right,
            updates,
            current: initial,
            pending: None,
            response: DisplayCurve::default(),
            response_bounds: None,
        }
    }

    /// Run one display cycle.
    ///
    /// Order matters: parameter changes are picked up first so the audio
    /// thread gets new coefficients before the next block, then both
    /// spectrum pipelines are drained.
    pub fn drive(&mut self, bounds: Bounds) {
        if self.params.take_dirty() {
            match ChainUpdate::compute(&self.params.snapshot(), self.sample_rate) {
                Ok(update) => {
                    self.current = update;
                    self.pending = Some(update);
                    self.response_bounds = None;
                }
                // Unreachable after a successful prepare; the sample rate
                // never changes afterwards.
                Err(e) => warn!("coefficient update failed: {e}"),
            }
        }

        if let Some(update) = self.pending {
            // Retried next cycle if the queue is momentarily full.
            if self.updates.try_push(update) {
                self.pending = None;
            }
        }

        if self.response_bounds != Some(bounds) {
            self.response = response_curve(&self.current, bounds, self.sample_rate);
            self.response_bounds = Some(bounds);
        }

        self.left.drive(bounds, self.sample_rate);
        self.right.drive(bounds, self.sample_rate);

        let new_drops = self.left.take_new_drops() + self.right.take_new_drops();
        if new_drops > 0 {
            debug!(blocks = new_drops, "analyzer tap overflowed, display stale");
        }
    }

    /// Latest spectrum curve for one channel.
    pub fn spectrum_curve(&self, channel: Channel) -> &DisplayCurve {
        match channel {
            Channel::Left => self.left.curve(),
            Channel::Right => self.right.curve(),
        }
    }

    /// Composite filter-response overlay; empty before the first drive.
    pub fn response_curve(&self) -> &DisplayCurve {
        &self.response
    }

    /// Settings snapshot currently shown by the response overlay.
    pub fn current_settings(&self) -> triband_dsp::BandSettings {
        self.params.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::sample_tap;

    fn test_bounds() -> Bounds {
        Bounds::new(0.0, 0.0, 600.0, 200.0)
    }

    #[test]
    fn test_channel_analyzer_produces_curve_after_enough_blocks() {
        let (mut tap, rx) = sample_tap(512, 8);
        let mut analyzer = ChannelAnalyzer::new(rx, FftOrder::Order2048, -48.0);

        assert!(analyzer.curve().is_empty());

        // Four 512-sample blocks fill the 2048-sample window.
        let sine: Vec<f32> = (0..512)
            .map(|n| (2.0 * core::f32::consts::PI * 1_000.0 * n as f32 / 48_000.0).sin())
            .collect();
        for _ in 0..4 {
            tap.push(&sine);
        }
        analyzer.drive(test_bounds(), 48_000.0);

        assert!(!analyzer.curve().is_empty());
    }

    #[test]
    fn test_drive_drains_all_pending_blocks() {
        let (mut tap, rx) = sample_tap(256, 16);
        let mut analyzer = ChannelAnalyzer::new(rx, FftOrder::Order2048, -48.0);

        for _ in 0..10 {
            tap.push(&[0.25; 256]);
        }
        analyzer.drive(test_bounds(), 48_000.0);

        assert!(!analyzer.curve().is_empty());
        let after_first = analyzer.curve().clone();

        // Nothing left queued: a second cycle keeps the same curve.
        analyzer.drive(test_bounds(), 48_000.0);
        assert_eq!(*analyzer.curve(), after_first);
    }

    #[test]
    fn test_rolling_window_keeps_newest_samples() {
        let (mut tap, rx) = sample_tap(1024, 8);
        let mut analyzer = ChannelAnalyzer::new(rx, FftOrder::Order2048, -48.0);

        tap.push(&[1.0; 1024]);
        tap.push(&[2.0; 1024]);
        tap.push(&[3.0; 1024]);
        analyzer.drive(test_bounds(), 48_000.0);

        assert_eq!(analyzer.window[0], 2.0);
        assert_eq!(analyzer.window[1023], 2.0);
        assert_eq!(analyzer.window[1024], 3.0);
        assert_eq!(analyzer.window[2047], 3.0);
    }
}
