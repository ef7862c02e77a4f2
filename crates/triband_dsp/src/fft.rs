//! FFT Magnitude Generator
//!
//! Turns windows of mono samples into dB magnitude frames for the
//! spectrum display. Runs entirely on the analyzer thread; the audio
//! thread only ever feeds the sample FIFO upstream of this.
//!
//! Pipeline per frame: Blackman-Harris window -> forward FFT -> keep the
//! lower half of the bins -> normalize by bin count -> convert to dB with
//! a floor substituted for silence. Finished frames queue in an internal
//! FIFO so a slow consumer sees whole frames or nothing.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::error::DspError;
use crate::fifo::{fifo, FifoConsumer, FifoProducer};

/// Default dB value substituted for bins at or below zero magnitude.
pub const DEFAULT_FLOOR_DB: f32 = -48.0;

/// Queued magnitude frames before the producer starts dropping.
const FRAME_QUEUE_CAPACITY: usize = 30;

/// Transform size as a log2 exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FftOrder {
    #[default]
    Order2048 = 11,
    Order4096 = 12,
    Order8192 = 13,
}

impl FftOrder {
    /// Transform size in samples.
    pub fn size(self) -> usize {
        1 << (self as usize)
    }

    pub fn from_exponent(exp: u8) -> Result<Self, DspError> {
        match exp {
            11 => Ok(FftOrder::Order2048),
            12 => Ok(FftOrder::Order4096),
            13 => Ok(FftOrder::Order8192),
            other => Err(DspError::InvalidFftOrder(other)),
        }
    }
}

/// Four-term Blackman-Harris window of length `len`.
fn blackman_harris(len: usize) -> Vec<f32> {
    let n1 = (len - 1) as f32;
    (0..len)
        .map(|n| {
            let x = n as f32 / n1;
            let tau = 2.0 * core::f32::consts::PI;
            0.35875 - 0.48829 * (tau * x).cos() + 0.14128 * (2.0 * tau * x).cos()
                - 0.01168 * (3.0 * tau * x).cos()
        })
        .collect()
}

/// Produces dB magnitude frames from fixed-size sample windows.
pub struct FftMagnitudeGenerator {
    order: FftOrder,
    fft: Arc<dyn Fft<f32>>,
    planner: FftPlanner<f32>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    floor_db: f32,
    frames_in: FifoProducer<Vec<f32>>,
    frames_out: FifoConsumer<Vec<f32>>,
}

impl FftMagnitudeGenerator {
    pub fn new(order: FftOrder) -> Self {
        Self::with_floor(order, DEFAULT_FLOOR_DB)
    }

    pub fn with_floor(order: FftOrder, floor_db: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(order.size());
        let (frames_in, frames_out) = fifo(FRAME_QUEUE_CAPACITY);
        Self {
            order,
            fft,
            planner,
            window: blackman_harris(order.size()),
            scratch: vec![Complex::new(0.0, 0.0); order.size()],
            floor_db,
            frames_in,
            frames_out,
        }
    }

    /// Rebuild plan, window, buffers, and the frame queue for a new size.
    ///
    /// Frames produced at the old size are discarded.
    pub fn change_order(&mut self, order: FftOrder) {
        self.order = order;
        self.fft = self.planner.plan_fft_forward(order.size());
        self.window = blackman_harris(order.size());
        self.scratch = vec![Complex::new(0.0, 0.0); order.size()];
        let (frames_in, frames_out) = fifo(FRAME_QUEUE_CAPACITY);
        self.frames_in = frames_in;
        self.frames_out = frames_out;
    }

    /// Transform one window of samples into a queued magnitude frame.
    ///
    /// `samples` must hold exactly `size()` values. Not real-time safe;
    /// never call this from the audio thread.
    pub fn produce(&mut self, samples: &[f32]) {
        debug_assert_eq!(samples.len(), self.size());

        for (slot, (&x, &w)) in self.scratch.iter_mut().zip(samples.iter().zip(&self.window)) {
            *slot = Complex::new(x * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let num_bins = self.num_bins();
        let norm = num_bins as f32;
        let floor = self.floor_db;
        let frame: Vec<f32> = self.scratch[..num_bins]
            .iter()
            .map(|bin| {
                let mut magnitude = bin.norm() / norm;
                if !magnitude.is_finite() {
                    magnitude = 0.0;
                }
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(floor)
                } else {
                    floor
                }
            })
            .collect();

        self.frames_in.try_push(frame);
    }

    /// Number of finished frames waiting to be pulled.
    pub fn frames_available(&self) -> usize {
        self.frames_out.available()
    }

    /// Move the oldest finished frame into `out`. Returns `false` if no
    /// frame is queued.
    pub fn pull_magnitudes(&mut self, out: &mut Vec<f32>) -> bool {
        match self.frames_out.try_pull() {
            Some(frame) => {
                *out = frame;
                true
            }
            None => false,
        }
    }

    pub fn size(&self) -> usize {
        self.order.size()
    }

    pub fn order(&self) -> FftOrder {
        self.order
    }

    /// Bins kept per frame (lower half of the transform).
    pub fn num_bins(&self) -> usize {
        self.order.size() / 2
    }

    /// Frequency spacing between adjacent bins in Hz.
    pub fn bin_width(&self, sample_rate: f32) -> f32 {
        sample_rate / self.order.size() as f32
    }

    pub fn floor_db(&self) -> f32 {
        self.floor_db
    }
}
