//! Audio-Thread Sample Tap
//!
//! The collector sits at the end of the audio callback and copies
//! processed samples toward the analyzer. Samples accumulate in a fixed
//! staging block; each time the block fills it is handed to the SPSC
//! ring as one all-or-nothing chunk, so the analyzer always sees whole
//! blocks in arrival order.
//!
//! # Real-time Safety
//!
//! `push` never allocates, locks, or blocks. If the analyzer falls
//! behind and the ring fills up, completed blocks are dropped and
//! counted; the display goes stale, the audio thread does not wait.

use triband_dsp::{fifo, FifoConsumer, FifoProducer};

/// Create a connected collector/receiver pair.
///
/// `block_size` is the number of samples per hand-off; `capacity_blocks`
/// is how many completed blocks may queue before drops begin.
pub fn sample_tap(block_size: usize, capacity_blocks: usize) -> (SampleCollector, BlockReceiver) {
    let (producer, consumer) = fifo(block_size * capacity_blocks);
    (
        SampleCollector {
            staging: vec![0.0; block_size],
            fill: 0,
            producer,
        },
        BlockReceiver {
            block_size,
            consumer,
        },
    )
}

/// Audio-thread half of the tap.
pub struct SampleCollector {
    staging: Vec<f32>,
    fill: usize,
    producer: FifoProducer<f32>,
}

impl SampleCollector {
    /// Append processed samples, handing off each completed block.
    #[inline]
    pub fn push(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.staging[self.fill] = sample;
            self.fill += 1;
            if self.fill == self.staging.len() {
                self.producer.push_slice(&self.staging);
                self.fill = 0;
            }
        }
    }
}

/// Analyzer-thread half of the tap.
pub struct BlockReceiver {
    block_size: usize,
    consumer: FifoConsumer<f32>,
}

impl BlockReceiver {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whole blocks ready to read.
    pub fn blocks_available(&self) -> usize {
        self.consumer.available() / self.block_size
    }

    /// Read one block into `out` (which must hold `block_size` samples).
    /// Returns `false` if no complete block is queued.
    pub fn read_block(&mut self, out: &mut [f32]) -> bool {
        debug_assert_eq!(out.len(), self.block_size);
        self.consumer.pull_slice(out)
    }

    /// Blocks dropped because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.consumer.dropped()
    }
}
