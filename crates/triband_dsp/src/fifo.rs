//! Lock-Free Single-Producer/Single-Consumer Queue
//!
//! Every hand-off in the analyzer pipeline goes through one of these:
//! raw sample blocks (audio thread -> analyzer), FFT magnitude frames,
//! generated display curves, and coefficient updates. Nothing crosses a
//! thread boundary through shared mutable state.
//!
//! The queue is a thin wrapper over `rtrb`'s wait-free ring buffer. The
//! producer and consumer are distinct owned values, so the one-producer/
//! one-consumer contract is enforced by the type system rather than checked
//! at runtime.
//!
//! # Overflow behavior
//!
//! Pushing into a full queue fails and the item is dropped (drop-newest).
//! The producer counts failed pushes into a shared relaxed counter that the
//! consumer side can poll for diagnostics; overflow is never fatal and
//! never blocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rtrb::RingBuffer;

/// Create a connected producer/consumer pair with at least `capacity` slots.
///
/// The capacity is rounded up to the next power of two so index wraparound
/// stays a mask operation inside the ring.
pub fn fifo<T>(capacity: usize) -> (FifoProducer<T>, FifoConsumer<T>) {
    let capacity = capacity.max(1).next_power_of_two();
    let (producer, consumer) = RingBuffer::new(capacity);
    let dropped = Arc::new(AtomicU64::new(0));

    (
        FifoProducer {
            inner: producer,
            dropped: Arc::clone(&dropped),
        },
        FifoConsumer {
            inner: consumer,
            dropped,
        },
    )
}

/// Write half of the queue. Exactly one thread may own this at a time.
pub struct FifoProducer<T> {
    inner: rtrb::Producer<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> FifoProducer<T> {
    /// Push a single item.
    ///
    /// Returns `false` (and drops the item) if the queue is full. Never
    /// blocks, never allocates.
    #[inline]
    pub fn try_push(&mut self, item: T) -> bool {
        match self.inner.push(item) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of free slots.
    pub fn free_slots(&self) -> usize {
        self.inner.slots()
    }

    /// Total number of items dropped due to a full queue.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T: Copy> FifoProducer<T> {
    /// Push a whole block of items, all-or-nothing.
    ///
    /// If fewer than `block.len()` slots are free the block is dropped in
    /// its entirety, so block boundaries in the stream are preserved.
    ///
    /// # Real-time Safety
    /// No allocations and no locks; safe to call from an audio callback.
    #[inline]
    pub fn push_slice(&mut self, block: &[T]) -> bool {
        match self.inner.write_chunk_uninit(block.len()) {
            Ok(chunk) => {
                let _ = chunk.fill_from_iter(block.iter().copied());
                true
            }
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Read half of the queue. Exactly one thread may own this at a time.
pub struct FifoConsumer<T> {
    inner: rtrb::Consumer<T>,
    dropped: Arc<AtomicU64>,
}

impl<T> FifoConsumer<T> {
    /// Pull the oldest item, or `None` if the queue is empty. Never blocks.
    #[inline]
    pub fn try_pull(&mut self) -> Option<T> {
        self.inner.pop().ok()
    }

    /// Number of items available for reading.
    pub fn available(&self) -> usize {
        self.inner.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of items the producer has dropped so far.
    ///
    /// Read from the consumer thread to report overflow without touching
    /// the producer.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<T: Copy> FifoConsumer<T> {
    /// Pull exactly `out.len()` items into `out`, all-or-nothing.
    ///
    /// Returns `false` without reading anything if fewer items are queued.
    #[inline]
    pub fn pull_slice(&mut self, out: &mut [T]) -> bool {
        match self.inner.read_chunk(out.len()) {
            Ok(chunk) => {
                let (first, second) = chunk.as_slices();
                out[..first.len()].copy_from_slice(first);
                out[first.len()..].copy_from_slice(second);
                chunk.commit_all();
                true
            }
            Err(_) => false,
        }
    }
}
