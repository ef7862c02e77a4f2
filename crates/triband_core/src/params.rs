//! Shared Parameter Store
//!
//! Lives in an `Arc` between the host's parameter layer and the render
//! thread. Every field is an individual atomic, so the host can write
//! from any thread without locks; the render thread reads whole-value
//! snapshots.
//!
//! Change notification is a single dirty flag rather than callbacks:
//! setters raise it, and the render thread test-and-clears it once per
//! drive cycle, recomputing coefficients only when something actually
//! changed.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use triband_dsp::{BandSettings, Slope};

/// f32 stored as its bit pattern in an AtomicU32.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }
}

fn slope_index(slope: Slope) -> u8 {
    match slope {
        Slope::Db12 => 0,
        Slope::Db24 => 1,
        Slope::Db36 => 2,
        Slope::Db48 => 3,
    }
}

fn slope_from_index(index: u8) -> Slope {
    match index {
        1 => Slope::Db24,
        2 => Slope::Db36,
        3 => Slope::Db48,
        _ => Slope::Db12,
    }
}

/// Lock-free shared parameter state for the three bands.
pub struct ParameterStore {
    low_cut_freq: AtomicF32,
    high_cut_freq: AtomicF32,
    peak_freq: AtomicF32,
    peak_gain_db: AtomicF32,
    peak_q: AtomicF32,
    low_cut_slope: AtomicU8,
    high_cut_slope: AtomicU8,
    low_cut_bypassed: AtomicBool,
    peak_bypassed: AtomicBool,
    high_cut_bypassed: AtomicBool,
    dirty: AtomicBool,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::from_settings(&BandSettings::default())
    }

    pub fn from_settings(settings: &BandSettings) -> Self {
        Self {
            low_cut_freq: AtomicF32::new(settings.low_cut_freq),
            high_cut_freq: AtomicF32::new(settings.high_cut_freq),
            peak_freq: AtomicF32::new(settings.peak_freq),
            peak_gain_db: AtomicF32::new(settings.peak_gain_db),
            peak_q: AtomicF32::new(settings.peak_q),
            low_cut_slope: AtomicU8::new(slope_index(settings.low_cut_slope)),
            high_cut_slope: AtomicU8::new(slope_index(settings.high_cut_slope)),
            low_cut_bypassed: AtomicBool::new(settings.low_cut_bypassed),
            peak_bypassed: AtomicBool::new(settings.peak_bypassed),
            high_cut_bypassed: AtomicBool::new(settings.high_cut_bypassed),
            dirty: AtomicBool::new(false),
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn set_low_cut_freq(&self, freq: f32) {
        self.low_cut_freq.store(freq);
        self.mark_dirty();
    }

    pub fn set_high_cut_freq(&self, freq: f32) {
        self.high_cut_freq.store(freq);
        self.mark_dirty();
    }

    pub fn set_peak_freq(&self, freq: f32) {
        self.peak_freq.store(freq);
        self.mark_dirty();
    }

    pub fn set_peak_gain_db(&self, gain_db: f32) {
        self.peak_gain_db.store(gain_db);
        self.mark_dirty();
    }

    pub fn set_peak_q(&self, q: f32) {
        self.peak_q.store(q);
        self.mark_dirty();
    }

    pub fn set_low_cut_slope(&self, slope: Slope) {
        self.low_cut_slope.store(slope_index(slope), Ordering::Release);
        self.mark_dirty();
    }

    pub fn set_high_cut_slope(&self, slope: Slope) {
        self.high_cut_slope.store(slope_index(slope), Ordering::Release);
        self.mark_dirty();
    }

    pub fn set_low_cut_bypassed(&self, bypassed: bool) {
        self.low_cut_bypassed.store(bypassed, Ordering::Release);
        self.mark_dirty();
    }

    pub fn set_peak_bypassed(&self, bypassed: bool) {
        self.peak_bypassed.store(bypassed, Ordering::Release);
        self.mark_dirty();
    }

    pub fn set_high_cut_bypassed(&self, bypassed: bool) {
        self.high_cut_bypassed.store(bypassed, Ordering::Release);
        self.mark_dirty();
    }

    /// Replace every field at once, as when loading a saved preset.
    pub fn apply(&self, settings: &BandSettings) {
        self.low_cut_freq.store(settings.low_cut_freq);
        self.high_cut_freq.store(settings.high_cut_freq);
        self.peak_freq.store(settings.peak_freq);
        self.peak_gain_db.store(settings.peak_gain_db);
        self.peak_q.store(settings.peak_q);
        self.low_cut_slope
            .store(slope_index(settings.low_cut_slope), Ordering::Release);
        self.high_cut_slope
            .store(slope_index(settings.high_cut_slope), Ordering::Release);
        self.low_cut_bypassed
            .store(settings.low_cut_bypassed, Ordering::Release);
        self.peak_bypassed
            .store(settings.peak_bypassed, Ordering::Release);
        self.high_cut_bypassed
            .store(settings.high_cut_bypassed, Ordering::Release);
        self.mark_dirty();
    }

    /// Whole-value copy of the current settings.
    pub fn snapshot(&self) -> BandSettings {
        BandSettings {
            low_cut_freq: self.low_cut_freq.load(),
            high_cut_freq: self.high_cut_freq.load(),
            peak_freq: self.peak_freq.load(),
            peak_gain_db: self.peak_gain_db.load(),
            peak_q: self.peak_q.load(),
            low_cut_slope: slope_from_index(self.low_cut_slope.load(Ordering::Acquire)),
            high_cut_slope: slope_from_index(self.high_cut_slope.load(Ordering::Acquire)),
            low_cut_bypassed: self.low_cut_bypassed.load(Ordering::Acquire),
            peak_bypassed: self.peak_bypassed.load(Ordering::Acquire),
            high_cut_bypassed: self.high_cut_bypassed.load(Ordering::Acquire),
        }
    }

    /// Test-and-clear the change flag. Returns `true` at most once per
    /// batch of setter calls.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_of_fresh_store_is_default() {
        let store = ParameterStore::new();
        assert_eq!(store.snapshot(), BandSettings::default());
        assert!(!store.take_dirty(), "fresh store is clean");
    }

    #[test]
    fn test_setters_update_snapshot() {
        let store = ParameterStore::new();
        store.set_peak_freq(1_200.0);
        store.set_peak_gain_db(-6.0);
        store.set_low_cut_slope(Slope::Db36);
        store.set_high_cut_bypassed(true);

        let snap = store.snapshot();
        assert_eq!(snap.peak_freq, 1_200.0);
        assert_eq!(snap.peak_gain_db, -6.0);
        assert_eq!(snap.low_cut_slope, Slope::Db36);
        assert!(snap.high_cut_bypassed);
        // Untouched fields keep their defaults.
        assert_eq!(snap.low_cut_freq, 20.0);
    }

    #[test]
    fn test_dirty_flag_reports_once() {
        let store = ParameterStore::new();
        store.set_peak_q(2.0);
        store.set_peak_gain_db(3.0);

        assert!(store.take_dirty(), "setters raise the flag");
        assert!(!store.take_dirty(), "flag clears on read");

        store.set_peak_q(3.0);
        assert!(store.take_dirty(), "flag rises again on the next change");
    }

    #[test]
    fn test_apply_replaces_everything_and_marks_dirty() {
        let store = ParameterStore::new();
        let preset = BandSettings {
            low_cut_freq: 120.0,
            peak_gain_db: 9.0,
            high_cut_slope: Slope::Db48,
            peak_bypassed: true,
            ..Default::default()
        };
        store.apply(&preset);

        assert_eq!(store.snapshot(), preset);
        assert!(store.take_dirty());
    }

    #[test]
    fn test_slope_index_round_trip() {
        for slope in [Slope::Db12, Slope::Db24, Slope::Db36, Slope::Db48] {
            assert_eq!(slope_from_index(slope_index(slope)), slope);
        }
    }
}
