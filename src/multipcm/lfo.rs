//! Low-frequency oscillators
//!
//! Every voice owns a pitch LFO (vibrato) and an amplitude LFO (tremolo).
//! Both share the frequency selected by register 6 and pick their own depth,
//! which selects one of the shared scale tables in [`Tables`].

use serde::{Deserialize, Serialize};

use super::constants::{LFO_FREQ, LFO_SHIFT, TL_SHIFT};
use super::tables::Tables;

/// Which waveform and scale family an LFO unit reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LfoKind {
    /// Vibrato: symmetric triangle around unity, scaled in cents.
    #[default]
    Pitch,
    /// Tremolo: triangle from full level down, scaled in decibels.
    Amplitude,
}

/// One LFO phase accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LfoUnit {
    /// Phase accumulator, `LFO_SHIFT` fractional bits over a 256-entry cycle.
    pub phase: u32,
    /// Phase increment per output sample.
    pub phase_step: u32,
    kind: LfoKind,
    depth: u8,
}

impl LfoUnit {
    /// Create a stopped LFO of the given kind with depth 0.
    pub fn new(kind: LfoKind) -> Self {
        LfoUnit {
            phase: 0,
            phase_step: 0,
            kind,
            depth: 0,
        }
    }

    /// Waveform family of this unit.
    pub fn kind(&self) -> LfoKind {
        self.kind
    }

    /// Selected depth (0..=7).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Recompute the phase step and depth table from register fields.
    ///
    /// `frequency` and `depth` are 3-bit register fields. The phase is kept.
    pub fn configure(&mut self, tables: &Tables, frequency: u8, depth: u8) {
        let step = LFO_FREQ[(frequency & 7) as usize] * 256.0 / tables.rate();
        self.phase_step = ((1u32 << LFO_SHIFT) as f32 * step) as u32;
        self.depth = depth & 7;
    }

    /// Reselect the depth table without touching the phase step.
    ///
    /// Used when the phase step itself comes from a restored snapshot.
    pub(crate) fn select_depth(&mut self, depth: u8) {
        self.depth = depth & 7;
    }

    /// Advance one sample and return the modifier in `TL_SHIFT` fixed point.
    ///
    /// `1 << TL_SHIFT` is unity; the pitch modifier scales the playback step,
    /// the amplitude modifier scales the interpolated sample.
    #[inline]
    pub fn step(&mut self, tables: &Tables) -> i32 {
        self.phase = self.phase.wrapping_add(self.phase_step);
        let wave = tables.lfo_wave(self.kind, ((self.phase >> LFO_SHIFT) & 0xff) as usize);
        tables.lfo_scale(self.kind, self.depth, wave) << (TL_SHIFT - LFO_SHIFT)
    }
}
