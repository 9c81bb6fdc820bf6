//! Precomputed lookup tables
//!
//! Every fixed-point curve the chip uses is derived once from the output
//! sample rate and then shared read-only between all voices. Only the
//! frequency-step table depends on the rate, so it is the only table rebuilt
//! when the input clock changes.

use super::constants::{
    value_to_fixed, AMPLITUDE_SCALE_LIMIT, ATTACK_RATE_TO_DECAY_RATE, BASE_TIMES, EG_DECAY1_SKIP,
    LFO_SHIFT, PHASE_SCALE_LIMIT, TIMEBASE_HZ, TL_SHIFT, TOTAL_LEVEL_RAMP_MS,
};
use super::lfo::LfoKind;

/// Entries in the frequency-step table (10-bit pitch fraction).
pub const FREQ_STEP_ENTRIES: usize = 0x400;
/// Entries in each envelope rate table.
pub const RATE_ENTRIES: usize = 0x40;
/// Entries in the linear to exponential volume table (10-bit envelope level).
pub const EXP_VOLUME_ENTRIES: usize = 0x400;
/// Entries in each pan table: 4-bit pan code by 7-bit total level.
pub const PAN_ENTRIES: usize = 0x800;
/// Entries in each LFO waveform and scale table.
pub const LFO_ENTRIES: usize = 0x100;

/// Immutable table bundle shared by every voice of a chip.
#[derive(Clone)]
pub struct Tables {
    rate: f32,
    freq_steps: Box<[u32]>,
    attack_steps: [u32; RATE_ENTRIES],
    decay_release_steps: [u32; RATE_ENTRIES],
    total_level_lower: i32,
    total_level_raise: i32,
    linear_to_exp: Box<[i32]>,
    left_pan: Box<[i32]>,
    right_pan: Box<[i32]>,
    pitch_wave: [u8; LFO_ENTRIES],
    amplitude_wave: [u8; LFO_ENTRIES],
    pitch_scale: Box<[[i32; LFO_ENTRIES]; 8]>,
    amplitude_scale: Box<[[i32; LFO_ENTRIES]; 8]>,
}

impl Tables {
    /// Build every table for the given output sample rate (Hz).
    pub fn new(rate: f32) -> Self {
        let (left_pan, right_pan) = build_pan_tables();
        let (pitch_wave, amplitude_wave) = build_lfo_waves();
        let (pitch_scale, amplitude_scale) = build_lfo_scales();

        Tables {
            rate,
            freq_steps: build_freq_steps(rate),
            attack_steps: build_rate_steps(1.0, true),
            decay_release_steps: build_rate_steps(ATTACK_RATE_TO_DECAY_RATE, false),
            total_level_lower: (-((0x80u32 << TL_SHIFT) as f32)
                / (TOTAL_LEVEL_RAMP_MS * TIMEBASE_HZ as f32 / 1000.0))
                as i32,
            total_level_raise: ((0x80u32 << TL_SHIFT) as f32
                / (TOTAL_LEVEL_RAMP_MS * 2.0 * TIMEBASE_HZ as f32 / 1000.0))
                as i32,
            linear_to_exp: build_linear_to_exp(),
            left_pan,
            right_pan,
            pitch_wave,
            amplitude_wave,
            pitch_scale,
            amplitude_scale,
        }
    }

    /// Output sample rate the frequency steps were built for.
    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Rebuild the frequency-step table after a clock change.
    ///
    /// All other tables are rate independent and stay untouched.
    pub fn rebuild_frequency_steps(&mut self, rate: f32) {
        self.rate = rate;
        self.freq_steps = build_freq_steps(rate);
    }

    /// Base frequency step for a 10-bit pitch fraction, scaled by the rate.
    #[inline]
    pub fn freq_step(&self, fraction: usize) -> u32 {
        self.freq_steps[fraction & (FREQ_STEP_ENTRIES - 1)]
    }

    /// Attack rate steps, indexed by effective rate (0..64).
    #[inline]
    pub fn attack_steps(&self) -> &[u32; RATE_ENTRIES] {
        &self.attack_steps
    }

    /// Decay1/decay2/release rate steps, indexed by effective rate (0..64).
    #[inline]
    pub fn decay_release_steps(&self) -> &[u32; RATE_ENTRIES] {
        &self.decay_release_steps
    }

    /// Total level step used when the level has to come down to its destination.
    #[inline]
    pub fn total_level_lower(&self) -> i32 {
        self.total_level_lower
    }

    /// Total level step used when the level has to go up to its destination.
    #[inline]
    pub fn total_level_raise(&self) -> i32 {
        self.total_level_raise
    }

    /// Exponential gain (`TL_SHIFT` fixed point) for a 10-bit linear envelope level.
    #[inline]
    pub fn exp_volume(&self, level: usize) -> i32 {
        self.linear_to_exp[level & (EXP_VOLUME_ENTRIES - 1)]
    }

    /// Left and right gains for a `pan << 7 | level` key.
    #[inline]
    pub fn pan_gain(&self, key: usize) -> (i32, i32) {
        let key = key & (PAN_ENTRIES - 1);
        (self.left_pan[key], self.right_pan[key])
    }

    /// Raw LFO waveform value (0..=255) at a phase index.
    #[inline]
    pub fn lfo_wave(&self, kind: LfoKind, index: usize) -> u8 {
        match kind {
            LfoKind::Pitch => self.pitch_wave[index & (LFO_ENTRIES - 1)],
            LfoKind::Amplitude => self.amplitude_wave[index & (LFO_ENTRIES - 1)],
        }
    }

    /// Depth-scaled LFO modifier (`LFO_SHIFT` fixed point) for a waveform value.
    #[inline]
    pub fn lfo_scale(&self, kind: LfoKind, depth: u8, value: u8) -> i32 {
        let depth = (depth & 7) as usize;
        match kind {
            LfoKind::Pitch => self.pitch_scale[depth][value as usize],
            LfoKind::Amplitude => self.amplitude_scale[depth][value as usize],
        }
    }
}

impl std::fmt::Debug for Tables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables")
            .field("rate", &self.rate)
            .field("total_level_lower", &self.total_level_lower)
            .field("total_level_raise", &self.total_level_raise)
            .finish_non_exhaustive()
    }
}

fn build_freq_steps(rate: f32) -> Box<[u32]> {
    (0..FREQ_STEP_ENTRIES)
        .map(|i| {
            let fcent = rate * (1024.0 + i as f32) / 1024.0;
            value_to_fixed(TL_SHIFT, fcent)
        })
        .collect()
}

fn build_rate_steps(time_scale: f64, attack: bool) -> [u32; RATE_ENTRIES] {
    let mut steps = [0u32; RATE_ENTRIES];
    // Rates 0..3 never move the envelope.
    for (i, step) in steps.iter_mut().enumerate().skip(4) {
        let samples = (BASE_TIMES[i] * time_scale * TIMEBASE_HZ / 1000.0) as f32;
        *step = (EG_DECAY1_SKIP as f32 / samples) as u32;
    }
    if attack {
        steps[RATE_ENTRIES - 1] = EG_DECAY1_SKIP;
    }
    steps
}

fn build_linear_to_exp() -> Box<[i32]> {
    (0..EXP_VOLUME_ENTRIES)
        .map(|i| {
            let db = -(96.0 - (96.0 * i as f32 / EXP_VOLUME_ENTRIES as f32));
            let exp_volume = 10f32.powf(db / 20.0);
            value_to_fixed(TL_SHIFT, exp_volume) as i32
        })
        .collect()
}

fn build_pan_tables() -> (Box<[i32]>, Box<[i32]>) {
    let mut left = vec![0i32; PAN_ENTRIES];
    let mut right = vec![0i32; PAN_ENTRIES];

    for level in 0..0x80usize {
        let vol_db = level as f32 * (-24.0) / 64.0;
        let total_level = 10f32.powf(vol_db / 20.0) / 4.0;

        for pan in 0..0x10usize {
            let (pan_left, pan_right) = pan_weights(pan);
            let key = (pan << 7) | level;
            left[key] = value_to_fixed(TL_SHIFT, pan_left * total_level) as i32;
            right[key] = value_to_fixed(TL_SHIFT, pan_right * total_level) as i32;
        }
    }

    (left.into_boxed_slice(), right.into_boxed_slice())
}

/// Linear left/right weights of a 4-bit pan code.
///
/// Code 0 is centre, 8 mutes both sides, 1..7 attenuate the left side in
/// 3 dB steps and 9..15 the right side. The outermost code of each side cuts
/// the attenuated channel completely.
fn pan_weights(pan: usize) -> (f32, f32) {
    let attenuation = |steps: usize| -> f32 {
        if steps & 7 == 7 {
            0.0
        } else {
            let db = steps as f64 * (-12.0) / 4.0;
            10f64.powf(db / 20.0) as f32
        }
    };

    match pan {
        0x0 => (1.0, 1.0),
        0x8 => (0.0, 0.0),
        p if p & 0x8 != 0 => (1.0, attenuation(0x10 - p)),
        p => (attenuation(p), 1.0),
    }
}

fn build_lfo_waves() -> ([u8; LFO_ENTRIES], [u8; LFO_ENTRIES]) {
    let mut pitch = [0u8; LFO_ENTRIES];
    let mut amplitude = [0u8; LFO_ENTRIES];

    for i in 0..LFO_ENTRIES as i32 {
        // Triangle centred on 128: up, down through the centre, back up.
        let p = match i {
            0..=63 => i * 2 + 128,
            64..=127 => 383 - i * 2,
            128..=191 => 384 - i * 2,
            _ => i * 2 - 383,
        };
        // Tremolo only ever attenuates, so its triangle starts at the top.
        let a = if i < 128 { 255 - i * 2 } else { i * 2 - 256 };

        pitch[i as usize] = p as u8;
        amplitude[i as usize] = a as u8;
    }

    (pitch, amplitude)
}

type ScaleTables = Box<[[i32; LFO_ENTRIES]; 8]>;

fn build_lfo_scales() -> (ScaleTables, ScaleTables) {
    let mut pitch = Box::new([[0i32; LFO_ENTRIES]; 8]);
    let mut amplitude = Box::new([[0i32; LFO_ENTRIES]; 8]);

    for depth in 0..8 {
        let limit = PHASE_SCALE_LIMIT[depth];
        for i in -128i32..128 {
            let cents = (limit * i as f32) / 128.0;
            let ratio = 2f32.powf(cents / 1200.0);
            pitch[depth][(i + 128) as usize] = value_to_fixed(LFO_SHIFT, ratio) as i32;
        }

        let limit = -AMPLITUDE_SCALE_LIMIT[depth];
        for i in 0..LFO_ENTRIES {
            let db = (limit * i as f32) / 256.0;
            let gain = 10f32.powf(db / 20.0);
            amplitude[depth][i] = value_to_fixed(LFO_SHIFT, gain) as i32;
        }
    }

    (pitch, amplitude)
}
