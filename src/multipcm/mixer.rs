//! Stereo output mixer
//!
//! Sums the per-voice contributions of one tick into 32-bit accumulators and
//! clamps the result to the signed 16-bit output range. Muted voices are
//! still advanced by the caller; the mixer just drops their output.

/// One stereo output frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoFrame {
    /// Left channel.
    pub left: i16,
    /// Right channel.
    pub right: i16,
}

impl StereoFrame {
    /// Frame with both channels at zero.
    pub const SILENCE: StereoFrame = StereoFrame { left: 0, right: 0 };

    /// Create a frame from two channel values.
    pub fn new(left: i16, right: i16) -> Self {
        StereoFrame { left, right }
    }

    /// Channels as floats in `[-1.0, 1.0)`.
    #[inline]
    pub fn to_f32(self) -> (f32, f32) {
        (self.left as f32 / 32768.0, self.right as f32 / 32768.0)
    }
}

/// Per-tick accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mixer {
    left: i32,
    right: i32,
}

impl Mixer {
    /// Start an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one voice's contribution.
    #[inline]
    pub fn accumulate(&mut self, (left, right): (i32, i32)) {
        self.left = self.left.saturating_add(left);
        self.right = self.right.saturating_add(right);
    }

    /// Clamp the sums into an output frame.
    #[inline]
    pub fn finish(self) -> StereoFrame {
        StereoFrame {
            left: clamp16(self.left),
            right: clamp16(self.right),
        }
    }
}

#[inline]
fn clamp16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
