//! Chip configuration
//!
//! Hosts usually build a [`ChipConfig`] in code, but it also loads from JSON
//! so board descriptions can live next to their ROM sets.

use serde::{Deserialize, Serialize};

use crate::multipcm::constants::{CLOCK_DIVIDER, VOICE_COUNT};
use crate::multipcm::DEFAULT_CLOCK;
use crate::{MultiPcmError, Result};

/// Construction parameters for a [`MultiPcm`](crate::MultiPcm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Input clock in Hz; the output rate is `clock_hz / 224`.
    pub clock_hz: u32,
    /// Voices to mute at start-up, bit `n` for voice `n`.
    pub mute_mask: u32,
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK,
            mute_mask: 0,
        }
    }
}

impl ChipConfig {
    /// Config for a given input clock.
    pub fn with_clock(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            ..Default::default()
        }
    }

    /// Mute a voice at start-up.
    pub fn mute_voice(mut self, voice: usize) -> Self {
        if voice < VOICE_COUNT {
            self.mute_mask |= 1 << voice;
        }
        self
    }

    /// Parse a JSON document, then validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ChipConfig = serde_json::from_str(json)
            .map_err(|e| MultiPcmError::ParseError(format!("Invalid chip config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| MultiPcmError::Other(e.to_string()))
    }

    /// Check that the clock yields a usable output rate and the mask only names real voices.
    pub fn validate(&self) -> Result<()> {
        if (self.clock_hz as f32) < CLOCK_DIVIDER {
            return Err(MultiPcmError::ConfigError(format!(
                "Clock {} Hz is below the {} divider",
                self.clock_hz, CLOCK_DIVIDER
            )));
        }
        if self.mute_mask >> VOICE_COUNT != 0 {
            return Err(MultiPcmError::ConfigError(format!(
                "Mute mask {:#x} names voices beyond {}",
                self.mute_mask,
                VOICE_COUNT - 1
            )));
        }
        Ok(())
    }

    /// Output sample rate for this clock.
    pub fn sample_rate(&self) -> f32 {
        self.clock_hz as f32 / CLOCK_DIVIDER
    }
}
