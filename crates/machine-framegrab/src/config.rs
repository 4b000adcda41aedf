//! Machine configuration.

use std::path::Path;

use fb_burst_writer::{DEST_WORD_BYTES, FIELDS_PER_WORD, TransferConfig};
use serde::{Deserialize, Serialize};

/// Frame-grabber configuration.
///
/// `validate()` performs the construction-time checks the engine itself
/// deliberately omits; a machine is only ever built from a validated
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Byte address of destination region 0.
    pub base_address: u32,
    /// Destination words per frame.
    pub total_words: u32,
    /// Destination words per burst.
    pub burst_length: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel clock in Hz.
    pub pixel_clock_hz: u64,
}

impl Default for MachineConfig {
    /// QVGA frame, 64-word bursts, 25 MHz pixel clock.
    fn default() -> Self {
        Self {
            base_address: 0,
            total_words: 19_200,
            burst_length: 64,
            width: 320,
            height: 240,
            pixel_clock_hz: 25_000_000,
        }
    }
}

impl MachineConfig {
    /// Check the invariants the engine assumes but never verifies.
    pub fn validate(&self) -> Result<(), String> {
        if self.burst_length == 0 {
            return Err("burst_length must be nonzero".to_string());
        }
        if self.total_words == 0 {
            return Err("total_words must be nonzero".to_string());
        }
        if self.total_words % self.burst_length != 0 {
            return Err(format!(
                "total_words ({}) must be an exact multiple of burst_length ({}); \
                 a partial final burst would be silently dropped",
                self.total_words, self.burst_length
            ));
        }
        let stride = self.burst_length * DEST_WORD_BYTES;
        if self.base_address % stride != 0 {
            return Err(format!(
                "base_address {:#X} must be burst-aligned (multiple of {stride})",
                self.base_address
            ));
        }
        let frame_pixels = self.width * self.height;
        let word_pixels = self.total_words * FIELDS_PER_WORD;
        if frame_pixels != word_pixels {
            return Err(format!(
                "width * height ({frame_pixels}) must equal total_words * {FIELDS_PER_WORD} \
                 ({word_pixels})"
            ));
        }
        if self.pixel_clock_hz == 0 {
            return Err("pixel_clock_hz must be nonzero".to_string());
        }
        Ok(())
    }

    /// The engine's static parameters.
    #[must_use]
    pub fn transfer_config(&self) -> TransferConfig {
        TransferConfig {
            base_address: self.base_address,
            total_words: self.total_words,
            burst_length: self.burst_length,
        }
    }

    /// Bytes covered by one destination region.
    #[must_use]
    pub fn region_bytes(&self) -> u32 {
        self.transfer_config().region_bytes()
    }

    /// Parse a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid config: {e}"))
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> MachineConfig {
        MachineConfig {
            base_address: 0,
            total_words: 16,
            burst_length: 4,
            width: 8,
            height: 8,
            pixel_clock_hz: 25_000_000,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MachineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn small_config_is_valid() {
        assert_eq!(small().validate(), Ok(()));
    }

    #[test]
    fn rejects_partial_final_burst() {
        let mut config = small();
        config.total_words = 18;
        config.width = 9;
        let err = config.validate().expect_err("18 words / 4-word bursts");
        assert!(err.contains("exact multiple"), "unexpected message: {err}");
    }

    #[test]
    fn rejects_unaligned_base_address() {
        let mut config = small();
        config.base_address = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_frame_size_mismatch() {
        let mut config = small();
        config.width = 16;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let config = small();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed = MachineConfig::from_json(&json).expect("parse");
        assert_eq!(parsed.total_words, config.total_words);
        assert_eq!(parsed.burst_length, config.burst_length);
        assert_eq!(parsed.pixel_clock_hz, config.pixel_clock_hz);
    }
}
