//! Transfer engine control state and per-cycle tick.

use sim_core::{Observable, Value};

use crate::address::destination_address;
use crate::config::TransferConfig;
use crate::counter::ProgressCounter;
use crate::packer::pack_pixels;

/// Byte-enable mask for a full-word write. The engine only performs
/// full-word writes.
pub const FULL_WORD_ENABLE: u8 = 0xFF;

/// Input signals sampled by the engine on one clock cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineInput {
    /// Transfer trigger. Level-checked each cycle; also aborts and restarts
    /// a transfer already in flight.
    pub start: bool,
    /// Buffer selector bit, sampled live. Never latched by the engine.
    pub swap: bool,
    /// Destination backpressure. While high, no write succeeds and all
    /// engine state holds.
    pub wait: bool,
    /// Pulse from the destination: a full burst was accepted this cycle.
    pub burst_accepted: bool,
    /// Current frame-buffer read data (the word addressed last cycle).
    pub source_data: u32,
}

/// One write presented to the destination port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationWrite {
    /// Burst-aligned byte address; the same address is presented for every
    /// word of a burst and the destination lands word *k* at
    /// `address + k * DEST_WORD_BYTES`.
    pub address: u32,
    /// Packed destination word.
    pub data: u64,
    /// Per-byte write enable; always [`FULL_WORD_ENABLE`].
    pub byte_enable: u8,
    /// Static burst-length field, sent with every write.
    pub burst_length: u32,
}

/// Output signals driven by the engine on one clock cycle.
#[derive(Debug, Clone, Copy)]
pub struct EngineOutput {
    /// The write attempted this cycle, if any. Present exactly when the
    /// engine is busy and the destination is not waiting.
    pub write: Option<DestinationWrite>,
    /// Frame-buffer read address presented this cycle. The source port is
    /// read every cycle, busy or not.
    pub source_read_addr: u32,
    /// Completion pulse: high for the single cycle following the cycle on
    /// which the terminal burst was accepted.
    pub done: bool,
}

/// The frame transfer engine.
///
/// All registered state lives here: the Idle/Busy control bit, the word and
/// burst progress counters, and the delayed completion flag. One call to
/// [`TransferEngine::tick`] is one clock edge; outputs are computed from the
/// pre-edge state.
pub struct TransferEngine {
    config: TransferConfig,
    active: bool,
    words: ProgressCounter,
    bursts: ProgressCounter,
    done_delayed: bool,
}

impl TransferEngine {
    #[must_use]
    pub fn new(config: TransferConfig) -> Self {
        Self {
            config,
            active: false,
            words: ProgressCounter::new(config.total_words),
            bursts: ProgressCounter::new(config.bursts_per_frame()),
            done_delayed: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// True while a transfer is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Words successfully written in the current transfer.
    #[must_use]
    pub fn word_count(&self) -> u32 {
        self.words.value()
    }

    /// Bursts accepted in the current transfer.
    #[must_use]
    pub fn burst_count(&self) -> u32 {
        self.bursts.value()
    }

    /// True on the cycle the word counter is about to wrap (the frame's
    /// final word is in flight).
    #[must_use]
    pub fn word_count_at_terminal(&self) -> bool {
        self.words.at_terminal()
    }

    /// True on the cycle the burst counter is about to wrap; with the
    /// burst-accepted pulse, this is the completion condition.
    #[must_use]
    pub fn burst_count_at_terminal(&self) -> bool {
        self.bursts.at_terminal()
    }

    /// True when a write will be attempted (and succeed) this cycle, given
    /// the destination's wait line.
    ///
    /// The machine uses this to derive same-cycle destination signals (the
    /// burst-accepted pulse) without duplicating the gating rule.
    #[must_use]
    pub fn will_write(&self, wait: bool) -> bool {
        self.active && !wait
    }

    /// Advance one clock edge.
    ///
    /// Output signals describe the cycle that ends at this edge and are
    /// computed from the pre-edge state; the registered state then updates.
    pub fn tick(&mut self, input: &EngineInput) -> EngineOutput {
        let write_now = self.will_write(input.wait);

        let write = write_now.then(|| DestinationWrite {
            address: destination_address(&self.config, input.swap, self.bursts.value()),
            data: pack_pixels(input.source_data),
            byte_enable: FULL_WORD_ENABLE,
            burst_length: self.config.burst_length,
        });

        // Read one word ahead of the word being written, so the registered
        // source port holds the right data on the next write cycle. The
        // hardware counter wraps at the frame boundary, priming word 0 for a
        // back-to-back transfer.
        let source_read_addr = if write_now {
            let next = self.words.value() + 1;
            if next == self.config.total_words { 0 } else { next }
        } else {
            self.words.value()
        };

        let done = self.done_delayed;
        let terminal_burst =
            self.active && input.burst_accepted && self.bursts.at_terminal();

        if input.start {
            // start wins over the completion transition: the engine stays
            // busy and both counters restart from zero (abort-and-restart).
            self.active = true;
            self.words.reset();
            self.bursts.reset();
        } else {
            if write_now {
                self.words.advance();
            }
            if input.burst_accepted {
                self.bursts.advance();
            }
            if terminal_burst {
                self.active = false;
            }
        }
        // The delayed completion echo is set regardless of a simultaneous
        // restart, so `done` still pulses for the aborted transfer's final
        // burst.
        self.done_delayed = terminal_burst;

        EngineOutput {
            write,
            source_read_addr,
            done,
        }
    }
}

impl Observable for TransferEngine {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "active" => Some(self.active.into()),
            "word_count" => Some(self.words.value().into()),
            "burst_count" => Some(self.bursts.value().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["active", "word_count", "burst_count"]
    }
}
