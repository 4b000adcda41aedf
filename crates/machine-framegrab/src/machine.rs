//! Top-level frame-grabber machine.
//!
//! One master-clock tick is one engine clock. Per cycle the machine samples
//! the destination wait line, derives the same-cycle burst-accepted pulse,
//! feeds the engine the frame buffer's registered read data, routes the
//! engine's write to the memory, and latches the next frame-buffer read.

use fb_burst_writer::{EngineInput, TransferEngine};
use sim_core::{MasterClock, Observable, Tickable, Value};

use crate::config::MachineConfig;
use crate::framebuffer::FrameBuffer;
use crate::memory::BurstMemory;

/// Safety cap for `run_transfer`: a healthy destination accepts one word
/// per cycle; this allows heavy backpressure before declaring the
/// destination hung.
const MAX_TICKS_PER_WORD: u64 = 64;

/// Frame-grabber pipeline.
pub struct Framegrab {
    config: MachineConfig,
    engine: TransferEngine,
    framebuffer: FrameBuffer,
    memory: BurstMemory,
    /// Start line armed for the next tick only.
    start_line: bool,
    /// Buffer selector level.
    swap_line: bool,
    /// Engine `done` output during the last tick.
    done_line: bool,
    done_count: u64,
    master_clock: u64,
}

impl Framegrab {
    /// Build a machine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &MachineConfig) -> Result<Self, String> {
        config.validate()?;

        let memory_bytes = config.base_address as usize + 2 * config.region_bytes() as usize;
        Ok(Self {
            engine: TransferEngine::new(config.transfer_config()),
            framebuffer: FrameBuffer::new(config.total_words),
            memory: BurstMemory::new(memory_bytes, config.burst_length),
            config: config.clone(),
            start_line: false,
            swap_line: false,
            done_line: false,
            done_count: 0,
            master_clock: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    #[must_use]
    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }

    /// Pixel clock as a [`MasterClock`], for timing reports.
    #[must_use]
    pub fn pixel_clock(&self) -> MasterClock {
        MasterClock::new(self.config.pixel_clock_hz)
    }

    /// Arm the start line for the next tick (a one-cycle pulse).
    pub fn start_transfer(&mut self) {
        self.start_line = true;
    }

    /// Drive the buffer selector level.
    pub fn set_swap(&mut self, swap: bool) {
        self.swap_line = swap;
    }

    #[must_use]
    pub fn swap(&self) -> bool {
        self.swap_line
    }

    /// Engine `done` pulse during the last tick.
    #[must_use]
    pub fn done(&self) -> bool {
        self.done_line
    }

    /// Completed transfers since construction.
    #[must_use]
    pub fn done_count(&self) -> u64 {
        self.done_count
    }

    #[must_use]
    pub fn transfer_active(&self) -> bool {
        self.engine.is_active()
    }

    #[must_use]
    pub fn engine(&self) -> &TransferEngine {
        &self.engine
    }

    #[must_use]
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }

    #[must_use]
    pub fn memory(&self) -> &BurstMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut BurstMemory {
        &mut self.memory
    }

    /// Byte address of a destination region.
    #[must_use]
    pub fn region_base(&self, selector: bool) -> u32 {
        if selector {
            self.config.base_address + self.config.region_bytes()
        } else {
            self.config.base_address
        }
    }

    /// Read back one destination region.
    #[must_use]
    pub fn buffer_bytes(&self, selector: bool) -> &[u8] {
        self.memory
            .read_bytes(self.region_base(selector), self.config.region_bytes() as usize)
    }

    /// Start a transfer and tick until its done pulse.
    ///
    /// Returns the elapsed ticks from the start pulse to (and including)
    /// the done pulse.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination stalls past the safety cap —
    /// the one failure the hardware itself cannot report.
    pub fn run_transfer(&mut self) -> Result<u64, String> {
        let cap = 64 + u64::from(self.config.total_words) * MAX_TICKS_PER_WORD;
        let start_clock = self.master_clock;

        self.start_transfer();
        loop {
            self.tick();
            let elapsed = self.master_clock - start_clock;
            if self.done() {
                return Ok(elapsed);
            }
            if elapsed >= cap {
                return Err(format!(
                    "transfer did not complete within {cap} ticks; destination hung?"
                ));
            }
        }
    }
}

impl Tickable for Framegrab {
    fn tick(&mut self) {
        let wait = self.memory.begin_cycle();
        let write_pending = self.engine.will_write(wait);

        let input = EngineInput {
            start: self.start_line,
            swap: self.swap_line,
            wait,
            burst_accepted: self.memory.completes_burst(write_pending),
            source_data: self.framebuffer.data_out(),
        };
        self.start_line = false;

        let output = self.engine.tick(&input);

        if let Some(write) = &output.write {
            self.memory.write(write);
        }
        self.framebuffer.set_read_addr(output.source_read_addr);
        self.framebuffer.tick();

        self.done_line = output.done;
        if output.done {
            self.done_count += 1;
        }
        self.master_clock += 1;
    }
}

impl Observable for Framegrab {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("engine.") {
            return self.engine.query(rest);
        }
        match path {
            "memory.words_accepted" => Some(self.memory.words_accepted().into()),
            "memory.bursts_accepted" => Some(self.memory.bursts_accepted().into()),
            "memory.wait" => Some(self.memory.wait().into()),
            "swap" => Some(self.swap_line.into()),
            "done" => Some(self.done_line.into()),
            "done_count" => Some(self.done_count.into()),
            "master_clock" => Some(self.master_clock.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "engine.active",
            "engine.word_count",
            "engine.burst_count",
            "memory.words_accepted",
            "memory.bursts_accepted",
            "memory.wait",
            "swap",
            "done",
            "done_count",
            "master_clock",
        ]
    }
}
