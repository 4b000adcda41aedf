//! Frame-buffer burst writer.
//!
//! A fixed-function DMA engine that copies one frame of pixel data from a
//! frame-buffer read port into an external burst-addressable memory. Two
//! equal destination regions are selected by a single `swap` bit (double
//! buffering). The engine generates burst-aligned addresses, packs four
//! narrow pixels into each wide memory word, holds all state under
//! destination backpressure, and pulses `done` exactly once per transfer.
//!
//! The engine is a clocked model: the caller drives one [`TransferEngine::tick`]
//! per clock edge, presenting that cycle's input signals and receiving that
//! cycle's outputs. There is no implicit clock.

mod address;
mod config;
mod counter;
mod engine;
mod packer;

pub use address::destination_address;
pub use config::{DEST_WORD_BYTES, TransferConfig};
pub use counter::ProgressCounter;
pub use engine::{
    DestinationWrite, EngineInput, EngineOutput, FULL_WORD_ENABLE, TransferEngine,
};
pub use packer::{
    DEST_WORD_BITS, FIELDS_PER_WORD, SOURCE_FIELD_BITS, pack_fields, pack_pixels,
};
