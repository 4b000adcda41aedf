//! Frame-grabber pipeline.
//!
//! Wires the [`fb_burst_writer::TransferEngine`] to models of its two
//! collaborators: a frame buffer with a registered one-cycle read port, and
//! a burst-addressable destination memory with backpressure. The machine
//! drives all three from one pixel clock.

pub mod capture;
mod config;
mod framebuffer;
mod machine;
pub mod mcp;
mod memory;

pub use config::MachineConfig;
pub use framebuffer::FrameBuffer;
pub use machine::Framegrab;
pub use memory::BurstMemory;
