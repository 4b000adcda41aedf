//! Headless capture: destination-region PNG dumps.

use std::error::Error;
use std::fs;
use std::path::Path;

use fb_burst_writer::DEST_WORD_BYTES;

use crate::machine::Framegrab;

/// Extract the pixels of one destination region.
///
/// Each 64-bit destination word carries four 16-bit fields whose low byte is
/// the pixel (the high byte is zero padding), so the pixels sit at every
/// even byte offset of the little-endian region.
#[must_use]
pub fn region_pixels(machine: &Framegrab, selector: bool) -> Vec<u8> {
    let region = machine.buffer_bytes(selector);
    let mut pixels = Vec::with_capacity(region.len() / 2);
    for word in region.chunks_exact(DEST_WORD_BYTES as usize) {
        for field in word.chunks_exact(2) {
            pixels.push(field[0]);
        }
    }
    pixels
}

/// Save one destination region as an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_buffer_png(machine: &Framegrab, selector: bool, path: &Path) -> Result<(), Box<dyn Error>> {
    let config = machine.config();
    let pixels = region_pixels(machine, selector);

    let file = fs::File::create(path)?;
    let w = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, config.width, config.height);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    Ok(())
}
