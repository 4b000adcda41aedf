//! Pixel packing.
//!
//! The frame buffer stores four 8-bit pixels per 32-bit word; the
//! destination memory takes 64-bit words. Each source field is zero-extended
//! to 16 bits and the four padded fields are concatenated, so source field
//! *i* (bits `8i..8i+8`) lands in destination bits `16i..16i+16`. This
//! layout is an interoperability contract with the reader on the far side of
//! the destination memory and must be reproduced bit for bit.

/// Pixel fields per source word.
pub const FIELDS_PER_WORD: u32 = 4;

/// Bits per source pixel field.
pub const SOURCE_FIELD_BITS: u32 = 8;

/// Bits per destination word.
pub const DEST_WORD_BITS: u32 = 64;

/// Regroup `field_count` adjacent `field_bits`-wide fields of `word` into an
/// `out_bits`-wide word, zero-extending each field to `out_bits / field_count`.
///
/// Pure and stateless; recomputed every attempted-write cycle. `field_bits`
/// must be below 64 and `field_count` nonzero.
#[must_use]
pub fn pack_fields(word: u32, field_count: u32, field_bits: u32, out_bits: u32) -> u64 {
    let out_field_bits = out_bits / field_count;
    let field_mask = (1u64 << field_bits) - 1;

    let mut packed = 0u64;
    for i in 0..field_count {
        let field = (u64::from(word) >> (i * field_bits)) & field_mask;
        packed |= field << (i * out_field_bits);
    }
    packed
}

/// Pack one source word with this engine's fixed ratio (4 × 8-bit pixels
/// into one 64-bit destination word).
#[must_use]
pub fn pack_pixels(word: u32) -> u64 {
    pack_fields(word, FIELDS_PER_WORD, SOURCE_FIELD_BITS, DEST_WORD_BITS)
}
