//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Bit arithmetic shared by every format node kind.
//!
//! Centralizing MSB-first extraction here avoids every node variant
//! re-deriving its own shift/mask and getting an off-by-one wrong
//! independently. The FSPEC-shaped byte walk below is grammar, not
//! arithmetic, so it is built as a `nom` combinator instead.

use nom::combinator::verify;
use nom::multi::many_till;
use nom::number::complete::be_u8;
use nom::IResult;

use crate::error::{Error, Result};

/// Extracts bits `[bit_from, bit_to]` (inclusive, 0-based, MSB of `buffer[0]`
/// is bit 0) from `buffer` as an unsigned value, right-justified.
///
/// `bit_from`/`bit_to` are positions within the *whole* owning node's byte
/// span, but only the bytes the field actually touches are folded into the
/// accumulator — this is what lets a Fixed node wider than 8 bytes still
/// host individual bitfields, as long as no single field is itself wider
/// than 64 bits, matching "≤ 64 bits for numeric encodings" (`spec.md` §3).
pub fn extract_msb_bits(buffer: &[u8], bit_from: u32, bit_to: u32) -> u64 {
    debug_assert!(bit_from <= bit_to, "bit_from must not exceed bit_to");
    let width = bit_to - bit_from + 1;

    let start_byte = (bit_from / 8) as usize;
    let end_byte = (bit_to / 8) as usize;
    let span = &buffer[start_byte..=end_byte.min(buffer.len() - 1)];

    let mut value: u64 = 0;
    for &b in span {
        value = (value << 8) | b as u64;
    }

    let span_bits = span.len() as u32 * 8;
    let local_bit_to = bit_to - (start_byte as u32) * 8;
    let shift = span_bits - 1 - local_bit_to;
    let mask: u64 = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    (value >> shift) & mask
}

/// Sign-extends the low `width` bits of `value` (2's complement).
pub fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

/// A byte whose low-order continuation bit is set: another FSPEC byte follows.
fn continuation_byte(input: &[u8]) -> IResult<&[u8], u8> {
    verify(be_u8, |byte: &u8| byte & 0x01 != 0)(input)
}

/// A byte whose low-order continuation bit is clear: the FSPEC chain ends here.
fn terminal_byte(input: &[u8]) -> IResult<&[u8], u8> {
    verify(be_u8, |byte: &u8| byte & 0x01 == 0)(input)
}

/// Parses the FSPEC-shaped byte chain itself, in the same function-combinator
/// style as the teacher crate's `de::parser::utils` helpers.
fn fspec_bytes(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (rest, (mut bytes, last)) = many_till(continuation_byte, terminal_byte)(input)?;
    bytes.push(last);
    Ok((rest, bytes))
}

/// Reads an FSPEC-shaped presence bitmap: bytes are consumed while their
/// low-order continuation bit is 1, and the high seven bits of each byte
/// (MSB-first, 1-based slot numbering) become presence flags. Used both for
/// the record-level FSPEC (`spec.md` §4.3) and for `Compound`'s primary
/// subfield (`spec.md` §4.4), which is explicitly specified to be decoded the
/// same way.
///
/// Returns `(presence_by_slot, bytes_consumed)` where `presence_by_slot[i]`
/// is whether 1-based slot `i + 1` was set.
pub fn read_fspec_like(input: &[u8]) -> Result<(Vec<bool>, usize)> {
    let (rest, bytes) = fspec_bytes(input).map_err(|_| Error::Truncated)?;
    let consumed = input.len() - rest.len();
    let mut presence = Vec::with_capacity(bytes.len() * 7);
    for byte in bytes {
        for bit in (1..=7).rev() {
            presence.push(byte & (1 << bit) != 0);
        }
    }
    Ok((presence, consumed))
}
