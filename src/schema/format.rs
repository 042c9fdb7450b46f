//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The polymorphic format tree.
//!
//! A [`FormatNode`] is the schema half of a data item: a tagged sum of the six
//! layout kinds ASTERIX items come in. Decoding a node against a byte cursor
//! yields a [`DecodedValue`], the instance half, which [`crate::render`]
//! walks to produce text, JSON or XML without going back to the raw bytes.
//!
//! Recursive nodes (`Compound`, `Repetitive`, `Explicit`, `Bds`) own their
//! children by value, so the schema for one data item is a genuine tree with
//! no possibility of a cycle.

use std::collections::BTreeMap;

use nom::bytes::complete::take;
use nom::number::complete::be_u8;

use crate::decode::bits::{extract_msb_bits, read_fspec_like, sign_extend};
use crate::error::{Error, Result};

/// How a bitfield's raw integer value maps to a rendered value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// Plain unsigned binary.
    Unsigned,
    /// Two's-complement signed binary, sign-extended over the field width.
    Signed,
    /// 7-bit ASCII, one character per 8-bit byte in the bitfield's byte span.
    Ascii,
    /// The ASTERIX 6-bit IA-5 subset used for identifiers such as callsigns.
    SixBitChar,
    /// Rendered as a hexadecimal string, value kept as an unsigned integer.
    Hex,
    /// Rendered as an octal string, value kept as an unsigned integer.
    Octal,
}

/// A decoded leaf value, after scale and enumeration have been applied.
#[derive(Clone, Debug, PartialEq)]
pub enum LeafData {
    Integer(i64),
    Real(f64),
    Text(String),
    /// An integer code with its enumerated label, or `None` on an `EnumMiss`.
    Enum { raw: i64, label: Option<String> },
}

/// One decoded bitfield, carrying enough of the schema along (name,
/// description, unit) for the renderer to produce a header without needing a
/// second pass over the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub field_name: String,
    pub description: String,
    pub unit: Option<String>,
    pub data: LeafData,
}

/// The schema description of one bitfield within a `Fixed` (or `Fixed`-shaped
/// `Variable` part) node.
///
/// `bit_from`/`bit_to` are 0-based bit positions counted from the MSB of the
/// node's entire byte span (bit 0 is the MSB of the first byte); width is
/// `bit_to - bit_from + 1`. `byte_from` is carried for descriptive purposes
/// only — see DESIGN.md for why this reading was chosen over a
/// per-byte-relative one.
#[derive(Clone, Debug, PartialEq)]
pub struct BitField {
    pub name: String,
    pub description: String,
    pub byte_from: usize,
    pub bit_from: u32,
    pub bit_to: u32,
    pub encoding: Encoding,
    pub scale: f64,
    pub unit: Option<String>,
    pub enum_map: Option<BTreeMap<i64, String>>,
}

impl BitField {
    /// Constructs a bitfield descriptor, deriving `byte_from` from `bit_from`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        bit_from: u32,
        bit_to: u32,
        encoding: Encoding,
    ) -> Self {
        BitField {
            name: name.into(),
            description: description.into(),
            byte_from: (bit_from / 8) as usize,
            bit_from,
            bit_to,
            encoding,
            scale: 1.0,
            unit: None,
            enum_map: None,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_enum_map(mut self, map: BTreeMap<i64, String>) -> Self {
        self.enum_map = Some(map);
        self
    }

    fn width(&self) -> u32 {
        self.bit_to - self.bit_from + 1
    }

    /// Extracts this bitfield from `buffer`, the full byte span of the owning
    /// Fixed node.
    ///
    /// Ascii and Hex read their raw byte span directly rather than going
    /// through the 64-bit accumulator — this lets those encodings exceed 64
    /// bits wide (e.g. an 8-character callsign) without overflow.
    pub fn extract(&self, buffer: &[u8]) -> Leaf {
        let byte_span = || {
            let start = self.byte_from.min(buffer.len());
            let end = (start + (self.width() as usize + 7) / 8).min(buffer.len());
            &buffer[start..end]
        };

        let data = match self.encoding {
            Encoding::Ascii => {
                let span = byte_span();
                // Validate the span as ASCII, falling back to masking the top bit
                // off each byte rather than failing the whole record when a
                // producer sent a stray high-bit byte in a supposedly-ASCII field.
                let text = ascii::AsciiStr::from_ascii(span)
                    .map(|value| value.as_str().to_string())
                    .unwrap_or_else(|_| span.iter().map(|&b| (b & 0x7F) as char).collect());
                LeafData::Text(text)
            }
            Encoding::Hex => {
                let text = byte_span().iter().map(|b| format!("{:02X}", b)).collect();
                LeafData::Text(text)
            }
            Encoding::SixBitChar => {
                let raw = extract_msb_bits(buffer, self.bit_from, self.bit_to);
                LeafData::Text(Self::six_bit_string(raw, self.width()))
            }
            Encoding::Octal => {
                let raw = extract_msb_bits(buffer, self.bit_from, self.bit_to);
                LeafData::Text(format!("{:o}", raw))
            }
            Encoding::Unsigned | Encoding::Signed => {
                let raw_unsigned = extract_msb_bits(buffer, self.bit_from, self.bit_to);
                let signed_value = if self.encoding == Encoding::Signed {
                    sign_extend(raw_unsigned, self.width())
                } else {
                    raw_unsigned as i64
                };

                if let Some(map) = &self.enum_map {
                    LeafData::Enum {
                        raw: signed_value,
                        label: map.get(&signed_value).cloned(),
                    }
                } else if (self.scale - 1.0).abs() > f64::EPSILON {
                    LeafData::Real(signed_value as f64 * self.scale)
                } else {
                    LeafData::Integer(signed_value)
                }
            }
        };

        Leaf {
            field_name: self.name.clone(),
            description: self.description.clone(),
            unit: self.unit.clone(),
            data,
        }
    }

    /// Decodes a span of packed 6-bit IA-5 codes into characters.
    ///
    /// Table: 1-26 => 'A'-'Z', 32 => space, 48-57 => '0'-'9'; anything else
    /// renders as `?` rather than failing the record, matching the way the
    /// rest of this decoder treats unrecognized leaf encodings as soft misses.
    fn six_bit_string(raw: u64, width: u32) -> String {
        let char_count = width / 6;
        let mut out = String::with_capacity(char_count as usize);
        for i in 0..char_count {
            let shift = width - 6 * (i + 1);
            let code = ((raw >> shift) & 0x3F) as u8;
            out.push(Self::six_bit_to_char(code));
        }
        out
    }

    fn six_bit_to_char(code: u8) -> char {
        match code {
            1..=26 => (b'A' + (code - 1)) as char,
            32 => ' ',
            48..=57 => (b'0' + (code - 48)) as char,
            0 => ' ',
            _ => '?',
        }
    }
}

/// One decoded node of the format tree, the instance counterpart of
/// [`FormatNode`]. Rendering operates entirely on this tree.
#[derive(Clone, Debug, PartialEq)]
pub enum DecodedValue {
    /// A `Fixed` node, or one part of a `Variable` node.
    Leaves(Vec<Leaf>),
    /// A `Variable` node: one `Leaves`-shaped vector per consumed part, in order.
    Parts(Vec<Vec<Leaf>>),
    /// A `Repetitive` node: one decoded `inner` per repetition.
    Sequence(Vec<DecodedValue>),
    /// A `Compound` node: present children, in schema order.
    Compound(Vec<(String, DecodedValue)>),
    /// An `Explicit` node, wrapping the inner decode.
    Explicit(Box<DecodedValue>),
    /// A `Bds` node: the selected register name and its decoded value.
    Bds { register: String, value: Box<DecodedValue> },
}

/// A fixed-length run of bitfields — used directly as `FormatNode::Fixed` and
/// as the per-part shape chained by `FormatNode::Variable`.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedSpec {
    pub length_bytes: usize,
    pub bitfields: Vec<BitField>,
}

impl FixedSpec {
    pub fn new(length_bytes: usize, bitfields: Vec<BitField>) -> Self {
        FixedSpec { length_bytes, bitfields }
    }

    fn decode(&self, input: &[u8]) -> Result<(Vec<Leaf>, usize)> {
        let (_, buffer) =
            take::<_, _, nom::error::Error<&[u8]>>(self.length_bytes)(input).map_err(|_| Error::Truncated)?;
        let leaves = self.bitfields.iter().map(|bf| bf.extract(buffer)).collect();
        Ok((leaves, self.length_bytes))
    }
}

/// The format tree's node variants.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatNode {
    Fixed(FixedSpec),
    /// Chained `Fixed` parts; the schema for part `i` is `parts[i.min(parts.len()-1)]`
    /// once the definition runs out of distinct continuation-byte layouts.
    Variable { parts: Vec<FixedSpec> },
    /// First byte is a repetition count; `rep_len` inner copies are consumed
    /// per count unit (almost always 1).
    Repetitive { inner: Box<FormatNode>, rep_len: usize },
    /// A presence-bitmap primary subfield followed by the present children,
    /// in schema order.
    Compound { children: Vec<(String, FormatNode)> },
    /// First byte is a total length (including itself); `inner` decodes the
    /// remaining `length - 1` bytes.
    Explicit { inner: Box<FormatNode> },
    /// First byte selects a sibling by `id_num`.
    Bds { registers: Vec<(u8, String, FormatNode)> },
}

impl FormatNode {
    /// Decodes one instance of this node from the front of `input`, returning
    /// the decoded value and the number of bytes consumed.
    pub fn decode(&self, input: &[u8]) -> Result<(DecodedValue, usize)> {
        match self {
            FormatNode::Fixed(spec) => {
                let (leaves, consumed) = spec.decode(input)?;
                Ok((DecodedValue::Leaves(leaves), consumed))
            }

            FormatNode::Variable { parts } => {
                if parts.is_empty() {
                    return Err(Error::InternalSchemaError);
                }
                let mut all_parts = Vec::new();
                let mut consumed = 0usize;
                let mut index = 0usize;
                loop {
                    let spec = &parts[index.min(parts.len() - 1)];
                    let (leaves, part_len) = spec.decode(&input[consumed..])?;
                    let continuation = input[consumed + part_len - 1] & 0x01 != 0;
                    consumed += part_len;
                    all_parts.push(leaves);
                    index += 1;
                    if !continuation {
                        break;
                    }
                }
                Ok((DecodedValue::Parts(all_parts), consumed))
            }

            FormatNode::Repetitive { inner, rep_len } => {
                let (mut cursor, count_byte) =
                    be_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| Error::Truncated)?;
                let count = count_byte as usize;
                let mut consumed = 1usize;
                let mut items = Vec::with_capacity(count);
                for _ in 0..(count * (*rep_len).max(1)) {
                    let (value, item_len) = inner.decode(cursor)?;
                    items.push(value);
                    consumed += item_len;
                    cursor = &cursor[item_len..];
                }
                Ok((DecodedValue::Sequence(items), consumed))
            }

            FormatNode::Compound { children } => {
                let (presence, primary_len) = read_fspec_like(input)?;
                let mut consumed = primary_len;
                let mut decoded = Vec::new();
                for (slot_index, present) in presence.iter().enumerate() {
                    if !present {
                        continue;
                    }
                    let (name, child) = children.get(slot_index).ok_or(Error::UnknownItem)?;
                    let (value, child_len) = child.decode(&input[consumed..])?;
                    consumed += child_len;
                    decoded.push((name.clone(), value));
                }
                Ok((DecodedValue::Compound(decoded), consumed))
            }

            FormatNode::Explicit { inner } => {
                let (after_length, length_byte) =
                    be_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| Error::Truncated)?;
                let length = length_byte as usize;
                if length == 0 {
                    return Err(Error::Overflow);
                }
                let (_, inner_bytes) = take::<_, _, nom::error::Error<&[u8]>>(length - 1)(after_length)
                    .map_err(|_| Error::Truncated)?;
                let (value, _) = inner.decode(inner_bytes)?;
                Ok((DecodedValue::Explicit(Box::new(value)), length))
            }

            FormatNode::Bds { registers } => {
                let (after_selector, selector) =
                    be_u8::<_, nom::error::Error<&[u8]>>(input).map_err(|_| Error::Truncated)?;
                let (name, node) = registers
                    .iter()
                    .find(|(id_num, _, _)| *id_num == selector)
                    .map(|(_, name, node)| (name.clone(), node))
                    .ok_or(Error::InternalSchemaError)?;
                let (value, inner_len) = node.decode(after_selector)?;
                Ok((
                    DecodedValue::Bds { register: name, value: Box::new(value) },
                    1 + inner_len,
                ))
            }
        }
    }
}
