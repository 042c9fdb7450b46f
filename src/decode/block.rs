//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The block parser (`spec.md` §4.1).
//!
//! Validates the three-byte `CAT | LEN_HI | LEN_LO` header, resolves the
//! category against a [`DefinitionStore`], then carves records off the
//! remaining payload one at a time until it is exhausted.

use nom::number::complete::{be_u16, be_u8};
use nom::sequence::tuple;
use nom::IResult;

use crate::decode::record::{self, DataRecord};
use crate::error::Error;
use crate::schema::DefinitionStore;
use crate::trace;

/// Parses the fixed 3-byte `CAT | LEN_HI | LEN_LO` header (`spec.md` §6).
fn header(input: &[u8]) -> IResult<&[u8], (u8, u16)> {
    tuple((be_u8, be_u16))(input)
}

/// One decoded ASTERIX data block: a framed run of records sharing a
/// category (`spec.md` §3).
#[derive(Clone, Debug, PartialEq)]
pub struct DataBlock {
    pub category_ref: u8,
    /// The `LEN` field from the header: total block length including the header.
    pub length: usize,
    /// Caller-supplied decode timestamp, carried through for downstream consumers.
    pub timestamp: f64,
    /// False if the header was malformed, the category is unknown, or any
    /// record inside decoded with `format_ok = false`.
    pub format_ok: bool,
    pub records: Vec<DataRecord>,
}

impl DataBlock {
    fn malformed(category_ref: u8, length: usize, timestamp: f64) -> Self {
        DataBlock { category_ref, length, timestamp, format_ok: false, records: Vec::new() }
    }
}

/// Parses one framed block out of `bytes`, under the schemas in `store`.
///
/// Never panics and never returns an error type: every failure mode — a
/// malformed header, an unresolvable category, a malformed record — is
/// reflected in `DataBlock::format_ok` and traced at level >= 1
/// (`spec.md` §7, §8).
pub fn parse_block(store: &DefinitionStore, bytes: &[u8], timestamp: f64) -> DataBlock {
    let (cat, length) = match header(bytes) {
        Ok((_, (cat, length))) => (cat, length as usize),
        Err(_) => {
            trace::emit_error(&Error::MalformedBlock);
            return DataBlock::malformed(bytes.first().copied().unwrap_or(0), 0, timestamp);
        }
    };

    if length < 3 || bytes.len() < length {
        trace::emit_error(&Error::MalformedBlock);
        return DataBlock::malformed(cat, length, timestamp);
    }

    let category = match store.category(cat) {
        Some(category) => category,
        None => {
            trace::emit_error(&Error::UnknownCategory);
            return DataBlock::malformed(cat, length, timestamp);
        }
    };

    let payload = &bytes[3..length];
    let mut cursor = payload;
    let mut records = Vec::new();
    let mut format_ok = true;

    while !cursor.is_empty() {
        let (record, consumed) = record::parse_record(category, cursor);
        if consumed == 0 {
            // The record parser could not make any progress at all (e.g. the
            // FSPEC itself was truncated); stop rather than loop forever.
            format_ok = false;
            break;
        }
        if !record.format_ok {
            format_ok = false;
        }
        cursor = &cursor[consumed..];
        records.push(record);
    }

    DataBlock { category_ref: cat, length, timestamp, format_ok, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BitField, Encoding, FixedSpec, FormatNode, UapSlot};

    fn store_with_single_slot_category() -> DefinitionStore {
        let mut store = DefinitionStore::new();
        let category = store.add_category(1);
        let mut item = crate::schema::DataItemDescription::new(
            "010",
            FormatNode::Fixed(FixedSpec::new(
                2,
                vec![BitField::new("VAL", "value", 0, 15, Encoding::Unsigned)],
            )),
        );
        item.set_name("value item");
        category.add_item(item);
        let uap = category.new_uap("default");
        uap.add_slot(1, UapSlot::Item("010".into()));
        for slot in 2..=8 {
            uap.add_slot(slot, UapSlot::Spare);
        }
        store
    }

    #[test]
    fn empty_payload_block_decodes_with_no_records() {
        let store = store_with_single_slot_category();
        // CAT=1, LEN=0x0003 (header only, no payload).
        let block = parse_block(&store, &[0x01, 0x00, 0x03], 0.0);
        assert!(block.format_ok);
        assert_eq!(block.category_ref, 1);
        assert!(block.records.is_empty());
    }

    #[test]
    fn single_record_block_decodes_cleanly() {
        let store = store_with_single_slot_category();
        // CAT=1, LEN=0x0006, FSPEC=0x80, item bytes 0x12 0x34.
        let block = parse_block(&store, &[0x01, 0x00, 0x06, 0x80, 0x12, 0x34], 0.0);
        assert!(block.format_ok);
        assert_eq!(block.records.len(), 1);
        assert_eq!(block.records[0].items[0].0, "010");
    }

    #[test]
    fn unknown_category_id_marks_block_not_ok() {
        let store = DefinitionStore::new();
        let block = parse_block(&store, &[0x09, 0x00, 0x04, 0xAA], 0.0);
        assert!(!block.format_ok);
        assert!(block.records.is_empty());
    }

    #[test]
    fn header_length_exceeding_buffer_is_malformed() {
        let store = store_with_single_slot_category();
        let block = parse_block(&store, &[0x01, 0x00, 0xFF, 0x80], 0.0);
        assert!(!block.format_ok);
        assert!(block.records.is_empty());
    }

    #[test]
    fn malformed_second_record_preserves_the_first() {
        let store = store_with_single_slot_category();
        // Header: CAT=1, LEN=0x0007 (3 header + 4 payload bytes).
        // Record 1: FSPEC=0x80, item 0x12 0x34 (3 bytes consumed, format_ok).
        // Record 2 attempt: FSPEC=0x80 (slot 1 set, terminates) with no bytes
        // left for its 2-byte item -> Truncated; only the FSPEC byte is
        // consumed, which exhausts the payload.
        let block = parse_block(&store, &[0x01, 0x00, 0x07, 0x80, 0x12, 0x34, 0x80], 0.0);
        assert!(!block.format_ok);
        assert_eq!(block.records.len(), 2);
        assert!(block.records[0].format_ok);
        assert!(!block.records[1].format_ok);
    }
}
