//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The record parser (`spec.md` §4.2, §4.3).
//!
//! Carves one record off the front of a block's payload: reads the FSPEC
//! presence bitmap, resolves the active UAP against it, then decodes each
//! present, non-spare slot's item in FSPEC order.

use crate::decode::bits::read_fspec_like;
use crate::error::Error;
use crate::schema::{Category, DecodedValue, Rule, UapSlot};
use crate::trace;

/// One decoded ASTERIX record: the selected UAP's name, its present items in
/// FSPEC order, and enough bookkeeping to tell a clean decode from a partial
/// one (`spec.md` §3).
#[derive(Clone, Debug, PartialEq)]
pub struct DataRecord {
    pub category_ref: u8,
    /// Name of the UAP this record was decoded against, empty if none matched.
    pub uap_name: String,
    /// Decoded items, in the order their FSPEC bits were set.
    pub items: Vec<(String, DecodedValue)>,
    /// 1-based FSPEC slot numbers that were set but reference a spare bit.
    pub spare_slots: Vec<usize>,
    /// False if any item failed to decode, no UAP matched, or a mandatory
    /// item's slot was absent from the FSPEC.
    pub format_ok: bool,
    /// Every error this record hit while decoding, in the order encountered.
    ///
    /// `trace::emit_error` writes the same errors to the process-wide sink,
    /// but that sink is shared across concurrently decoding threads
    /// (`spec.md` §5) and carries no record identity — this is the per-record
    /// channel callers actually inspect to attribute a failure to the record
    /// that produced it (`spec.md` §7, §9).
    pub diagnostics: Vec<Error>,
}

impl DataRecord {
    fn failed(category_ref: u8, diagnostics: Vec<Error>) -> Self {
        DataRecord {
            category_ref,
            uap_name: String::new(),
            items: Vec::new(),
            spare_slots: Vec::new(),
            format_ok: false,
            diagnostics,
        }
    }
}

/// Traces `error` through the process-wide sink and appends it to the
/// record's own diagnostic list, keeping the two channels in lockstep.
fn diagnose(diagnostics: &mut Vec<Error>, error: Error) {
    trace::emit_error(&error);
    diagnostics.push(error);
}

/// Parses one record from the front of `input`, which is assumed to already
/// be positioned just past the block header.
///
/// Never fails outright (`spec.md` §7: no error crosses the public
/// boundary); instead returns a record with `format_ok = false` and however
/// many bytes were consumed before the failure, so the block parser can
/// still account for the bytes and continue with whatever remains.
pub fn parse_record(category: &Category, input: &[u8]) -> (DataRecord, usize) {
    let mut diagnostics = Vec::new();

    let (presence, fspec_len) = match read_fspec_like(input) {
        Ok(ok) => ok,
        Err(e) => {
            diagnose(&mut diagnostics, e);
            return (DataRecord::failed(category.id, diagnostics), 0);
        }
    };

    let after_fspec = &input[fspec_len..];
    // spec.md §9 Open Questions: the UAP selector predicate is documented as
    // applying to the byte immediately following the FSPEC's terminator, one
    // byte further in than the first item byte itself. We skip that one byte
    // only for predicate evaluation; item decoding still starts right after
    // the FSPEC.
    let predicate_view = if after_fspec.is_empty() { after_fspec } else { &after_fspec[1..] };

    let uap = match category.resolve_uap(predicate_view) {
        Some(uap) => uap,
        None => {
            diagnose(&mut diagnostics, Error::UnknownUap);
            return (DataRecord::failed(category.id, diagnostics), fspec_len);
        }
    };

    let mut cursor = after_fspec;
    let mut consumed = fspec_len;
    let mut items = Vec::new();
    let mut spare_slots = Vec::new();
    let mut ok = true;

    for (slot_index, present) in presence.iter().enumerate() {
        if !*present {
            continue;
        }
        let slot_number = slot_index + 1;

        if uap.is_spare_at(slot_number) {
            spare_slots.push(slot_number);
            continue;
        }

        let item_id = match uap.item_id_at(slot_number) {
            Some(id) => id,
            None => {
                diagnose(&mut diagnostics, Error::UnknownItem);
                ok = false;
                break;
            }
        };

        let description = match category.item(item_id) {
            Some(description) => description,
            None => {
                diagnose(&mut diagnostics, Error::InternalSchemaError);
                ok = false;
                break;
            }
        };

        match description.format.decode(cursor) {
            Ok((value, len)) => {
                items.push((item_id.to_string(), value));
                cursor = &cursor[len..];
                consumed += len;
            }
            Err(e) => {
                diagnose(&mut diagnostics, e);
                ok = false;
                break;
            }
        }
    }

    if ok {
        for (slot_index, slot) in uap.slots.iter().enumerate() {
            if let UapSlot::Item(id) = slot {
                if category.item(id).map(|d| d.rule == Rule::Mandatory).unwrap_or(false)
                    && !presence.get(slot_index).copied().unwrap_or(false)
                {
                    ok = false;
                }
            }
        }
    }

    (
        DataRecord {
            category_ref: category.id,
            uap_name: uap.name.clone(),
            items,
            spare_slots,
            format_ok: ok,
            diagnostics,
        },
        consumed,
    )
}
