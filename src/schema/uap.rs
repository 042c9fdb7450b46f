//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # User Application Profiles.
//!
//! A UAP maps FSPEC bit positions onto data item ids (or spare slots) and may
//! carry a selector predicate used to pick among several UAP variants for the
//! same category.

/// One slot in a UAP's ordered item list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UapSlot {
    /// References the data item with this canonical id (e.g. `"010"`).
    Item(String),
    /// A reserved FSPEC bit with no associated data item.
    Spare,
}

/// Selects among multiple UAPs for the same category. At most one kind is
/// active per UAP.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// Bit `bit` (1-based, MSB-first) of the first payload byte after FSPEC is set.
    UseIfBitSet { bit: u32 },
    /// The byte at offset `byte_nr` (after FSPEC) equals `is_set_to`.
    UseIfByteNr { byte_nr: usize, is_set_to: u8 },
}

/// A User Application Profile: an ordered list of FSPEC slots plus an
/// optional selector predicate.
#[derive(Clone, Debug, PartialEq)]
pub struct Uap {
    pub name: String,
    pub slots: Vec<UapSlot>,
    pub selector: Option<Selector>,
}

impl Uap {
    /// Creates an empty UAP with no selector (matches, by default, any traffic).
    pub fn new(name: impl Into<String>) -> Self {
        Uap {
            name: name.into(),
            slots: Vec::new(),
            selector: None,
        }
    }

    /// Appends a slot at the next FSPEC bit position (definition order).
    ///
    /// Slots are positional, so `bit_index` is taken to be
    /// `self.slots.len() + 1` and is asserted against to catch loader bugs
    /// early rather than silently reordering the profile.
    pub fn add_slot(&mut self, bit_index: usize, slot: UapSlot) {
        assert_eq!(
            bit_index,
            self.slots.len() + 1,
            "UAP slots must be added in ascending, contiguous bit order"
        );
        self.slots.push(slot);
    }

    /// Installs the "bit set" selector predicate.
    pub fn set_predicate_bit(&mut self, bit: u32) {
        self.selector = Some(Selector::UseIfBitSet { bit });
    }

    /// Installs the "byte equals" selector predicate.
    pub fn set_predicate_byte(&mut self, byte_nr: usize, is_set_to: u8) {
        self.selector = Some(Selector::UseIfByteNr { byte_nr, is_set_to });
    }

    /// Resolves the item id, if any, referenced by FSPEC slot `index` (1-based).
    pub fn item_id_at(&self, index: usize) -> Option<&str> {
        match self.slots.get(index - 1) {
            Some(UapSlot::Item(id)) => Some(id.as_str()),
            _ => None,
        }
    }

    /// True if FSPEC slot `index` (1-based) is a spare bit.
    pub fn is_spare_at(&self, index: usize) -> bool {
        matches!(self.slots.get(index - 1), Some(UapSlot::Spare))
    }

    /// Evaluates the selector predicate against the payload bytes that follow
    /// the FSPEC (i.e. already positioned past the continuation chain). A UAP
    /// with no selector always matches.
    ///
    /// The extra byte of skip beyond the FSPEC terminator, whose purpose is
    /// not documented upstream (see DESIGN.md), is applied by the caller
    /// before this is invoked; this method only applies the predicate's own
    /// byte/bit offset.
    pub fn matches(&self, payload_after_fspec: &[u8]) -> bool {
        match &self.selector {
            None => true,
            Some(Selector::UseIfBitSet { bit }) => {
                let byte_offset = ((*bit - 1) / 8) as usize;
                let mask = 1u8 << (7 - ((*bit - 1) % 8));
                payload_after_fspec
                    .get(byte_offset)
                    .map(|b| b & mask != 0)
                    .unwrap_or(false)
            }
            Some(Selector::UseIfByteNr { byte_nr, is_set_to }) => payload_after_fspec
                .get(*byte_nr)
                .map(|b| *b == *is_set_to)
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_set_predicate_matches_msb_first() {
        let mut uap = Uap::new("variant-a");
        uap.set_predicate_bit(1);
        // Bit 1 is the MSB of byte 0.
        assert!(uap.matches(&[0b1000_0000]));
        assert!(!uap.matches(&[0b0111_1111]));
    }

    #[test]
    fn bit_set_predicate_second_byte() {
        let mut uap = Uap::new("variant-b");
        uap.set_predicate_bit(9);
        assert!(uap.matches(&[0x00, 0b1000_0000]));
        assert!(!uap.matches(&[0xFF, 0b0111_1111]));
    }

    #[test]
    fn byte_nr_predicate_matches_exact_value() {
        let mut uap = Uap::new("variant-c");
        uap.set_predicate_byte(2, 0x07);
        assert!(uap.matches(&[0x00, 0x00, 0x07]));
        assert!(!uap.matches(&[0x00, 0x00, 0x08]));
    }

    #[test]
    fn no_selector_always_matches() {
        let uap = Uap::new("default");
        assert!(uap.matches(&[]));
    }

    #[test]
    fn slot_lookup_distinguishes_spare_and_item() {
        let mut uap = Uap::new("cat048");
        uap.add_slot(1, UapSlot::Item("010".into()));
        uap.add_slot(2, UapSlot::Spare);
        assert_eq!(uap.item_id_at(1), Some("010"));
        assert_eq!(uap.item_id_at(2), None);
        assert!(uap.is_spare_at(2));
        assert!(!uap.is_spare_at(1));
    }
}
