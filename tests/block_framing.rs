//! Block-level framing scenarios: zero-record blocks, a clean single record,
//! and a truncated trailing record that must not poison an already-decoded
//! one. Schemas are built directly against the fluent loader surface rather
//! than loaded from an XML definitions file, since no such loader ships with
//! this crate.

use asterix::schema::{BitField, DataItemDescription, DefinitionStore, Encoding, FixedSpec, FormatNode, UapSlot};
use asterix::{parse_block, RenderFormat, Renderer};

fn store_with_cat48_data_source_id() -> DefinitionStore {
    let mut store = DefinitionStore::new();
    let category = store.add_category(48);
    let mut item = DataItemDescription::new(
        "010",
        FormatNode::Fixed(FixedSpec::new(
            2,
            vec![BitField::new("VAL", "16-bit value", 0, 15, Encoding::Unsigned)],
        )),
    );
    item.set_name("Data Source Identifier");
    category.add_item(item);

    let uap = category.new_uap("default");
    uap.add_slot(1, UapSlot::Item("010".into()));
    for slot in 2..=8 {
        uap.add_slot(slot, UapSlot::Spare);
    }
    store
}

#[test]
fn zero_record_block_is_format_ok_with_no_records() {
    let store = store_with_cat48_data_source_id();
    // CAT=48, LEN=4, one payload byte whose FSPEC has no bits set.
    let block = parse_block(&store, &[48, 0x00, 0x04, 0x00], 0.0);
    assert!(block.format_ok);
    assert_eq!(block.category_ref, 48);
    assert!(block.records.is_empty());
}

#[test]
fn single_clean_record_consumes_fspec_plus_item_bytes() {
    let store = store_with_cat48_data_source_id();
    // FSPEC=0x80 (slot 1 set, terminates), item bytes 0x12 0x34.
    let block = parse_block(&store, &[48, 0x00, 0x06, 0x80, 0x12, 0x34], 0.0);
    assert!(block.format_ok);
    assert_eq!(block.records.len(), 1);
    let (id, _) = &block.records[0].items[0];
    assert_eq!(id, "010");
}

#[test]
fn residual_bytes_that_cannot_form_another_record_mark_the_block_malformed_but_keep_the_first() {
    let store = store_with_cat48_data_source_id();
    // Record 1: FSPEC 0x80, item 0x12 0x34 (consumes 3 bytes cleanly).
    // Record 2 attempt: FSPEC 0x80 but only 0 bytes left for its 2-byte item.
    let block = parse_block(&store, &[48, 0x00, 0x07, 0x80, 0x12, 0x34, 0x80], 0.0);
    assert!(!block.format_ok);
    assert_eq!(block.records.len(), 2);
    assert!(block.records[0].format_ok);
    assert!(!block.records[1].format_ok);
}

#[test]
fn unknown_category_fails_the_block_and_produces_no_records() {
    let store = DefinitionStore::new();
    let block = parse_block(&store, &[0x09, 0x00, 0x04, 0xAA], 0.0);
    assert!(!block.format_ok);
    assert!(block.records.is_empty());
}

#[test]
fn rendering_an_unknown_category_block_still_produces_output_for_every_format() {
    let store = DefinitionStore::new();
    let block = parse_block(&store, &[0x09, 0x00, 0x04, 0xAA], 0.0);

    for format in [RenderFormat::Text, RenderFormat::Json, RenderFormat::Xml] {
        let rendered = Renderer::new(format).render(&block, &store);
        if format == RenderFormat::Text {
            assert!(rendered.is_empty());
        } else {
            assert!(!rendered.is_empty());
        }
    }
}
