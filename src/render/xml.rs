//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # XML rendering: an element tree (`spec.md` §4.5).
//!
//! Composite nodes open and close elements through a `quick_xml::Writer`;
//! `quick_xml` owns nesting and escaping, so this module only ever decides
//! *which* element to open, never how to serialize one.

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::decode::{DataBlock, DataRecord};
use crate::render::category_header_visible;
use crate::schema::{Category, DecodedValue, DefinitionStore, Leaf, LeafData};

pub(crate) fn render_block(block: &DataBlock, store: &DefinitionStore) -> String {
    let category = store.category(block.category_ref);
    if !category_header_visible(block, category) {
        return String::new();
    }

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let category_attr = block.category_ref.to_string();
    let format_ok_attr = block.format_ok.to_string();
    let mut root = BytesStart::new("data_block");
    root.push_attribute(("category", category_attr.as_str()));
    root.push_attribute(("format_ok", format_ok_attr.as_str()));
    let _ = writer.write_event(Event::Start(root));

    for record in &block.records {
        render_record(&mut writer, record, category);
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("data_block")));

    String::from_utf8(writer.into_inner().into_inner()).unwrap_or_default()
}

fn render_record(writer: &mut Writer<Cursor<Vec<u8>>>, record: &DataRecord, category: Option<&Category>) {
    let format_ok_attr = record.format_ok.to_string();
    let mut element = BytesStart::new("record");
    element.push_attribute(("uap", record.uap_name.as_str()));
    element.push_attribute(("format_ok", format_ok_attr.as_str()));
    let _ = writer.write_event(Event::Start(element));

    for (item_id, value) in &record.items {
        let mut item_element = BytesStart::new("item");
        item_element.push_attribute(("id", item_id.as_str()));
        let _ = writer.write_event(Event::Start(item_element));
        render_value(writer, value, item_id, category);
        let _ = writer.write_event(Event::End(BytesEnd::new("item")));
    }

    let _ = writer.write_event(Event::End(BytesEnd::new("record")));
}

fn render_value(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    value: &DecodedValue,
    item_id: &str,
    category: Option<&Category>,
) {
    match value {
        DecodedValue::Leaves(leaves) => render_leaves(writer, leaves, item_id, category),
        DecodedValue::Parts(parts) => {
            for part in parts {
                render_leaves(writer, part, item_id, category);
            }
        }
        DecodedValue::Sequence(items) => {
            for item in items {
                let _ = writer.write_event(Event::Start(BytesStart::new("entry")));
                render_value(writer, item, item_id, category);
                let _ = writer.write_event(Event::End(BytesEnd::new("entry")));
            }
        }
        DecodedValue::Compound(children) => {
            for (name, child) in children {
                let _ = writer.write_event(Event::Start(BytesStart::new(name.as_str())));
                render_value(writer, child, item_id, category);
                let _ = writer.write_event(Event::End(BytesEnd::new(name.as_str())));
            }
        }
        DecodedValue::Explicit(inner) => render_value(writer, inner, item_id, category),
        DecodedValue::Bds { register, value } => {
            let _ = writer.write_event(Event::Start(BytesStart::new(register.as_str())));
            render_value(writer, value, item_id, category);
            let _ = writer.write_event(Event::End(BytesEnd::new(register.as_str())));
        }
    }
}

fn render_leaves(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    leaves: &[Leaf],
    item_id: &str,
    category: Option<&Category>,
) {
    for leaf in leaves {
        if let Some(category) = category {
            if !category.filter_accept(item_id, &leaf.field_name) {
                continue;
            }
        }

        let mut element = BytesStart::new(leaf.field_name.as_str());
        if let Some(unit) = &leaf.unit {
            element.push_attribute(("unit", unit.as_str()));
        }
        let _ = writer.write_event(Event::Start(element));
        let _ = writer.write_event(Event::Text(BytesText::new(&format_value(leaf))));
        let _ = writer.write_event(Event::End(BytesEnd::new(leaf.field_name.as_str())));
    }
}

fn format_value(leaf: &Leaf) -> String {
    match &leaf.data {
        LeafData::Integer(value) => value.to_string(),
        LeafData::Real(value) => format!("{:.6}", value),
        LeafData::Text(value) => value.clone(),
        LeafData::Enum { raw, label } => label.clone().unwrap_or_else(|| raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_block;
    use crate::schema::{BitField, DataItemDescription, Encoding, FixedSpec, FormatNode, UapSlot};

    fn store_with_single_item() -> DefinitionStore {
        let mut store = DefinitionStore::new();
        let category = store.add_category(1);
        let mut item = DataItemDescription::new(
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
    fn leaf_renders_as_a_named_element_with_text_content() {
        let store = store_with_single_item();
        let block = parse_block(&store, &[0x01, 0x00, 0x06, 0x80, 0x12, 0x34], 0.0);
        let rendered = render_block(&block, &store);
        assert!(rendered.contains("<VAL>4660</VAL>"));
        assert!(rendered.contains("<item id=\"010\">"));
    }
}
