//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # JSON rendering: an object tree (`spec.md` §4.5).
//!
//! Composite nodes build a `serde_json::Map`/`Value` tree; `serde_json`
//! itself owns comma and brace placement once that tree is serialized, so
//! this module never formats JSON punctuation by hand.

use serde_json::{json, Map, Value};

use crate::decode::{DataBlock, DataRecord};
use crate::render::category_header_visible;
use crate::schema::{Category, DecodedValue, DefinitionStore, Leaf, LeafData};

pub(crate) fn render_block(block: &DataBlock, store: &DefinitionStore) -> String {
    let category = store.category(block.category_ref);
    if !category_header_visible(block, category) {
        return String::new();
    }

    let records: Vec<Value> = block
        .records
        .iter()
        .map(|record| record_to_json(record, category))
        .collect();

    let root = json!({
        "category": block.category_ref,
        "length": block.length,
        "timestamp": block.timestamp,
        "format_ok": block.format_ok,
        "records": records,
    });

    serde_json::to_string_pretty(&root).unwrap_or_default()
}

fn record_to_json(record: &DataRecord, category: Option<&Category>) -> Value {
    let mut items = Map::new();
    for (item_id, value) in &record.items {
        items.insert(item_id.clone(), value_to_json(value, item_id, category));
    }

    json!({
        "uap": record.uap_name,
        "format_ok": record.format_ok,
        "spare_slots": record.spare_slots,
        "items": items,
    })
}

fn value_to_json(value: &DecodedValue, item_id: &str, category: Option<&Category>) -> Value {
    match value {
        DecodedValue::Leaves(leaves) => leaves_to_json(leaves, item_id, category),
        DecodedValue::Parts(parts) => Value::Array(
            parts.iter().map(|part| leaves_to_json(part, item_id, category)).collect(),
        ),
        DecodedValue::Sequence(items) => Value::Array(
            items.iter().map(|item| value_to_json(item, item_id, category)).collect(),
        ),
        DecodedValue::Compound(children) => {
            let mut map = Map::new();
            for (name, child) in children {
                map.insert(name.clone(), value_to_json(child, item_id, category));
            }
            Value::Object(map)
        }
        DecodedValue::Explicit(inner) => value_to_json(inner, item_id, category),
        DecodedValue::Bds { register, value } => {
            let mut map = Map::new();
            map.insert(register.clone(), value_to_json(value, item_id, category));
            Value::Object(map)
        }
    }
}

fn leaves_to_json(leaves: &[Leaf], item_id: &str, category: Option<&Category>) -> Value {
    let mut map = Map::new();
    for leaf in leaves {
        if let Some(category) = category {
            if !category.filter_accept(item_id, &leaf.field_name) {
                continue;
            }
        }
        map.insert(leaf.field_name.clone(), leaf_to_json(leaf));
    }
    Value::Object(map)
}

fn leaf_to_json(leaf: &Leaf) -> Value {
    let value = match &leaf.data {
        LeafData::Integer(value) => json!(value),
        LeafData::Real(value) => json!(value),
        LeafData::Text(value) => json!(value),
        LeafData::Enum { raw, label } => match label {
            Some(label) => json!(label),
            None => json!(raw),
        },
    };
    match &leaf.unit {
        Some(unit) => json!({ "value": value, "unit": unit }),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_block;
    use crate::schema::{BitField, DataItemDescription, Encoding, FixedSpec, FormatNode, UapSlot};

    fn store_with_scaled_item() -> DefinitionStore {
        let mut store = DefinitionStore::new();
        let category = store.add_category(48);
        let mut item = DataItemDescription::new(
            "040",
            FormatNode::Fixed(FixedSpec::new(
                2,
                vec![BitField::new("RHO", "range", 0, 15, Encoding::Unsigned)
                    .with_scale(0.25)
                    .with_unit("NM")],
            )),
        );
        item.set_name("Measured Position");
        category.add_item(item);
        let uap = category.new_uap("default");
        uap.add_slot(1, UapSlot::Item("040".into()));
        for slot in 2..=8 {
            uap.add_slot(slot, UapSlot::Spare);
        }
        store
    }

    #[test]
    fn scaled_leaf_carries_its_unit_alongside_the_value() {
        let store = store_with_scaled_item();
        let block = parse_block(&store, &[48, 0x00, 0x06, 0x80, 0x00, 0x04], 0.0);
        let rendered = render_block(&block, &store);
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        let rho = &parsed["records"][0]["items"]["040"]["RHO"];
        assert_eq!(rho["value"], 1.0);
        assert_eq!(rho["unit"], "NM");
    }
}
