//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # TEXT rendering: one line per leaf (`spec.md` §4.5).

use std::fmt::Write as _;

use crate::decode::{DataBlock, DataRecord};
use crate::render::category_header_visible;
use crate::schema::{Category, DecodedValue, DefinitionStore, Leaf, LeafData};

pub(crate) fn render_block(block: &DataBlock, store: &DefinitionStore) -> String {
    let category = store.category(block.category_ref);
    if !category_header_visible(block, category) {
        return String::new();
    }

    let mut out = String::new();
    for record in &block.records {
        render_record(record, block.category_ref, category, &mut out);
    }
    out
}

fn render_record(record: &DataRecord, cat_id: u8, category: Option<&Category>, out: &mut String) {
    for (item_id, value) in &record.items {
        let header = format!("CAT{:03}:I{}", cat_id, item_id);
        render_value(value, item_id, category, &header, out);
    }
}

fn render_value(
    value: &DecodedValue,
    item_id: &str,
    category: Option<&Category>,
    header: &str,
    out: &mut String,
) {
    match value {
        DecodedValue::Leaves(leaves) => render_leaves(leaves, item_id, category, header, out),
        DecodedValue::Parts(parts) => {
            for part in parts {
                render_leaves(part, item_id, category, header, out);
            }
        }
        DecodedValue::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                let sub_header = format!("{}[{}]", header, index);
                render_value(item, item_id, category, &sub_header, out);
            }
        }
        DecodedValue::Compound(children) => {
            for (name, child) in children {
                let sub_header = format!("{}:{}", header, name);
                render_value(child, item_id, category, &sub_header, out);
            }
        }
        DecodedValue::Explicit(inner) => render_value(inner, item_id, category, header, out),
        DecodedValue::Bds { register, value } => {
            let sub_header = format!("{}:{}", header, register);
            render_value(value, item_id, category, &sub_header, out);
        }
    }
}

fn render_leaves(
    leaves: &[Leaf],
    item_id: &str,
    category: Option<&Category>,
    header: &str,
    out: &mut String,
) {
    for leaf in leaves {
        if let Some(category) = category {
            if !category.filter_accept(item_id, &leaf.field_name) {
                continue;
            }
        }
        let _ = writeln!(out, "{}:{} = {}", header, leaf.field_name, format_value(leaf));
    }
}

fn format_value(leaf: &Leaf) -> String {
    let rendered = match &leaf.data {
        LeafData::Integer(value) => value.to_string(),
        LeafData::Real(value) => format!("{:.6}", value),
        LeafData::Text(value) => value.clone(),
        LeafData::Enum { raw, label } => label.clone().unwrap_or_else(|| raw.to_string()),
    };
    match &leaf.unit {
        Some(unit) => format!("{} {}", rendered, unit),
        None => rendered,
    }
}
