//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Renderer dispatch (`spec.md` §4.5).
//!
//! A decoded [`crate::DataBlock`] is schema-shaped, not wire-shaped: its
//! leaves already carry the scaled value, unit and (if any) enumerated
//! label the schema described. Rendering walks that tree once per
//! [`RenderFormat`] and never looks at the original bytes again.
//!
//! Every node kind in [`crate::schema::DecodedValue`] knows how to emit
//! itself; the three submodules here ([`text`], [`json`], [`xml`]) each
//! implement the full recursive walk for one format, so a leaf only ever
//! branches on format to pick its syntactic wrapper (quoted string vs. XML
//! text node vs. a line of text), never to decide whether it should recurse
//! (`spec.md` §9 Design Notes).

mod json;
mod text;
mod xml;

use crate::decode::DataBlock;
use crate::schema::{Category, DecodedValue, DefinitionStore};

/// Whether `value` has at least one leaf that survives `category`'s filters
/// (`spec.md` §4.7). Recurses through every composite node kind so a
/// `Compound`/`Sequence`/`Explicit`/`Bds` wrapper around entirely-filtered
/// leaves counts as invisible too.
fn value_is_visible(value: &DecodedValue, item_id: &str, category: &Category) -> bool {
    match value {
        DecodedValue::Leaves(leaves) => {
            leaves.iter().any(|leaf| category.filter_accept(item_id, &leaf.field_name))
        }
        DecodedValue::Parts(parts) => parts
            .iter()
            .any(|part| part.iter().any(|leaf| category.filter_accept(item_id, &leaf.field_name))),
        DecodedValue::Sequence(items) => items.iter().any(|item| value_is_visible(item, item_id, category)),
        DecodedValue::Compound(children) => {
            children.iter().any(|(_, child)| value_is_visible(child, item_id, category))
        }
        DecodedValue::Explicit(inner) => value_is_visible(inner, item_id, category),
        DecodedValue::Bds { value, .. } => value_is_visible(value, item_id, category),
    }
}

/// Whether a block should render its header/wrapper at all.
///
/// `spec.md` §4.7's invariant is that at least one item of a filtered
/// category normally remains renderable; when filtering has instead removed
/// every leaf in the block, the category-wide `filtered` flag is what
/// decides whether the header still prints (`spec.md` §4.7: "otherwise
/// set-category-filtered flag controls whether the header prints"). A
/// category with no filters set, or one that still has something visible,
/// always renders normally.
pub(crate) fn category_header_visible(block: &DataBlock, category: Option<&Category>) -> bool {
    let category = match category {
        Some(category) if category.is_filtered() => category,
        _ => return true,
    };

    block
        .records
        .iter()
        .flat_map(|record| record.items.iter())
        .any(|(item_id, value)| value_is_visible(value, item_id, category))
}

/// Output kinds a [`Renderer`] can produce, stable across versions
/// (`spec.md` §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderFormat {
    Text,
    Json,
    Xml,
}

/// Threads a format selector through the format tree (`spec.md` §4.5).
///
/// Rendering is append-only and produces a single owned `String`; callers
/// that want to render the same block in multiple formats construct one
/// `Renderer` per format and call [`Renderer::render`] again — nothing here
/// is mutated by rendering itself, so repeated calls are side-effect free.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    format: RenderFormat,
}

impl Renderer {
    pub fn new(format: RenderFormat) -> Self {
        Renderer { format }
    }

    pub fn format(&self) -> RenderFormat {
        self.format
    }

    /// Renders one decoded block against the schema it was decoded under.
    ///
    /// `store` is only consulted for its [`crate::schema::Category::filter_accept`]
    /// state (`spec.md` §4.7) — the block and its records already carry every
    /// decoded value they need.
    pub fn render(&self, block: &DataBlock, store: &DefinitionStore) -> String {
        match self.format {
            RenderFormat::Text => text::render_block(block, store),
            RenderFormat::Json => json::render_block(block, store),
            RenderFormat::Xml => xml::render_block(block, store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_block;
    use crate::schema::{BitField, Encoding, FixedSpec, FormatNode, UapSlot};

    fn store_with_single_item() -> DefinitionStore {
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
    fn each_format_renders_the_decoded_value() {
        let store = store_with_single_item();
        let block = parse_block(&store, &[0x01, 0x00, 0x06, 0x80, 0x12, 0x34], 0.0);

        let text = Renderer::new(RenderFormat::Text).render(&block, &store);
        assert!(text.contains("CAT001:I010:VAL = 4660"));

        let json = Renderer::new(RenderFormat::Json).render(&block, &store);
        assert!(json.contains("4660"));

        let xml = Renderer::new(RenderFormat::Xml).render(&block, &store);
        assert!(xml.contains("4660"));
    }

    #[test]
    fn filtering_every_leaf_of_a_category_suppresses_the_header_in_every_format() {
        let mut store = store_with_single_item();
        store.add_category(1).filter_out_item("010", "VAL");
        let block = parse_block(&store, &[0x01, 0x00, 0x06, 0x80, 0x12, 0x34], 0.0);

        assert!(Renderer::new(RenderFormat::Text).render(&block, &store).is_empty());
        assert!(Renderer::new(RenderFormat::Json).render(&block, &store).is_empty());
        assert!(Renderer::new(RenderFormat::Xml).render(&block, &store).is_empty());
    }

    #[test]
    fn filtering_only_some_leaves_still_renders_the_header() {
        let mut store = DefinitionStore::new();
        let category = store.add_category(62);
        let mut item = crate::schema::DataItemDescription::new(
            "010",
            FormatNode::Fixed(FixedSpec::new(
                2,
                vec![
                    BitField::new("SAC", "system area code", 0, 7, Encoding::Unsigned),
                    BitField::new("SIC", "system identification code", 8, 15, Encoding::Unsigned),
                ],
            )),
        );
        item.set_name("Data Source Identifier");
        category.add_item(item);
        category.filter_out_item("010", "SAC");
        let uap = category.new_uap("default");
        uap.add_slot(1, UapSlot::Item("010".into()));
        for slot in 2..=8 {
            uap.add_slot(slot, UapSlot::Spare);
        }

        let block = parse_block(&store, &[62, 0x00, 0x06, 0x80, 0x01, 0x02], 0.0);
        assert!(!Renderer::new(RenderFormat::Json).render(&block, &store).is_empty());
        assert!(Renderer::new(RenderFormat::Text).render(&block, &store).contains("SIC"));
    }
}
