//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The schema-loader interface (`spec.md` §6).
//!
//! External schema ingestion — typically a loader reading ASTERIX XML
//! category definitions — is out of this crate's scope (`spec.md` §1), but
//! the concrete Rust surface it is written against ships here: construct a
//! [`DefinitionStore`], add [`Category`]s to it, attach [`DataItemDescription`]s
//! and [`Uap`]s, and populate each item's [`FormatNode`] tree before handing
//! the finished store to [`crate::decode::parse_block`].
//!
//! This module adds no types of its own; it re-exports the fluent builder
//! methods already defined directly on [`DefinitionStore`], [`Category`],
//! [`DataItemDescription`] and [`Uap`] in [`crate::schema`], gathered under
//! one name so a loader implementation has a single path to import against:
//!
//! ```
//! use asterix::builder::{DefinitionStore, FixedSpec, FormatNode, UapSlot};
//!
//! let mut store = DefinitionStore::new();
//! let category = store.add_category(48);
//! let item = category.add_item(asterix::builder::DataItemDescription::new(
//!     "010",
//!     FormatNode::Fixed(FixedSpec::new(2, vec![])),
//! ));
//! item.set_name("Data Source Identifier");
//!
//! let uap = category.new_uap("default");
//! uap.add_slot(1, UapSlot::Item("010".into()));
//! ```

pub use crate::schema::{
    BitField, Category, DataItemDescription, DecodedValue, DefinitionStore, Encoding, FixedSpec,
    FormatNode, Leaf, LeafData, Rule, Selector, Uap, UapSlot,
};
