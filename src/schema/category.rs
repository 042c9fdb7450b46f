//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Categories and the definition store.
//!
//! A [`DefinitionStore`] is the schema arena: it owns every [`Category`],
//! which in turn owns its item descriptions and UAPs. The store is read-only
//! once loaded, so `&DefinitionStore` can be shared freely across decoding
//! threads.

use std::collections::{HashMap, HashSet};

use crate::schema::item::DataItemDescription;
use crate::schema::uap::Uap;

/// One ASTERIX category's schema.
#[derive(Clone, Debug, Default)]
pub struct Category {
    pub id: u8,
    items: Vec<DataItemDescription>,
    item_index: HashMap<String, usize>,
    uaps: Vec<Uap>,
    /// A category-wide toggle: true once any item/field on this category has
    /// been filtered out.
    filtered: bool,
    /// `(item_id, field_name)` pairs hidden from rendering.
    filtered_fields: HashSet<(String, String)>,
}

impl Category {
    pub fn new(id: u8) -> Self {
        Category { id, ..Default::default() }
    }

    /// Appends a new item description and returns a handle to it for the
    /// loader to continue configuring.
    ///
    /// # Panics
    ///
    /// Panics if `id` duplicates an item already present in this category —
    /// item ids are unique within a category, so a duplicate means the
    /// loader itself is broken.
    pub fn add_item(&mut self, description: DataItemDescription) -> &mut DataItemDescription {
        assert!(
            !self.item_index.contains_key(&description.id),
            "duplicate data item id {} in category {}",
            description.id,
            self.id
        );
        self.item_index.insert(description.id.clone(), self.items.len());
        self.items.push(description);
        self.items.last_mut().unwrap()
    }

    pub fn item(&self, id: &str) -> Option<&DataItemDescription> {
        self.item_index.get(id).map(|&idx| &self.items[idx])
    }

    pub fn items(&self) -> &[DataItemDescription] {
        &self.items
    }

    /// Creates and appends a new, empty UAP.
    pub fn new_uap(&mut self, name: impl Into<String>) -> &mut Uap {
        self.uaps.push(Uap::new(name));
        self.uaps.last_mut().unwrap()
    }

    pub fn uaps(&self) -> &[Uap] {
        &self.uaps
    }

    /// Resolves the active UAP for a record's payload: definition order,
    /// first predicate match wins, no-selector UAPs always match.
    pub fn resolve_uap(&self, payload_after_fspec: &[u8]) -> Option<&Uap> {
        self.uaps.iter().find(|uap| uap.matches(payload_after_fspec))
    }

    /// Marks `(item_id, field_name)` as hidden from rendering.
    pub fn filter_out_item(&mut self, item_id: impl Into<String>, field_name: impl Into<String>) {
        self.filtered = true;
        self.filtered_fields.insert((item_id.into(), field_name.into()));
    }

    /// Whether any filter has been set on this category.
    pub fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Whether the given `(item_id, field_name)` pair should render.
    pub fn filter_accept(&self, item_id: &str, field_name: &str) -> bool {
        !self.filtered_fields.contains(&(item_id.to_string(), field_name.to_string()))
    }
}

/// The schema arena: an indexed collection of [`Category`] schemas, populated
/// once at start-up by an external loader.
#[derive(Clone, Debug, Default)]
pub struct DefinitionStore {
    categories: HashMap<u8, Category>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore::default()
    }

    /// Adds (or returns the existing) category with the given id.
    pub fn add_category(&mut self, id: u8) -> &mut Category {
        self.categories.entry(id).or_insert_with(|| Category::new(id))
    }

    pub fn category(&self, id: u8) -> Option<&Category> {
        self.categories.get(&id)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
