//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Data item descriptions.

use crate::schema::format::FormatNode;

/// Whether a data item must be present whenever its UAP slot is reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// The loader never set a rule for this item.
    ///
    /// Whether an unset rule should be treated as mandatory or optional is
    /// not specified upstream; this decoder treats it as [`Rule::Optional`]
    /// — see DESIGN.md for why.
    Unknown,
    Optional,
    Mandatory,
}

impl Default for Rule {
    fn default() -> Self {
        Rule::Unknown
    }
}

/// A single data item's schema: identity, documentation and format tree.
#[derive(Clone, Debug)]
pub struct DataItemDescription {
    /// Canonical three-character id, e.g. `"010"`.
    pub id: String,
    /// Numeric equivalent of `id`, used only by the `Bds` format kind.
    pub id_num: u32,
    pub name: String,
    pub definition: String,
    pub format_label: String,
    pub note: String,
    pub rule: Rule,
    pub format: FormatNode,
}

impl DataItemDescription {
    /// Creates a new item description with an empty/default body: an id is
    /// always present; everything else is attached afterward via the
    /// `set_*`/`attach_format` setters below.
    pub fn new(id: impl Into<String>, format: FormatNode) -> Self {
        let id = id.into();
        let id_num = u32::from_str_radix(&id, 10).unwrap_or(0);
        DataItemDescription {
            id,
            id_num,
            name: String::new(),
            definition: String::new(),
            format_label: String::new(),
            note: String::new(),
            rule: Rule::default(),
            format,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_definition(&mut self, definition: impl Into<String>) -> &mut Self {
        self.definition = definition.into();
        self
    }

    pub fn set_format_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.format_label = label.into();
        self
    }

    pub fn set_note(&mut self, note: impl Into<String>) -> &mut Self {
        self.note = note.into();
        self
    }

    pub fn set_rule(&mut self, rule: Rule) -> &mut Self {
        self.rule = rule;
        self
    }

    pub fn attach_format(&mut self, format: FormatNode) -> &mut Self {
        self.format = format;
        self
    }

    /// Numeric id parsed as hexadecimal, exposed alongside the decimal parse
    /// in `id_num` since the BDS register-selector base is not documented
    /// upstream.
    pub fn id_num_hex(&self) -> u32 {
        u32::from_str_radix(&self.id, 16).unwrap_or(0)
    }
}
