//
// Copyright 2024 asterix Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

use std;
use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, Error>;

/// Decoding error taxonomy.
///
/// Leaf parse errors abort the current record only; the block parser and the
/// record parser never propagate these across the public API. Callers drive
/// decoding through [`crate::decode::parse_block`] and inspect `format_ok` on
/// the returned [`crate::decode::DataBlock`] and its records instead. These
/// variants exist so that internal plumbing has a single error currency and
/// so that the tracer has something uniform to format.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The block header declares a length inconsistent with the available bytes.
    MalformedBlock,
    /// No category definition is loaded for the id named in the block header.
    UnknownCategory,
    /// No UAP predicate in the category matched the record.
    UnknownUap,
    /// A FSPEC bit references a UAP slot with no corresponding item description.
    UnknownItem,
    /// A format node needed more bytes than remained in the record.
    Truncated,
    /// A declared length (repetition count, explicit length) exceeds the container.
    Overflow,
    /// A leaf value had no entry in its enumeration table (non-fatal).
    EnumMiss,
    /// An item id appears in a UAP slot but its format node is missing from the schema.
    InternalSchemaError,
}

impl Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MalformedBlock =>
                formatter.write_str("block header length disagrees with available bytes"),
            Error::UnknownCategory =>
                formatter.write_str("no definition loaded for category"),
            Error::UnknownUap =>
                formatter.write_str("no UAP predicate matched the record"),
            Error::UnknownItem =>
                formatter.write_str("FSPEC references an undefined UAP slot"),
            Error::Truncated =>
                formatter.write_str("item needs more bytes than remain in the record"),
            Error::Overflow =>
                formatter.write_str("declared length exceeds the containing buffer"),
            Error::EnumMiss =>
                formatter.write_str("leaf value absent from enumeration table"),
            Error::InternalSchemaError =>
                formatter.write_str("item id present but its format node is missing"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for errors the tracer should never emit a line for (see `spec.md` §7).
    pub fn is_silent(&self) -> bool {
        matches!(self, Error::EnumMiss)
    }
}
