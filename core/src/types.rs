//! Query parameter domains for the Zotero API.
//!
//! # Design
//! The builder takes sort fields and directions as strings so callers can
//! pass user input straight through; these enums are the closed sets those
//! strings are checked against. `NumericArg` lets `limit`/`start` accept
//! either integers or numeric strings while still rejecting garbage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Field by which listings are sorted (`sort=` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    DateAdded,
    DateModified,
    Title,
    Creator,
    Type,
    Date,
    Publisher,
    PublicationTitle,
    JournalAbbreviation,
    Language,
    AccessDate,
    LibraryCatalog,
    CallNumber,
    Rights,
    AddedBy,
    NumItems,
}

impl SortField {
    pub const ALL: [SortField; 16] = [
        SortField::DateAdded,
        SortField::DateModified,
        SortField::Title,
        SortField::Creator,
        SortField::Type,
        SortField::Date,
        SortField::Publisher,
        SortField::PublicationTitle,
        SortField::JournalAbbreviation,
        SortField::Language,
        SortField::AccessDate,
        SortField::LibraryCatalog,
        SortField::CallNumber,
        SortField::Rights,
        SortField::AddedBy,
        SortField::NumItems,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::DateAdded => "dateAdded",
            SortField::DateModified => "dateModified",
            SortField::Title => "title",
            SortField::Creator => "creator",
            SortField::Type => "type",
            SortField::Date => "date",
            SortField::Publisher => "publisher",
            SortField::PublicationTitle => "publicationTitle",
            SortField::JournalAbbreviation => "journalAbbreviation",
            SortField::Language => "language",
            SortField::AccessDate => "accessDate",
            SortField::LibraryCatalog => "libraryCatalog",
            SortField::CallNumber => "callNumber",
            SortField::Rights => "rights",
            SortField::AddedBy => "addedBy",
            SortField::NumItems => "numItems",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sorting direction (`direction=` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value accepted by the numeric query parameters.
///
/// Integers always qualify. Strings must be numeric strings: optional
/// surrounding whitespace, an optional sign, digits with an optional
/// fraction, and an optional exponent (`"20"`, `"2.5"`, `" 5"`, `"1e2"`).
/// The trimmed text is what goes into the query string.
pub trait NumericArg {
    /// The numeric value and its query-string text.
    fn to_numeric(&self) -> Option<(f64, String)>;
}

macro_rules! numeric_arg_for_ints {
    ($($t:ty),*) => {
        $(
            impl NumericArg for $t {
                fn to_numeric(&self) -> Option<(f64, String)> {
                    Some((*self as f64, self.to_string()))
                }
            }
        )*
    };
}

numeric_arg_for_ints!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl NumericArg for &str {
    fn to_numeric(&self) -> Option<(f64, String)> {
        let text = self.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
        let shape_ok = text
            .bytes()
            .all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b));
        if text.is_empty() || !shape_ok {
            return None;
        }
        let value: f64 = text.parse().ok()?;
        value.is_finite().then(|| (value, text.to_string()))
    }
}

impl NumericArg for String {
    fn to_numeric(&self) -> Option<(f64, String)> {
        self.as_str().to_numeric()
    }
}
