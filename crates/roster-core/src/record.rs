#![forbid(unsafe_code)]

//! Customer record model.
//!
//! A [`Record`] is immutable once built. The [`RecordSource`](crate::source::RecordSource)
//! owns every record; everything downstream borrows `&Record`.

use std::fmt;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::avatar::AvatarRef;

/// Stable, unique record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Highest score a record may carry.
pub const MAX_SCORE: u8 = 100;

/// One customer entity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Engagement score in `0..=100`.
    pub score: u8,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub last_message_at: OffsetDateTime,
    pub added_by: String,
    #[cfg_attr(feature = "serde", serde(rename = "avatar"))]
    pub avatar: AvatarRef,
}

impl Record {
    /// Whether the row has the fields a table row needs.
    ///
    /// Records coming from a file or backend may carry an empty name; those
    /// rows render as empty instead of failing the whole list.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// `last_message_at` as a calendar date (`MM/DD/YYYY`).
    #[must_use]
    pub fn last_message_date(&self) -> String {
        let format = format_description!("[month]/[day]/[year]");
        self.last_message_at
            .format(&format)
            .unwrap_or_else(|_| String::new())
    }
}
