#![forbid(unsafe_code)]

//! Sort state and the column catalogue.

use std::cmp::Ordering;
use std::fmt;

use roster_core::Record;

/// Field a view can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Score,
    Email,
    LastMessageAt,
    AddedBy,
}

impl SortKey {
    /// All sortable keys in header order.
    pub const ALL: [SortKey; 5] = [
        SortKey::Name,
        SortKey::Score,
        SortKey::Email,
        SortKey::LastMessageAt,
        SortKey::AddedBy,
    ];

    /// Natural ascending order of two records on this field.
    #[must_use]
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Self::Name => a.name.cmp(&b.name),
            Self::Score => a.score.cmp(&b.score),
            Self::Email => a.email.cmp(&b.email),
            Self::LastMessageAt => a.last_message_at.cmp(&b.last_message_at),
            Self::AddedBy => a.added_by.cmp(&b.added_by),
        }
    }

    /// Stable string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Score => "score",
            Self::Email => "email",
            Self::LastMessageAt => "lastMessageAt",
            Self::AddedBy => "addedBy",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

/// Current sort key and direction.
///
/// The view is only ordered when `key` is set. With a key set, every
/// direction other than [`SortDirection::Ascending`] orders descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl SortState {
    /// Unsorted: records keep source order.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self {
            key: None,
            direction: SortDirection::None,
        }
    }

    #[must_use]
    pub const fn ascending(key: SortKey) -> Self {
        Self {
            key: Some(key),
            direction: SortDirection::Ascending,
        }
    }

    #[must_use]
    pub const fn descending(key: SortKey) -> Self {
        Self {
            key: Some(key),
            direction: SortDirection::Descending,
        }
    }

    /// State after the header for `key` is activated.
    ///
    /// The column already sorted ascending flips to descending; anything
    /// else sorts `key` ascending.
    #[must_use]
    pub fn toggled(self, key: SortKey) -> Self {
        if self.key == Some(key) && self.direction == SortDirection::Ascending {
            Self::descending(key)
        } else {
            Self::ascending(key)
        }
    }

    /// Ordering of two records under this state, or `None` when unsorted.
    #[must_use]
    pub fn compare(self, a: &Record, b: &Record) -> Option<Ordering> {
        let key = self.key?;
        let ord = key.compare(a, b);
        Some(if self.direction == SortDirection::Ascending {
            ord
        } else {
            ord.reverse()
        })
    }

    /// Header suffix for `key`: ` ▲`, ` ▼`, or nothing.
    #[must_use]
    pub fn indicator(self, key: SortKey) -> &'static str {
        if self.key != Some(key) {
            return "";
        }
        match self.direction {
            SortDirection::Ascending => " ▲",
            _ => " ▼",
        }
    }
}

/// Table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Row selection checkbox.
    Select,
    /// Avatar, name and phone.
    Customer,
    Score,
    Email,
    LastMessageAt,
    AddedBy,
}

impl Column {
    /// All columns in display order.
    pub const ALL: [Column; 6] = [
        Column::Select,
        Column::Customer,
        Column::Score,
        Column::Email,
        Column::LastMessageAt,
        Column::AddedBy,
    ];

    /// Header label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Select => "",
            Self::Customer => "Customer",
            Self::Score => "Score",
            Self::Email => "Email",
            Self::LastMessageAt => "Last message sent at",
            Self::AddedBy => "Added by",
        }
    }

    /// Key this column sorts by when its header is activated.
    #[must_use]
    pub const fn sort_key(self) -> Option<SortKey> {
        match self {
            Self::Select => None,
            Self::Customer => Some(SortKey::Name),
            Self::Score => Some(SortKey::Score),
            Self::Email => Some(SortKey::Email),
            Self::LastMessageAt => Some(SortKey::LastMessageAt),
            Self::AddedBy => Some(SortKey::AddedBy),
        }
    }

    /// Header label with the sort indicator appended.
    #[must_use]
    pub fn header(self, sort: SortState) -> String {
        match self.sort_key() {
            Some(key) => format!("{}{}", self.title(), sort.indicator(key)),
            None => self.title().to_string(),
        }
    }

    /// Cell text for `record`.
    #[must_use]
    pub fn cell(self, record: &Record) -> String {
        match self {
            Self::Select => String::new(),
            Self::Customer => format!("{}\n{}", record.name, record.phone),
            Self::Score => record.score.to_string(),
            Self::Email => record.email.clone(),
            Self::LastMessageAt => record.last_message_date(),
            Self::AddedBy => record.added_by.clone(),
        }
    }
}
