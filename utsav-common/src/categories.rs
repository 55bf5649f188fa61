//! Static event category lookup table
//!
//! Categories are display metadata only. The admission logic compares the
//! bare category tag; listings and emails use the label.

/// A festival event category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCategory {
    pub id: &'static str,
    pub label: &'static str,
}

/// All known event categories (id, display label)
pub const EVENT_CATEGORIES: &[EventCategory] = &[
    EventCategory { id: "dance", label: "Dance" },
    EventCategory { id: "music", label: "Music" },
    EventCategory { id: "gaming", label: "Gaming" },
    EventCategory { id: "theatre", label: "Theatre" },
    EventCategory { id: "finearts", label: "Fine Arts" },
    EventCategory { id: "literary", label: "Literary" },
    EventCategory { id: "other", label: "Other" },
];

/// Look up the display label for a category id; unknown ids render as "Other"
pub fn category_label(id: &str) -> &'static str {
    EVENT_CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.label)
        .unwrap_or("Other")
}

/// True if the id names a known category
pub fn is_valid_category(id: &str) -> bool {
    EVENT_CATEGORIES.iter().any(|c| c.id == id)
}
