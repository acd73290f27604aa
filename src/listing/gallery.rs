//! Gallery search, kind filter and category chips.

use std::str::FromStr;

use serde::Serialize;

use super::UnknownFilter;
use crate::models::{GalleryItem, MediaKind};

/// Most chips shown in the category bar, the "all" chip included.
pub const MAX_CATEGORY_CHIPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(MediaKind),
}

impl FromStr for KindFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(KindFilter::All),
            other => MediaKind::parse(other)
                .map(KindFilter::Only)
                .ok_or_else(|| UnknownFilter {
                    what: "kind",
                    value: other.to_string(),
                }),
        }
    }
}

/// A chip in the category bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "label", rename_all = "lowercase")]
pub enum CategoryChip {
    All,
    Category(String),
}

impl CategoryChip {
    /// The chip a client refers to by label; empty or `all` is the "all" chip.
    pub fn from_label(label: &str) -> Self {
        match label {
            "" | "all" => CategoryChip::All,
            other => CategoryChip::Category(other.to_string()),
        }
    }
}

/// Current gallery selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub search_text: String,
    pub kind: KindFilter,
}

impl GalleryFilter {
    pub fn matches(&self, item: &GalleryItem) -> bool {
        let kind_ok = match self.kind {
            KindFilter::All => true,
            KindFilter::Only(kind) => item.kind == kind,
        };
        if !kind_ok {
            return false;
        }
        if self.search_text.is_empty() {
            return true;
        }

        let needle = self.search_text.to_lowercase();
        item.caption.to_lowercase().contains(&needle)
            || item.category.to_lowercase().contains(&needle)
    }

    /// Clicking a chip sets the search text to its label; clicking the
    /// active chip again, or the "all" chip, clears it.
    pub fn select_chip(&mut self, chip: &CategoryChip) {
        match chip {
            CategoryChip::All => self.search_text.clear(),
            CategoryChip::Category(label) if self.search_text == *label => {
                self.search_text.clear()
            }
            CategoryChip::Category(label) => self.search_text = label.clone(),
        }
    }
}

/// Items passing the filter, in collection order.
pub fn filter_gallery(items: &[GalleryItem], filter: &GalleryFilter) -> Vec<GalleryItem> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// The "all" chip followed by distinct categories in first-seen order.
pub fn category_chips(items: &[GalleryItem]) -> Vec<CategoryChip> {
    let mut chips = vec![CategoryChip::All];
    for category in items.iter().map(|i| i.category.as_str()) {
        if chips.len() >= MAX_CATEGORY_CHIPS {
            break;
        }
        let chip = CategoryChip::Category(category.to_string());
        if !chips.contains(&chip) {
            chips.push(chip);
        }
    }
    chips
}
