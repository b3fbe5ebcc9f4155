//! Notices shown in place of the candidate list.

use serde::{Deserialize, Serialize};

/// Why a notice is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NoticeKind {
    /// Prompt to commit the typed value.
    AddItem,
    /// `maxItemCount` reached.
    MaxItems,
    /// Duplicate value while `duplicateItems` is off.
    NotUnique,
    /// Typed value fails `regexFilter`.
    CustomRejected,
    /// A search is active and nothing matched.
    NoResults,
    /// There is nothing left to choose from.
    NoChoices,
}

/// A human-readable message surfaced in the candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Notice category.
    pub kind: NoticeKind,
    /// Rendered text.
    pub text: String,
}

impl Notice {
    /// Create a notice.
    pub fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whether this notice reports a refused addition.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.kind,
            NoticeKind::MaxItems | NoticeKind::NotUnique | NoticeKind::CustomRejected
        )
    }
}

/// Notice templates. `{value}` and `{max}` are substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoticeTexts {
    /// Prompt shown while typing a new value.
    pub add_item_text: String,
    /// Shown when `maxItemCount` is reached.
    pub max_item_text: String,
    /// Shown for refused duplicates.
    pub unique_item_text: String,
    /// Shown when `regexFilter` refuses the value.
    pub custom_add_item_text: String,
    /// Shown when a search matched nothing.
    pub no_results_text: String,
    /// Shown when no choices are left.
    pub no_choices_text: String,
}

impl Default for NoticeTexts {
    fn default() -> Self {
        Self {
            add_item_text: "Press Enter to add \"{value}\"".to_string(),
            max_item_text: "Only {max} values can be added.".to_string(),
            unique_item_text: "Only unique values can be added.".to_string(),
            custom_add_item_text: "Only values matching specific conditions can be added."
                .to_string(),
            no_results_text: "No results found".to_string(),
            no_choices_text: "No choices to choose from".to_string(),
        }
    }
}

impl NoticeTexts {
    /// "Press Enter to add" prompt for `value`.
    pub fn add_item(&self, value: &str) -> Notice {
        Notice::new(
            NoticeKind::AddItem,
            self.add_item_text.replace("{value}", value),
        )
    }

    /// Limit notice for `max` items.
    pub fn max_items(&self, max: usize) -> Notice {
        Notice::new(
            NoticeKind::MaxItems,
            self.max_item_text.replace("{max}", &max.to_string()),
        )
    }

    /// Duplicate notice.
    pub fn not_unique(&self) -> Notice {
        Notice::new(NoticeKind::NotUnique, self.unique_item_text.clone())
    }

    /// `regexFilter` notice for `value`.
    pub fn custom_rejected(&self, value: &str) -> Notice {
        Notice::new(
            NoticeKind::CustomRejected,
            self.custom_add_item_text.replace("{value}", value),
        )
    }

    /// Empty-search notice.
    pub fn no_results(&self) -> Notice {
        Notice::new(NoticeKind::NoResults, self.no_results_text.clone())
    }

    /// Empty-list notice.
    pub fn no_choices(&self) -> Notice {
        Notice::new(NoticeKind::NoChoices, self.no_choices_text.clone())
    }
}
