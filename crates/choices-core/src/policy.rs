//! Add-item guards.
//!
//! Before a typed (or programmatically added) value becomes an item, the control checks it
//! against `maxItemCount`, `regexFilter` and `duplicateItems`. A refusal is not an error: it
//! yields a [`Notice`] that the reconciler shows in place of the candidate list.

use crate::config::Config;
use crate::host::Mode;
use crate::model::Item;
use crate::notice::Notice;

/// Outcome of an add-item check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDecision {
    /// The value may be added; the notice is the "Press Enter to add" prompt.
    Allowed(Notice),
    /// The value is refused for the reason given by the notice.
    Rejected(Notice),
}

impl AddDecision {
    /// Whether the value may be added.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AddDecision::Allowed(_))
    }

    /// The notice to surface.
    pub fn notice(&self) -> &Notice {
        match self {
            AddDecision::Allowed(notice) | AddDecision::Rejected(notice) => notice,
        }
    }
}

/// Check whether `value` may become a new item, given the currently active items.
///
/// The item limit applies to every multi-value mode; the pattern and uniqueness rules only apply
/// to free-typed values.
pub fn check_add(config: &Config, mode: Mode, active_items: &[&Item], value: &str) -> AddDecision {
    if mode != Mode::SingleSelect
        && let Some(max) = config.max_item_count
        && active_items.len() >= max
    {
        return AddDecision::Rejected(config.texts.max_items(max));
    }

    if mode == Mode::FreeText {
        if let Some(filter) = &config.regex_filter
            && !filter.is_match(value)
        {
            return AddDecision::Rejected(config.texts.custom_rejected(value));
        }
        if !config.duplicate_items {
            // Items store the decorated value.
            let stored = config.decorate_value(value);
            if active_items.iter().any(|item| item.value == stored) {
                return AddDecision::Rejected(config.texts.not_unique());
            }
        }
    }

    AddDecision::Allowed(config.texts.add_item(value))
}
