//! Action vocabulary.
//!
//! Every state mutation is expressed as an [`Action`] and funnelled through
//! [`Store::dispatch`](crate::Store::dispatch). Actions carry fully resolved data (ids are
//! allocated by the caller before dispatch), which keeps the reducers pure.

use crate::ids::{ChoiceId, GroupId, ItemId};
use crate::search::SearchResult;

/// Item slice actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemAction {
    /// Append a new active, unhighlighted item.
    ///
    /// When `choice_id` resolves, the matching choice is marked selected.
    Add {
        /// Id allocated for the new item.
        id: ItemId,
        /// Committed value.
        value: String,
        /// Display label (defaults to value).
        label: Option<String>,
        /// Originating choice, if any.
        choice_id: Option<ChoiceId>,
        /// Group of the originating choice, if any.
        group_id: Option<GroupId>,
    },
    /// Soft-delete an item; when `choice_id` resolves, the choice becomes selectable again.
    Remove {
        /// Item to deactivate.
        id: ItemId,
        /// Choice backing the item, if any.
        choice_id: Option<ChoiceId>,
    },
    /// Set one item's `highlighted` flag, leaving all others untouched.
    Highlight {
        /// Target item.
        id: ItemId,
        /// New flag value.
        highlighted: bool,
    },
}

/// Choice slice actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceAction {
    /// Append a new active, unselected choice.
    Add {
        /// Id allocated for the new choice.
        id: ChoiceId,
        /// Choice value.
        value: String,
        /// Display label (defaults to value).
        label: Option<String>,
        /// Owning group, if any.
        group_id: Option<GroupId>,
        /// Whether the choice is disabled.
        disabled: bool,
    },
    /// Activate (and score) every choice present in `results`; deactivate all others.
    Filter {
        /// Ranked search results.
        results: Vec<SearchResult>,
    },
    /// Bulk-set `active` on every choice and drop search scores.
    Activate {
        /// New flag value.
        active: bool,
    },
}

/// Group slice actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    /// Append a group.
    Add {
        /// Id allocated for the new group.
        id: GroupId,
        /// Header text.
        label: String,
        /// Whether the group is active.
        active: bool,
        /// Whether the group is disabled.
        disabled: bool,
    },
}

/// Unified action enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Item actions
    Item(ItemAction),
    /// Choice actions
    Choice(ChoiceAction),
    /// Group actions
    Group(GroupAction),
    /// Reset every slice to empty. Irreversible.
    ClearAll,
}

impl Action {
    /// Stable name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Item(ItemAction::Add { .. }) => "ADD_ITEM",
            Action::Item(ItemAction::Remove { .. }) => "REMOVE_ITEM",
            Action::Item(ItemAction::Highlight { .. }) => "HIGHLIGHT_ITEM",
            Action::Choice(ChoiceAction::Add { .. }) => "ADD_CHOICE",
            Action::Choice(ChoiceAction::Filter { .. }) => "FILTER_CHOICES",
            Action::Choice(ChoiceAction::Activate { .. }) => "ACTIVATE_CHOICES",
            Action::Group(GroupAction::Add { .. }) => "ADD_GROUP",
            Action::ClearAll => "CLEAR_ALL",
        }
    }

    /// Shorthand for [`ItemAction::Add`] without a backing choice.
    pub fn add_item(id: ItemId, value: impl Into<String>, label: Option<String>) -> Self {
        Action::Item(ItemAction::Add {
            id,
            value: value.into(),
            label,
            choice_id: None,
            group_id: None,
        })
    }

    /// Shorthand for [`ItemAction::Remove`].
    pub fn remove_item(id: ItemId, choice_id: Option<ChoiceId>) -> Self {
        Action::Item(ItemAction::Remove { id, choice_id })
    }

    /// Shorthand for [`ItemAction::Highlight`].
    pub fn highlight_item(id: ItemId, highlighted: bool) -> Self {
        Action::Item(ItemAction::Highlight { id, highlighted })
    }

    /// Shorthand for [`ChoiceAction::Add`].
    pub fn add_choice(
        id: ChoiceId,
        value: impl Into<String>,
        label: Option<String>,
        group_id: Option<GroupId>,
        disabled: bool,
    ) -> Self {
        Action::Choice(ChoiceAction::Add {
            id,
            value: value.into(),
            label,
            group_id,
            disabled,
        })
    }

    /// Shorthand for [`ChoiceAction::Filter`].
    pub fn filter_choices(results: Vec<SearchResult>) -> Self {
        Action::Choice(ChoiceAction::Filter { results })
    }

    /// Shorthand for [`ChoiceAction::Activate`].
    pub fn activate_choices(active: bool) -> Self {
        Action::Choice(ChoiceAction::Activate { active })
    }

    /// Shorthand for [`GroupAction::Add`].
    pub fn add_group(id: GroupId, label: impl Into<String>, active: bool, disabled: bool) -> Self {
        Action::Group(GroupAction::Add {
            id,
            label: label.into(),
            active,
            disabled,
        })
    }
}
