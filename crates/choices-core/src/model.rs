//! State data model.
//!
//! The store holds three independent slices: committed [`Item`]s, candidate [`Choice`]s and
//! [`Group`]s partitioning the choices. Each slice is an immutable, reference-counted vector
//! paired with a generation counter; a slice is replaced (and its generation bumped) only when a
//! reducer reports a change, so consumers detect changes by comparing generations instead of
//! relying on allocation identity.

use crate::ids::{ChoiceId, GroupId, ItemId};
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

/// A value committed by the control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Allocator-assigned id.
    pub id: ItemId,
    /// The committed value.
    pub value: String,
    /// Display string (defaults to `value`).
    pub label: String,
    /// The choice this item was promoted from (`None` for freely typed items).
    pub choice_id: Option<ChoiceId>,
    /// Group of the originating choice, if any.
    pub group_id: Option<GroupId>,
    /// `false` once the item has been removed (soft delete).
    pub active: bool,
    /// Pointer/keyboard focus for deletion.
    pub highlighted: bool,
}

impl Item {
    /// Create a fresh, active, unhighlighted item.
    pub fn new(id: ItemId, value: impl Into<String>, label: Option<String>) -> Self {
        let value = value.into();
        Self {
            id,
            label: label.unwrap_or_else(|| value.clone()),
            value,
            choice_id: None,
            group_id: None,
            active: true,
            highlighted: false,
        }
    }
}

/// A candidate option offered in the dropdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Allocator-assigned id.
    pub id: ChoiceId,
    /// Value committed when the choice is selected.
    pub value: String,
    /// Display string (defaults to `value`).
    pub label: String,
    /// Owning group (`None` = ungrouped).
    pub group_id: Option<GroupId>,
    /// Disabled choices are never selectable.
    pub disabled: bool,
    /// Already promoted to an item.
    pub selected: bool,
    /// Currently eligible for display (toggled by search filtering).
    pub active: bool,
    /// Relevance while a search is active; lower is better.
    pub score: Option<f64>,
}

impl Choice {
    /// Create a fresh, active, unselected choice.
    pub fn new(id: ChoiceId, value: impl Into<String>, label: Option<String>) -> Self {
        let value = value.into();
        Self {
            id,
            label: label.unwrap_or_else(|| value.clone()),
            value,
            group_id: None,
            disabled: false,
            selected: false,
            active: true,
            score: None,
        }
    }

    /// Active, enabled and not yet selected.
    pub fn is_selectable(&self) -> bool {
        self.active && !self.disabled && !self.selected
    }
}

/// A named partition of choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    /// Allocator-assigned id.
    pub id: GroupId,
    /// Header text.
    pub label: String,
    /// Whether the group is eligible for display.
    pub active: bool,
    /// Disabled groups are hidden along with their choices.
    pub disabled: bool,
}

impl Group {
    /// Create a group.
    pub fn new(id: GroupId, label: impl Into<String>, active: bool, disabled: bool) -> Self {
        Self {
            id,
            label: label.into(),
            active,
            disabled,
        }
    }
}

/// One immutable state partition plus its change generation.
#[derive(Debug)]
pub struct Slice<T> {
    entries: Arc<Vec<T>>,
    generation: u64,
}

impl<T> Slice<T> {
    /// Generation counter; bumped every time the slice is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Borrow the entries.
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub(crate) fn replaced(&self, entries: Vec<T>) -> Self {
        Self {
            entries: Arc::new(entries),
            generation: self.generation + 1,
        }
    }
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            generation: self.generation,
        }
    }
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            generation: 0,
        }
    }
}

impl<T> Deref for Slice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

/// Per-slice generation counters, used for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generations {
    /// Items slice generation.
    pub items: u64,
    /// Choices slice generation.
    pub choices: u64,
    /// Groups slice generation.
    pub groups: u64,
}

/// Immutable composite of the three slices. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Committed items, including soft-deleted ones.
    pub items: Slice<Item>,
    /// Candidate choices.
    pub choices: Slice<Choice>,
    /// Choice groups.
    pub groups: Slice<Group>,
}

impl State {
    /// Current generation of every slice.
    pub fn generations(&self) -> Generations {
        Generations {
            items: self.items.generation(),
            choices: self.choices.generation(),
            groups: self.groups.generation(),
        }
    }
}
