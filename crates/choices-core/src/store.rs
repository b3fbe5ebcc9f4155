//! Action/reducer store.
//!
//! # Overview
//!
//! [`Store`] owns the authoritative [`State`] of one control. All mutation goes through
//! [`Store::dispatch`], which runs the three slice reducers, assembles a new state and notifies
//! subscribers when (and only when) at least one slice generation moved.
//!
//! Listeners receive a shared reference to the store and pull whatever they need through the
//! query methods; nothing is pushed to them.
//!
//! # Example
//!
//! ```rust
//! use choices_core::{Action, ItemId, Store};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut store = Store::new();
//! let seen = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&seen);
//! store.subscribe(move |store| counter.set(store.active_items().len()));
//!
//! store.dispatch(Action::add_item(ItemId::next(0), "a", None)).unwrap();
//! assert_eq!(seen.get(), 1);
//! assert_eq!(store.item_values(), vec!["a"]);
//! ```

use crate::actions::Action;
use crate::error::ChoicesError;
use crate::ids::{ChoiceId, GroupId};
use crate::model::{Choice, Generations, Group, Item, State};
use crate::reducers::{reduce_choices, reduce_groups, reduce_items};
use std::fmt;

/// Store listener.
pub type Listener = Box<dyn FnMut(&Store)>;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Holds the three slices and dispatches actions to their reducers.
pub struct Store {
    state: State,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    released: bool,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .field("released", &self.released)
            .finish()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: State::default(),
            listeners: Vec::new(),
            next_listener: 0,
            released: false,
        }
    }

    /// Apply `action` to every slice.
    ///
    /// Returns `Ok(true)` when some slice changed (listeners were notified), `Ok(false)` when the
    /// action was a no-op, and [`ChoicesError::Released`] once the store has been released.
    pub fn dispatch(&mut self, action: Action) -> Result<bool, ChoicesError> {
        if self.released {
            log::debug!(
                target: "choices_core::store",
                "rejecting {} dispatched after release",
                action.kind()
            );
            return Err(ChoicesError::Released);
        }

        let before = self.state.generations();
        let current = &self.state;
        let items = match reduce_items(&current.items, &action) {
            Some(next) => current.items.replaced(next),
            None => current.items.clone(),
        };
        let choices = match reduce_choices(&current.choices, &action) {
            Some(next) => current.choices.replaced(next),
            None => current.choices.clone(),
        };
        let groups = match reduce_groups(&current.groups, &action) {
            Some(next) => current.groups.replaced(next),
            None => current.groups.clone(),
        };
        self.state = State {
            items,
            choices,
            groups,
        };

        let changed = self.state.generations() != before;
        log::trace!(
            target: "choices_core::store",
            "{} -> changed={changed}",
            action.kind()
        );
        if changed {
            self.notify();
        }
        Ok(changed)
    }

    /// Register a listener. Listeners fire in registration order after every effective dispatch.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Store) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Tear the store down: clear every slice, drop listeners, reject later dispatches.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.listeners.clear();
        // Cannot fail: the store is not released yet.
        let _ = self.dispatch(Action::ClearAll);
        self.released = true;
    }

    /// Whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn notify(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self);
        }
        self.listeners = listeners;
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.state.clone()
    }

    /// Current slice generations.
    pub fn generations(&self) -> Generations {
        self.state.generations()
    }

    /// All items, including removed ones.
    pub fn items(&self) -> &[Item] {
        &self.state.items
    }

    /// Items that have not been removed.
    pub fn active_items(&self) -> Vec<&Item> {
        self.state.items.iter().filter(|item| item.active).collect()
    }

    /// Active items with the highlight flag set.
    pub fn highlighted_items(&self) -> Vec<&Item> {
        self.state
            .items
            .iter()
            .filter(|item| item.active && item.highlighted)
            .collect()
    }

    /// Values of the active items, in insertion order.
    pub fn item_values(&self) -> Vec<&str> {
        self.state
            .items
            .iter()
            .filter(|item| item.active)
            .map(|item| item.value.as_str())
            .collect()
    }

    /// All choices.
    pub fn choices(&self) -> &[Choice] {
        &self.state.choices
    }

    /// Choices currently eligible for display.
    pub fn active_choices(&self) -> Vec<&Choice> {
        self.state
            .choices
            .iter()
            .filter(|choice| choice.active)
            .collect()
    }

    /// Active, enabled, not yet selected choices.
    pub fn selectable_choices(&self) -> Vec<&Choice> {
        self.state
            .choices
            .iter()
            .filter(|choice| choice.is_selectable())
            .collect()
    }

    /// Haystack for search: enabled, not yet selected choices regardless of their current
    /// filter state.
    pub fn searchable_choices(&self) -> Vec<&Choice> {
        self.state
            .choices
            .iter()
            .filter(|choice| !choice.disabled && !choice.selected)
            .collect()
    }

    /// Look up a choice by id.
    pub fn choice_by_id(&self, id: ChoiceId) -> Option<&Choice> {
        self.state.choices.iter().find(|choice| choice.id == id)
    }

    /// First enabled, unselected choice with the given value.
    pub fn choice_by_value(&self, value: &str) -> Option<&Choice> {
        self.state
            .choices
            .iter()
            .find(|choice| choice.value == value && !choice.disabled && !choice.selected)
    }

    /// All groups.
    pub fn groups(&self) -> &[Group] {
        &self.state.groups
    }

    /// Look up a group by id.
    pub fn group_by_id(&self, id: GroupId) -> Option<&Group> {
        self.state.groups.iter().find(|group| group.id == id)
    }

    /// Groups that are active, enabled and have at least one active, unselected child choice.
    pub fn active_groups(&self) -> Vec<&Group> {
        self.state
            .groups
            .iter()
            .filter(|group| group.active && !group.disabled)
            .filter(|group| {
                self.state.choices.iter().any(|choice| {
                    choice.group_id == Some(group.id) && choice.active && !choice.selected
                })
            })
            .collect()
    }
}
