//! Slice reducers.
//!
//! Each reducer maps `(slice, action)` to the next slice. A reducer returns `None` when the action
//! leaves its slice untouched: either the action belongs to another slice, or it references an
//! unknown id, or it would not change anything. Reducers never fail.

use crate::actions::{Action, ChoiceAction, GroupAction, ItemAction};
use crate::model::{Choice, Group, Item};
use std::collections::HashMap;

/// Clone `entries` and apply `apply` to every entry matching `pred`; `None` if nothing matches.
fn update_where<T: Clone>(
    entries: &[T],
    pred: impl Fn(&T) -> bool,
    apply: impl Fn(&mut T),
) -> Option<Vec<T>> {
    if !entries.iter().any(&pred) {
        return None;
    }
    let mut next = entries.to_vec();
    for entry in next.iter_mut() {
        if pred(entry) {
            apply(entry);
        }
    }
    Some(next)
}

fn appended<T: Clone>(entries: &[T], entry: T) -> Vec<T> {
    let mut next = Vec::with_capacity(entries.len() + 1);
    next.extend_from_slice(entries);
    next.push(entry);
    next
}

/// Reduce the items slice.
pub fn reduce_items(items: &[Item], action: &Action) -> Option<Vec<Item>> {
    match action {
        Action::Item(ItemAction::Add {
            id,
            value,
            label,
            choice_id,
            group_id,
        }) => {
            let mut item = Item::new(*id, value.clone(), label.clone());
            item.choice_id = *choice_id;
            item.group_id = *group_id;
            Some(appended(items, item))
        }
        Action::Item(ItemAction::Remove { id, .. }) => update_where(
            items,
            |item| item.id == *id && item.active,
            |item| item.active = false,
        ),
        Action::Item(ItemAction::Highlight { id, highlighted }) => update_where(
            items,
            |item| item.id == *id && item.highlighted != *highlighted,
            |item| item.highlighted = *highlighted,
        ),
        Action::ClearAll => (!items.is_empty()).then(Vec::new),
        Action::Choice(_) | Action::Group(_) => None,
    }
}

/// Reduce the choices slice.
pub fn reduce_choices(choices: &[Choice], action: &Action) -> Option<Vec<Choice>> {
    match action {
        Action::Choice(ChoiceAction::Add {
            id,
            value,
            label,
            group_id,
            disabled,
        }) => {
            let mut choice = Choice::new(*id, value.clone(), label.clone());
            choice.group_id = *group_id;
            choice.disabled = *disabled;
            Some(appended(choices, choice))
        }
        Action::Choice(ChoiceAction::Filter { results }) => {
            let scores: HashMap<_, _> = results.iter().map(|r| (r.id, r.score)).collect();
            let next: Vec<Choice> = choices
                .iter()
                .map(|choice| {
                    let score = scores.get(&choice.id).copied();
                    Choice {
                        active: score.is_some(),
                        score,
                        ..choice.clone()
                    }
                })
                .collect();
            (next.as_slice() != choices).then_some(next)
        }
        Action::Choice(ChoiceAction::Activate { active }) => update_where(
            choices,
            |choice| choice.active != *active || choice.score.is_some(),
            |choice| {
                choice.active = *active;
                choice.score = None;
            },
        ),
        Action::Item(ItemAction::Add {
            choice_id: Some(choice_id),
            ..
        }) => update_where(
            choices,
            |choice| choice.id == *choice_id && !choice.selected,
            |choice| choice.selected = true,
        ),
        Action::Item(ItemAction::Remove {
            choice_id: Some(choice_id),
            ..
        }) => update_where(
            choices,
            |choice| choice.id == *choice_id && choice.selected,
            |choice| choice.selected = false,
        ),
        Action::ClearAll => (!choices.is_empty()).then(Vec::new),
        Action::Item(_) | Action::Group(_) => None,
    }
}

/// Reduce the groups slice.
pub fn reduce_groups(groups: &[Group], action: &Action) -> Option<Vec<Group>> {
    match action {
        Action::Group(GroupAction::Add {
            id,
            label,
            active,
            disabled,
        }) => Some(appended(
            groups,
            Group::new(*id, label.clone(), *active, *disabled),
        )),
        Action::ClearAll => (!groups.is_empty()).then(Vec::new),
        Action::Item(_) | Action::Choice(_) => None,
    }
}
