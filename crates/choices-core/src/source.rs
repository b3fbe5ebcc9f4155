//! Choice sources: host presets and asynchronous deliveries.
//!
//! Hosts hand choices to the control either up front (via [`HostElement`](crate::HostElement)
//! presets) or later, through the [`ChoiceDelivery`] handle given to an asynchronous fetch
//! callback. Results are plain JSON objects; the caller names the fields holding the value and
//! the label. Objects carrying a `choices` array describe a group.

use crate::error::ChoicesError;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A choice to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSpec {
    /// Choice value.
    pub value: String,
    /// Display label; `None` falls back to the value.
    pub label: Option<String>,
    /// Immediately promote the choice to an item.
    pub selected: bool,
    /// Never selectable.
    pub disabled: bool,
}

impl ChoiceSpec {
    /// A plain, enabled, unselected choice.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
            selected: false,
            disabled: false,
        }
    }

    /// Set the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Mark as selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Mark as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// A group of choices to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Header text.
    pub label: String,
    /// Disables the group and all of its choices.
    pub disabled: bool,
    /// Child choices.
    pub choices: Vec<ChoiceSpec>,
}

/// One entry of a preset list or delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
    /// An ungrouped choice.
    Choice(ChoiceSpec),
    /// A group with its choices.
    Group(GroupSpec),
}

impl SourceEntry {
    /// Number of choices carried by this entry.
    pub fn choice_count(&self) -> usize {
        match self {
            SourceEntry::Choice(_) => 1,
            SourceEntry::Group(group) => group.choices.len(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn flag(object: &serde_json::Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn parse_choice(result: &Value, value_field: &str, label_field: &str) -> Option<ChoiceSpec> {
    let object = result.as_object()?;
    let value = object.get(value_field).and_then(scalar_to_string)?;
    Some(ChoiceSpec {
        value,
        label: object.get(label_field).and_then(scalar_to_string),
        selected: flag(object, "selected"),
        disabled: flag(object, "disabled"),
    })
}

/// Convert JSON results into entries.
///
/// Entries that are not objects, or that lack a usable value, are skipped and logged.
pub fn parse_results(results: &[Value], value_field: &str, label_field: &str) -> Vec<SourceEntry> {
    let mut entries = Vec::with_capacity(results.len());
    for result in results {
        if let Some(children) = result.get("choices").and_then(Value::as_array) {
            let label = result
                .get("label")
                .and_then(scalar_to_string)
                .unwrap_or_default();
            let choices = children
                .iter()
                .filter_map(|child| {
                    let parsed = parse_choice(child, value_field, label_field);
                    if parsed.is_none() {
                        log::warn!(
                            target: "choices_core::source",
                            "skipping malformed choice in group {label:?}: {child}"
                        );
                    }
                    parsed
                })
                .collect();
            entries.push(SourceEntry::Group(GroupSpec {
                disabled: result.get("disabled").and_then(Value::as_bool) == Some(true),
                label,
                choices,
            }));
            continue;
        }

        match parse_choice(result, value_field, label_field) {
            Some(choice) => entries.push(SourceEntry::Choice(choice)),
            None => log::warn!(
                target: "choices_core::source",
                "skipping malformed choice (value field {value_field:?}): {result}"
            ),
        }
    }
    entries
}

pub(crate) type Inbox = Rc<RefCell<VecDeque<Vec<SourceEntry>>>>;

/// Handle through which an asynchronous choice source delivers results.
///
/// The handle only weakly references its control: once the control is destroyed (or dropped)
/// every delivery is rejected with [`ChoicesError::Released`]. Deliveries are queued and applied
/// by [`Choices::process_deliveries`](crate::Choices::process_deliveries).
#[derive(Debug, Clone)]
pub struct ChoiceDelivery {
    inbox: Weak<RefCell<VecDeque<Vec<SourceEntry>>>>,
}

impl ChoiceDelivery {
    pub(crate) fn new(inbox: &Inbox) -> Self {
        Self {
            inbox: Rc::downgrade(inbox),
        }
    }

    /// Whether the control is still alive.
    pub fn is_open(&self) -> bool {
        self.inbox.strong_count() > 0
    }

    /// Queue `results` for the control. Returns the number of choices queued.
    pub fn deliver(
        &self,
        results: &[Value],
        value_field: &str,
        label_field: &str,
    ) -> Result<usize, ChoicesError> {
        let Some(inbox) = self.inbox.upgrade() else {
            log::debug!(
                target: "choices_core::source",
                "dropping delivery of {} result(s) for a released control",
                results.len()
            );
            return Err(ChoicesError::Released);
        };
        let entries = parse_results(results, value_field, label_field);
        let count = entries.iter().map(SourceEntry::choice_count).sum();
        inbox.borrow_mut().push_back(entries);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_choices_and_groups() {
        let results = vec![
            json!({"id": 1, "name": "Apple", "selected": true}),
            json!({"id": 2}),
            json!("not an object"),
            json!({"label": "Veg", "disabled": true, "choices": [{"id": 3, "name": "Leek"}]}),
        ];
        let entries = parse_results(&results, "id", "name");
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            SourceEntry::Choice(ChoiceSpec::new("1").label("Apple").selected())
        );
        assert_eq!(entries[1], SourceEntry::Choice(ChoiceSpec::new("2")));
        match &entries[2] {
            SourceEntry::Group(group) => {
                assert_eq!(group.label, "Veg");
                assert!(group.disabled);
                assert_eq!(group.choices, vec![ChoiceSpec::new("3").label("Leek")]);
            }
            other => panic!("expected group, got {other:?}"),
        }
    }

    #[test]
    fn test_delivery_after_drop_is_rejected() {
        let inbox: Inbox = Rc::default();
        let delivery = ChoiceDelivery::new(&inbox);
        assert_eq!(
            delivery.deliver(&[json!({"value": "a"})], "value", "label"),
            Ok(1)
        );
        assert_eq!(inbox.borrow().len(), 1);

        drop(inbox);
        assert!(!delivery.is_open());
        assert_eq!(
            delivery.deliver(&[json!({"value": "b"})], "value", "label"),
            Err(ChoicesError::Released)
        );
    }
}
