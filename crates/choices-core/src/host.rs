//! Host element description.
//!
//! The host adapter (markup parsing, attribute reading) lives outside the engine; it hands over
//! the control mode and the preset values/choices through [`HostElement`].

use crate::source::{ChoiceSpec, GroupSpec, SourceEntry};
use serde::{Deserialize, Serialize};

/// Kind of form control being enhanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// One value picked from choices; picking another replaces it.
    SingleSelect,
    /// Many values picked from choices.
    MultiSelect,
    /// Free-typed values, no dropdown of choices.
    FreeText,
}

impl Mode {
    /// Whether values are picked from a choice list.
    pub fn is_select(self) -> bool {
        !matches!(self, Mode::FreeText)
    }
}

/// Everything the engine needs to know about the host element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostElement {
    /// Control mode.
    pub mode: Mode,
    /// Preset choices and groups.
    pub choices: Vec<SourceEntry>,
    /// Preset values committed at init.
    pub items: Vec<String>,
}

impl HostElement {
    /// A host with no presets.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            choices: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Add a preset choice.
    pub fn with_choice(mut self, choice: ChoiceSpec) -> Self {
        self.choices.push(SourceEntry::Choice(choice));
        self
    }

    /// Add preset choices from plain values.
    pub fn with_choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices.extend(
            values
                .into_iter()
                .map(|value| SourceEntry::Choice(ChoiceSpec::new(value))),
        );
        self
    }

    /// Add a preset group.
    pub fn with_group(mut self, label: impl Into<String>, choices: Vec<ChoiceSpec>) -> Self {
        self.choices.push(SourceEntry::Group(GroupSpec {
            label: label.into(),
            disabled: false,
            choices,
        }));
        self
    }

    /// Add preset item values.
    pub fn with_items<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items.extend(values.into_iter().map(Into::into));
        self
    }
}
