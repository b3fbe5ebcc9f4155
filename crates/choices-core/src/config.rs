//! Control configuration.
//!
//! Options can be built in code (start from [`Config::default`]) or loaded from a JSON options
//! object with camelCase keys, as a host adapter would read them from markup:
//!
//! ```rust
//! use choices_core::{CallbackRegistry, Config};
//! use serde_json::json;
//!
//! let mut registry = CallbackRegistry::new();
//! registry.register("logChange", |event| println!("{event:?}"));
//!
//! let config = Config::from_json(
//!     &json!({ "maxItemCount": 2, "callbackOnChange": "logChange" }),
//!     &registry,
//! )
//! .unwrap();
//! assert_eq!(config.max_item_count, Some(2));
//! assert!(config.callbacks.on_change.is_some());
//! ```
//!
//! Callback options name functions registered by the host. Every name is resolved exactly once,
//! while the configuration loads; anything that does not resolve is a
//! [`ConfigError::NotCallable`].

use crate::error::ConfigError;
use crate::ids::ItemId;
use crate::model::Choice;
use crate::notice::NoticeTexts;
use crate::search::{DEFAULT_SEARCH_FLOOR, SearchField};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Lifecycle notification passed to callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoicesEvent {
    /// The control finished initialising.
    Init,
    /// An item was added.
    AddItem {
        /// New item id.
        id: ItemId,
        /// Item value.
        value: String,
        /// Label of the originating choice's group.
        group: Option<String>,
    },
    /// An item was removed.
    RemoveItem {
        /// Removed item id.
        id: ItemId,
        /// Item value.
        value: String,
        /// Label of the originating choice's group.
        group: Option<String>,
    },
    /// An item was highlighted.
    HighlightItem {
        /// Item id.
        id: ItemId,
        /// Item value.
        value: String,
        /// Label of the originating choice's group.
        group: Option<String>,
    },
    /// An item lost its highlight.
    UnhighlightItem {
        /// Item id.
        id: ItemId,
        /// Item value.
        value: String,
        /// Label of the originating choice's group.
        group: Option<String>,
    },
    /// The committed value changed.
    Change {
        /// Value that was added or removed.
        value: String,
    },
    /// A search ran.
    Search {
        /// The needle.
        value: String,
        /// Number of matching choices.
        result_count: usize,
    },
}

/// A host callback.
pub type Callback = Rc<dyn Fn(&ChoicesEvent)>;

/// A custom choice comparator for non-search sorting.
pub type SortFn = Rc<dyn Fn(&Choice, &Choice) -> Ordering>;

/// Named host functions that callback options may refer to.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry")
            .field("names", &names)
            .finish()
    }
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&ChoicesEvent) + 'static,
    {
        self.callbacks.insert(name.into(), Rc::new(callback));
    }

    /// Look up a callback.
    pub fn get(&self, name: &str) -> Option<Callback> {
        self.callbacks.get(name).cloned()
    }
}

/// Resolved lifecycle callbacks.
#[derive(Clone, Default)]
pub struct Callbacks {
    /// `callbackOnInit`
    pub on_init: Option<Callback>,
    /// `callbackOnAddItem`
    pub on_add_item: Option<Callback>,
    /// `callbackOnRemoveItem`
    pub on_remove_item: Option<Callback>,
    /// `callbackOnHighlightItem`
    pub on_highlight_item: Option<Callback>,
    /// `callbackOnUnhighlightItem`
    pub on_unhighlight_item: Option<Callback>,
    /// `callbackOnChange`
    pub on_change: Option<Callback>,
    /// `callbackOnSearch`
    pub on_search: Option<Callback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_init", &self.on_init.is_some())
            .field("on_add_item", &self.on_add_item.is_some())
            .field("on_remove_item", &self.on_remove_item.is_some())
            .field("on_highlight_item", &self.on_highlight_item.is_some())
            .field("on_unhighlight_item", &self.on_unhighlight_item.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("on_search", &self.on_search.is_some())
            .finish()
    }
}

impl Callbacks {
    /// Invoke the callback registered for `event`, if any.
    pub fn fire(&self, event: &ChoicesEvent) {
        let hook = match event {
            ChoicesEvent::Init => &self.on_init,
            ChoicesEvent::AddItem { .. } => &self.on_add_item,
            ChoicesEvent::RemoveItem { .. } => &self.on_remove_item,
            ChoicesEvent::HighlightItem { .. } => &self.on_highlight_item,
            ChoicesEvent::UnhighlightItem { .. } => &self.on_unhighlight_item,
            ChoicesEvent::Change { .. } => &self.on_change,
            ChoicesEvent::Search { .. } => &self.on_search,
        };
        if let Some(callback) = hook {
            callback(event);
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawOptions {
    max_item_count: i64,
    add_items: bool,
    remove_items: bool,
    edit_items: bool,
    duplicate_items: bool,
    delimiter: String,
    search: bool,
    search_floor: usize,
    search_result_limit: Option<usize>,
    sort_fields: Vec<SearchField>,
    should_sort: bool,
    render_choice_limit: i64,
    regex_filter: Option<String>,
    prepend_value: Option<String>,
    append_value: Option<String>,
    #[serde(flatten)]
    texts: NoticeTexts,
    callback_on_init: Option<Value>,
    callback_on_add_item: Option<Value>,
    callback_on_remove_item: Option<Value>,
    callback_on_highlight_item: Option<Value>,
    callback_on_unhighlight_item: Option<Value>,
    callback_on_change: Option<Value>,
    callback_on_search: Option<Value>,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            max_item_count: -1,
            add_items: true,
            remove_items: true,
            edit_items: false,
            duplicate_items: true,
            delimiter: ",".to_string(),
            search: true,
            search_floor: DEFAULT_SEARCH_FLOOR,
            search_result_limit: None,
            sort_fields: vec![SearchField::Label, SearchField::Value],
            should_sort: true,
            render_choice_limit: -1,
            regex_filter: None,
            prepend_value: None,
            append_value: None,
            texts: NoticeTexts::default(),
            callback_on_init: None,
            callback_on_add_item: None,
            callback_on_remove_item: None,
            callback_on_highlight_item: None,
            callback_on_unhighlight_item: None,
            callback_on_change: None,
            callback_on_search: None,
        }
    }
}

/// Control options.
#[derive(Clone)]
pub struct Config {
    /// Maximum number of active items (`None` = unlimited).
    pub max_item_count: Option<usize>,
    /// Allow adding items by typing.
    pub add_items: bool,
    /// Allow removing items by user interaction.
    pub remove_items: bool,
    /// Backspace on an empty input moves the last item back into the input.
    pub edit_items: bool,
    /// Allow the same typed value more than once.
    pub duplicate_items: bool,
    /// Separator used when serialising values.
    pub delimiter: String,
    /// Enable search.
    pub search: bool,
    /// Minimum needle length, in graphemes.
    pub search_floor: usize,
    /// Maximum number of search results.
    pub search_result_limit: Option<usize>,
    /// Fields used for matching and alphabetical sorting, in priority order.
    pub sort_fields: Vec<SearchField>,
    /// Sort choices (and groups) when not searching.
    pub should_sort: bool,
    /// Custom comparator used instead of alphabetical sorting.
    pub sort_fn: Option<SortFn>,
    /// Maximum number of rendered choices outside search (`None` = unlimited).
    pub render_choice_limit: Option<usize>,
    /// Typed values must match this pattern (case-insensitive).
    pub regex_filter: Option<Regex>,
    /// Prefix added to every item value.
    pub prepend_value: Option<String>,
    /// Suffix added to every item value.
    pub append_value: Option<String>,
    /// Notice templates.
    pub texts: NoticeTexts,
    /// Lifecycle callbacks.
    pub callbacks: Callbacks,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_item_count", &self.max_item_count)
            .field("add_items", &self.add_items)
            .field("remove_items", &self.remove_items)
            .field("edit_items", &self.edit_items)
            .field("duplicate_items", &self.duplicate_items)
            .field("delimiter", &self.delimiter)
            .field("search", &self.search)
            .field("search_floor", &self.search_floor)
            .field("search_result_limit", &self.search_result_limit)
            .field("sort_fields", &self.sort_fields)
            .field("should_sort", &self.should_sort)
            .field("sort_fn", &self.sort_fn.is_some())
            .field("render_choice_limit", &self.render_choice_limit)
            .field("regex_filter", &self.regex_filter.as_ref().map(Regex::as_str))
            .field("prepend_value", &self.prepend_value)
            .field("append_value", &self.append_value)
            .field("texts", &self.texts)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_raw(RawOptions::default(), None, Callbacks::default())
    }
}

fn positive_limit(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|limit| *limit > 0)
}

fn compile_filter(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|err| ConfigError::InvalidRegex {
            pattern: pattern.to_string(),
            message: err.to_string(),
        })
}

fn resolve_callback(
    option: &str,
    value: Option<&Value>,
    registry: &CallbackRegistry,
) -> Result<Option<Callback>, ConfigError> {
    let not_callable = || ConfigError::NotCallable {
        option: option.to_string(),
    };
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => registry.get(name).map(Some).ok_or_else(not_callable),
        Some(_) => Err(not_callable()),
    }
}

impl Config {
    fn from_raw(raw: RawOptions, regex_filter: Option<Regex>, callbacks: Callbacks) -> Self {
        Self {
            max_item_count: positive_limit(raw.max_item_count),
            add_items: raw.add_items,
            remove_items: raw.remove_items,
            edit_items: raw.edit_items,
            duplicate_items: raw.duplicate_items,
            delimiter: raw.delimiter,
            search: raw.search,
            search_floor: raw.search_floor.max(1),
            search_result_limit: raw.search_result_limit,
            sort_fields: raw.sort_fields,
            should_sort: raw.should_sort,
            sort_fn: None,
            render_choice_limit: positive_limit(raw.render_choice_limit),
            regex_filter,
            prepend_value: raw.prepend_value,
            append_value: raw.append_value,
            texts: raw.texts,
            callbacks,
        }
    }

    /// Load options from a JSON object, resolving callback names against `registry`.
    ///
    /// Errors are logged before being returned.
    pub fn from_json(options: &Value, registry: &CallbackRegistry) -> Result<Self, ConfigError> {
        let result = Self::load(options, registry);
        if let Err(err) = &result {
            log::warn!(target: "choices_core::config", "rejecting configuration: {err}");
        }
        result
    }

    fn load(options: &Value, registry: &CallbackRegistry) -> Result<Self, ConfigError> {
        let raw = RawOptions::deserialize(options)
            .map_err(|err| ConfigError::InvalidOptions(err.to_string()))?;

        let callbacks = Callbacks {
            on_init: resolve_callback("callbackOnInit", raw.callback_on_init.as_ref(), registry)?,
            on_add_item: resolve_callback(
                "callbackOnAddItem",
                raw.callback_on_add_item.as_ref(),
                registry,
            )?,
            on_remove_item: resolve_callback(
                "callbackOnRemoveItem",
                raw.callback_on_remove_item.as_ref(),
                registry,
            )?,
            on_highlight_item: resolve_callback(
                "callbackOnHighlightItem",
                raw.callback_on_highlight_item.as_ref(),
                registry,
            )?,
            on_unhighlight_item: resolve_callback(
                "callbackOnUnhighlightItem",
                raw.callback_on_unhighlight_item.as_ref(),
                registry,
            )?,
            on_change: resolve_callback(
                "callbackOnChange",
                raw.callback_on_change.as_ref(),
                registry,
            )?,
            on_search: resolve_callback(
                "callbackOnSearch",
                raw.callback_on_search.as_ref(),
                registry,
            )?,
        };
        let regex_filter = raw
            .regex_filter
            .as_deref()
            .map(compile_filter)
            .transpose()?;

        Ok(Self::from_raw(raw, regex_filter, callbacks))
    }

    /// Set the typed-value filter.
    pub fn with_regex_filter(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.regex_filter = Some(compile_filter(pattern)?);
        Ok(self)
    }

    /// Set a custom comparator for non-search sorting.
    pub fn with_sort_fn<F>(mut self, sort_fn: F) -> Self
    where
        F: Fn(&Choice, &Choice) -> Ordering + 'static,
    {
        self.sort_fn = Some(Rc::new(sort_fn));
        self
    }

    /// Apply `prependValue`/`appendValue` to a value.
    pub fn decorate_value(&self, value: &str) -> String {
        let mut decorated = String::new();
        if let Some(prefix) = &self.prepend_value {
            decorated.push_str(prefix);
        }
        decorated.push_str(value);
        if let Some(suffix) = &self.append_value {
            decorated.push_str(suffix);
        }
        decorated
    }
}
