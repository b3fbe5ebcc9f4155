//! The control facade.
//!
//! # Overview
//!
//! [`Choices`] owns everything one enhanced control needs: its [`Store`], the search engine,
//! the reconciler, the scroll animator and the presentation [`Renderer`]. Host events (typed
//! text, keys, pointer actions, programmatic calls) come in through its methods; each method
//! decides which actions to dispatch, fires the configured callbacks and finishes with a
//! reconcile pass so the renderer is always in sync with the store.
//!
//! There is no global registry: a page with several controls simply owns several `Choices`.
//!
//! # Example
//!
//! ```rust
//! use choices_core::{AddOutcome, Choices, Config, HeadlessRenderer, HostElement, Mode};
//!
//! let config = Config {
//!     max_item_count: Some(1),
//!     ..Config::default()
//! };
//! let mut choices = Choices::new(config, HostElement::new(Mode::FreeText));
//! choices.init(HeadlessRenderer::new()).unwrap();
//!
//! assert!(matches!(choices.add_item("a", None).unwrap(), AddOutcome::Added(_)));
//! assert!(matches!(choices.add_item("b", None).unwrap(), AddOutcome::Rejected(_)));
//! assert_eq!(choices.serialized_value(), "a");
//! ```

use crate::actions::{Action, ItemAction};
use crate::config::{CallbackRegistry, ChoicesEvent, Config};
use crate::error::ChoicesError;
use crate::highlight::Direction;
use crate::host::{HostElement, Mode};
use crate::ids::{ChoiceId, GroupId, ItemId};
use crate::model::Item;
use crate::notice::Notice;
use crate::policy::{AddDecision, check_add};
use crate::reconcile::{ListOptions, ReconcileContext, Reconciler, Renderer};
use crate::scroll::{AnimationHandle, EntryBox, ScrollAnimator, ScrollGeometry, ScrollStep};
use crate::search::{SearchEngine, SearchRequest};
use crate::source::{ChoiceDelivery, ChoiceSpec, Inbox, SourceEntry, parse_results};
use crate::store::Store;
use serde_json::Value as Json;
use std::cell::Cell;
use std::rc::Rc;

const LOG_TARGET: &str = "choices_core::controller";

/// Result of an attempt to add an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new item was committed.
    Added(ItemId),
    /// A policy refused the value; the notice is being shown.
    Rejected(Notice),
    /// Nothing to do (empty value, unknown or unselectable choice, adding disabled).
    Ignored,
}

/// Keys the control reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Commit the typed value or the highlighted choice.
    Enter,
    /// Close the dropdown.
    Escape,
    /// Highlight the previous choice.
    Up,
    /// Highlight the next choice.
    Down,
    /// Highlight the first choice.
    PageUp,
    /// Highlight the last choice.
    PageDown,
    /// Delete backwards (acts on items when the input is empty).
    Backspace,
    /// Delete forwards (acts on items when the input is empty).
    Delete,
    /// Select all (highlights every item when the input is empty).
    SelectAll,
}

/// What a key press did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key had no effect.
    Ignored,
    /// The key changed the view (dropdown, highlight).
    Handled,
    /// An item was committed.
    Added(ItemId),
    /// An addition was refused.
    Rejected(Notice),
    /// This many items were removed.
    Removed(usize),
}

impl From<AddOutcome> for KeyOutcome {
    fn from(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(id) => KeyOutcome::Added(id),
            AddOutcome::Rejected(notice) => KeyOutcome::Rejected(notice),
            AddOutcome::Ignored => KeyOutcome::Ignored,
        }
    }
}

/// The committed value of a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Single-select value.
    Single(Option<String>),
    /// Values of a multi-value control, in insertion order.
    Multiple(Vec<String>),
}

/// One enhanced form control.
pub struct Choices<R: Renderer> {
    config: Config,
    mode: Mode,
    presets: Option<HostElement>,
    store: Store,
    dirty: Rc<Cell<bool>>,
    reconciler: Reconciler,
    search: SearchEngine,
    scroll: ScrollAnimator,
    renderer: Option<R>,
    inbox: Inbox,
    input: String,
    notice: Option<Notice>,
    painted_notice: Option<Notice>,
    painted_searching: bool,
    shown_notice: Option<Notice>,
    searching: bool,
    dropdown_open: bool,
    enabled: bool,
    loading: bool,
    destroyed: bool,
    last_direction: Direction,
}

impl<R: Renderer> std::fmt::Debug for Choices<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Choices")
            .field("mode", &self.mode)
            .field("store", &self.store)
            .field("input", &self.input)
            .field("searching", &self.searching)
            .field("dropdown_open", &self.dropdown_open)
            .field("enabled", &self.enabled)
            .field("initialized", &self.is_initialized())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> Choices<R> {
    /// Create a control for `host`. Nothing is loaded or painted until [`init`](Self::init).
    pub fn new(config: Config, host: HostElement) -> Self {
        let mut store = Store::new();
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        store.subscribe(move |_| flag.set(true));

        let search = SearchEngine::new(
            config.sort_fields.clone(),
            config.search_floor,
            config.search_result_limit,
        );
        Self {
            mode: host.mode,
            presets: Some(host),
            store,
            dirty,
            reconciler: Reconciler::new(),
            search,
            scroll: ScrollAnimator::new(),
            renderer: None,
            inbox: Inbox::default(),
            input: String::new(),
            notice: None,
            painted_notice: None,
            painted_searching: false,
            shown_notice: None,
            searching: false,
            dropdown_open: false,
            enabled: true,
            loading: false,
            destroyed: false,
            last_direction: Direction::Down,
            config,
        }
    }

    /// Create a control from a JSON options object.
    pub fn from_json(
        options: &Json,
        registry: &CallbackRegistry,
        host: HostElement,
    ) -> Result<Self, ChoicesError> {
        Ok(Self::new(Config::from_json(options, registry)?, host))
    }

    /// Load the host presets, fire `callbackOnInit` and paint for the first time.
    ///
    /// Calling `init` on an initialised control is a no-op.
    pub fn init(&mut self, renderer: R) -> Result<(), ChoicesError> {
        if self.destroyed {
            log::warn!(target: LOG_TARGET, "init called on a destroyed control");
            return Err(ChoicesError::Released);
        }
        if self.renderer.is_some() {
            log::debug!(target: LOG_TARGET, "control already initialised");
            return Ok(());
        }
        self.renderer = Some(renderer);

        if let Some(host) = self.presets.take() {
            self.insert_entries(host.choices)?;
            for value in host.items {
                self.preset_item(&value)?;
            }
        }
        if self.mode == Mode::SingleSelect && self.store.active_items().is_empty() {
            let first = self.store.selectable_choices().first().map(|choice| choice.id);
            if let Some(id) = first {
                self.commit_choice(id)?;
            }
        }

        log::debug!(
            target: LOG_TARGET,
            "initialised {:?} control with {} choice(s), {} item(s)",
            self.mode,
            self.store.choices().len(),
            self.store.active_items().len()
        );
        self.config.callbacks.fire(&ChoicesEvent::Init);
        self.render();
        Ok(())
    }

    /// Whether [`init`](Self::init) has run (and [`destroy`](Self::destroy) has not).
    pub fn is_initialized(&self) -> bool {
        self.renderer.is_some() && !self.destroyed
    }

    /// Tear the control down. Pending and future deliveries are rejected, as is every later
    /// mutation.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.store.release();
        self.inbox = Inbox::default();
        self.scroll.cancel();
        self.destroyed = true;
        log::debug!(target: LOG_TARGET, "control destroyed");
    }

    fn ensure_ready(&self) -> Result<(), ChoicesError> {
        if self.destroyed {
            log::warn!(target: LOG_TARGET, "call rejected: control has been destroyed");
            return Err(ChoicesError::Released);
        }
        if self.renderer.is_none() {
            log::warn!(target: LOG_TARGET, "call rejected: control is not initialised");
            return Err(ChoicesError::NotInitialized);
        }
        Ok(())
    }

    fn ensure_interactive(&self) -> Result<(), ChoicesError> {
        self.ensure_ready()?;
        if !self.enabled {
            log::debug!(target: LOG_TARGET, "call rejected: control is disabled");
            return Err(ChoicesError::Disabled);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Control mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read access to the store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The renderer, once initialised.
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    /// Mutable access to the renderer, once initialised.
    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    /// Current text input.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether a search is narrowing the choices.
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// The notice shown in place of the candidate list, if any.
    pub fn notice(&self) -> Option<&Notice> {
        self.shown_notice.as_ref()
    }

    /// The highlighted choice, if any.
    pub fn highlighted_choice(&self) -> Option<ChoiceId> {
        self.reconciler.highlighted()
    }

    /// Whether the dropdown is open.
    pub fn is_dropdown_open(&self) -> bool {
        self.dropdown_open
    }

    /// Whether the control accepts user interaction.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether an asynchronous fetch is waiting for its first delivery.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The committed value.
    pub fn value(&self) -> Value {
        let values = self.store.item_values();
        match self.mode {
            Mode::SingleSelect => Value::Single(values.first().map(|value| value.to_string())),
            Mode::MultiSelect | Mode::FreeText => {
                Value::Multiple(values.into_iter().map(str::to_string).collect())
            }
        }
    }

    /// The committed values joined by the configured delimiter, as written back to the host.
    pub fn serialized_value(&self) -> String {
        self.store.item_values().join(&self.config.delimiter)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn current_notice(&self) -> Option<Notice> {
        if self.notice.is_some() {
            return self.notice.clone();
        }
        if self.mode == Mode::MultiSelect
            && let Some(max) = self.config.max_item_count
            && self.store.active_items().len() >= max
        {
            return Some(self.config.texts.max_items(max));
        }
        None
    }

    fn render(&mut self) {
        if self.destroyed {
            return;
        }
        let notice = self.current_notice();
        let force = notice != self.painted_notice || self.searching != self.painted_searching;
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if !self.dirty.replace(false) && !force && !self.reconciler.needs_pass() {
            return;
        }

        let ctx = ReconcileContext {
            list: ListOptions::from_config(&self.config, self.searching),
            texts: &self.config.texts,
            notice: notice.as_ref(),
            force_choices: force,
        };
        let report = self.reconciler.reconcile(&self.store, &ctx, renderer);
        if report.choices_rendered.is_some() || report.notice.is_some() {
            self.shown_notice = report.notice.clone();
        }
        self.painted_notice = notice;
        self.painted_searching = self.searching;
        log::trace!(target: LOG_TARGET, "reconciled: {report:?}");
    }

    // ------------------------------------------------------------------
    // Loading choices
    // ------------------------------------------------------------------

    fn insert_choice(
        &mut self,
        spec: &ChoiceSpec,
        group: Option<(GroupId, bool)>,
    ) -> Result<ChoiceId, ChoicesError> {
        let id = ChoiceId::next(self.store.choices().len());
        let (group_id, group_disabled) = match group {
            Some((group_id, disabled)) => (Some(group_id), disabled),
            None => (None, false),
        };
        let disabled = spec.disabled || group_disabled;
        self.store.dispatch(Action::add_choice(
            id,
            spec.value.clone(),
            spec.label.clone(),
            group_id,
            disabled,
        ))?;
        if spec.selected && !disabled {
            self.commit_choice(id)?;
        }
        Ok(id)
    }

    fn insert_entries(&mut self, entries: Vec<SourceEntry>) -> Result<usize, ChoicesError> {
        let mut added = 0;
        for entry in entries {
            match entry {
                SourceEntry::Choice(spec) => {
                    self.insert_choice(&spec, None)?;
                    added += 1;
                }
                SourceEntry::Group(group) => {
                    let id = GroupId::next(self.store.groups().len());
                    self.store
                        .dispatch(Action::add_group(id, group.label, true, group.disabled))?;
                    for spec in &group.choices {
                        self.insert_choice(spec, Some((id, group.disabled)))?;
                        added += 1;
                    }
                }
            }
        }
        Ok(added)
    }

    fn preset_item(&mut self, value: &str) -> Result<(), ChoicesError> {
        if !self.mode.is_select() {
            self.commit_item(value, None, None)?;
            return Ok(());
        }
        match self.store.choice_by_value(value).map(|choice| choice.id) {
            Some(id) => {
                self.commit_choice(id)?;
            }
            None => log::warn!(
                target: LOG_TARGET,
                "preset value {value:?} does not match any choice"
            ),
        }
        Ok(())
    }

    /// Add choices from JSON results, reading the value and label from the named fields.
    ///
    /// Objects with a `choices` array become groups. Returns the number of choices added.
    pub fn set_choices(
        &mut self,
        results: &[Json],
        value_field: &str,
        label_field: &str,
    ) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        if !self.mode.is_select() {
            log::warn!(target: LOG_TARGET, "set_choices called on a free-text control");
            return Err(ChoicesError::InvalidArgument(
                "choices can only be set on select controls".to_string(),
            ));
        }
        if value_field.is_empty() || label_field.is_empty() {
            log::warn!(target: LOG_TARGET, "set_choices called without value/label fields");
            return Err(ChoicesError::InvalidArgument(
                "value and label fields are required".to_string(),
            ));
        }
        let added = self.insert_entries(parse_results(results, value_field, label_field))?;
        self.refresh_search()?;
        self.render();
        Ok(added)
    }

    /// Hand an asynchronous choice source its delivery handle.
    ///
    /// Deliveries made before `source` returns are applied immediately; later ones are applied by
    /// [`process_deliveries`](Self::process_deliveries).
    pub fn fetch_choices<F>(&mut self, source: F) -> Result<usize, ChoicesError>
    where
        F: FnOnce(ChoiceDelivery),
    {
        self.ensure_ready()?;
        if !self.mode.is_select() {
            log::warn!(target: LOG_TARGET, "fetch_choices called on a free-text control");
            return Err(ChoicesError::InvalidArgument(
                "choices can only be fetched for select controls".to_string(),
            ));
        }
        self.loading = true;
        source(ChoiceDelivery::new(&self.inbox));
        self.process_deliveries()
    }

    /// Apply every queued delivery. Returns the number of choices added.
    pub fn process_deliveries(&mut self) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let batches: Vec<Vec<SourceEntry>> = self.inbox.borrow_mut().drain(..).collect();
        if batches.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for entries in batches {
            added += self.insert_entries(entries)?;
        }
        self.loading = false;
        log::debug!(target: LOG_TARGET, "applied deliveries: {added} choice(s)");
        self.refresh_search()?;
        self.render();
        Ok(added)
    }

    /// Reset every slice to empty. The control stays usable.
    pub fn clear_store(&mut self) -> Result<(), ChoicesError> {
        self.ensure_ready()?;
        self.store.dispatch(Action::ClearAll)?;
        self.searching = false;
        self.search.reset();
        self.notice = None;
        self.reconciler.reset_highlight();
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    fn group_label(&self, group_id: Option<GroupId>) -> Option<String> {
        group_id
            .and_then(|id| self.store.group_by_id(id))
            .map(|group| group.label.clone())
    }

    fn commit_item(
        &mut self,
        value: &str,
        label: Option<String>,
        choice: Option<(ChoiceId, Option<GroupId>)>,
    ) -> Result<ItemId, ChoicesError> {
        let value = self.config.decorate_value(value.trim());
        let id = ItemId::next(self.store.items().len());
        let (choice_id, group_id) = match choice {
            Some((choice_id, group_id)) => (Some(choice_id), group_id),
            None => (None, None),
        };
        self.store.dispatch(Action::Item(ItemAction::Add {
            id,
            value: value.clone(),
            label,
            choice_id,
            group_id,
        }))?;
        log::debug!(target: LOG_TARGET, "added item {id} {value:?}");

        let group = self.group_label(group_id);
        self.config.callbacks.fire(&ChoicesEvent::AddItem {
            id,
            value: value.clone(),
            group,
        });
        self.config.callbacks.fire(&ChoicesEvent::Change { value });

        if self.mode == Mode::SingleSelect {
            self.discard_items(|item| item.id != id)?;
        }
        Ok(id)
    }

    fn commit_choice(&mut self, id: ChoiceId) -> Result<Option<ItemId>, ChoicesError> {
        let Some(choice) = self.store.choice_by_id(id) else {
            return Ok(None);
        };
        let (value, label, group_id) =
            (choice.value.clone(), choice.label.clone(), choice.group_id);
        self.commit_item(&value, Some(label), Some((id, group_id)))
            .map(Some)
    }

    fn discard_item(&mut self, item: &Item) -> Result<(), ChoicesError> {
        self.store
            .dispatch(Action::remove_item(item.id, item.choice_id))?;
        log::debug!(target: LOG_TARGET, "removed item {} {:?}", item.id, item.value);
        self.config.callbacks.fire(&ChoicesEvent::RemoveItem {
            id: item.id,
            value: item.value.clone(),
            group: self.group_label(item.group_id),
        });
        self.config.callbacks.fire(&ChoicesEvent::Change {
            value: item.value.clone(),
        });
        Ok(())
    }

    fn discard_items<F>(&mut self, pred: F) -> Result<usize, ChoicesError>
    where
        F: Fn(&Item) -> bool,
    {
        let doomed: Vec<Item> = self
            .store
            .active_items()
            .into_iter()
            .filter(|item| pred(*item))
            .cloned()
            .collect();
        for item in &doomed {
            self.discard_item(item)?;
        }
        Ok(doomed.len())
    }

    /// Add `value` as a new item, subject to the add-item policy.
    ///
    /// On select controls the value is matched against the choices first; a value without a
    /// matching choice is added as a new, selected choice labelled `label`. A matching choice is
    /// selected as it is, keeping its own label.
    pub fn add_item(&mut self, value: &str, label: Option<&str>) -> Result<AddOutcome, ChoicesError> {
        self.ensure_ready()?;
        let value = value.trim();
        if value.is_empty() {
            return Ok(AddOutcome::Ignored);
        }

        let outcome = match check_add(&self.config, self.mode, &self.store.active_items(), value) {
            AddDecision::Rejected(notice) => {
                log::debug!(target: LOG_TARGET, "refused {value:?}: {}", notice.text);
                self.notice = Some(notice.clone());
                AddOutcome::Rejected(notice)
            }
            AddDecision::Allowed(_) => {
                self.notice = None;
                let added = if self.mode.is_select() {
                    let existing = self.store.choice_by_value(value).map(|choice| choice.id);
                    let id = match existing {
                        Some(id) => id,
                        None => {
                            let mut spec = ChoiceSpec::new(value);
                            spec.label = label.map(str::to_string);
                            self.insert_choice(&spec, None)?
                        }
                    };
                    self.commit_choice(id)?
                } else {
                    Some(self.commit_item(value, label.map(str::to_string), None)?)
                };
                added.map_or(AddOutcome::Ignored, AddOutcome::Added)
            }
        };
        self.render();
        Ok(outcome)
    }

    /// Commit `values` without running the add-item policy. Returns the number of items added.
    ///
    /// On select controls every value becomes a new, selected choice.
    pub fn set_value<I, S>(&mut self, values: I) -> Result<usize, ChoicesError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_ready()?;
        let mut added = 0;
        for value in values {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            if self.mode.is_select() {
                self.insert_choice(&ChoiceSpec::new(value).selected(), None)?;
            } else {
                self.commit_item(value, None, None)?;
            }
            added += 1;
        }
        self.render();
        Ok(added)
    }

    /// Select existing choices by value. Values without an enabled, unselected choice are
    /// skipped. Returns the number of choices selected.
    pub fn set_value_by_choice<I, S>(&mut self, values: I) -> Result<usize, ChoicesError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_ready()?;
        if !self.mode.is_select() {
            log::debug!(target: LOG_TARGET, "set_value_by_choice ignored on a free-text control");
            return Ok(0);
        }
        let mut selected = 0;
        for value in values {
            let value = value.as_ref();
            match self.store.choice_by_value(value).map(|choice| choice.id) {
                Some(id) => {
                    if self.commit_choice(id)?.is_some() {
                        selected += 1;
                    }
                }
                None => log::warn!(target: LOG_TARGET, "no selectable choice with value {value:?}"),
            }
        }
        self.render();
        Ok(selected)
    }

    /// Promote a choice to an item (pointer click or Enter on the highlighted choice).
    pub fn select_choice(&mut self, id: ChoiceId) -> Result<AddOutcome, ChoicesError> {
        self.ensure_interactive()?;
        let Some(choice) = self.store.choice_by_id(id) else {
            return Ok(AddOutcome::Ignored);
        };
        if choice.disabled || choice.selected {
            return Ok(AddOutcome::Ignored);
        }
        let value = choice.value.clone();

        let outcome = match check_add(&self.config, self.mode, &self.store.active_items(), &value)
        {
            AddDecision::Rejected(notice) => {
                log::debug!(target: LOG_TARGET, "refused choice {id}: {}", notice.text);
                AddOutcome::Rejected(notice)
            }
            AddDecision::Allowed(_) => {
                let added = self.commit_choice(id)?;
                self.reset_input()?;
                if self.mode == Mode::SingleSelect {
                    self.hide_dropdown();
                }
                added.map_or(AddOutcome::Ignored, AddOutcome::Added)
            }
        };
        self.render();
        Ok(outcome)
    }

    /// Remove one active item. Returns `false` if there is no such active item.
    pub fn remove_item(&mut self, id: ItemId) -> Result<bool, ChoicesError> {
        self.ensure_ready()?;
        let removed = self.discard_items(|item| item.id == id)?;
        self.render();
        Ok(removed > 0)
    }

    /// Remove every active item except `excluded`. Returns the number removed.
    pub fn remove_active_items(&mut self, excluded: Option<ItemId>) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let removed = self.discard_items(|item| Some(item.id) != excluded)?;
        self.render();
        Ok(removed)
    }

    /// Remove every active item holding `value`. Returns the number removed.
    pub fn remove_active_items_by_value(&mut self, value: &str) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let removed = self.discard_items(|item| item.value == value)?;
        self.render();
        Ok(removed)
    }

    /// Remove every highlighted item. Returns the number removed.
    pub fn remove_highlighted_items(&mut self) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let removed = self.discard_items(|item| item.highlighted)?;
        self.render();
        Ok(removed)
    }

    /// Remove by a value supplied by host code. Anything but a string is an invalid argument.
    pub fn remove_value_json(&mut self, value: &Json) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let Some(value) = value.as_str() else {
            log::warn!(target: LOG_TARGET, "remove by value: expected a string, got {value}");
            return Err(ChoicesError::InvalidArgument(format!(
                "expected a string value, got {value}"
            )));
        };
        self.remove_active_items_by_value(value)
    }

    /// Remove an item object supplied by host code. The object must carry a numeric `id` and a
    /// string `value`; an item is removed only when both match.
    pub fn remove_item_json(&mut self, item: &Json) -> Result<bool, ChoicesError> {
        self.ensure_ready()?;
        let id = item.get("id").and_then(Json::as_u64);
        let value = item.get("value").and_then(Json::as_str);
        let (Some(id), Some(value)) = (id, value) else {
            log::warn!(target: LOG_TARGET, "remove item: missing id or value in {item}");
            return Err(ChoicesError::InvalidArgument(
                "item object requires an id and a value".to_string(),
            ));
        };
        let id = ItemId::new(id);
        let removed = self.discard_items(|item| item.id == id && item.value == value)?;
        self.render();
        Ok(removed > 0)
    }

    fn set_highlight(&mut self, item: &Item, highlighted: bool) -> Result<bool, ChoicesError> {
        if !self
            .store
            .dispatch(Action::highlight_item(item.id, highlighted))?
        {
            return Ok(false);
        }
        let group = self.group_label(item.group_id);
        let (id, value) = (item.id, item.value.clone());
        let event = if highlighted {
            ChoicesEvent::HighlightItem { id, value, group }
        } else {
            ChoicesEvent::UnhighlightItem { id, value, group }
        };
        self.config.callbacks.fire(&event);
        Ok(true)
    }

    fn highlight_where<F>(&mut self, highlighted: bool, pred: F) -> Result<usize, ChoicesError>
    where
        F: Fn(&Item) -> bool,
    {
        let targets: Vec<Item> = self
            .store
            .active_items()
            .into_iter()
            .filter(|item| item.highlighted != highlighted && pred(*item))
            .cloned()
            .collect();
        let mut changed = 0;
        for item in &targets {
            if self.set_highlight(item, highlighted)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Highlight an active item. On single-select controls any other highlight is dropped.
    pub fn highlight_item(&mut self, id: ItemId) -> Result<bool, ChoicesError> {
        self.ensure_ready()?;
        if self.mode == Mode::SingleSelect {
            self.highlight_where(false, |item| item.id != id)?;
        }
        let changed = self.highlight_where(true, |item| item.id == id)? > 0;
        self.render();
        Ok(changed)
    }

    /// Drop an item's highlight.
    pub fn unhighlight_item(&mut self, id: ItemId) -> Result<bool, ChoicesError> {
        self.ensure_ready()?;
        let changed = self.highlight_where(false, |item| item.id == id)? > 0;
        self.render();
        Ok(changed)
    }

    /// Highlight every active item.
    pub fn highlight_all(&mut self) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let changed = if self.mode == Mode::SingleSelect {
            let first = self.store.active_items().first().map(|item| item.id);
            match first {
                Some(id) => self.highlight_where(true, |item| item.id == id)?,
                None => 0,
            }
        } else {
            self.highlight_where(true, |_| true)?
        };
        self.render();
        Ok(changed)
    }

    /// Drop every item highlight.
    pub fn unhighlight_all(&mut self) -> Result<usize, ChoicesError> {
        self.ensure_ready()?;
        let changed = self.highlight_where(false, |_| true)?;
        self.render();
        Ok(changed)
    }

    /// Pointer press on an item. Highlights it; without `extend` every other highlight is
    /// dropped.
    pub fn click_item(&mut self, id: ItemId, extend: bool) -> Result<(), ChoicesError> {
        self.ensure_interactive()?;
        let extend = extend && self.mode != Mode::SingleSelect;
        if !extend {
            self.highlight_where(false, |item| item.id != id)?;
        }
        self.highlight_where(true, |item| item.id == id)?;
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input and search
    // ------------------------------------------------------------------

    fn run_search(&mut self) -> Result<(), ChoicesError> {
        if !self.config.search || !self.mode.is_select() {
            return Ok(());
        }
        match self.search.prepare(&self.input) {
            SearchRequest::ShowAll => {
                if self.searching {
                    self.stop_search()?;
                }
            }
            SearchRequest::Unchanged => {}
            SearchRequest::Search(needle) => {
                let results = self.search.search(&needle, self.store.searchable_choices());
                let result_count = results.len();
                self.searching = true;
                self.store.dispatch(Action::filter_choices(results))?;
                self.reconciler.reset_highlight();
                self.config.callbacks.fire(&ChoicesEvent::Search {
                    value: needle,
                    result_count,
                });
            }
        }
        Ok(())
    }

    fn stop_search(&mut self) -> Result<(), ChoicesError> {
        self.searching = false;
        self.search.reset();
        self.store.dispatch(Action::activate_choices(true))?;
        Ok(())
    }

    fn refresh_search(&mut self) -> Result<(), ChoicesError> {
        if self.searching {
            self.search.reset();
            self.run_search()?;
        }
        Ok(())
    }

    fn reset_input(&mut self) -> Result<(), ChoicesError> {
        self.input.clear();
        self.notice = None;
        if self.searching {
            self.stop_search()?;
        }
        Ok(())
    }

    /// Replace the typed text.
    ///
    /// Select controls search their choices; free-text controls show the add-item prompt (or
    /// the reason the value would be refused).
    pub fn set_input(&mut self, text: &str) -> Result<(), ChoicesError> {
        self.ensure_interactive()?;
        self.input = text.to_string();
        self.input_changed()?;
        self.render();
        Ok(())
    }

    fn input_changed(&mut self) -> Result<(), ChoicesError> {
        if self.mode.is_select() {
            self.notice = None;
            return self.run_search();
        }
        let value = self.input.trim();
        self.notice = if value.is_empty() || !self.config.add_items {
            None
        } else {
            let decision = check_add(&self.config, self.mode, &self.store.active_items(), value);
            Some(decision.notice().clone())
        };
        Ok(())
    }

    /// Clear the typed text; every choice becomes visible again.
    pub fn clear_input(&mut self) -> Result<(), ChoicesError> {
        self.ensure_ready()?;
        self.reset_input()?;
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Keyboard and pointer
    // ------------------------------------------------------------------

    /// React to a key press.
    pub fn handle_key(&mut self, key: Key) -> Result<KeyOutcome, ChoicesError> {
        self.ensure_interactive()?;
        let outcome = match key {
            Key::Enter => self.on_enter()?,
            Key::Escape => {
                if self.dropdown_open {
                    self.hide_dropdown();
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Up | Key::Down | Key::PageUp | Key::PageDown => self.on_direction(key),
            Key::Backspace | Key::Delete => self.on_delete()?,
            Key::SelectAll => {
                if self.input.is_empty() && !self.store.active_items().is_empty() {
                    self.highlight_where(true, |_| true)?;
                    KeyOutcome::Handled
                } else {
                    KeyOutcome::Ignored
                }
            }
        };
        self.render();
        Ok(outcome)
    }

    fn on_enter(&mut self) -> Result<KeyOutcome, ChoicesError> {
        if !self.mode.is_select() {
            if self.input.trim().is_empty() || !self.config.add_items {
                return Ok(KeyOutcome::Ignored);
            }
            let input = self.input.clone();
            let outcome = self.add_item(&input, None)?;
            if matches!(outcome, AddOutcome::Added(_)) {
                self.reset_input()?;
            }
            return Ok(outcome.into());
        }

        if !self.dropdown_open {
            self.show_dropdown();
            return Ok(KeyOutcome::Handled);
        }
        match self.reconciler.highlighted() {
            Some(id) => Ok(self.select_choice(id)?.into()),
            None => Ok(KeyOutcome::Ignored),
        }
    }

    fn on_direction(&mut self, key: Key) -> KeyOutcome {
        if !self.mode.is_select() {
            return KeyOutcome::Ignored;
        }
        self.dropdown_open = true;
        let Some(renderer) = self.renderer.as_mut() else {
            return KeyOutcome::Ignored;
        };
        let highlighted = match key {
            Key::Up => {
                self.last_direction = Direction::Up;
                self.reconciler.step(Direction::Up, renderer)
            }
            Key::Down => {
                self.last_direction = Direction::Down;
                self.reconciler.step(Direction::Down, renderer)
            }
            Key::PageUp => {
                self.last_direction = Direction::Up;
                self.reconciler.jump(Direction::Up, renderer)
            }
            _ => {
                self.last_direction = Direction::Down;
                self.reconciler.jump(Direction::Down, renderer)
            }
        };
        log::trace!(target: LOG_TARGET, "{key:?} -> {highlighted:?}");
        KeyOutcome::Handled
    }

    fn on_delete(&mut self) -> Result<KeyOutcome, ChoicesError> {
        if !self.input.is_empty() || self.mode == Mode::SingleSelect || !self.config.remove_items {
            return Ok(KeyOutcome::Ignored);
        }
        let active = self.store.active_items();
        let has_highlight = active.iter().any(|item| item.highlighted);
        let Some(last) = active.last().map(|item| (*item).clone()) else {
            return Ok(KeyOutcome::Ignored);
        };

        if has_highlight {
            return Ok(KeyOutcome::Removed(self.discard_items(|item| item.highlighted)?));
        }
        self.discard_item(&last)?;
        if self.config.edit_items {
            self.input = last.value;
            self.input_changed()?;
        }
        Ok(KeyOutcome::Removed(1))
    }

    /// Pointer hover over a choice.
    pub fn hover_choice(&mut self, id: ChoiceId) -> Result<Option<ChoiceId>, ChoicesError> {
        self.ensure_interactive()?;
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(None);
        };
        Ok(self.reconciler.target(id, renderer))
    }

    /// Pointer click on a choice.
    pub fn click_choice(&mut self, id: ChoiceId) -> Result<AddOutcome, ChoicesError> {
        self.hover_choice(id)?;
        self.select_choice(id)
    }

    // ------------------------------------------------------------------
    // Dropdown, enablement, scrolling
    // ------------------------------------------------------------------

    /// Open the dropdown.
    pub fn show_dropdown(&mut self) {
        self.dropdown_open = true;
    }

    /// Close the dropdown and stop any scroll animation.
    pub fn hide_dropdown(&mut self) {
        self.dropdown_open = false;
        self.scroll.cancel();
    }

    /// Accept user interaction again.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Refuse user interaction; programmatic calls keep working.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.hide_dropdown();
    }

    /// Start scrolling the highlighted choice (at `entry`) into view, replacing any running
    /// animation. Returns `None` if it is already visible.
    pub fn reveal_highlighted(
        &mut self,
        geometry: ScrollGeometry,
        entry: EntryBox,
    ) -> Option<AnimationHandle> {
        self.scroll.reveal(geometry, entry, self.last_direction)
    }

    /// Advance a scroll animation by one frame.
    pub fn scroll_frame(&mut self, handle: AnimationHandle, scroll_top: f64) -> ScrollStep {
        self.scroll.step(handle, scroll_top)
    }
}
