#![warn(missing_docs)]
//! Choices Core - Headless Tagging/Autocomplete Control Engine
//!
//! # Overview
//!
//! `choices-core` is the state engine behind an enhanced select/text input: a tagging and
//! autocomplete control with keyboard navigation, fuzzy search and multi-select semantics.
//! It does not draw anything; the host supplies a [`Renderer`] and feeds user events into a
//! [`Choices`] controller, which keeps the authoritative model and tells the renderer what to
//! repaint.
//!
//! # Core Features
//!
//! - **Action/Reducer Store**: items, choices and groups mutated only through dispatched actions
//! - **Generation-based Change Detection**: listeners and the renderer only see real changes
//! - **Fuzzy Search**: `nucleo`-backed ranking with a search floor and normalised scores
//! - **Highlight State Machine**: clamped keyboard navigation that survives list reshaping
//! - **Add-item Policy**: item limits, uniqueness and pattern filters surfaced as notices
//! - **Async Choice Sources**: late deliveries are queued, and rejected after teardown
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Choices controller (keys, input, pointer)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Reconciler + Highlight machine + Scroll    │  ← Presentation sync
//! ├─────────────────────────────────────────────┤
//! │  Search engine          Add-item policy     │  ← Decisions
//! ├─────────────────────────────────────────────┤
//! │  Store (dispatch / subscribe / queries)     │  ← State
//! ├─────────────────────────────────────────────┤
//! │  Reducers + Actions + Ids                   │  ← Pure core
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use choices_core::{Choices, Config, HeadlessRenderer, HostElement, Key, Mode};
//!
//! let host = HostElement::new(Mode::MultiSelect).with_choices(["Apple", "Banana", "Apricot"]);
//! let mut choices = Choices::new(Config::default(), host);
//! choices.init(HeadlessRenderer::new()).unwrap();
//!
//! // Narrow the list, then pick the highlighted match
//! choices.set_input("ap").unwrap();
//! assert_eq!(choices.store().active_choices().len(), 2);
//! choices.handle_key(Key::Down).unwrap();
//! choices.handle_key(Key::Enter).unwrap();
//!
//! assert_eq!(choices.store().active_items().len(), 1);
//! assert_eq!(choices.input(), "");
//! ```
//!
//! # Module Description
//!
//! - [`ids`] - Identifier allocation derived from slice length
//! - [`model`] - Items, choices, groups and versioned slices
//! - [`actions`] / [`reducers`] / [`store`] - The action/reducer store
//! - [`search`] - Fuzzy search and ranking
//! - [`highlight`] - Choice highlight state machine
//! - [`reconcile`] - Render reconciliation and the renderer interface
//! - [`scroll`] - Cancellable scroll-into-view animation
//! - [`policy`] / [`notice`] - Add-item guards and the notices they produce
//! - [`config`] - Options, callbacks and their validation
//! - [`host`] / [`source`] - Host element description and choice sources
//! - [`controller`] - The [`Choices`] facade

pub mod actions;
pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod host;
pub mod ids;
pub mod model;
pub mod notice;
pub mod policy;
pub mod reconcile;
pub mod reducers;
pub mod scroll;
pub mod search;
pub mod source;
pub mod store;

pub use actions::{Action, ChoiceAction, GroupAction, ItemAction};
pub use config::{Callback, CallbackRegistry, Callbacks, ChoicesEvent, Config, SortFn};
pub use controller::{AddOutcome, Choices, Key, KeyOutcome, Value};
pub use error::{ChoicesError, ConfigError};
pub use highlight::{Direction, HighlightMachine, HighlightState};
pub use host::{HostElement, Mode};
pub use ids::{ChoiceId, GroupId, ItemId, next_id};
pub use model::{Choice, Generations, Group, Item, Slice, State};
pub use notice::{Notice, NoticeKind, NoticeTexts};
pub use policy::{AddDecision, check_add};
pub use reconcile::{
    ChoiceList, ChoiceListEntry, HeadlessRenderer, ListOptions, ReconcileContext,
    ReconcileReport, Reconciler, Renderer,
};
pub use reducers::{reduce_choices, reduce_groups, reduce_items};
pub use scroll::{AnimationHandle, EntryBox, ScrollAnimator, ScrollGeometry, ScrollStep};
pub use search::{
    DEFAULT_SEARCH_FLOOR, SearchEngine, SearchField, SearchRequest, SearchResult, compare_scores,
};
pub use source::{ChoiceDelivery, ChoiceSpec, GroupSpec, SourceEntry, parse_results};
pub use store::{Listener, ListenerId, Store};
