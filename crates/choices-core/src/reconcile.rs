//! Render reconciliation.
//!
//! # Overview
//!
//! The [`Reconciler`] remembers the slice generations it last painted. On every pass it compares
//! them with the store's current generations and only calls into the [`Renderer`] for the parts
//! that moved:
//!
//! - **items**: the active-item projection is handed to [`Renderer::render_items`]
//! - **choices and groups** (one trigger, since groups are painted together with their
//!   children): a [`ChoiceList`] is built and handed to [`Renderer::render_choices`]
//!
//! After a choice pass the highlight is re-asserted through the [`HighlightMachine`], so
//! keyboard navigation keeps working when the list changes shape. When the renderer reports that
//! it produced nothing, a "no results" (while searching) or "no choices" notice is requested
//! instead.
//!
//! The renderer is an external collaborator: the core never inspects what it produces, only how
//! many nodes it reports.

use crate::config::{Config, SortFn};
use crate::highlight::{Direction, HighlightMachine, HighlightState};
use crate::ids::ChoiceId;
use crate::model::{Choice, Generations, Group, Item};
use crate::notice::{Notice, NoticeTexts};
use crate::search::{SearchField, compare_scores};
use crate::store::Store;
use std::cmp::Ordering;

/// Presentation collaborator.
pub trait Renderer {
    /// Paint the active items. Returns the number of nodes produced.
    fn render_items(&mut self, items: &[&Item]) -> usize;

    /// Paint the candidate list. Returns the number of nodes produced.
    fn render_choices(&mut self, list: &ChoiceList) -> usize;

    /// Paint a notice in place of the candidate list.
    fn render_notice(&mut self, notice: &Notice);

    /// Move the visual highlight (`None` clears it).
    fn highlight_choice(&mut self, id: Option<ChoiceId>);
}

/// One row of the candidate list.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceListEntry {
    /// A group header.
    Group(Group),
    /// A choice.
    Choice(Choice),
}

/// Options controlling how the candidate list is built.
#[derive(Clone, Copy)]
pub struct ListOptions<'a> {
    /// A search is active: flat list ordered by score, no render limit.
    pub searching: bool,
    /// Sort groups and choices when not searching.
    pub should_sort: bool,
    /// Fields used for the default alphabetical comparison.
    pub sort_fields: &'a [SearchField],
    /// Custom comparator overriding the alphabetical one.
    pub sort_fn: Option<&'a SortFn>,
    /// Maximum number of choices outside search.
    pub render_limit: Option<usize>,
}

impl<'a> ListOptions<'a> {
    /// Derive list options from the control configuration.
    pub fn from_config(config: &'a Config, searching: bool) -> Self {
        Self {
            searching,
            should_sort: config.should_sort,
            sort_fields: &config.sort_fields,
            sort_fn: config.sort_fn.as_ref(),
            render_limit: config.render_choice_limit,
        }
    }

    fn compare(&self, a: &Choice, b: &Choice) -> Ordering {
        if self.searching {
            return compare_scores(a, b);
        }
        if let Some(sort_fn) = self.sort_fn {
            return sort_fn(a, b);
        }
        self.sort_fields
            .iter()
            .map(|field| compare_alpha(field.extract(a), field.extract(b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    fn sort(&self, choices: &mut [&Choice]) {
        if self.searching || self.should_sort {
            choices.sort_by(|a, b| self.compare(a, b));
        }
    }
}

fn compare_alpha(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// The ordered candidate list handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceList {
    entries: Vec<ChoiceListEntry>,
}

impl ChoiceList {
    /// Build the list from the store.
    ///
    /// Visible groups are rendered (each followed by its active, unselected children) unless a
    /// search is running; choices without a group follow the groups. Otherwise the list is flat.
    pub fn build(store: &Store, options: &ListOptions<'_>) -> Self {
        let visible = |choice: &&Choice| choice.active && !choice.selected;
        let mut groups = store.active_groups();
        let mut entries = Vec::new();
        let mut remaining = if options.searching {
            None
        } else {
            options.render_limit
        };
        let mut push_choices = |entries: &mut Vec<ChoiceListEntry>,
                                group: Option<&Group>,
                                mut choices: Vec<&Choice>| {
            // A header is only shown above at least one child.
            if choices.is_empty() || remaining == Some(0) {
                return;
            }
            if let Some(group) = group {
                entries.push(ChoiceListEntry::Group(group.clone()));
            }
            options.sort(&mut choices);
            for choice in choices {
                if remaining == Some(0) {
                    break;
                }
                entries.push(ChoiceListEntry::Choice(choice.clone()));
                remaining = remaining.map(|left| left - 1);
            }
        };

        if !options.searching && !groups.is_empty() {
            if options.should_sort {
                groups.sort_by(|a, b| compare_alpha(&a.label, &b.label));
            }
            for group in groups {
                let children: Vec<&Choice> = store
                    .choices()
                    .iter()
                    .filter(visible)
                    .filter(|choice| choice.group_id == Some(group.id))
                    .collect();
                push_choices(&mut entries, Some(group), children);
            }
            let ungrouped: Vec<&Choice> = store
                .choices()
                .iter()
                .filter(visible)
                .filter(|choice| choice.group_id.is_none())
                .collect();
            push_choices(&mut entries, None, ungrouped);
        } else {
            let flat: Vec<&Choice> = store.choices().iter().filter(visible).collect();
            push_choices(&mut entries, None, flat);
        }

        Self { entries }
    }

    /// Rows in display order.
    pub fn entries(&self) -> &[ChoiceListEntry] {
        &self.entries
    }

    /// Number of rows, headers included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Choices in display order.
    pub fn choices(&self) -> impl Iterator<Item = &Choice> {
        self.entries.iter().filter_map(|entry| match entry {
            ChoiceListEntry::Choice(choice) => Some(choice),
            ChoiceListEntry::Group(_) => None,
        })
    }

    /// Ids of the choices that can take the highlight (not disabled), in display order.
    pub fn eligible(&self) -> Vec<ChoiceId> {
        self.choices()
            .filter(|choice| !choice.disabled)
            .map(|choice| choice.id)
            .collect()
    }
}

/// Per-pass input from the controller.
pub struct ReconcileContext<'a> {
    /// How to build the candidate list.
    pub list: ListOptions<'a>,
    /// Notice texts for the empty-list fallbacks.
    pub texts: &'a NoticeTexts,
    /// A notice that replaces the candidate list (add-item prompt or policy refusal).
    pub notice: Option<&'a Notice>,
    /// Repaint the candidate list even if no slice moved.
    pub force_choices: bool,
}

/// What a reconcile pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Nodes produced for items, if items were repainted.
    pub items_rendered: Option<usize>,
    /// Nodes produced for the candidate list, if it was repainted.
    pub choices_rendered: Option<usize>,
    /// The notice painted instead of choices, if any.
    pub notice: Option<Notice>,
    /// The highlighted choice after the pass.
    pub highlighted: Option<ChoiceId>,
}

/// Diffs store generations against the last painted ones.
#[derive(Debug, Default)]
pub struct Reconciler {
    rendered: Option<Generations>,
    eligible: Vec<ChoiceId>,
    highlight: HighlightMachine,
    restore_pending: bool,
}

impl Reconciler {
    /// A reconciler that has painted nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what was painted; the next pass repaints everything.
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    /// Run one pass.
    pub fn reconcile<R>(
        &mut self,
        store: &Store,
        ctx: &ReconcileContext<'_>,
        renderer: &mut R,
    ) -> ReconcileReport
    where
        R: Renderer + ?Sized,
    {
        let current = store.generations();
        let previous = self.rendered;
        let mut report = ReconcileReport::default();

        if previous.is_none_or(|seen| seen.items != current.items) {
            report.items_rendered = Some(renderer.render_items(&store.active_items()));
        }

        let choices_moved = previous
            .is_none_or(|seen| seen.choices != current.choices || seen.groups != current.groups);
        if choices_moved || ctx.force_choices || self.restore_pending {
            self.render_choices(store, ctx, renderer, &mut report);
        } else {
            report.highlighted = self.highlighted();
        }

        self.rendered = Some(current);
        report
    }

    fn render_choices<R>(
        &mut self,
        store: &Store,
        ctx: &ReconcileContext<'_>,
        renderer: &mut R,
        report: &mut ReconcileReport,
    ) where
        R: Renderer + ?Sized,
    {
        self.restore_pending = false;
        if let Some(notice) = ctx.notice {
            renderer.render_notice(notice);
            self.show_notice(notice.clone(), renderer, report);
            return;
        }

        let list = ChoiceList::build(store, &ctx.list);
        let produced = renderer.render_choices(&list);
        report.choices_rendered = Some(produced);

        if produced == 0 {
            let notice = if ctx.list.searching {
                ctx.texts.no_results()
            } else {
                ctx.texts.no_choices()
            };
            log::debug!(target: "choices_core::reconcile", "empty list, showing {:?}", notice.kind);
            renderer.render_notice(&notice);
            self.show_notice(notice, renderer, report);
            return;
        }

        self.eligible = list.eligible();
        let highlighted = self.highlight.restore(&self.eligible);
        renderer.highlight_choice(highlighted);
        report.highlighted = highlighted;
    }

    fn show_notice<R>(&mut self, notice: Notice, renderer: &mut R, report: &mut ReconcileReport)
    where
        R: Renderer + ?Sized,
    {
        self.eligible.clear();
        self.highlight.restore(&self.eligible);
        renderer.highlight_choice(None);
        report.highlighted = None;
        report.notice = Some(notice);
    }

    /// Eligible choice ids as last painted.
    pub fn eligible(&self) -> &[ChoiceId] {
        &self.eligible
    }

    /// Highlight machine state.
    pub fn highlight_state(&self) -> HighlightState {
        self.highlight.state()
    }

    /// The highlighted choice, if any.
    pub fn highlighted(&self) -> Option<ChoiceId> {
        self.highlight.current(&self.eligible)
    }

    /// Arrow-key step.
    pub fn step<R>(&mut self, direction: Direction, renderer: &mut R) -> Option<ChoiceId>
    where
        R: Renderer + ?Sized,
    {
        let highlighted = self.highlight.step(&self.eligible, direction);
        renderer.highlight_choice(highlighted);
        highlighted
    }

    /// Page-key jump to the first or last eligible choice.
    pub fn jump<R>(&mut self, direction: Direction, renderer: &mut R) -> Option<ChoiceId>
    where
        R: Renderer + ?Sized,
    {
        let highlighted = self.highlight.jump(&self.eligible, direction);
        renderer.highlight_choice(highlighted);
        highlighted
    }

    /// Pointer target.
    pub fn target<R>(&mut self, id: ChoiceId, renderer: &mut R) -> Option<ChoiceId>
    where
        R: Renderer + ?Sized,
    {
        let highlighted = self.highlight.target(&self.eligible, id);
        renderer.highlight_choice(highlighted);
        highlighted
    }

    /// Drop the highlight; the next pass repaints the list and restores it at the top, even
    /// when no slice changed.
    pub fn reset_highlight(&mut self) {
        self.highlight.reset();
        self.restore_pending = true;
    }

    /// Whether a highlight reset is waiting for a pass.
    pub fn needs_pass(&self) -> bool {
        self.restore_pending
    }
}

/// A renderer that records what it was asked to paint.
///
/// Every choice, group header and item counts as one node.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    /// Last painted items.
    pub items: Vec<Item>,
    /// Last painted candidate rows.
    pub entries: Vec<ChoiceListEntry>,
    /// Notice currently shown, if any.
    pub notice: Option<Notice>,
    /// Highlighted choice.
    pub highlighted: Option<ChoiceId>,
    /// Number of item passes.
    pub item_renders: usize,
    /// Number of candidate-list passes.
    pub choice_renders: usize,
}

impl HeadlessRenderer {
    /// Create an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of the painted items.
    pub fn item_values(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.value.as_str()).collect()
    }

    /// Labels of the painted choices (headers excluded).
    pub fn choice_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                ChoiceListEntry::Choice(choice) => Some(choice.label.as_str()),
                ChoiceListEntry::Group(_) => None,
            })
            .collect()
    }
}

impl Renderer for HeadlessRenderer {
    fn render_items(&mut self, items: &[&Item]) -> usize {
        self.items = items.iter().map(|item| (*item).clone()).collect();
        self.item_renders += 1;
        self.items.len()
    }

    fn render_choices(&mut self, list: &ChoiceList) -> usize {
        self.entries = list.entries().to_vec();
        self.notice = None;
        self.choice_renders += 1;
        self.entries.len()
    }

    fn render_notice(&mut self, notice: &Notice) {
        self.entries.clear();
        self.notice = Some(notice.clone());
    }

    fn highlight_choice(&mut self, id: Option<ChoiceId>) {
        self.highlighted = id;
    }
}
