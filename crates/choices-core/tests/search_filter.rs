use choices_core::{
    Action, CallbackRegistry, ChoiceId, Choices, ChoicesEvent, Config, HeadlessRenderer,
    HostElement, Mode, NoticeKind, SearchEngine, SearchField, Store,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn fruit_store() -> Store {
    let mut store = Store::new();
    for label in ["Apple", "Banana", "Apricot"] {
        let id = ChoiceId::next(store.choices().len());
        store
            .dispatch(Action::add_choice(
                id,
                label.to_lowercase(),
                Some(label.to_string()),
                None,
                false,
            ))
            .unwrap();
    }
    store
}

fn active_labels(store: &Store) -> Vec<&str> {
    store
        .active_choices()
        .iter()
        .map(|choice| choice.label.as_str())
        .collect()
}

fn fruit_control(config: Config) -> Choices<HeadlessRenderer> {
    let host = HostElement::new(Mode::MultiSelect).with_choices(["Apple", "Banana", "Apricot"]);
    let mut choices = Choices::new(config, host);
    choices.init(HeadlessRenderer::new()).unwrap();
    choices
}

#[test]
fn test_search_ap_over_label_then_clear() {
    let mut store = fruit_store();
    let mut engine = SearchEngine::new(vec![SearchField::Label], 2, None);

    let results = engine.search("ap", store.searchable_choices());
    store.dispatch(Action::filter_choices(results)).unwrap();

    let mut labels = active_labels(&store);
    labels.sort();
    assert_eq!(labels, vec!["Apple", "Apricot"]);
    assert!(
        store
            .active_choices()
            .iter()
            .all(|choice| choice.score.is_some())
    );

    store.dispatch(Action::activate_choices(true)).unwrap();
    assert_eq!(active_labels(&store), vec!["Apple", "Banana", "Apricot"]);
}

#[test]
fn test_controller_search_narrows_and_clear_restores() {
    let config = Config {
        sort_fields: vec![SearchField::Label],
        ..Config::default()
    };
    let mut choices = fruit_control(config);

    choices.set_input("ap").unwrap();
    assert!(choices.is_searching());
    let mut painted = choices.renderer().unwrap().choice_labels();
    painted.sort();
    assert_eq!(painted, vec!["Apple", "Apricot"]);

    choices.clear_input().unwrap();
    assert!(!choices.is_searching());
    assert_eq!(choices.store().active_choices().len(), 3);
    assert_eq!(
        choices.renderer().unwrap().choice_labels(),
        vec!["Apple", "Apricot", "Banana"]
    );
}

#[test]
fn test_needle_below_floor_shows_everything() {
    let mut choices = fruit_control(Config::default());
    choices.set_input("ap").unwrap();
    assert_eq!(choices.store().active_choices().len(), 2);

    // Backspacing down to one character resets instead of searching.
    choices.set_input("a").unwrap();
    assert!(!choices.is_searching());
    assert_eq!(choices.store().active_choices().len(), 3);
}

#[test]
fn test_narrowing_then_widening_uses_full_haystack() {
    let mut choices = fruit_control(Config::default());
    choices.set_input("apr").unwrap();
    assert_eq!(choices.store().active_choices().len(), 1);
    choices.set_input("ap").unwrap();
    assert_eq!(choices.store().active_choices().len(), 2);
}

#[test]
fn test_zero_matches_shows_no_results_notice() {
    let mut choices = fruit_control(Config::default());
    choices.set_input("zzz").unwrap();

    assert!(choices.store().active_choices().is_empty());
    let notice = choices.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::NoResults);
    assert_eq!(notice.text, "No results found");
    assert_eq!(choices.highlighted_choice(), None);
}

#[test]
fn test_search_disabled_never_filters() {
    let config = Config {
        search: false,
        ..Config::default()
    };
    let mut choices = fruit_control(config);
    choices.set_input("ap").unwrap();
    assert!(!choices.is_searching());
    assert_eq!(choices.store().active_choices().len(), 3);
}

#[test]
fn test_selected_choices_are_not_searched() {
    let mut choices = fruit_control(Config::default());
    choices.set_value_by_choice(["Apple"]).unwrap();
    choices.set_input("ap").unwrap();

    assert_eq!(choices.renderer().unwrap().choice_labels(), vec!["Apricot"]);
}

#[test]
fn test_search_callback_reports_needle_and_count() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut registry = CallbackRegistry::new();
    registry.register("onSearch", move |event| sink.borrow_mut().push(event.clone()));

    let config = Config::from_json(&json!({ "callbackOnSearch": "onSearch" }), &registry).unwrap();
    let mut choices = fruit_control(config);
    choices.set_input("ap").unwrap();
    // Same trimmed needle: no second search.
    choices.set_input("ap ").unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![ChoicesEvent::Search {
            value: "ap".to_string(),
            result_count: 2,
        }]
    );
}

#[test]
fn test_search_result_limit() {
    let config = Config {
        search_result_limit: Some(1),
        ..Config::default()
    };
    let mut choices = fruit_control(config);
    choices.set_input("ap").unwrap();
    assert_eq!(choices.store().active_choices().len(), 1);
}
