use choices_core::{
    AddOutcome, CallbackRegistry, ChoiceId, ChoiceListEntry, ChoiceSpec, Choices, ChoicesError,
    ChoicesEvent, Config, HeadlessRenderer, HostElement, ItemId, Key, KeyOutcome, Mode,
    NoticeKind, Value,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn init(config: Config, host: HostElement) -> Choices<HeadlessRenderer> {
    let mut choices = Choices::new(config, host);
    choices.init(HeadlessRenderer::new()).unwrap();
    choices
}

fn values(choices: &Choices<HeadlessRenderer>) -> Vec<String> {
    match choices.value() {
        Value::Multiple(values) => values,
        Value::Single(value) => value.into_iter().collect(),
    }
}

fn recording_registry() -> (CallbackRegistry, Rc<RefCell<Vec<ChoicesEvent>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let mut registry = CallbackRegistry::new();
    registry.register("record", move |event| sink.borrow_mut().push(event.clone()));
    (registry, events)
}

#[test]
fn test_multi_select_max_item_count() {
    let config = Config {
        max_item_count: Some(2),
        ..Config::default()
    };
    let host = HostElement::new(Mode::MultiSelect).with_choices(["a", "b", "c"]);
    let mut choices = init(config, host);

    assert!(matches!(choices.add_item("a", None).unwrap(), AddOutcome::Added(_)));
    assert!(matches!(choices.add_item("b", None).unwrap(), AddOutcome::Added(_)));
    assert_eq!(values(&choices), vec!["a", "b"]);

    let outcome = choices.add_item("c", None).unwrap();
    let AddOutcome::Rejected(notice) = outcome else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert_eq!(notice.kind, NoticeKind::MaxItems);
    assert_eq!(notice.text, "Only 2 values can be added.");
    assert_eq!(values(&choices), vec!["a", "b"]);
    assert_eq!(
        choices.renderer().unwrap().notice.as_ref().map(|n| n.text.as_str()),
        Some("Only 2 values can be added.")
    );
}

#[test]
fn test_max_items_notice_replaces_choices_until_room_frees_up() {
    let config = Config {
        max_item_count: Some(1),
        ..Config::default()
    };
    let host = HostElement::new(Mode::MultiSelect).with_choices(["a", "b"]);
    let mut choices = init(config, host);

    let outcome = choices.select_choice(ChoiceId(1)).unwrap();
    assert_eq!(outcome, AddOutcome::Added(ItemId(1)));
    assert_eq!(choices.notice().map(|n| n.kind), Some(NoticeKind::MaxItems));
    assert!(matches!(
        choices.select_choice(ChoiceId(2)).unwrap(),
        AddOutcome::Rejected(_)
    ));

    choices.remove_item(ItemId(1)).unwrap();
    assert_eq!(choices.notice(), None);
    assert_eq!(choices.renderer().unwrap().choice_labels(), vec!["a", "b"]);
}

#[test]
fn test_free_text_duplicates_rejected() {
    let config = Config {
        duplicate_items: false,
        ..Config::default()
    };
    let mut choices = init(config, HostElement::new(Mode::FreeText));

    assert!(matches!(choices.add_item("x", None).unwrap(), AddOutcome::Added(_)));
    let outcome = choices.add_item("x", None).unwrap();
    let AddOutcome::Rejected(notice) = outcome else {
        panic!("expected a rejection, got {outcome:?}");
    };
    assert_eq!(notice.text, "Only unique values can be added.");
    assert_eq!(values(&choices), vec!["x"]);
}

#[test]
fn test_free_text_typing_shows_prompt_and_enter_commits() {
    let mut choices = init(Config::default(), HostElement::new(Mode::FreeText));
    choices.set_input("hello").unwrap();
    let notice = choices.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::AddItem);
    assert_eq!(notice.text, "Press Enter to add \"hello\"");

    let outcome = choices.handle_key(Key::Enter).unwrap();
    assert_eq!(outcome, KeyOutcome::Added(ItemId(1)));
    assert_eq!(choices.input(), "");
    assert_eq!(choices.renderer().unwrap().item_values(), vec!["hello"]);
}

#[test]
fn test_regex_filter_refuses_typed_value() {
    let config = Config::default().with_regex_filter(r"^[^@]+@[^@]+$").unwrap();
    let mut choices = init(config, HostElement::new(Mode::FreeText));

    choices.set_input("nope").unwrap();
    assert_eq!(
        choices.notice().map(|n| n.kind),
        Some(NoticeKind::CustomRejected)
    );
    assert!(matches!(
        choices.handle_key(Key::Enter).unwrap(),
        KeyOutcome::Rejected(_)
    ));
    assert_eq!(choices.input(), "nope");

    choices.set_input("me@example.com").unwrap();
    assert!(matches!(
        choices.handle_key(Key::Enter).unwrap(),
        KeyOutcome::Added(_)
    ));
}

#[test]
fn test_add_items_disabled_ignores_enter() {
    let config = Config {
        add_items: false,
        ..Config::default()
    };
    let mut choices = init(config, HostElement::new(Mode::FreeText));
    choices.set_input("x").unwrap();
    assert_eq!(choices.handle_key(Key::Enter).unwrap(), KeyOutcome::Ignored);
    assert!(choices.store().active_items().is_empty());
}

#[test]
fn test_serialized_value_uses_delimiter() {
    let config = Config {
        delimiter: "|".to_string(),
        ..Config::default()
    };
    let mut choices = init(
        config,
        HostElement::new(Mode::FreeText).with_items(["a", "b"]),
    );
    choices.set_value(["c"]).unwrap();
    assert_eq!(choices.serialized_value(), "a|b|c");
    assert_eq!(
        choices.value(),
        Value::Multiple(vec!["a".into(), "b".into(), "c".into()])
    );
}

#[test]
fn test_prepend_and_append_value() {
    let mut config = Config::default();
    config.prepend_value = Some("#".to_string());
    config.append_value = Some("!".to_string());
    let mut choices = init(config, HostElement::new(Mode::FreeText));
    choices.add_item("tag", None).unwrap();
    assert_eq!(choices.serialized_value(), "#tag!");
}

#[test]
fn test_duplicates_compare_decorated_values() {
    let mut config = Config {
        duplicate_items: false,
        ..Config::default()
    };
    config.prepend_value = Some("#".to_string());
    let mut choices = init(config, HostElement::new(Mode::FreeText));

    assert_eq!(choices.add_item("x", None).unwrap(), AddOutcome::Added(ItemId(1)));
    let outcome = choices.add_item("x", None).unwrap();
    assert!(matches!(
        outcome,
        AddOutcome::Rejected(ref notice) if notice.kind == NoticeKind::NotUnique
    ));
    // The prompt shown while typing agrees with Enter.
    choices.set_input("x").unwrap();
    assert_eq!(choices.notice().map(|n| n.kind), Some(NoticeKind::NotUnique));
    assert_eq!(choices.serialized_value(), "#x");
}

#[test]
fn test_add_item_matching_existing_choice_keeps_its_label() {
    let host = HostElement::new(Mode::MultiSelect)
        .with_choice(ChoiceSpec::new("nl").label("Netherlands"));
    let mut choices = init(Config::default(), host);

    assert!(matches!(
        choices.add_item("nl", Some("Holland")).unwrap(),
        AddOutcome::Added(_)
    ));
    assert_eq!(choices.store().active_items()[0].label, "Netherlands");
    assert_eq!(choices.store().choices().len(), 1);
}

#[test]
fn test_single_select_presets_and_replacement() {
    let host = HostElement::new(Mode::SingleSelect)
        .with_choices(["one", "two", "three"])
        .with_items(["two"]);
    let mut choices = init(Config::default(), host);
    assert_eq!(choices.value(), Value::Single(Some("two".to_string())));

    choices.show_dropdown();
    choices.click_choice(ChoiceId(3)).unwrap();
    assert_eq!(choices.value(), Value::Single(Some("three".to_string())));
    assert!(!choices.is_dropdown_open());
    assert_eq!(choices.store().active_items().len(), 1);
}

#[test]
fn test_single_select_keeps_one_highlight() {
    let host = HostElement::new(Mode::SingleSelect).with_choices(["a", "b"]);
    let mut choices = init(Config::default(), host);
    choices.select_choice(ChoiceId(2)).unwrap();

    choices.highlight_all().unwrap();
    choices.click_item(ItemId(2), true).unwrap();
    assert!(choices.store().highlighted_items().len() <= 1);
}

#[test]
fn test_grouped_choices_render_under_headers() {
    let host = HostElement::new(Mode::MultiSelect)
        .with_group(
            "Fruit",
            vec![ChoiceSpec::new("pear"), ChoiceSpec::new("fig").selected()],
        )
        .with_group("Veg", vec![ChoiceSpec::new("kale")]);
    let choices = init(Config::default(), host);

    let rows: Vec<String> = choices
        .renderer()
        .unwrap()
        .entries
        .iter()
        .map(|entry| match entry {
            ChoiceListEntry::Group(group) => format!("[{}]", group.label),
            ChoiceListEntry::Choice(choice) => choice.value.clone(),
        })
        .collect();
    assert_eq!(rows, vec!["[Fruit]", "pear", "[Veg]", "kale"]);
    assert_eq!(values(&choices), vec!["fig"]);
}

#[test]
fn test_disabled_group_disables_children() {
    let mut choices = init(Config::default(), HostElement::new(Mode::MultiSelect));
    choices
        .set_choices(
            &[json!({
                "label": "Closed",
                "disabled": true,
                "choices": [{ "id": "a", "name": "A" }],
            })],
            "id",
            "name",
        )
        .unwrap();
    assert!(choices.store().choices()[0].disabled);
    assert!(choices.store().active_groups().is_empty());
    assert_eq!(
        choices.select_choice(ChoiceId(1)).unwrap(),
        AddOutcome::Ignored
    );
}

#[test]
fn test_set_choices_rejects_free_text_and_missing_fields() {
    let mut text = init(Config::default(), HostElement::new(Mode::FreeText));
    assert!(matches!(
        text.set_choices(&[json!({ "value": "a" })], "value", "label"),
        Err(ChoicesError::InvalidArgument(_))
    ));

    let mut select = init(Config::default(), HostElement::new(Mode::MultiSelect));
    assert!(matches!(
        select.set_choices(&[json!({ "value": "a" })], "", "label"),
        Err(ChoicesError::InvalidArgument(_))
    ));
    assert_eq!(
        select.set_choices(&[json!({ "value": "a", "label": "A" })], "value", "label"),
        Ok(1)
    );
    assert_eq!(select.renderer().unwrap().choice_labels(), vec!["A"]);
}

#[test]
fn test_set_value_by_choice_skips_unknown_values() {
    let host = HostElement::new(Mode::MultiSelect).with_choices(["a", "b"]);
    let mut choices = init(Config::default(), host);
    assert_eq!(choices.set_value_by_choice(["b", "missing"]).unwrap(), 1);
    assert_eq!(values(&choices), vec!["b"]);
    assert!(choices.store().choice_by_id(ChoiceId(2)).unwrap().selected);
}

#[test]
fn test_backspace_removes_highlighted_items_first() {
    let mut choices = init(
        Config::default(),
        HostElement::new(Mode::FreeText).with_items(["a", "b", "c"]),
    );
    choices.click_item(ItemId(1), false).unwrap();
    choices.click_item(ItemId(2), true).unwrap();
    assert_eq!(choices.store().highlighted_items().len(), 2);

    assert_eq!(
        choices.handle_key(Key::Backspace).unwrap(),
        KeyOutcome::Removed(2)
    );
    assert_eq!(values(&choices), vec!["c"]);
}

#[test]
fn test_select_all_then_delete() {
    let mut choices = init(
        Config::default(),
        HostElement::new(Mode::FreeText).with_items(["a", "b"]),
    );
    assert_eq!(choices.handle_key(Key::SelectAll).unwrap(), KeyOutcome::Handled);
    assert_eq!(
        choices.handle_key(Key::Delete).unwrap(),
        KeyOutcome::Removed(2)
    );
    assert!(values(&choices).is_empty());
}

#[test]
fn test_remove_items_disabled_blocks_backspace() {
    let config = Config {
        remove_items: false,
        ..Config::default()
    };
    let mut choices = init(config, HostElement::new(Mode::FreeText).with_items(["a"]));
    assert_eq!(choices.handle_key(Key::Backspace).unwrap(), KeyOutcome::Ignored);
    assert_eq!(values(&choices), vec!["a"]);
}

#[test]
fn test_removing_item_makes_choice_selectable_again() {
    let host = HostElement::new(Mode::MultiSelect).with_choices(["a", "b"]);
    let mut choices = init(Config::default(), host);
    choices.select_choice(ChoiceId(1)).unwrap();
    assert_eq!(choices.renderer().unwrap().choice_labels(), vec!["b"]);

    assert_eq!(choices.remove_active_items_by_value("a").unwrap(), 1);
    assert_eq!(choices.renderer().unwrap().choice_labels(), vec!["a", "b"]);
}

#[test]
fn test_remove_active_items_with_exclusion() {
    let mut choices = init(
        Config::default(),
        HostElement::new(Mode::FreeText).with_items(["a", "b", "c"]),
    );
    assert_eq!(choices.remove_active_items(Some(ItemId(2))).unwrap(), 2);
    assert_eq!(values(&choices), vec!["b"]);
}

#[test]
fn test_callbacks_fire_for_item_lifecycle() {
    let (registry, events) = recording_registry();
    let options = json!({
        "callbackOnInit": "record",
        "callbackOnAddItem": "record",
        "callbackOnRemoveItem": "record",
        "callbackOnHighlightItem": "record",
        "callbackOnUnhighlightItem": "record",
        "callbackOnChange": "record",
    });
    let host = HostElement::new(Mode::MultiSelect)
        .with_group("Letters", vec![ChoiceSpec::new("a")]);
    let mut choices = Choices::from_json(&options, &registry, host).unwrap();
    choices.init(HeadlessRenderer::new()).unwrap();

    choices.select_choice(ChoiceId(1)).unwrap();
    choices.highlight_item(ItemId(1)).unwrap();
    choices.unhighlight_item(ItemId(1)).unwrap();
    choices.remove_item(ItemId(1)).unwrap();

    let group = Some("Letters".to_string());
    assert_eq!(
        *events.borrow(),
        vec![
            ChoicesEvent::Init,
            ChoicesEvent::AddItem {
                id: ItemId(1),
                value: "a".to_string(),
                group: group.clone(),
            },
            ChoicesEvent::Change {
                value: "a".to_string()
            },
            ChoicesEvent::HighlightItem {
                id: ItemId(1),
                value: "a".to_string(),
                group: group.clone(),
            },
            ChoicesEvent::UnhighlightItem {
                id: ItemId(1),
                value: "a".to_string(),
                group: group.clone(),
            },
            ChoicesEvent::RemoveItem {
                id: ItemId(1),
                value: "a".to_string(),
                group,
            },
            ChoicesEvent::Change {
                value: "a".to_string()
            },
        ]
    );
}

#[test]
fn test_unresolvable_callback_is_a_config_error() {
    let registry = CallbackRegistry::new();
    let result: Result<Choices<HeadlessRenderer>, _> = Choices::from_json(
        &json!({ "callbackOnChange": "nowhere" }),
        &registry,
        HostElement::new(Mode::FreeText),
    );
    assert!(matches!(result, Err(ChoicesError::Config(_))));
}

#[test]
fn test_clear_store_restarts_ids() {
    let mut choices = init(
        Config::default(),
        HostElement::new(Mode::FreeText).with_items(["a", "b"]),
    );
    choices.clear_store().unwrap();
    assert!(choices.store().items().is_empty());
    assert_eq!(choices.add_item("c", None).unwrap(), AddOutcome::Added(ItemId(1)));
}

#[test]
fn test_empty_select_shows_no_choices_notice() {
    let choices = init(Config::default(), HostElement::new(Mode::MultiSelect));
    let notice = choices.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::NoChoices);
    assert_eq!(notice.text, "No choices to choose from");
}
