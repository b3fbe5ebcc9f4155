use choices_core::{
    Action, ChoiceDelivery, Choices, ChoicesError, Config, HeadlessRenderer, HostElement, ItemId,
    Mode, Store,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn control() -> Choices<HeadlessRenderer> {
    let mut choices = Choices::new(Config::default(), HostElement::new(Mode::MultiSelect));
    choices.init(HeadlessRenderer::new()).unwrap();
    choices
}

#[test]
fn test_synchronous_delivery_is_applied_immediately() {
    let mut choices = control();
    let added = choices
        .fetch_choices(|delivery| {
            delivery
                .deliver(
                    &[json!({ "code": "nl", "name": "Netherlands" })],
                    "code",
                    "name",
                )
                .unwrap();
        })
        .unwrap();
    assert_eq!(added, 1);
    assert!(!choices.is_loading());
    assert_eq!(
        choices.renderer().unwrap().choice_labels(),
        vec!["Netherlands"]
    );
}

#[test]
fn test_late_and_repeated_deliveries() {
    let mut choices = control();
    let handle: Rc<RefCell<Option<ChoiceDelivery>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&handle);
    assert_eq!(
        choices
            .fetch_choices(move |delivery| *slot.borrow_mut() = Some(delivery))
            .unwrap(),
        0
    );
    assert!(choices.is_loading());

    let delivery = handle.borrow_mut().take().unwrap();
    // Zero results, then two batches.
    assert_eq!(delivery.deliver(&[], "value", "label"), Ok(0));
    assert_eq!(
        delivery.deliver(&[json!({ "value": "a" })], "value", "label"),
        Ok(1)
    );
    assert_eq!(
        delivery.deliver(
            &[json!({ "value": "b" }), json!({ "value": "c", "selected": true })],
            "value",
            "label"
        ),
        Ok(2)
    );

    assert_eq!(choices.process_deliveries().unwrap(), 3);
    assert!(!choices.is_loading());
    assert_eq!(choices.store().choices().len(), 3);
    assert_eq!(choices.serialized_value(), "c");
    assert_eq!(choices.process_deliveries().unwrap(), 0);
}

#[test]
fn test_delivery_after_destroy_is_rejected() {
    let mut choices = control();
    let handle: Rc<RefCell<Option<ChoiceDelivery>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&handle);
    choices
        .fetch_choices(move |delivery| *slot.borrow_mut() = Some(delivery))
        .unwrap();
    let delivery = handle.borrow_mut().take().unwrap();
    assert!(delivery.is_open());

    choices.destroy();
    assert!(!delivery.is_open());
    assert_eq!(
        delivery.deliver(&[json!({ "value": "late" })], "value", "label"),
        Err(ChoicesError::Released)
    );
    assert_eq!(choices.process_deliveries(), Err(ChoicesError::Released));
    assert_eq!(
        choices.add_item("x", None),
        Err(ChoicesError::Released)
    );
    assert!(choices.store().choices().is_empty());
}

#[test]
fn test_delivery_outliving_the_control_is_rejected() {
    let handle: Rc<RefCell<Option<ChoiceDelivery>>> = Rc::new(RefCell::new(None));
    {
        let mut choices = control();
        let slot = Rc::clone(&handle);
        choices
            .fetch_choices(move |delivery| *slot.borrow_mut() = Some(delivery))
            .unwrap();
    }
    let delivery = handle.borrow_mut().take().unwrap();
    assert_eq!(
        delivery.deliver(&[json!({ "value": "late" })], "value", "label"),
        Err(ChoicesError::Released)
    );
}

#[test]
fn test_delivery_while_searching_is_filtered() {
    let host = HostElement::new(Mode::MultiSelect).with_choices(["Apple"]);
    let mut choices = Choices::new(Config::default(), host);
    choices.init(HeadlessRenderer::new()).unwrap();
    choices.set_input("ap").unwrap();

    choices
        .fetch_choices(|delivery| {
            delivery
                .deliver(
                    &[json!({ "value": "Apricot" }), json!({ "value": "Banana" })],
                    "value",
                    "label",
                )
                .unwrap();
        })
        .unwrap();

    let mut labels = choices.renderer().unwrap().choice_labels();
    labels.sort();
    assert_eq!(labels, vec!["Apple", "Apricot"]);
}

#[test]
fn test_released_store_rejects_dispatch() {
    let mut store = Store::new();
    store.dispatch(Action::add_item(ItemId(1), "a", None)).unwrap();
    store.release();
    assert!(store.items().is_empty());
    assert_eq!(
        store.dispatch(Action::add_item(ItemId(1), "b", None)),
        Err(ChoicesError::Released)
    );
}

#[test]
fn test_free_text_cannot_fetch() {
    let mut choices = Choices::new(Config::default(), HostElement::new(Mode::FreeText));
    choices.init(HeadlessRenderer::new()).unwrap();
    assert!(matches!(
        choices.fetch_choices(|_| {}),
        Err(ChoicesError::InvalidArgument(_))
    ));
}
