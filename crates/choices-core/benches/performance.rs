use choices_core::{
    Action, ChoiceId, ChoiceList, Choices, Config, HeadlessRenderer, HostElement, ItemId,
    ListOptions, Mode, SearchEngine, SearchField, Store,
};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn label(i: usize) -> String {
    format!("{i:05} quick brown fox option")
}

fn large_store(choice_count: usize) -> Store {
    let mut store = Store::new();
    for i in 0..choice_count {
        store
            .dispatch(Action::add_choice(
                ChoiceId::next(i),
                format!("value-{i}"),
                Some(label(i)),
                None,
                false,
            ))
            .unwrap();
    }
    store
}

fn bench_search_large_haystack(c: &mut Criterion) {
    let store = large_store(10_000);
    let mut engine = SearchEngine::new(vec![SearchField::Label, SearchField::Value], 1, None);

    c.bench_function("search/10k_choices", |b| {
        b.iter(|| {
            let results = engine.search(black_box("brwn fx 42"), store.searchable_choices());
            black_box(results.len());
            engine.reset();
        })
    });
}

fn bench_dispatch_items(c: &mut Criterion) {
    c.bench_function("dispatch/1k_add_items", |b| {
        b.iter_batched(
            Store::new,
            |mut store| {
                for i in 0..1_000 {
                    store
                        .dispatch(Action::add_item(ItemId::next(i), format!("tag-{i}"), None))
                        .unwrap();
                }
                black_box(store.items().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_build_choice_list(c: &mut Criterion) {
    let store = large_store(10_000);
    let config = Config::default();

    c.bench_function("choice_list/10k_sorted", |b| {
        b.iter(|| {
            let list = ChoiceList::build(&store, &ListOptions::from_config(&config, false));
            black_box(list.len());
        })
    });
}

fn bench_typing_search(c: &mut Criterion) {
    let labels: Vec<String> = (0..2_000).map(label).collect();

    c.bench_function("control/type_needle_2k", |b| {
        b.iter_batched(
            || {
                let host =
                    HostElement::new(Mode::MultiSelect).with_choices(labels.iter().map(String::as_str));
                let mut choices = Choices::new(Config::default(), host);
                choices.init(HeadlessRenderer::new()).unwrap();
                choices
            },
            |mut choices| {
                // Each keystroke re-runs the search and reconciles the list.
                for needle in ["1", "12", "123", "123 q", "123 qu"] {
                    choices.set_input(needle).unwrap();
                }
                black_box(choices.store().active_choices().len());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_search_large_haystack,
    bench_dispatch_items,
    bench_build_choice_list,
    bench_typing_search
);
criterion_main!(benches);
