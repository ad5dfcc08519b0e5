use company_store::{
    CompanyLookup, CompanySelectionStore, CompanySummary, LookupError, LookupFailurePolicy,
    MemoryLocation, MemoryStorage, SelectionConfig, StaticLookup,
};
use futures::channel::oneshot;
use futures::executor::block_on;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

const KEY: &str = "selected_company";

fn acme() -> CompanySummary {
    CompanySummary::new("123", "Acme")
}

fn build(
    url: &str,
    storage: &MemoryStorage,
    policy: LookupFailurePolicy,
) -> CompanySelectionStore<MemoryStorage, MemoryLocation> {
    let config = SelectionConfig {
        on_lookup_failure: policy,
        ..SelectionConfig::default()
    };
    CompanySelectionStore::new(storage.clone(), MemoryLocation::new(url), config)
}

#[test]
fn url_takes_precedence_over_storage() {
    let storage = MemoryStorage::with_entry(KEY, r#"{"id":"9","name":"X"}"#);
    let store = build("/?company=123", &storage, LookupFailurePolicy::FailClosed);
    let lookup = StaticLookup::new([acme()]);

    block_on(store.hydrate(&lookup));

    assert_eq!(store.company(), Some(acme()));
    assert!(!store.is_loading());
    let stored: CompanySummary = serde_json::from_str(&storage.get(KEY).unwrap()).unwrap();
    assert_eq!(stored, acme());
    assert_eq!(lookup.calls(), 1);
}

#[test]
fn storage_is_trusted_without_network_call() {
    let storage = MemoryStorage::with_entry(KEY, r#"{"id":"9","name":"X"}"#);
    let store = build("/", &storage, LookupFailurePolicy::FailClosed);
    let lookup = StaticLookup::new([CompanySummary::new("9", "Renamed")]);

    block_on(store.hydrate(&lookup));

    assert_eq!(store.company(), Some(CompanySummary::new("9", "X")));
    assert!(!store.is_loading());
    assert_eq!(lookup.calls(), 0);
}

#[test]
fn failed_lookup_leaves_selection_empty() {
    let storage = MemoryStorage::new();
    let store = build("/?company=999", &storage, LookupFailurePolicy::FailClosed);
    let lookup = StaticLookup::new([acme()]);

    block_on(store.hydrate(&lookup));

    assert_eq!(store.company(), None);
    assert!(!store.is_loading());
    assert_eq!(storage.get(KEY), None);
}

#[rstest]
#[case::fail_closed(LookupFailurePolicy::FailClosed, None)]
#[case::use_storage(LookupFailurePolicy::UseStorage, Some(CompanySummary::new("9", "X")))]
fn lookup_failure_policy(
    #[case] policy: LookupFailurePolicy,
    #[case] expected: Option<CompanySummary>,
) {
    let storage = MemoryStorage::with_entry(KEY, r#"{"id":"9","name":"X"}"#);
    let store = build("/?company=999", &storage, policy);
    let lookup = StaticLookup::default();
    lookup.set_offline(true);

    block_on(store.hydrate(&lookup));

    assert_eq!(store.company(), expected);
    assert!(!store.is_loading());
    // Stored record is never touched by a failed lookup.
    assert_eq!(storage.get(KEY).as_deref(), Some(r#"{"id":"9","name":"X"}"#));
}

#[rstest]
#[case::not_json("not json")]
#[case::missing_name(r#"{"id":"9"}"#)]
#[case::wrong_shape(r#"["9","X"]"#)]
#[case::empty("")]
fn malformed_storage_counts_as_empty(#[case] raw: &str) {
    let storage = MemoryStorage::with_entry(KEY, raw);
    let store = build("/", &storage, LookupFailurePolicy::FailClosed);

    block_on(store.hydrate(&StaticLookup::default()));

    assert_eq!(store.company(), None);
    assert!(!store.is_loading());
}

#[test]
fn unreadable_storage_counts_as_empty() {
    let storage = MemoryStorage::with_entry(KEY, r#"{"id":"9","name":"X"}"#);
    storage.set_fail_reads(true);
    let store = build("/", &storage, LookupFailurePolicy::FailClosed);

    block_on(store.hydrate(&StaticLookup::default()));

    assert_eq!(store.company(), None);
    assert!(!store.is_loading());
}

#[test]
fn storage_write_failure_still_selects_url_company() {
    let storage = MemoryStorage::new();
    storage.set_fail_writes(true);
    let store = build("/?company=123", &storage, LookupFailurePolicy::FailClosed);

    block_on(store.hydrate(&StaticLookup::new([acme()])));

    assert_eq!(store.company(), Some(acme()));
    assert_eq!(storage.get(KEY), None);
}

#[test]
fn hydration_notifies_exactly_once() {
    let storage = MemoryStorage::new();
    let store = build("/?company=123", &storage, LookupFailurePolicy::FailClosed);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |selection| sink.borrow_mut().push(selection.clone()));

    block_on(store.hydrate(&StaticLookup::new([acme()])));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].company, Some(acme()));
    assert!(!seen[0].loading);
}

/// Lookup that stays pending until the test releases it.
struct GatedLookup {
    pending: RefCell<Option<oneshot::Receiver<Result<CompanySummary, LookupError>>>>,
    calls: Cell<usize>,
}

impl GatedLookup {
    fn new() -> (Self, oneshot::Sender<Result<CompanySummary, LookupError>>) {
        let (tx, rx) = oneshot::channel();
        let lookup = Self {
            pending: RefCell::new(Some(rx)),
            calls: Cell::new(0),
        };
        (lookup, tx)
    }
}

impl CompanyLookup for GatedLookup {
    fn fetch_company(
        &self,
        _id: &str,
    ) -> impl Future<Output = Result<CompanySummary, LookupError>> {
        self.calls.set(self.calls.get() + 1);
        let pending = self.pending.borrow_mut().take();
        async move {
            match pending {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(LookupError::Network("dropped".into()))),
                None => Err(LookupError::Network("already used".into())),
            }
        }
    }
}

#[test]
fn explicit_selection_during_lookup_wins() {
    let storage = MemoryStorage::new();
    let store = build("/?company=123", &storage, LookupFailurePolicy::FailClosed);
    let (lookup, release) = GatedLookup::new();
    let chosen = CompanySummary::new("7", "Chosen");

    block_on(async {
        let user = async {
            assert!(store.is_loading());
            store.set_company(Some(chosen.clone()));
            release.send(Ok(acme())).unwrap();
        };
        futures::join!(store.hydrate(&lookup), user);
    });

    assert_eq!(lookup.calls.get(), 1);
    assert_eq!(store.company(), Some(chosen.clone()));
    assert!(!store.is_loading());
    let stored: CompanySummary = serde_json::from_str(&storage.get(KEY).unwrap()).unwrap();
    assert_eq!(stored, chosen);
}

#[test]
fn disposed_store_discards_lookup_result() {
    let storage = MemoryStorage::new();
    let store = build("/?company=123", &storage, LookupFailurePolicy::FailClosed);
    let (lookup, release) = GatedLookup::new();
    let notified = Rc::new(Cell::new(false));
    let flag = Rc::clone(&notified);
    store.subscribe(move |_| flag.set(true));

    block_on(async {
        let unmount = async {
            store.dispose();
            release.send(Ok(acme())).unwrap();
        };
        futures::join!(store.hydrate(&lookup), unmount);
    });

    assert_eq!(store.company(), None);
    assert_eq!(storage.get(KEY), None);
    assert!(!notified.get());
}
