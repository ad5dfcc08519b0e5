use company_store::{
    CompanySelectionStore, CompanySummary, LocationQuery, MemoryLocation, MemoryStorage,
    SelectionConfig,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::cell::RefCell;
use std::rc::Rc;

const KEY: &str = "selected_company";

struct Harness {
    store: CompanySelectionStore<MemoryStorage, MemoryLocation>,
    storage: MemoryStorage,
    location: MemoryLocation,
}

fn harness(url: &str) -> Harness {
    let storage = MemoryStorage::new();
    let location = MemoryLocation::new(url);
    let store =
        CompanySelectionStore::new(storage.clone(), location.clone(), SelectionConfig::default());
    Harness {
        store,
        storage,
        location,
    }
}

#[rstest]
#[case::minimal(CompanySummary::new("123", "Acme"))]
#[case::full(
    CompanySummary::new("5f0c", "Northwind Robotics")
        .with_industry("Robotics")
        .with_stage("Series A")
        .with_headquarters("Berlin, DE")
        .with_logo_url("https://cdn.example/northwind.png")
)]
#[case::needs_escaping(CompanySummary::new("a b&c", "Ampersand \"Quoted\" Co"))]
fn set_company_writes_both_mirrors(#[case] company: CompanySummary) {
    let h = harness("/");

    h.store.set_company(Some(company.clone()));

    let stored: CompanySummary = serde_json::from_str(&h.storage.get(KEY).unwrap()).unwrap();
    assert_eq!(stored, company);
    assert_eq!(
        h.location.query_param("company").unwrap().as_deref(),
        Some(company.id.as_str())
    );
    assert_eq!(h.store.company(), Some(company));
}

#[test]
fn clearing_removes_both_mirrors() {
    let h = harness("/?view=market");
    h.store.set_company(Some(CompanySummary::new("123", "Acme")));

    h.store.set_company(None);

    assert_eq!(h.store.company(), None);
    assert_eq!(h.storage.get(KEY), None);
    assert_eq!(h.location.query_param("company").unwrap(), None);
    assert_eq!(h.location.href(), "/?view=market");
}

#[test]
fn every_update_is_a_single_replace() {
    let h = harness("/");
    for id in ["1", "2", "3"] {
        h.store.set_company(Some(CompanySummary::new(id, "Co")));
    }
    h.store.set_company(None);

    assert_eq!(h.location.replace_count(), 4);
}

#[test]
fn last_update_wins() {
    let h = harness("/");
    h.store.set_company(Some(CompanySummary::new("1", "First")));
    h.store.set_company(Some(CompanySummary::new("2", "Second")));

    assert_eq!(h.store.company_id().as_deref(), Some("2"));
    assert_eq!(h.location.href(), "/?company=2");
}

#[test]
fn url_failure_rolls_back_storage() {
    let h = harness("/");
    h.store.set_company(Some(CompanySummary::new("1", "First")));
    let before = h.storage.get(KEY);
    h.location.set_fail_writes(true);

    h.store.set_company(Some(CompanySummary::new("2", "Second")));

    assert_eq!(h.storage.get(KEY), before);
    assert_eq!(h.location.href(), "/?company=1");
    // In-memory state still follows the caller.
    assert_eq!(h.store.company_id().as_deref(), Some("2"));
}

#[test]
fn url_failure_on_first_selection_leaves_storage_empty() {
    let h = harness("/");
    h.location.set_fail_writes(true);

    h.store.set_company(Some(CompanySummary::new("1", "First")));

    assert_eq!(h.storage.get(KEY), None);
}

#[test]
fn storage_failure_leaves_url_untouched() {
    let h = harness("/?company=1");
    h.storage.set_fail_writes(true);

    h.store.set_company(Some(CompanySummary::new("2", "Second")));

    assert_eq!(h.location.href(), "/?company=1");
    assert_eq!(h.location.replace_count(), 0);
    assert_eq!(h.store.company_id().as_deref(), Some("2"));
}

#[test]
fn every_update_notifies_every_listener() {
    let h = harness("/");
    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    for sink in [Rc::clone(&first), Rc::clone(&second)] {
        h.store
            .subscribe(move |selection| sink.borrow_mut().push(selection.company_id().map(str::to_string)));
    }

    h.store.set_company(Some(CompanySummary::new("1", "Acme")));
    h.store.set_company(None);

    let expected = vec![Some("1".to_string()), None];
    assert_eq!(*first.borrow(), expected);
    assert_eq!(*second.borrow(), expected);
}

#[test]
fn custom_keys_are_honoured() {
    let storage = MemoryStorage::new();
    let location = MemoryLocation::new("/");
    let config = SelectionConfig {
        storage_key: "focus".into(),
        query_param: "c".into(),
        ..SelectionConfig::default()
    };
    let store = CompanySelectionStore::new(storage.clone(), location.clone(), config);

    store.set_company(Some(CompanySummary::new("42", "Answer")));

    assert!(storage.get("focus").is_some());
    assert_eq!(storage.get(KEY), None);
    assert_eq!(location.href(), "/?c=42");
}
