//! Leptos context exposing the company selection store to the view tree.

use crate::bridge::{ApiClient, HttpCompanyLookup};
use crate::browser::{BrowserLocation, BrowserStorage};
use company_store::{CompanySelectionStore, CompanySummary, Selection, SelectionConfig};
use leptos::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

type BrowserStore = CompanySelectionStore<BrowserStorage, BrowserLocation>;

#[derive(Clone, Copy)]
pub struct CompanyContext {
    selection: ReadSignal<Selection>,
    store: StoredValue<Rc<BrowserStore>>,
}

impl CompanyContext {
    pub fn company(&self) -> Option<CompanySummary> {
        self.selection.with(|s| s.company.clone())
    }

    pub fn company_id(&self) -> Option<String> {
        self.selection.with(|s| s.company_id().map(str::to_string))
    }

    pub fn loading(&self) -> bool {
        self.selection.with(|s| s.loading)
    }

    pub fn set_company(&self, next: Option<CompanySummary>) {
        self.store.with_value(|store| store.set_company(next));
    }
}

/// Create the store for this mount, start hydration and provide the context.
/// The store is disposed when the owning scope is cleaned up.
pub fn provide_company_context(config: SelectionConfig, client: ApiClient) -> CompanyContext {
    let store = Rc::new(CompanySelectionStore::new(
        BrowserStorage,
        BrowserLocation,
        config,
    ));
    let (selection, set_selection) = create_signal(store.selection());
    let subscription = store.subscribe(move |next| set_selection.set(next.clone()));

    {
        let store = Rc::clone(&store);
        let lookup = HttpCompanyLookup::new(client);
        spawn_local(async move {
            store.hydrate(&lookup).await;
        });
    }
    {
        let store = Rc::clone(&store);
        on_cleanup(move || {
            store.unsubscribe(subscription);
            store.dispose();
        });
    }

    let ctx = CompanyContext {
        selection,
        store: store_value(store),
    };
    provide_context(ctx);
    ctx
}

pub fn use_company() -> CompanyContext {
    use_context::<CompanyContext>()
        .expect("use_company must be called below provide_company_context")
}
