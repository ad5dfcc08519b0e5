//! The company selection store.
//!
//! Holds the company currently in focus and keeps three copies of it in step:
//! in-memory state, the persisted storage record and the URL query parameter.
//! At startup [`CompanySelectionStore::hydrate`] reconciles them (URL first,
//! then storage); afterwards [`CompanySelectionStore::set_company`] is the
//! only way to change the selection and it rewrites both mirrors.
//!
//! Every failure in here is logged and swallowed. A broken mirror degrades
//! the store to "no selection", it never reaches the caller.

use crate::config::{LookupFailurePolicy, SelectionConfig};
use crate::error::StorageError;
use crate::ports::{CompanyLookup, LocationQuery, SelectionStorage};
use crate::summary::{CompanySummary, Selection};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Handle returned by [`CompanySelectionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&Selection)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Fresh,
    Hydrating,
    Ready,
}

pub struct CompanySelectionStore<S, L> {
    storage: S,
    location: L,
    config: SelectionConfig,
    state: RefCell<Selection>,
    phase: Cell<Phase>,
    /// Bumped by every `set_company`; lets hydration notice it was overtaken.
    revision: Cell<u64>,
    disposed: Cell<bool>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<u64>,
}

impl<S, L> CompanySelectionStore<S, L>
where
    S: SelectionStorage,
    L: LocationQuery,
{
    pub fn new(storage: S, location: L, config: SelectionConfig) -> Self {
        Self {
            storage,
            location,
            config,
            state: RefCell::new(Selection::default()),
            phase: Cell::new(Phase::Fresh),
            revision: Cell::new(0),
            disposed: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn selection(&self) -> Selection {
        self.state.borrow().clone()
    }

    pub fn company(&self) -> Option<CompanySummary> {
        self.state.borrow().company.clone()
    }

    pub fn company_id(&self) -> Option<String> {
        self.state.borrow().company_id().map(str::to_string)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Reconcile URL, storage and memory. Runs once per store; later calls
    /// return immediately.
    ///
    /// The lookup is the only suspension point. If `set_company` is called
    /// while it is pending, the explicit selection wins. If the store is
    /// disposed meanwhile, the result is dropped.
    pub async fn hydrate<C: CompanyLookup>(&self, lookup: &C) {
        if self.disposed.get() || self.phase.get() != Phase::Fresh {
            tracing::debug!("selection hydration already ran, skipping");
            return;
        }
        self.phase.set(Phase::Hydrating);
        let started_at = self.revision.get();

        let resolved = match self.url_company_id() {
            Some(id) => match lookup.fetch_company(&id).await {
                Ok(company) => {
                    tracing::debug!(company_id = %company.id, "selection resolved from url");
                    Resolved::FromUrl(company)
                }
                Err(err) => {
                    tracing::warn!(company_id = %id, error = %err, "company lookup failed during hydration");
                    match self.config.on_lookup_failure {
                        LookupFailurePolicy::FailClosed => Resolved::Nothing,
                        LookupFailurePolicy::UseStorage => self
                            .stored_company()
                            .map_or(Resolved::Nothing, Resolved::FromStorage),
                    }
                }
            },
            None => self
                .stored_company()
                .map_or(Resolved::Nothing, Resolved::FromStorage),
        };

        if self.disposed.get() {
            tracing::debug!("store disposed during hydration, discarding result");
            return;
        }
        self.phase.set(Phase::Ready);

        if self.revision.get() != started_at {
            tracing::debug!("selection changed during hydration, keeping explicit choice");
            self.update_state(|state| state.loading = false);
            return;
        }

        match resolved {
            Resolved::FromUrl(company) => {
                if let Err(err) = self.persist(&company) {
                    tracing::warn!(error = %err, "could not persist hydrated selection");
                }
                self.update_state(|state| {
                    state.company = Some(company);
                    state.loading = false;
                });
            }
            Resolved::FromStorage(company) => {
                self.update_state(|state| {
                    state.company = Some(company);
                    state.loading = false;
                });
            }
            Resolved::Nothing => self.update_state(|state| {
                state.company = None;
                state.loading = false;
            }),
        }
    }

    /// Replace the selection and rewrite both mirrors. No network call.
    ///
    /// Mirrors are updated all-or-nothing: if the URL cannot be rewritten the
    /// storage record is rolled back to what it held before.
    pub fn set_company(&self, next: Option<CompanySummary>) {
        if self.disposed.get() {
            tracing::debug!("set_company on a disposed store ignored");
            return;
        }
        self.revision.set(self.revision.get() + 1);

        if let Err(err) = self.write_mirrors(next.as_ref()) {
            tracing::warn!(error = %err, "selection mirrors left unchanged");
        }
        self.update_state(|state| state.company = next);
    }

    /// Register a listener called with the new selection after every change.
    pub fn subscribe(&self, listener: impl Fn(&Selection) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Returns `false` when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Tear the store down: drop listeners and ignore any pending hydration.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.listeners.borrow_mut().clear();
    }

    fn url_company_id(&self) -> Option<String> {
        match self.location.query_param(&self.config.query_param) {
            Ok(id) => id.filter(|id| !id.is_empty()),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unreadable location");
                None
            }
        }
    }

    fn stored_company(&self) -> Option<CompanySummary> {
        let raw = match self.storage.read(&self.config.storage_key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring unreadable selection storage");
                return None;
            }
        };
        match parse_stored(&raw) {
            Ok(company) => Some(company),
            Err(err) => {
                tracing::debug!(error = %err, "ignoring stored selection");
                None
            }
        }
    }

    fn persist(&self, company: &CompanySummary) -> Result<(), StorageError> {
        let payload =
            serde_json::to_string(company).map_err(|e| StorageError::Malformed(e.to_string()))?;
        self.storage.write(&self.config.storage_key, &payload)
    }

    fn write_mirrors(&self, next: Option<&CompanySummary>) -> Result<(), MirrorError> {
        let key = &self.config.storage_key;
        let payload = next
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| MirrorError::Storage(StorageError::Malformed(e.to_string())))?;
        let previous = self.storage.read(key).map_err(MirrorError::Storage)?;

        match payload.as_deref() {
            Some(payload) => self.storage.write(key, payload),
            None => self.storage.remove(key),
        }
        .map_err(MirrorError::Storage)?;

        let url_result = self
            .location
            .replace_query_param(&self.config.query_param, next.map(|c| c.id.as_str()));
        if let Err(err) = url_result {
            let rollback = match previous.as_deref() {
                Some(previous) => self.storage.write(key, previous),
                None => self.storage.remove(key),
            };
            if let Err(rollback_err) = rollback {
                tracing::warn!(error = %rollback_err, "storage rollback failed");
            }
            return Err(MirrorError::Location(err.to_string()));
        }
        Ok(())
    }

    fn update_state(&self, apply: impl FnOnce(&mut Selection)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            apply(&mut state);
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, selection: &Selection) {
        // Cloned so listeners may subscribe, unsubscribe or set_company re-entrantly.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        let revision = self.revision.get();
        for listener in listeners {
            listener(selection);
            // A nested set_company already delivered a newer snapshot to everyone.
            if self.revision.get() != revision {
                break;
            }
        }
    }
}

/// The stored record must be a JSON object; serde would otherwise also accept
/// a positional array for the struct.
fn parse_stored(raw: &str) -> Result<CompanySummary, StorageError> {
    let malformed = |e: serde_json::Error| StorageError::Malformed(e.to_string());
    match serde_json::from_str(raw).map_err(malformed)? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value).map_err(malformed),
        _ => Err(StorageError::Malformed("expected a JSON object".into())),
    }
}

enum Resolved {
    FromUrl(CompanySummary),
    FromStorage(CompanySummary),
    Nothing,
}

#[derive(Debug, thiserror::Error)]
enum MirrorError {
    #[error("storage: {0}")]
    Storage(StorageError),
    #[error("location: {0}")]
    Location(String),
}
