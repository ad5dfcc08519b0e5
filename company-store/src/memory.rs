//! In-memory port implementations.
//!
//! Each type is a cheap `Clone` handle over shared state so a caller can hand
//! one copy to the store and keep another to inspect what was written.

use crate::error::{LocationError, LookupError, StorageError};
use crate::ports::{CompanyLookup, LocationQuery, SelectionStorage};
use crate::summary::CompanySummary;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::rc::Rc;

#[derive(Default)]
struct StorageInner {
    entries: RefCell<BTreeMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

/// `localStorage` stand-in.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<StorageInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.insert(key, value);
        storage
    }

    /// Write directly, bypassing failure injection.
    pub fn insert(&self, key: &str, value: &str) {
        self.inner
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    /// Read directly, bypassing failure injection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.entries.borrow().get(key).cloned()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl SelectionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.inner.fail_reads.get() {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.inner.fail_writes.get() {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.inner.fail_writes.get() {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        self.inner.entries.borrow_mut().remove(key);
        Ok(())
    }
}

struct LocationInner {
    path: RefCell<String>,
    query: RefCell<Vec<(String, String)>>,
    replace_count: Cell<usize>,
    fail_writes: Cell<bool>,
}

/// `window.location` + `history.replaceState` stand-in.
#[derive(Clone)]
pub struct MemoryLocation {
    inner: Rc<LocationInner>,
}

impl MemoryLocation {
    /// Parse a path with an optional query string, e.g. `/app?company=123`.
    pub fn new(url: &str) -> Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (url, Vec::new()),
        };
        Self {
            inner: Rc::new(LocationInner {
                path: RefCell::new(path.to_string()),
                query: RefCell::new(query),
                replace_count: Cell::new(0),
                fail_writes: Cell::new(false),
            }),
        }
    }

    /// Current URL as path plus query string.
    pub fn href(&self) -> String {
        let path = self.inner.path.borrow();
        let query = format_query(&self.inner.query.borrow());
        if query.is_empty() {
            path.clone()
        } else {
            format!("{path}?{query}")
        }
    }

    pub fn replace_count(&self) -> usize {
        self.inner.replace_count.get()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl LocationQuery for MemoryLocation {
    fn query_param(&self, name: &str) -> Result<Option<String>, LocationError> {
        Ok(self
            .inner
            .query
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    fn replace_query_param(&self, name: &str, value: Option<&str>) -> Result<(), LocationError> {
        if self.inner.fail_writes.get() {
            return Err(LocationError::History("replaceState rejected".into()));
        }
        let mut query = self.inner.query.borrow_mut();
        match value {
            Some(value) => {
                // URLSearchParams::set keeps the first slot and drops duplicates.
                let mut replaced = false;
                query.retain_mut(|(k, v)| {
                    if k != name {
                        return true;
                    }
                    if replaced {
                        return false;
                    }
                    *v = value.to_string();
                    replaced = true;
                    true
                });
                if !replaced {
                    query.push((name.to_string(), value.to_string()));
                }
            }
            None => query.retain(|(k, _)| k != name),
        }
        self.inner.replace_count.set(self.inner.replace_count.get() + 1);
        Ok(())
    }
}

/// Decode `a=1&b=two%20words` into ordered pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

/// Encode ordered pairs back into a query string (without the leading `?`).
pub fn format_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Fixed company directory standing in for the backend lookup.
#[derive(Clone, Default)]
pub struct StaticLookup {
    companies: Rc<RefCell<HashMap<String, CompanySummary>>>,
    calls: Rc<Cell<usize>>,
    offline: Rc<Cell<bool>>,
}

impl StaticLookup {
    pub fn new(companies: impl IntoIterator<Item = CompanySummary>) -> Self {
        let lookup = Self::default();
        for company in companies {
            lookup.add(company);
        }
        lookup
    }

    pub fn add(&self, company: CompanySummary) {
        self.companies
            .borrow_mut()
            .insert(company.id.clone(), company);
    }

    /// Number of `fetch_company` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Make every lookup fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }
}

impl CompanyLookup for StaticLookup {
    fn fetch_company(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CompanySummary, LookupError>> {
        self.calls.set(self.calls.get() + 1);
        let result = if self.offline.get() {
            Err(LookupError::Network("offline".into()))
        } else {
            self.companies
                .borrow()
                .get(id)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(id.to_string()))
        };
        std::future::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parsing_decodes_components() {
        let pairs = parse_query("?company=a%20b&view=market+analysis&flag");
        assert_eq!(
            pairs,
            vec![
                ("company".to_string(), "a b".to_string()),
                ("view".to_string(), "market analysis".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn replace_keeps_other_params() {
        let location = MemoryLocation::new("/app?view=market&company=1");
        location.replace_query_param("company", Some("2")).unwrap();
        assert_eq!(location.href(), "/app?view=market&company=2");
        location.replace_query_param("company", None).unwrap();
        assert_eq!(location.href(), "/app?view=market");
        assert_eq!(location.replace_count(), 2);
    }

    #[test]
    fn replace_collapses_duplicate_params() {
        let location = MemoryLocation::new("/?company=1&company=2");
        location.replace_query_param("company", Some("3")).unwrap();
        assert_eq!(location.href(), "/?company=3");
    }

    #[test]
    fn failing_storage_rejects_writes_but_keeps_data() {
        let storage = MemoryStorage::with_entry("k", "v");
        storage.set_fail_writes(true);
        assert!(storage.write("k", "w").is_err());
        assert!(storage.remove("k").is_err());
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
    }
}
