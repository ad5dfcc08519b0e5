//! Seams between the selection store and the outside world.
//!
//! The browser build wires these to `localStorage`, `window.location` and the
//! REST backend; tests use the in-memory versions from [`crate::memory`].

use crate::error::{LocationError, LookupError, StorageError};
use crate::summary::CompanySummary;
use std::future::Future;

/// Key/value string storage that outlives the page (e.g. `localStorage`).
pub trait SelectionStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Access to the query string of the current page URL.
pub trait LocationQuery {
    fn query_param(&self, name: &str) -> Result<Option<String>, LocationError>;

    /// Set (`Some`) or delete (`None`) a query parameter in place.
    /// Must replace the current history entry, never push a new one.
    fn replace_query_param(&self, name: &str, value: Option<&str>) -> Result<(), LocationError>;
}

/// Resolves a company id to its summary. The store's only network dependency.
pub trait CompanyLookup {
    fn fetch_company(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CompanySummary, LookupError>>;
}

impl<T: SelectionStorage + ?Sized> SelectionStorage for std::rc::Rc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<T: LocationQuery + ?Sized> LocationQuery for std::rc::Rc<T> {
    fn query_param(&self, name: &str) -> Result<Option<String>, LocationError> {
        (**self).query_param(name)
    }

    fn replace_query_param(&self, name: &str, value: Option<&str>) -> Result<(), LocationError> {
        (**self).replace_query_param(name, value)
    }
}
