//! # company-store
//!
//! The "selected company" state for the research dashboard: a store that
//! keeps the company in focus consistent across memory, persisted storage and
//! the page URL, plus the ports it talks through and the dashboard's layered
//! configuration.
//!
//! ```
//! use company_store::{
//!     CompanySelectionStore, CompanySummary, MemoryLocation, MemoryStorage, SelectionConfig,
//! };
//!
//! let location = MemoryLocation::new("/dashboard");
//! let store = CompanySelectionStore::new(
//!     MemoryStorage::new(),
//!     location.clone(),
//!     SelectionConfig::default(),
//! );
//! store.set_company(Some(CompanySummary::new("123", "Acme")));
//! assert_eq!(location.href(), "/dashboard?company=123");
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod ports;
pub mod store;
mod summary;

pub use config::{ApiConfig, DashboardConfig, LookupFailurePolicy, SelectionConfig};
pub use error::{ConfigError, LocationError, LookupError, StorageError};
pub use memory::{MemoryLocation, MemoryStorage, StaticLookup};
pub use ports::{CompanyLookup, LocationQuery, SelectionStorage};
pub use store::{CompanySelectionStore, SubscriptionId};
pub use summary::{CompanySummary, Selection};
