//! Flat-file marketplace listing store.
//!
//! Listings live as `|`-delimited records inside a CSV file next to a
//! username registry. The store re-reads the whole file on every call;
//! mutations hold an advisory lock and compact through a temp-file rename.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod lock;
pub mod query;
pub mod registry;
pub mod store;
pub mod timestamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{decode, encode, Listing};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use query::{Projection, SortDir, SortKey, SortSpec};
pub use registry::UserRegistry;
pub use store::{ListingPatch, NewListing, RecordStore};
