//! LeadPilot Query - keyed query cache and mutation runner
//!
//! Every read the client performs goes through a [`QueryCache`] keyed by a
//! [`CacheKey`]. Views subscribe to keys and get notified whenever the entry
//! changes; writes go through a [`MutationRunner`] which invalidates the keys
//! it names once the write succeeds.
//!
//! The cache is generic over the value and error types so the transport
//! layer decides what gets stored. Fetches run on the ambient tokio runtime.

pub mod cache;
pub mod entry;
pub mod key;
pub mod mutation;

pub use cache::{
    listener, loader, CacheConfig, CacheStats, Invalidation, Listener, LoadFuture, Loader,
    QueryCache, Subscription,
};
pub use entry::{CacheEntry, QueryStatus};
pub use key::{CacheKey, KeyPart};
pub use mutation::{MutationRunner, MutationState, MutationStatus};
