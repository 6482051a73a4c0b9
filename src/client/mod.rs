//! Client-side support for frontends calling this API: a keyed query cache
//! with a snapshot/rollback contract, and mutation hooks that patch the
//! cache optimistically before the server responds.

pub mod cache;
pub mod mutations;

pub use cache::{QueryCache, QueryKey, Snapshot};
pub use mutations::{MutationHooks, Transport, TransportError};
