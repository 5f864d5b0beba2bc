//! In-memory adapter implementations for testing.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! exercising the dispatch services without external infrastructure.

mod photos;
mod store;

pub use photos::InMemoryPhotoStorage;
pub use store::InMemoryTaskStore;
