//! In-process storage backends.
//!
//! [`MemoryUnitOfWork`] keeps all tables in one shared state and by default
//! serialises sessions: a session works on a private copy and publishes it on
//! commit, so concurrent callers observe the same isolation they would get
//! from `SERIALIZABLE` transactions. A store built without isolation lets
//! sessions race, so the duplicate-key backstop of id allocation can be
//! driven for real. [`FaultInjection`] lets tests fail individual writes to
//! exercise compensation paths.

mod blob_store;
mod repositories;
mod unit_of_work;

pub use blob_store::MemoryBlobStore;
pub use unit_of_work::{FaultInjection, MemorySession, MemoryState, MemoryUnitOfWork};
