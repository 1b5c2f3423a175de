//! In-memory implementation of the auth-bridge storage traits. Used by the
//! test suites and as a reference for real backends.

pub mod store;

pub use store::MemoryBridgeStore;
