//! Core types for external-IdP login reconciliation: the claims model,
//! configuration, mapping-list parsing, the storage seam, and shared
//! infrastructure (errors, logging, generated identifiers).

pub mod claims;
pub mod error;
pub mod ids;
pub mod logger;
pub mod mapping;
pub mod options;
pub mod store;

// Re-exports for convenience
pub use claims::{ClaimValue, Claims, Identity, DATABASE_PROVIDER};
pub use error::{BridgeError, Result};
pub use logger::{BridgeLogger, LogHandler, LogLevel, LoggerConfig};
pub use mapping::{is_protected_field, parse_pipe_list, to_pipe_list, MappingPair};
pub use options::BridgeOptions;
pub use store::{IdentityLink, IdentityLinkStore, UserRecord, UserStore};
