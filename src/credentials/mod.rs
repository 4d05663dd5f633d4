//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! Sign-in (outside the core)
//!     → storage.rs (write token to the `jwt_access` slot)
//!
//! Startup:
//!     guard.rs strict check → purge expired/malformed token
//!
//! Navigation:
//!     guard.rs buffered check (token.rs decodes claims)
//!     → purge on rejection
//!
//! Authenticated request:
//!     storage.rs read → Authorization: Bearer <token>
//!     401 response → storage.rs clear
//! ```
//!
//! # Design Decisions
//! - Tokens are opaque except for the `exp` claim
//! - Validation is not read-only: rejected tokens are removed
//! - Storage is a trait so the slot can live in memory or on disk

pub mod guard;
pub mod storage;
pub mod token;

/// Storage key holding the bearer token.
pub const CREDENTIAL_SLOT: &str = "jwt_access";

pub use guard::{CredentialGuard, StartupPurge};
pub use storage::{CredentialSlot, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use token::{Claims, TokenError};
