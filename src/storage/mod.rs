//! Record storage for chirpy
//!
//! The whole database is one JSON document on disk holding two
//! collections, chirps and users. The file is owned exclusively by
//! [`RecordStore`]; nothing else reads or writes it.
//!
//! # Design Principles
//!
//! - Full-document rewrite on every mutation (no append log)
//! - Single writer at a time, readers share
//! - Atomic replace via temp file + fsync + rename
//! - Validate on load, never repair silently
//! - Ids are one past the largest existing id, per collection

mod document;
mod errors;
mod record;
mod store;

pub use document::{Document, CURRENT_VERSION};
pub use errors::{StorageError, StorageResult};
pub use record::{Chirp, User, UserPublic, MAX_CHIRP_LENGTH};
pub use store::RecordStore;
