//! Thread composition and file ownership for Loom projects.
//!
//! A *thread* is a bundle of files kept in a store under `<thread>/_thread/`.
//! Adding or weaving a thread copies its files into the project and records,
//! per file, which thread owns it in `loom.yaml`. A file is owned by at most
//! one thread; taking over a file owned by another thread revokes it from
//! that thread.
//!
//! The pieces, leaf first:
//!
//! - [`manifest`]: the `loom.yaml` model and the "who owns this file" query.
//! - [`store`]: finding thread sources in the project and configured stores.
//! - [`compose`]: listing the files a thread contributes.
//! - [`conflict`]: deciding what to do with each destination file.
//! - [`ledger`]: the only writer of ownership records.
//! - [`ops`]: `init`, `add`, `weave`, `remove`, `list`.

pub mod compose;
pub mod conflict;
pub mod error;
pub mod ledger;
pub mod manifest;
pub mod ops;
pub mod store;

pub use conflict::{Decide, Decision, FixedDecision, Mode, Outcome, Prompt, PromptError};
pub use error::{ErrorKind, LoomError, Result};
pub use manifest::{Manifest, OwnedFiles, Thread, MANIFEST_FILE};
pub use store::{ResolvedThread, StoreCatalog, StoreResolver};
