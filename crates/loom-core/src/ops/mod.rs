//! User-facing operations over a project directory.
//!
//! Each operation loads `loom.yaml` once, does its work one thread and one
//! file at a time, and saves the manifest once at the end. A fatal error
//! returns before the save, so the manifest on disk is left as it was.

mod apply;

pub mod add;
pub mod init;
pub mod list;
pub mod remove;
pub mod weave;

pub use add::{add, AddReport, ThreadSpec};
pub use apply::{Skipped, ThreadReport, Transfer};
pub use init::{init, InitReport, INIT_TEMPLATE};
pub use list::{list, ActiveThread, ListReport, StoreListing};
pub use remove::{remove, remove_all, RemoveAllReport, RemoveReport};
pub use weave::{weave, WeaveReport};
