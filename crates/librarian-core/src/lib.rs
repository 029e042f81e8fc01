//! Librarian Core Components
//!
//! This crate provides the core functionality for Librarian,
//! including configuration, repository detection and index lifecycle.

mod config;
mod error;
mod manager;
mod repo;

pub use config::{LibrarianConfig, REPO_CONFIG_PATH};
pub use error::CoreError;
pub use manager::{ConfigInfo, IndexManager, ManagerState, RefreshSummary};
pub use repo::find_repo_root;
