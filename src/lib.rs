//! repo-pilot: repository cataloging, task-aware context selection, and safe
//! application of generated file changes.
//!
//! The library is split along the three stages of that pipeline: [`index`]
//! builds and caches the file catalog, [`select`] ranks catalog entries
//! against a task and formats the context bundle, and [`edit`] merges
//! generated output back into the working tree with backups and rollback.

pub mod cli;
pub mod config;
pub mod domain;
pub mod edit;
pub mod index;
pub mod select;
pub mod utils;
