//! # page-scaffold
//!
//! Scaffolds Java page-object classes for UI tests and appends located
//! element fields to them.
//!
//! ## Architecture
//!
//! - **model**: Narrow class model (package, class, annotated private fields)
//! - **annotation**: Marker and `key=value` locator annotations
//! - **package**: Package inference from the current directory and source roots
//! - **render**: Deterministic Java rendering of a model
//! - **parse**: tree-sitter based reading of a rendered class back into a model
//! - **persist**: File locations, atomic writes and reads
//! - **pages**: The `new-page` and `new-element` operations
//! - **commands**: Explicit command table shared by the CLI and the shell
//! - **workspace**: Per-command context (directories, active resource, prompt)
//! - **session**: Active-resource memory between invocations
//! - **config**: Project root discovery, `page-scaffold.toml`, session location

pub mod annotation;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod package;
pub mod pages;
pub mod parse;
pub mod persist;
pub mod render;
pub mod session;
pub mod workspace;
