//! assetman: generate Ninja build graphs from declarative asset pipelines
//!
//! A pipeline description declares rules (shell command templates), `single`
//! transforms (one output per matched file) and `bundle` transforms (many
//! matched files into a fixed set of outputs). This crate resolves those
//! declarations against the source tree and writes a `build.ninja` that also
//! knows how to regenerate itself.

pub mod cli;
pub mod compile;
pub mod config;
pub mod domain;
pub mod error;
pub mod filelist;
pub mod graph;
pub mod pattern;
pub mod script;
pub mod utils;

pub use compile::{generate, Compiled, GraphCompiler};
pub use error::{GenerateError, GenerateResult};
