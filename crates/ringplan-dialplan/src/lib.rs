//! Ring-group dialplan compiler.
//!
//! Turns a stored ring group into the XML routing program the switch
//! executes. Rendering is pure and synchronous; [`RingGroupCompiler`] adds
//! the store reads and the single dialplan write around it.
//!
//! # Quick start
//!
//! ```no_run
//! # async fn run(store: std::sync::Arc<impl ringplan_core::store::PbxStore>) {
//! use ringplan_dialplan::{CompilerOptions, RingGroupCompiler};
//!
//! let compiler = RingGroupCompiler::new(store, CompilerOptions::default());
//! let dialplan_id = compiler.compile_by_id(uuid::Uuid::nil()).await.unwrap();
//! # }
//! ```

pub mod bridge;
pub mod compile;
pub mod error;
pub mod render;
pub mod strategy;
pub mod xml;

pub use compile::{CompilerOptions, DEFAULT_HTTAPI_URL, RingGroupCompiler};
pub use error::{Error, Result};
pub use render::{CompileInput, render};
pub use strategy::StrategyEngine;

#[cfg(test)]
pub(crate) mod test_helpers;
