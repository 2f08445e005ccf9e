//! # parley-core
//!
//! Foundation types shared by every Parley crate.
//!
//! - **Content entries**: [`ContentEntry`] with a [`Speaker`] and ordered [`ContentBlock`]s,
//!   the provider-neutral unit of conversation history
//! - **Session IDs**: [`SessionId`] newtype (UUID v7)
//! - **History primitives**: [`history::compress`] and [`history::rewind`], the fold
//!   operations shared by log replay and the live history store
//! - **Logging**: `tracing` subscriber setup and log capture for tests

#![deny(unsafe_code)]

pub mod content;
pub mod history;
pub mod ids;
pub mod logging;

pub use content::{ContentBlock, ContentEntry, Speaker};
pub use ids::SessionId;
