//! Typed payload structs, one per event type.
//!
//! Deserialization is the validator: a payload that fails to deserialize
//! into its struct is rejected as a whole. Required fields have no
//! `#[serde(default)]`; optional ones do.

pub mod audit;
pub mod config;
pub mod history;
pub mod session;

pub use audit::{SessionEvent, Severity};
pub use config::{DirectoriesChangedPayload, ProviderSwitchPayload};
pub use history::{CompressedPayload, ContentPayload, RewindPayload};
pub use session::SessionStartPayload;
