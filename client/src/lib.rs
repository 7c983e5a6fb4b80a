//! HTTP clients and the editing-session config store for Formloom.
//!
//! [`BuilderClient`] talks to the builder/config API, [`RuntimeClient`] to
//! the runtime chat API, and [`ConfigStore`] holds one editing session's
//! configuration graph with the exact load/save/publish semantics the
//! authoring surface depends on.

mod builder;
mod error;
mod runtime;
mod store;

pub use builder::{BuilderClient, DEFAULT_BUILDER_URL};
pub use error::ClientError;
pub use runtime::{DEFAULT_RUNTIME_URL, RuntimeClient};
pub use store::{ConfigStore, ConfigTransport, save_plan};
