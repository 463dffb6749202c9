//! Core PS Business Suites knowledge: app identities and where their data lives

pub mod app;
pub mod paths;

pub use app::{detect_app, AppKind};
pub use paths::{resolve_target, RestoreTarget};
