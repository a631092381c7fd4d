//! Top-level application component.

#[allow(clippy::module_inception)]
mod app;

pub use app::{App, AppContext, AppError, Result};
