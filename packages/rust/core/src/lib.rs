//! Core domain logic for Monotone.
//!
//! This crate ties the tutorial index, hash routes, content resolution, and
//! Markdown rendering together behind the route-bound [`RouteLoader`].

pub mod index;
pub mod loader;
pub mod route;

pub use index::TutorialIndex;
pub use loader::{
    CycleHandle, CycleOutcome, LoadState, LoaderStatus, RenderedContent, RouteLoader,
};
pub use route::Route;
