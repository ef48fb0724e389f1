//! TUI screen definitions.
//!
//! The list screen is always alive; a page screen exists only while a
//! tutorial is open and owns that page's loader.

mod list;
mod page;

use std::fmt;

pub(crate) use list::ListScreen;
pub(crate) use page::PageScreen;

use monotone_shared::RouteParam;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    List,
    Page,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "Tutorials"),
            Self::Page => write!(f, "Tutorial"),
        }
    }
}

/// What a screen asks the app to do after handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScreenAction {
    None,
    /// Open the page screen on this route parameter.
    Open(RouteParam),
    /// Leave the page screen.
    Back,
    /// Replace the status message.
    Status(String),
}
