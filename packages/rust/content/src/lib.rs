//! Content resolution: tutorial identifier → raw Markdown text.
//!
//! This crate provides:
//! - [`ContentResolver`]: the async lookup trait consumed by the loader
//! - Backends: [`BundledResolver`], [`MemoryResolver`], [`DirResolver`], [`HttpResolver`]
//! - [`resolver_from_config`]: picks a backend from `[content]` config
//!
//! Every backend reports a missing tutorial as `MonotoneError::NotFound` and
//! anything else that goes wrong as `MonotoneError::Unavailable`.

pub mod bundled;
mod dir;
mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use monotone_shared::{ContentConfig, ContentSource, MonotoneError, Result, RouteParam, TutorialId};

pub use bundled::BundledResolver;
pub use dir::DirResolver;
pub use http::HttpResolver;
pub use memory::MemoryResolver;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Keyed lookup of tutorial bodies.
///
/// Implementations must be safe to call repeatedly and concurrently for
/// different parameters; none may share mutable state between resolutions.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    /// Fetch the raw Markdown for `param`.
    async fn resolve(&self, param: &RouteParam) -> Result<String>;

    /// Human-readable backend name for tracing.
    fn name(&self) -> &str;
}

/// Interpret a route parameter as a tutorial id, or report it as absent.
///
/// Backends call this before touching their store so a malformed parameter
/// never reaches a file path or URL.
pub fn require_id(param: &RouteParam) -> Result<TutorialId> {
    param
        .tutorial_id()
        .ok_or_else(|| MonotoneError::not_found(param.as_str()))
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// Build the resolver selected by the `[content]` config section.
pub fn resolver_from_config(config: &ContentConfig) -> Result<Arc<dyn ContentResolver>> {
    let resolver: Arc<dyn ContentResolver> = match config.source {
        ContentSource::Bundled => Arc::new(BundledResolver),
        ContentSource::Dir => Arc::new(DirResolver::new(&config.dir, config.timeout())),
        ContentSource::Http => Arc::new(HttpResolver::new(&config.base_url, config.timeout())?),
    };
    tracing::debug!(backend = resolver.name(), "content resolver selected");
    Ok(resolver)
}
