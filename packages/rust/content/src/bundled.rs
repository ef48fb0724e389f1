//! Tutorials compiled into the binary.

use async_trait::async_trait;
use monotone_shared::{MonotoneError, Result, RouteParam};
use tracing::instrument;

use crate::{ContentResolver, require_id};

/// TOML source of the bundled tutorial index.
pub const INDEX_TOML: &str = include_str!("../bundled/index.toml");

/// Bundled tutorial bodies, keyed by id.
const BODIES: &[(u32, &str)] = &[
    (1, include_str!("../bundled/1.md")),
    (2, include_str!("../bundled/2.md")),
    (3, include_str!("../bundled/3.md")),
];

/// Resolver over the tutorial set shipped with the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledResolver;

impl BundledResolver {
    /// Look up a bundled body without going through the async interface.
    pub fn body(id: u32) -> Option<&'static str> {
        BODIES
            .iter()
            .find(|(body_id, _)| *body_id == id)
            .map(|(_, body)| *body)
    }
}

#[async_trait]
impl ContentResolver for BundledResolver {
    #[instrument(skip_all, fields(param = %param))]
    async fn resolve(&self, param: &RouteParam) -> Result<String> {
        let id = require_id(param)?;
        Self::body(id.0)
            .map(str::to_string)
            .ok_or_else(|| MonotoneError::not_found(param.as_str()))
    }

    fn name(&self) -> &str {
        "bundled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_bundled_tutorial() {
        let text = BundledResolver
            .resolve(&RouteParam::new("1"))
            .await
            .expect("bundled tutorial 1");
        assert!(text.starts_with("# Using indexes in PostgreSQL"));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let err = BundledResolver
            .resolve(&RouteParam::new("999"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn every_body_has_a_title() {
        for (id, body) in BODIES {
            assert!(body.starts_with("# "), "tutorial {id} must open with an H1");
        }
    }
}
