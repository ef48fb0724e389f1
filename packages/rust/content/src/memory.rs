//! In-memory content store.

use std::collections::HashMap;

use async_trait::async_trait;
use monotone_shared::{MonotoneError, Result, RouteParam, TutorialId};

use crate::{ContentResolver, require_id};

/// Resolver over a map built at runtime.
///
/// The map is immutable once the resolver is constructed; each resolution
/// returns its own copy of the body.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    bodies: HashMap<TutorialId, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body, replacing any previous one for the same id.
    pub fn with(mut self, id: impl Into<TutorialId>, body: impl Into<String>) -> Self {
        self.bodies.insert(id.into(), body.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl FromIterator<(TutorialId, String)> for MemoryResolver {
    fn from_iter<I: IntoIterator<Item = (TutorialId, String)>>(iter: I) -> Self {
        Self {
            bodies: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ContentResolver for MemoryResolver {
    async fn resolve(&self, param: &RouteParam) -> Result<String> {
        let id = require_id(param)?;
        self.bodies
            .get(&id)
            .cloned()
            .ok_or_else(|| MonotoneError::not_found(param.as_str()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_resolutions_are_independent() {
        let resolver = MemoryResolver::new().with(1_u32, "# One").with(2_u32, "# Two");
        let (p1, p2) = (RouteParam::new("1"), RouteParam::new("2"));

        let (a, b, c) = tokio::join!(
            resolver.resolve(&p1),
            resolver.resolve(&p1),
            resolver.resolve(&p2),
        );

        let (mut a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        assert_eq!(a, "# One");
        assert_eq!(b, "# One");
        assert_eq!(c, "# Two");

        // Each result owns its buffer.
        a.push_str(" changed");
        assert_eq!(b, "# One");
        assert_eq!(resolver.resolve(&p1).await.unwrap(), "# One");
    }

    #[tokio::test]
    async fn missing_and_malformed_are_not_found() {
        let resolver: MemoryResolver = [(TutorialId(1), "# One".to_string())].into_iter().collect();
        assert_eq!(resolver.len(), 1);

        for raw in ["2", "abc", ""] {
            let err = resolver.resolve(&RouteParam::new(raw)).await.unwrap_err();
            assert!(err.is_not_found(), "{raw:?} should be not-found");
        }
    }
}
