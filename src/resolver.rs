//! Canonical endpoint → live service root.
//!
//! One redirect-following GET per call, then the rewrite rule of the
//! canonical template (if any). Nothing is cached and nothing is retried:
//! a broken demo service should abort fixture setup straight away.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::endpoints::{requires_resolution, rewrite_rule_for, KnownEndpoint};
use crate::errors::ResolveError;
use crate::rewrite::RewriteRule;
use crate::transport::RedirectFollower;

pub struct EndpointResolver {
    transport: Arc<dyn RedirectFollower>,
}

impl Clone for EndpointResolver {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl EndpointResolver {
    pub fn new(transport: impl RedirectFollower + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_shared(transport: Arc<dyn RedirectFollower>) -> Self {
        Self { transport }
    }

    /// Follow `canonical`'s redirects and normalize the landing URI if the
    /// canonical template asks for it.
    pub async fn resolve(&self, canonical: &str) -> Result<String, ResolveError> {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            return Err(ResolveError::InvalidEndpoint("empty endpoint URI".into()));
        }

        self.resolve_with_rule(canonical, rewrite_rule_for(canonical)).await
    }

    /// Resolve a mirror (or a local stand-in) of a known endpoint, applying
    /// the known endpoint's rewrite rule to whatever the mirror redirects to.
    pub async fn resolve_mirror(
        &self,
        mirror: &str,
        template: KnownEndpoint,
    ) -> Result<String, ResolveError> {
        let mirror = mirror.trim();
        if mirror.is_empty() {
            return Err(ResolveError::InvalidEndpoint("empty endpoint URI".into()));
        }
        self.resolve_with_rule(mirror, template.rewrite_rule()).await
    }

    async fn resolve_with_rule(
        &self,
        canonical: &str,
        rule: RewriteRule,
    ) -> Result<String, ResolveError> {
        let landed = self.transport.follow(canonical).await?;
        let resolved = rule.apply(landed.as_str()).map_err(|e| {
            warn!("Could not normalize redirect target for {}: {}", canonical, e);
            e
        })?;

        if resolved != canonical {
            info!(canonical, resolved = %resolved, ?rule, "endpoint resolved");
        }
        Ok(resolved)
    }

    /// Service root to hand to a client: read-write services go through
    /// [`resolve`](Self::resolve), read-only ones are used as given.
    pub async fn service_root(&self, canonical: &str) -> Result<String, ResolveError> {
        if requires_resolution(canonical) {
            self.resolve(canonical).await
        } else {
            debug!(canonical, "read-only endpoint, skipping redirect lookup");
            Ok(canonical.to_string())
        }
    }

    /// Resolve several endpoints concurrently over the shared transport.
    /// Outcomes are returned in input order and don't affect each other.
    pub async fn resolve_all<I, S>(&self, canonicals: I) -> Vec<(String, Result<String, ResolveError>)>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pending = canonicals.into_iter().map(|c| {
            let canonical: String = c.into();
            async move {
                let outcome = self.resolve(&canonical).await;
                (canonical, outcome)
            }
        });
        join_all(pending).await
    }
}
