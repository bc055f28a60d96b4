//! Test-fixture lifecycle around a demo OData service.
//!
//! Setup resolves the service root and builds client settings; teardown
//! deletes whatever the test created before the fixture goes away. Async
//! work can't run in `Drop`, so teardown is an explicit call.

use std::fmt::Debug;
use std::future::Future;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::resolver::EndpointResolver;
use crate::settings::{ClientSettings, PayloadFormat};

/// The per-suite client, which knows how to clean up after its tests.
#[async_trait]
pub trait FixtureData: Send + Sync {
    async fn delete_test_data(&self, settings: &ClientSettings) -> anyhow::Result<()>;
}

pub struct ServiceFixture<D: FixtureData> {
    service_uri: Url,
    settings: ClientSettings,
    client: Option<D>,
}

impl<D: FixtureData> ServiceFixture<D> {
    /// Resolve `canonical`, build default settings for it and construct the
    /// client with `make_client`.
    pub async fn setup<F>(
        resolver: &EndpointResolver,
        canonical: &str,
        payload_format: PayloadFormat,
        make_client: F,
    ) -> anyhow::Result<Self>
    where
        F: FnOnce(&ClientSettings) -> D,
    {
        let root = resolver
            .service_root(canonical)
            .await
            .with_context(|| format!("resolving service root for {}", canonical))?;
        let service_uri =
            Url::parse(&root).with_context(|| format!("resolved root is not a URI: {}", root))?;

        let settings = ClientSettings::defaults(service_uri.clone(), payload_format);
        let client = make_client(&settings);
        info!(service = %service_uri, format = %payload_format, "fixture ready");

        Ok(Self {
            service_uri,
            settings,
            client: Some(client),
        })
    }

    pub fn service_uri(&self) -> &Url {
        &self.service_uri
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn client(&self) -> Option<&D> {
        self.client.as_ref()
    }

    /// Delete test data (if a client was built), then release everything.
    pub async fn teardown(mut self) -> anyhow::Result<()> {
        if let Some(client) = self.client.take() {
            debug!(service = %self.service_uri, "deleting test data");
            client
                .delete_test_data(&self.settings)
                .await
                .with_context(|| format!("deleting test data at {}", self.service_uri))?;
        }
        Ok(())
    }
}

/// Await `fut` and return its error, panicking if it succeeded or failed
/// with an error `expected` rejects.
pub async fn assert_fails_with<T, E, Fut>(fut: Fut, expected: impl FnOnce(&E) -> bool) -> E
where
    T: Debug,
    E: Debug,
    Fut: Future<Output = Result<T, E>>,
{
    match fut.await {
        Ok(value) => panic!("expected an error, got Ok({:?})", value),
        Err(e) if expected(&e) => e,
        Err(e) => panic!("unexpected error: {:?}", e),
    }
}
