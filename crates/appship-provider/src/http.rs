//! reqwest client for the provider's REST API.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::{ArtifactPage, ArtifactProvider};

const AUTH_HEADER: &str = "Bitrise-Addon-Auth-Token";

#[derive(Debug, Deserialize)]
struct ShowResponse {
    data: ShowData,
}

#[derive(Debug, Deserialize)]
struct ShowData {
    #[serde(default)]
    public_install_page_url: String,
}

/// [`ArtifactProvider`] backed by the provider's HTTP API.
pub struct HttpArtifactProvider {
    config: ProviderConfig,
    http_client: reqwest::Client,
}

impl HttpArtifactProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("appship/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpArtifactProvider {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn artifacts_url(&self, app_slug: &str, build_slug: &str) -> String {
        format!(
            "{}/apps/{}/builds/{}/artifacts",
            self.config.base_url(),
            app_slug,
            build_slug
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request
            .header(AUTH_HEADER, &self.config.auth_token)
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(operation, status = status.as_u16(), "provider request rejected");
            return Err(ProviderError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ProviderError::Decode { operation, source })
    }
}

#[async_trait]
impl ArtifactProvider for HttpArtifactProvider {
    async fn list_artifacts(
        &self,
        app_slug: &str,
        build_slug: &str,
        next: Option<&str>,
    ) -> Result<ArtifactPage> {
        let mut request = self.http_client.get(self.artifacts_url(app_slug, build_slug));
        if let Some(cursor) = next.filter(|c| !c.is_empty()) {
            request = request.query(&[("next", cursor)]);
        }
        debug!(app_slug, build_slug, next, "listing artifacts");
        self.get_json("list_artifacts", request).await
    }

    async fn public_install_page_url(
        &self,
        app_slug: &str,
        build_slug: &str,
        artifact_slug: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/{}",
            self.artifacts_url(app_slug, build_slug),
            artifact_slug
        );
        let show: ShowResponse = self
            .get_json("show_artifact", self.http_client.get(url))
            .await?;
        Ok(show.data.public_install_page_url)
    }
}
