//! Client for the precomputed analysis artifacts, plus the bindings that
//! keep year-selected artifacts in sync with the dashboard.
//!
//! Artifacts are static files produced by the census pipeline and served
//! under one base URL. Everything here is read-only consumption: JSON
//! documents are parsed into wire types, HTML documents cross the trust
//! boundary as [`TrustedMarkup`].

pub mod markup;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::watch;

use crate::binder::{self, ContentCell};
use crate::config::ArtifactsConfig;
use markup::TrustedMarkup;
use types::{PipelineStep, YearStat};

/// Fallback markup when a year's data dictionary cannot be loaded.
pub const DICTIONARY_FALLBACK: &str =
    "<p class=\"text-danger\">Erro ao carregar dicionário.</p>";
/// Fallback markup when a year has no duplicate-records report.
pub const DUPLICATES_FALLBACK: &str =
    "<p class=\"text-info\">Nenhum registro duplicado detectado para este ano.</p>";

pub struct ArtifactClient {
    client: Client,
    base_url: String,
}

impl ArtifactClient {
    pub fn new(config: &ArtifactsConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_text(&self, name: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, name);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", name))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET {} failed ({}): {}", name, status, body);
        }

        resp.text()
            .await
            .with_context(|| format!("failed to read {} body", name))
    }

    /// Discovery endpoint: which years have published artifacts.
    pub async fn available_years(&self) -> Result<Vec<String>> {
        let json = self.get_text("available_years.json").await?;
        types::parse_available_years(&json).context("failed to parse available years")
    }

    pub async fn summary_stats(&self) -> Result<Vec<YearStat>> {
        let json = self.get_text("summary_stats.json").await?;
        types::parse_summary_stats(&json).context("failed to parse summary stats")
    }

    pub async fn pipeline_graph(&self) -> Result<Vec<PipelineStep>> {
        let json = self.get_text("pipeline_graph.json").await?;
        types::parse_pipeline_graph(&json).context("failed to parse pipeline graph")
    }

    pub async fn dictionary(&self, year: &str) -> Result<String> {
        self.get_text(&format!("dictionary_{}.html", year)).await
    }

    pub async fn duplicates(&self, year: &str) -> Result<String> {
        self.get_text(&format!("duplicates_{}.html", year)).await
    }
}

/// Keep the data-dictionary cell bound to the selected year.
pub fn bind_dictionary(
    selection: watch::Receiver<String>,
    client: Arc<ArtifactClient>,
) -> ContentCell<TrustedMarkup> {
    binder::bind(
        selection,
        move |year| {
            let client = client.clone();
            async move { client.dictionary(&year).await }
        },
        TrustedMarkup::from_static_artifact,
        TrustedMarkup::from_static_artifact(DICTIONARY_FALLBACK.to_string()),
    )
}

/// Keep the duplicate-records cell bound to the selected year.
pub fn bind_duplicates(
    selection: watch::Receiver<String>,
    client: Arc<ArtifactClient>,
) -> ContentCell<TrustedMarkup> {
    binder::bind(
        selection,
        move |year| {
            let client = client.clone();
            async move { client.duplicates(&year).await }
        },
        TrustedMarkup::from_static_artifact,
        TrustedMarkup::from_static_artifact(DUPLICATES_FALLBACK.to_string()),
    )
}
