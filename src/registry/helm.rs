use crate::agents::declaration::Identifier;
use crate::config::ResolverSettings;
use crate::error::{Result, TflvError};
use crate::registry::build_client;
use crate::registry::version::first_stable;
use crate::repository::{VersionCache, VersionResolver};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Helm chart repository client reading `{repository}/index.yaml`.
pub struct HelmRepository {
    client: Client,
    cache: VersionCache,
}

#[derive(Debug, Deserialize)]
struct IndexFile {
    #[serde(default)]
    entries: HashMap<String, Vec<ChartVersion>>,
}

#[derive(Debug, Deserialize)]
struct ChartVersion {
    #[serde(default)]
    version: String,
}

impl HelmRepository {
    pub fn new(settings: &ResolverSettings, cache: VersionCache) -> Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout)?,
            cache,
        })
    }

    fn fetch_latest(&self, repository: &str, chart: &str) -> Result<String> {
        let url = index_url(repository)?;
        debug!("Fetching chart index: {}", url);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TflvError::Resolve(format!(
                "chart repository {repository} returned HTTP {status}"
            )));
        }

        let index: IndexFile = serde_yaml::from_str(&response.text()?)?;
        select_chart_version(&index, chart)
    }
}

impl VersionResolver for HelmRepository {
    fn resolve(&self, identifier: &Identifier) -> Result<String> {
        let Identifier::Chart { repository, chart } = identifier else {
            return Err(TflvError::Resolve(format!(
                "{identifier} is not a chart identifier"
            )));
        };
        self.cache
            .get_or_try_insert_with(&identifier.cache_key(), || {
                self.fetch_latest(repository, chart)
            })
    }
}

/// Only plain HTTP(S) repositories serve an `index.yaml`; `oci://` and friends do not.
fn index_url(repository: &str) -> Result<Url> {
    let parsed = Url::parse(repository).map_err(|e| {
        TflvError::Resolve(format!("invalid chart repository URL {repository:?}: {e}"))
    })?;
    match parsed.scheme() {
        "https" | "http" => {}
        scheme => {
            return Err(TflvError::Resolve(format!(
                "unsupported chart repository scheme {scheme} for {repository}"
            )));
        }
    }

    Ok(Url::parse(&format!(
        "{}/index.yaml",
        repository.trim_end_matches('/')
    ))?)
}

/// First stable version in index order. The entries are not re-sorted.
fn select_chart_version(index: &IndexFile, chart: &str) -> Result<String> {
    let entries = index
        .entries
        .get(chart)
        .ok_or_else(|| TflvError::Resolve(format!("could not find chart entry {chart:?}")))?;
    if entries.is_empty() {
        return Err(TflvError::Resolve(format!(
            "chart {chart:?} has no published versions"
        )));
    }

    let versions: Vec<&str> = entries.iter().map(|e| e.version.as_str()).collect();
    first_stable(versions.as_slice()).ok_or_else(|| {
        TflvError::Resolve(format!("no stable versions found for chart {chart:?}"))
    })
}
