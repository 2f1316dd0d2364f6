use crate::agents::declaration::Identifier;
use crate::config::ResolverSettings;
use crate::error::{Result, TflvError};
use crate::registry::build_client;
use crate::registry::version::{Version, newest_stable};
use crate::repository::{VersionCache, VersionResolver};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const DEFAULT_HOST: &str = "registry.terraform.io";
const DEFAULT_NAMESPACE: &str = "hashicorp";

/// Terraform provider registry client (`/v1/providers/{namespace}/{type}`).
pub struct TerraformRegistry {
    client: Client,
    base_url: Url,
    cache: VersionCache,
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    version: String,
    #[serde(default)]
    versions: Vec<String>,
}

impl TerraformRegistry {
    pub fn new(settings: &ResolverSettings, cache: VersionCache) -> Result<Self> {
        let mut base_url = settings.registry_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: build_client(settings.timeout)?,
            base_url,
            cache,
        })
    }

    fn fetch_latest(&self, address: &str) -> Result<String> {
        let url = self.base_url.join(&format!("v1/providers/{address}"))?;
        debug!("Fetching provider metadata: {}", url);

        let response = self.client.get(url).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(TflvError::Resolve(format!(
                    "provider {address} was not found in the registry"
                )));
            }
            status if !status.is_success() => {
                return Err(TflvError::Resolve(format!(
                    "registry returned HTTP {status} for provider {address}"
                )));
            }
            _ => {}
        }

        let body: ProviderResponse = serde_json::from_str(&response.text()?)?;
        select_version(&body).ok_or_else(|| {
            TflvError::Resolve(format!("no stable version found for provider {address}"))
        })
    }
}

impl VersionResolver for TerraformRegistry {
    fn resolve(&self, identifier: &Identifier) -> Result<String> {
        let address = provider_address(identifier)?;
        self.cache
            .get_or_try_insert_with(&identifier.cache_key(), || self.fetch_latest(&address))
    }
}

/// Normalizes a provider source to `namespace/type`.
///
/// Accepts `type` (implied `hashicorp` namespace), `namespace/type` and
/// `registry.terraform.io/namespace/type`. Sources hosted anywhere else fail.
fn provider_address(identifier: &Identifier) -> Result<String> {
    let Identifier::Provider { source, name } = identifier else {
        return Err(TflvError::Resolve(format!(
            "{identifier} is not a provider identifier"
        )));
    };

    let source = source.trim();
    let source = if source.is_empty() { name.trim() } else { source };
    if source.is_empty() {
        return Err(TflvError::Resolve(
            "provider source cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = source.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(malformed(source));
    }

    match parts.as_slice() {
        [provider_type] => Ok(format!("{DEFAULT_NAMESPACE}/{provider_type}")),
        [namespace, provider_type] => Ok(format!("{namespace}/{provider_type}")),
        [host, namespace, provider_type] if host.eq_ignore_ascii_case(DEFAULT_HOST) => {
            Ok(format!("{namespace}/{provider_type}"))
        }
        [host, _, _] => Err(TflvError::Resolve(format!(
            "provider source {source} uses unsupported registry host {host}"
        ))),
        _ => Err(malformed(source)),
    }
}

fn malformed(source: &str) -> TflvError {
    TflvError::Resolve(format!("malformed provider source {source:?}"))
}

/// The advertised `version` when it is stable, otherwise the newest stable entry of `versions`.
fn select_version(response: &ProviderResponse) -> Option<String> {
    let latest = response.version.trim();
    if !latest.is_empty() && Version::parse(latest).is_stable() {
        return Some(latest.to_string());
    }
    newest_stable(response.versions.as_slice())
}
