use crate::cli::SelectionArgs;
use crate::error::{Result, TflvError};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const CONFIG_FILE_NAME: &str = ".tf-latest-version.toml";
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.terraform.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Optional settings read from `.tf-latest-version.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub providers: Option<Vec<String>>,
    pub charts: Option<Vec<String>>,
    pub registry_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TflvError::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            TflvError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })
    }

    /// An explicit file must exist; otherwise the default file is used when present.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(TflvError::Config(format!(
                    "Config file '{}' not found",
                    path.display()
                )));
            }
            return Self::load(path);
        }

        let dir = if root.is_file() {
            root.parent().unwrap_or(Path::new("."))
        } else {
            root
        };
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Using config file {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}

/// Allow-list of provider sources or chart names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    names: HashSet<String>,
}

impl Selector {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Flags win over the config file; no list at all means everything is selected.
    fn from_sources(flags: &[String], file: Option<&Vec<String>>) -> Option<Self> {
        if !flags.is_empty() {
            return Some(Self::new(flags));
        }
        file.map(Self::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub registry_url: Url,
    pub timeout: Duration,
}

impl ResolverSettings {
    pub fn new(registry_url: &str, timeout_secs: u64) -> Result<Self> {
        if timeout_secs == 0 {
            return Err(TflvError::Config(
                "Timeout must be greater than zero seconds".to_string(),
            ));
        }

        let registry_url = Url::parse(registry_url).map_err(|e| {
            TflvError::Config(format!("Invalid registry URL '{registry_url}': {e}"))
        })?;
        match registry_url.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(TflvError::Config(format!(
                    "Unsupported registry scheme: {scheme}"
                )));
            }
        }

        Ok(Self {
            registry_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Everything a run needs, merged from flags, the config file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub provider_selector: Option<Selector>,
    pub chart_selector: Option<Selector>,
    pub resolver: ResolverSettings,
}

impl Settings {
    pub fn load(root: &Path, explicit_config: Option<&Path>, args: &SelectionArgs) -> Result<Self> {
        let file = FileConfig::discover(root, explicit_config)?;
        Self::merge(root, file, args)
    }

    fn merge(root: &Path, file: FileConfig, args: &SelectionArgs) -> Result<Self> {
        let registry_url = args
            .registry_url
            .as_deref()
            .or(file.registry_url.as_deref())
            .unwrap_or(DEFAULT_REGISTRY_URL);
        let timeout_secs = args
            .timeout
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            root: root.to_path_buf(),
            provider_selector: Selector::from_sources(&args.providers, file.providers.as_ref()),
            chart_selector: Selector::from_sources(&args.charts, file.charts.as_ref()),
            resolver: ResolverSettings::new(registry_url, timeout_secs)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_config_file() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(dir.path(), None, &SelectionArgs::default()).unwrap();
        assert!(settings.provider_selector.is_none());
        assert!(settings.chart_selector.is_none());
        assert_eq!(settings.resolver.registry_url.as_str(), "https://registry.terraform.io/");
        assert_eq!(settings.resolver.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn reads_default_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "providers = [\"hashicorp/aws\"]\ntimeout_secs = 3\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path(), None, &SelectionArgs::default()).unwrap();
        let providers = settings.provider_selector.unwrap();
        assert!(providers.contains("hashicorp/aws"));
        assert!(!providers.contains("hashicorp/azurerm"));
        assert_eq!(settings.resolver.timeout, Duration::from_secs(3));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "charts = [\"a\"]\nregistry_url = \"https://registry.example.com\"\n",
        )
        .unwrap();
        let args = SelectionArgs {
            charts: vec!["b".into()],
            timeout: Some(5),
            ..SelectionArgs::default()
        };

        let settings = Settings::load(dir.path(), None, &args).unwrap();
        let charts = settings.chart_selector.unwrap();
        assert!(charts.contains("b"));
        assert!(!charts.contains("a"));
        assert_eq!(settings.resolver.registry_url.host_str(), Some("registry.example.com"));
        assert_eq!(settings.resolver.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "provider = [\"typo\"]\n").unwrap();
        let err = Settings::load(dir.path(), Some(&path), &SelectionArgs::default()).unwrap_err();
        assert!(matches!(err, TflvError::Config(_)));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Settings::load(dir.path(), Some(&path), &SelectionArgs::default()).is_err());
    }

    #[test]
    fn rejects_invalid_resolver_settings() {
        assert!(ResolverSettings::new("ftp://registry.example.com", 10).is_err());
        assert!(ResolverSettings::new(DEFAULT_REGISTRY_URL, 0).is_err());
    }

    #[test]
    fn selector_ignores_blank_entries() {
        let selector = Selector::new([" ingress-nginx ", ""]);
        assert!(selector.contains("ingress-nginx"));
        assert!(!selector.contains(""));
    }
}
