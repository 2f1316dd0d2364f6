use crate::agents::annotation::{self, Annotation};
use crate::error::{Result, TflvError};
use hcl_edit::expr::{Expression, ObjectKey};
use hcl_edit::repr::Decorate;
use hcl_edit::structure::{Block, BlockLabel, Body, Structure};
use std::fmt;
use std::path::Path;
use tracing::debug;

pub const HELM_RELEASE: &str = "helm_release";

/// Key used to look up the latest version of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// `source` may be empty, in which case the local name is used for lookup.
    Provider { source: String, name: String },
    Chart { repository: String, chart: String },
}

impl Identifier {
    pub fn cache_key(&self) -> String {
        match self {
            Identifier::Provider { source, name } if source.is_empty() => name.clone(),
            Identifier::Provider { source, .. } => source.clone(),
            Identifier::Chart { repository, chart } => {
                format!("{}/{}", repository.trim_end_matches('/'), chart)
            }
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Provider { source, name } if source.is_empty() => write!(f, "{name}"),
            Identifier::Provider { source, .. } => write!(f, "{source}"),
            Identifier::Chart { repository, chart } => write!(f, "{chart} ({repository})"),
        }
    }
}

/// How the rewrite engine finds the declaration again in an edited document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    /// Key inside `terraform { required_providers { ... } }`.
    RequiredProvider { name: String },
    /// `resource "helm_release" "<name>"`.
    HelmRelease { name: String },
}

/// One version-bearing unit found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub identifier: Identifier,
    pub display_name: String,
    pub current_version: String,
    /// Comments right in front of the declaration.
    pub annotations: Vec<Annotation>,
    pub block_ref: BlockRef,
}

impl Declaration {
    pub fn is_annotated_ignore(&self) -> bool {
        annotation::should_skip(&self.annotations)
    }
}

/// Reads every `required_providers` entry of every root `terraform` block.
pub fn extract_providers(path: &Path, body: &Body) -> Result<Vec<Declaration>> {
    let mut declarations = Vec::new();

    for terraform in body.get_blocks("terraform") {
        for required in terraform.body.get_blocks("required_providers") {
            for attr in required.body.iter().filter_map(Structure::as_attribute) {
                let name = attr.key.as_str();
                let Some(record) = attr.value.as_object() else {
                    return Err(extraction_error(
                        path,
                        format!("required provider {name} must be an object"),
                    ));
                };

                let mut source = String::new();
                let mut version = String::new();
                for (key, value) in record.iter() {
                    match object_key(key) {
                        Some("source") => source = string_value(path, name, "source", value.expr())?,
                        Some("version") => {
                            version = string_value(path, name, "version", value.expr())?
                        }
                        _ => {}
                    }
                }

                let display_name = if source.is_empty() {
                    name.to_string()
                } else {
                    source.clone()
                };
                declarations.push(Declaration {
                    identifier: Identifier::Provider {
                        source,
                        name: name.to_string(),
                    },
                    display_name,
                    current_version: version,
                    annotations: annotation::scan(attr.decor()),
                    block_ref: BlockRef::RequiredProvider {
                        name: name.to_string(),
                    },
                });
            }
        }
    }

    Ok(declarations)
}

/// Reads every root `resource "helm_release"` block that points at a remote
/// repository. Releases of local charts are left out entirely.
pub fn extract_chart_releases(path: &Path, body: &Body) -> Result<Vec<Declaration>> {
    let mut declarations = Vec::new();

    for block in body.get_blocks("resource") {
        if block.labels.first().map(BlockLabel::as_str) != Some(HELM_RELEASE) {
            continue;
        }
        let name = release_name(path, block)?;

        let Some(chart) = block.body.get_attribute("chart") else {
            return Err(extraction_error(
                path,
                format!("helm release {name} is missing the required chart attribute"),
            ));
        };
        let Some(repository) = optional_string(path, &name, block, "repository")? else {
            debug!("Skipping helm release {} with a local chart", name);
            continue;
        };
        let chart = string_value(path, &name, "chart", &chart.value)?;
        let version = optional_string(path, &name, block, "version")?.unwrap_or_default();

        declarations.push(Declaration {
            identifier: Identifier::Chart {
                repository,
                chart: chart.clone(),
            },
            display_name: chart,
            current_version: version,
            annotations: annotation::scan(block.decor()),
            block_ref: BlockRef::HelmRelease { name },
        });
    }

    Ok(declarations)
}

/// Name of an object key written as an identifier or a quoted string.
pub(crate) fn object_key(key: &ObjectKey) -> Option<&str> {
    match key {
        ObjectKey::Ident(ident) => Some(ident.as_str()),
        ObjectKey::Expression(expr) => expr.as_str(),
    }
}

fn release_name(path: &Path, block: &Block) -> Result<String> {
    match block.labels.as_slice() {
        [_, name] => Ok(name.as_str().to_string()),
        labels => Err(extraction_error(
            path,
            format!(
                "{HELM_RELEASE} resource needs a type and a name label, found {}",
                labels.len()
            ),
        )),
    }
}

fn optional_string(path: &Path, owner: &str, block: &Block, key: &str) -> Result<Option<String>> {
    block
        .body
        .get_attribute(key)
        .map(|attr| string_value(path, owner, key, &attr.value))
        .transpose()
}

/// Quoted strings without interpolation are the only accepted form.
fn string_value(path: &Path, owner: &str, key: &str, value: &Expression) -> Result<String> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        extraction_error(path, format!("{owner}: {key} must be a literal string"))
    })
}

fn extraction_error(path: &Path, message: String) -> TflvError {
    TflvError::Extraction {
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Body {
        hcl_edit::parser::parse_body(source).unwrap()
    }

    #[test]
    fn extracts_required_providers_in_order() {
        let doc = parse(
            r#"
terraform {
  required_version = "0.13.5"

  required_providers {
    azurerm = {
      source  = "hashicorp/azurerm"
      version = "2.76.0"
    }
    aws = {
      source  = "hashicorp/aws"
      version = "3.58.0"
      configuration_aliases = [aws.east]
    }
    random = {}
  }
}
"#,
        );
        let declarations = extract_providers(Path::new("main.tf"), &doc).unwrap();
        assert_eq!(declarations.len(), 3);

        assert_eq!(declarations[0].display_name, "hashicorp/azurerm");
        assert_eq!(declarations[0].current_version, "2.76.0");
        assert!(declarations[0].annotations.is_empty());
        assert_eq!(
            declarations[0].block_ref,
            BlockRef::RequiredProvider {
                name: "azurerm".into()
            }
        );

        assert_eq!(declarations[1].identifier.cache_key(), "hashicorp/aws");

        assert_eq!(declarations[2].display_name, "random");
        assert_eq!(declarations[2].current_version, "");
        assert_eq!(declarations[2].identifier.cache_key(), "random");
    }

    #[test]
    fn comments_above_are_attached() {
        let doc = parse(
            "terraform {\n  required_providers {\n    # pinned\n    #tf-latest-version:ignore\n    aws = {\n      version = \"3.58.0\"\n    }\n    random = {}\n  }\n}\n\n#tf-latest-version:ignore\n\nresource \"helm_release\" \"x\" {\n  repository = \"https://charts.example.com\"\n  chart      = \"x\"\n}\n",
        );
        let providers = extract_providers(Path::new("main.tf"), &doc).unwrap();
        assert_eq!(providers[0].annotations.len(), 2);
        assert!(providers[0].is_annotated_ignore());
        assert!(!providers[1].is_annotated_ignore());

        // A blank line separates the directive from the release.
        let releases = extract_chart_releases(Path::new("main.tf"), &doc).unwrap();
        assert_eq!(releases[0].annotations[0].lines_above, 2);
        assert!(!releases[0].is_annotated_ignore());
    }

    #[test]
    fn no_required_providers_is_empty() {
        let doc = parse("terraform {\n}\n\nprovider \"aws\" {\n  region = \"eu-west-1\"\n}\n");
        assert!(extract_providers(Path::new("main.tf"), &doc).unwrap().is_empty());
    }

    #[test]
    fn provider_requirement_must_be_an_object() {
        let doc = parse("terraform {\n  required_providers {\n    aws = \"~> 3.0\"\n  }\n}\n");
        let err = extract_providers(Path::new("main.tf"), &doc).unwrap_err();
        assert!(matches!(err, TflvError::Extraction { .. }));
    }

    #[test]
    fn extracts_remote_helm_releases() {
        let doc = parse(
            r#"
resource "helm_release" "aad_pod_identity" {
  repository = "https://raw.githubusercontent.com/Azure/aad-pod-identity/master/charts"
  chart      = "aad-pod-identity"
  name       = "aad-pod-identity"
  version    = "2.1.0"
}

resource "kubernetes_namespace" "ops" {
  metadata {
    name = "ops"
  }
}
"#,
        );
        let declarations = extract_chart_releases(Path::new("main.tf"), &doc).unwrap();
        assert_eq!(declarations.len(), 1);
        let release = &declarations[0];
        assert_eq!(release.display_name, "aad-pod-identity");
        assert_eq!(release.current_version, "2.1.0");
        assert_eq!(
            release.identifier.cache_key(),
            "https://raw.githubusercontent.com/Azure/aad-pod-identity/master/charts/aad-pod-identity"
        );
        assert_eq!(
            release.block_ref,
            BlockRef::HelmRelease {
                name: "aad_pod_identity".into()
            }
        );
    }

    #[test]
    fn local_charts_are_excluded() {
        let doc = parse(
            "resource \"helm_release\" \"local\" {\n  chart = \"${path.module}/charts/app\"\n  name  = \"app\"\n}\n",
        );
        assert!(extract_chart_releases(Path::new("main.tf"), &doc).unwrap().is_empty());
    }

    #[test]
    fn missing_chart_is_fatal() {
        let doc = parse(
            "resource \"helm_release\" \"x\" {\n  repository = \"https://charts.example.com\"\n}\n",
        );
        let err = extract_chart_releases(Path::new("main.tf"), &doc).unwrap_err();
        assert!(err.to_string().contains("missing the required chart"));
    }

    #[test]
    fn interpolated_version_is_fatal() {
        let doc = parse(
            "terraform {\n  required_providers {\n    aws = {\n      version = \"${var.aws}\"\n    }\n  }\n}\n",
        );
        let err = extract_providers(Path::new("main.tf"), &doc).unwrap_err();
        assert!(err.to_string().contains("aws: version must be a literal string"));
    }

    #[test]
    fn non_literal_version_is_fatal() {
        let doc = parse(
            "resource \"helm_release\" \"x\" {\n  repository = \"https://charts.example.com\"\n  chart = \"x\"\n  version = var.x\n}\n",
        );
        assert!(extract_chart_releases(Path::new("main.tf"), &doc).is_err());
    }
}
