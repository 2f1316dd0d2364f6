use crate::config::ResolverSettings;
use crate::error::Result;
use crate::registry::{HelmRepository, TerraformRegistry};
use crate::repository::{VersionCache, VersionResolver};
use std::sync::Arc;

/// Builds the network-backed resolvers, each with its own run-scoped cache.
pub struct ResolverFactory;

impl ResolverFactory {
    pub fn create_provider_registry(
        settings: &ResolverSettings,
    ) -> Result<Arc<dyn VersionResolver>> {
        let client = TerraformRegistry::new(settings, VersionCache::new())?;
        Ok(Arc::new(client))
    }

    pub fn create_chart_repository(
        settings: &ResolverSettings,
    ) -> Result<Arc<dyn VersionResolver>> {
        let client = HelmRepository::new(settings, VersionCache::new())?;
        Ok(Arc::new(client))
    }
}
