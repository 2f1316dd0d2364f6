use crate::agents::update::handlers::chart_handler::CHART_TITLE;
use crate::agents::update::handlers::provider_handler::PROVIDER_TITLE;
use crate::agents::update::handlers::{ChartHandler, ProviderHandler};
use crate::agents::update::{FileContext, Report, ReportSet};
use crate::config::{ResolverSettings, Selector};
use crate::error::Result;
use crate::repository::{ResolverFactory, VersionResolver};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// DependencyUpdater runs both declaration families over a set of files
pub struct DependencyUpdater {
    provider_resolver: Arc<dyn VersionResolver>,
    chart_resolver: Arc<dyn VersionResolver>,
    provider_selector: Option<Selector>,
    chart_selector: Option<Selector>,
}

impl DependencyUpdater {
    pub fn with_settings(
        settings: &ResolverSettings,
        provider_selector: Option<Selector>,
        chart_selector: Option<Selector>,
    ) -> Result<Self> {
        Ok(Self::with_resolvers(
            ResolverFactory::create_provider_registry(settings)?,
            ResolverFactory::create_chart_repository(settings)?,
        )
        .with_selectors(provider_selector, chart_selector))
    }

    pub fn with_resolvers(
        provider_resolver: Arc<dyn VersionResolver>,
        chart_resolver: Arc<dyn VersionResolver>,
    ) -> Self {
        Self {
            provider_resolver,
            chart_resolver,
            provider_selector: None,
            chart_selector: None,
        }
    }

    pub fn with_selectors(
        mut self,
        provider_selector: Option<Selector>,
        chart_selector: Option<Selector>,
    ) -> Self {
        self.provider_selector = provider_selector;
        self.chart_selector = chart_selector;
        self
    }

    /// Processes `files` in order. Files are rewritten only when `write` is set
    /// and at least one declaration in them was updated. Both families always
    /// have a report, Helm first.
    pub fn run(&self, files: &[PathBuf], write: bool, progress: &ProgressBar) -> Result<ReportSet> {
        let mut reports = ReportSet::new();
        reports.merge(Report::new(CHART_TITLE));
        reports.merge(Report::new(PROVIDER_TITLE));

        for path in files {
            progress.set_message(path.display().to_string());
            self.process_file(path, write, &mut reports)?;
            progress.inc(1);
        }

        Ok(reports)
    }

    fn process_file(&self, path: &Path, write: bool, reports: &mut ReportSet) -> Result<()> {
        debug!("Processing {}", path.display());
        let mut ctx = FileContext::load(path)?;

        let charts = ChartHandler::new(self.chart_resolver.as_ref(), self.chart_selector.as_ref())
            .update(&mut ctx)?;
        let providers =
            ProviderHandler::new(self.provider_resolver.as_ref(), self.provider_selector.as_ref())
                .update(&mut ctx)?;

        if ctx.is_dirty() {
            if write {
                ctx.save()?;
                info!("Updated {}", path.display());
            } else {
                debug!("Leaving {} untouched (check only)", path.display());
            }
        }

        reports.merge(charts);
        reports.merge(providers);
        Ok(())
    }
}
