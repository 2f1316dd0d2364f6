use super::process_declarations;
use crate::agents::declaration::extract_chart_releases;
use crate::agents::update::context::FileContext;
use crate::agents::update::report::Report;
use crate::config::Selector;
use crate::error::Result;
use crate::repository::VersionResolver;

pub const CHART_TITLE: &str = "Helm";

/// Updates the chart version of `helm_release` resources backed by a repository.
pub struct ChartHandler<'a> {
    resolver: &'a dyn VersionResolver,
    selector: Option<&'a Selector>,
}

impl<'a> ChartHandler<'a> {
    pub fn new(resolver: &'a dyn VersionResolver, selector: Option<&'a Selector>) -> Self {
        Self { resolver, selector }
    }

    pub fn update(&self, ctx: &mut FileContext) -> Result<Report> {
        let declarations = extract_chart_releases(ctx.path(), ctx.body())?;
        let mut report = Report::new(CHART_TITLE);
        process_declarations(ctx, declarations, self.resolver, self.selector, &mut report);
        Ok(report)
    }
}
