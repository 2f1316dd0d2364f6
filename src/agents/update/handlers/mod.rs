// One handler per declaration family. Both extract their declarations from
// the file context and share the ignore, select, resolve and rewrite steps.

pub mod chart_handler;
pub mod provider_handler;

pub use chart_handler::ChartHandler;
pub use provider_handler::ProviderHandler;

use crate::agents::declaration::Declaration;
use crate::agents::update::context::FileContext;
use crate::agents::update::report::{IgnoreReason, Report};
use crate::config::Selector;
use crate::repository::VersionResolver;
use tracing::{debug, warn};

/// Walks `declarations` in file order and records one outcome per declaration,
/// editing the in-memory document for every update.
fn process_declarations(
    ctx: &mut FileContext,
    declarations: Vec<Declaration>,
    resolver: &dyn VersionResolver,
    selector: Option<&Selector>,
    report: &mut Report,
) {
    let path = ctx.display_path();

    for declaration in declarations {
        let name = declaration.display_name.clone();

        if declaration.is_annotated_ignore() {
            debug!("Ignoring {} in {} ({})", name, path, IgnoreReason::Annotation);
            report.add_ignore(name, path.clone(), IgnoreReason::Annotation);
            continue;
        }
        if selector.is_some_and(|s| !s.contains(&name)) {
            debug!("Ignoring {} in {} ({})", name, path, IgnoreReason::NotSelected);
            report.add_ignore(name, path.clone(), IgnoreReason::NotSelected);
            continue;
        }

        let latest = match resolver.resolve(&declaration.identifier) {
            Ok(version) => version,
            Err(e) => {
                warn!("Unable to resolve {}: {}", declaration.identifier, e);
                report.add_failure(name, path.clone(), e.to_string());
                continue;
            }
        };
        if latest == declaration.current_version {
            debug!("{} is up to date ({})", name, latest);
            continue;
        }

        match ctx.apply_version(&declaration, &latest) {
            Ok(()) => {
                debug!(
                    "Updated {}: {} -> {}",
                    name, declaration.current_version, latest
                );
                report.add_update(name, declaration.current_version, latest);
            }
            Err(e) => {
                warn!("Unable to update {} in {}: {}", name, path, e);
                report.add_failure(name, path.clone(), e.to_string());
            }
        }
    }
}
