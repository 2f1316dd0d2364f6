pub mod annotation;
pub mod declaration;
pub mod dependency_updater;
pub mod project_scanner;
pub mod rewrite;
pub mod update;

pub use dependency_updater::DependencyUpdater;
pub use project_scanner::ProjectScannerAgent;
