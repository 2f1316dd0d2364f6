// Per-file update machinery:
// - FileContext: one loaded file, its comments and the atomic save
// - Handlers: one per declaration family (providers, Helm charts)
// - Report: the Updated / Ignored / Failed outcomes and their Markdown form
pub mod context;
pub mod handlers;
pub mod report;

pub use context::FileContext;
pub use report::{Report, ReportSet};
