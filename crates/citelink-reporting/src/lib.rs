pub mod export;
pub mod types;

pub use export::{export_mentions, export_report, render_mentions, render_report};
pub use types::{ExportError, ExportFormat};
