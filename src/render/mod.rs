pub mod context;
pub mod placeholder;
pub mod plan;
pub mod select;

pub use context::build_context;
pub use placeholder::{placeholders, substitute, Filter, Placeholder};
pub use plan::{render, RenderResult, RenderedFile, SkipReason, SkippedEntry};
pub use select::select_entries;
