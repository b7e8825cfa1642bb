// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    InitOutcome, Workspace, emit, expand_path, init_workspace, parse_format, render_anchors,
    render_export, render_recommendations, render_stats,
};
