//! Render tree interpreter
//!
//! Maps a compiled render tree to presentation widgets.

mod code;
mod interpreter;
mod widget;

pub use code::{code_view, default_filename, display_name, file_icon, COLLAPSE_THRESHOLD};
pub use interpreter::render;
pub use widget::{CalloutTreatment, CodeView, EmphasisKind, FileIcon, HeadingSize, Widget};
