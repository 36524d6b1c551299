//! Content module - turns raw markdown documents into posts

mod assembler;
pub mod authoring;
pub mod excerpt;
mod frontmatter;
mod markdown;
mod post;
pub mod reading_time;
mod sanitize;
mod slug;

pub use assembler::PostAssembler;
pub use authoring::Draft;
pub use excerpt::excerpt;
pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, RenderError};
pub use post::Post;
pub use reading_time::reading_time;
pub use sanitize::Sanitizer;
pub use slug::slugify;
