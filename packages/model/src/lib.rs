//! # Page Builder Model
//!
//! Data model for one page of the visual page builder: the page document,
//! its ordered sections, typed per-kind content, styles and version
//! snapshots.
//!
//! Everything here is plain data. Mutation policy (which edits hit the
//! backend, what goes into undo history) lives in `pagebuilder-editor`.

pub mod content;
pub mod error;
pub mod page;
pub mod path;
pub mod section;

pub use content::*;
pub use error::*;
pub use page::*;
pub use path::*;
pub use section::*;
