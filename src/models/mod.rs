//! Domain models for the prompt library.
//!
//! # Core Concepts
//!
//! - [`Category`]: A directory of prompts grouped by the kind of transformation they apply.
//! - [`Document`]: A single prompt file inside a category.
//! - [`SelectionList`]: The ordered, de-duplicated set of documents picked during a combine
//!   session.
//! - [`CompositionMetadata`]: The provenance record written next to every combined prompt.

mod composition;
mod document;
mod selection;

pub use composition::*;
pub use document::*;
pub use selection::*;
