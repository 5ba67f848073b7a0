//! Tools for maintaining a library of text-transformation system prompts.
//!
//! - [`store`]: list categories and prompts, flatten the tree into one directory.
//! - [`session`]: interactive selection of prompts to combine.
//! - [`composer`]: build and persist combined prompts with metadata.
//! - [`rewrite`]: batch-rewrite the flattened prompts through a generation service.

pub mod composer;
pub mod config;
pub mod generation;
pub mod models;
pub mod rewrite;
pub mod session;
pub mod store;
