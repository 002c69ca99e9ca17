//! Domain types and pure logic for Storyloom.
//!
//! Nothing in this crate performs I/O: the story data model, the staged
//! generation reducer, JSON extraction from model output, image size
//! selection and prompt construction all live here so they can be tested
//! without a database or network.

pub mod comic;
pub mod error;
pub mod extraction;
pub mod fixtures;
pub mod generation;
pub mod image_size;
pub mod naming;
pub mod pagination;
pub mod prompts;
pub mod story;
pub mod types;
