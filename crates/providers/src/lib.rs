//! Clients for the external services a story run depends on.
//!
//! The pipeline only sees the [`TextGenerator`], [`ImageGenerator`] and
//! [`BlobStore`] traits; the concrete adapters here talk to an
//! OpenAI-compatible chat API, Replicate, S3 and the local filesystem.

pub mod blob;
pub mod error;
pub mod image;
pub mod openai;
pub mod replicate;
pub mod storage;
pub mod text;

pub use blob::BlobStore;
pub use error::ProviderError;
pub use image::{GeneratedImage, ImageGenerator, ImageRequest};
pub use text::{TextGenerator, TextRequest};
