pub mod comics;
pub mod generation;
pub mod images;
pub mod panels;
pub mod prompts;
pub mod seed;
pub mod stories;
