//! Core business logic for quill.
//!
//! Services own the rules of the blog: the depth-bounded comment tree, the
//! soft-delete lifecycle shared by every entity kind, comment tree assembly
//! for readers, and who may see or comment on a post.

pub mod services;

pub use services::*;
