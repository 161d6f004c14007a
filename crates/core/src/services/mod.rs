//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod category;
pub mod comment;
pub mod comment_tree;
pub mod comment_view;
pub mod lifecycle;
pub mod pagination;
pub mod post;
pub mod slug;
pub mod tag;
pub mod user;
pub mod visibility;

pub use admin::{AdminService, Record};
pub use category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{CommentService, CreateCommentInput, UpdateCommentInput};
pub use comment_tree::{CommentTree, compute_depth};
pub use comment_view::{CommentNode, CommentView, assemble};
pub use lifecycle::{EntityKind, EntityRef, SoftDeleteLifecycle, Transition};
pub use pagination::{Page, PageRequest};
pub use post::{CreatePostInput, PostDetail, PostService, UpdatePostInput};
pub use slug::{allocate_slug, resolve_unique_slug, slug_candidate, slugify};
pub use tag::{CreateTagInput, TagService, UpdateTagInput};
pub use user::{CreateUserInput, UpdateUserInput, UserService};
pub use visibility::{Actor, VisibilityPolicy};
