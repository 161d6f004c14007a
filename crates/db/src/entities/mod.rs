//! Database entities.

pub mod category;
pub mod comment;
pub mod post;
pub mod post_tag;
pub mod tag;
pub mod user;

pub use category::Entity as Category;
pub use comment::Entity as Comment;
pub use post::Entity as Post;
pub use post_tag::Entity as PostTag;
pub use tag::Entity as Tag;
pub use user::Entity as User;
