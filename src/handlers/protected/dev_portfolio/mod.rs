pub mod list;
pub mod upload;

pub use list::list_get;
pub use upload::upload_post;
