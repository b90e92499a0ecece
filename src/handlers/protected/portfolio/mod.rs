pub mod count;
pub mod delete;
pub mod list;
pub mod upload;

pub use count::count_get;
pub use delete::delete_post;
pub use list::list_get;
pub use upload::upload_post;
