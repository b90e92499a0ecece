pub mod list;
pub mod show;

pub use list::catalog_get;
pub use show::catalog_show;
