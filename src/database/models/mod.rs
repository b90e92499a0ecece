pub mod dev_portfolio;
pub mod portfolio;
pub mod user;

pub use dev_portfolio::DevItemRow;
pub use portfolio::PortfolioItemRow;
pub use user::{PublicUser, User};
