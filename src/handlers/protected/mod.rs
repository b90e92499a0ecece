pub mod dev_portfolio;
pub mod portfolio;
