pub mod auth;
pub mod dev_portfolio;
