pub mod logged_in;
pub mod login;
pub mod signup;

pub use logged_in::logged_in_post;
pub use login::login_post;
pub use signup::signup_post;
