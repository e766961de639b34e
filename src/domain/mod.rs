pub mod engagement;
pub mod post;
pub mod subforum;
pub mod user;
