pub mod admin;
pub mod recommendation;
pub mod user;
