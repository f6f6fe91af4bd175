pub mod prelude;

pub mod admin;
pub mod recommendations;
pub mod users;
