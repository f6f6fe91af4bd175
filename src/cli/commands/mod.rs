mod admin;
mod recommendations;

pub use admin::cmd_create_admin;
pub use recommendations::cmd_list_recommendations;
