pub use super::admin::Entity as Admin;
pub use super::recommendations::Entity as Recommendations;
pub use super::users::Entity as Users;
