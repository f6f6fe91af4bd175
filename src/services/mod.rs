pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;

pub mod session;
pub use session::{AdminSession, AuthState};

pub mod recommendation_service;
pub mod recommendation_service_impl;
pub use recommendation_service::{
    AddMovieRequest, CurationError, CurationOutcome, Dashboard, DashboardStats,
    RecommendationService,
};
pub use recommendation_service_impl::SeaOrmRecommendationService;

pub mod catalog;
pub use catalog::{BrowseKind, CatalogService, MovieSummary};

pub mod user_service;
pub use user_service::{UserError, UserList, UserService};
