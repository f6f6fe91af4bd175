pub mod tmdb;

pub use tmdb::{MetadataProvider, TmdbClient, UpstreamError};
