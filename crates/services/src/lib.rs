#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod favorites;
pub mod identity;
pub mod quiz;

pub use vocab_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CatalogLoader, CatalogOrigin, CatalogSource, LoadedCatalog};
pub use error::{AppServicesError, CatalogError, FavoritesError, IdentityError};
pub use favorites::{FavoriteService, default_list_name};
pub use identity::{
    AuthUser, HostedIdentityConfig, HostedIdentityProvider, IdentityProvider, IdentityService,
    InMemoryIdentityProvider, LoginRequest, RegisterRequest,
};
pub use quiz::QuizController;
