//! SeaORM repository implementations

pub mod location_repository;
pub mod rate_repository;
pub mod repository_provider;

pub use location_repository::SeaOrmLocationRepository;
pub use rate_repository::SeaOrmRateRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
