//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::location::LocationRepository;
use crate::domain::rate::RateRepository;
use crate::domain::repositories::RepositoryProvider;

use super::location_repository::SeaOrmLocationRepository;
use super::rate_repository::SeaOrmRateRepository;

/// Holds one connection pool and exposes per-aggregate repositories.
pub struct SeaOrmRepositoryProvider {
    rates: SeaOrmRateRepository,
    locations: SeaOrmLocationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            rates: SeaOrmRateRepository::new(db.clone()),
            locations: SeaOrmLocationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn rates(&self) -> &dyn RateRepository {
        &self.rates
    }

    fn locations(&self) -> &dyn LocationRepository {
        &self.locations
    }
}
