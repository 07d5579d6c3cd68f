//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_locations;
mod m20250101_000002_create_onion_rates;
mod m20250101_000003_create_announcements;
mod m20250101_000004_create_market_updates;
mod m20250101_000005_create_media_assets;
mod m20250101_000006_create_site_settings;
mod m20250101_000007_create_contact_inquiries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_locations::Migration),
            Box::new(m20250101_000002_create_onion_rates::Migration),
            Box::new(m20250101_000003_create_announcements::Migration),
            Box::new(m20250101_000004_create_market_updates::Migration),
            Box::new(m20250101_000005_create_media_assets::Migration),
            Box::new(m20250101_000006_create_site_settings::Migration),
            Box::new(m20250101_000007_create_contact_inquiries::Migration),
        ]
    }
}
