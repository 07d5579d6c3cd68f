//! Database entities module

pub mod announcement;
pub mod contact_inquiry;
pub mod mandi;
pub mod market_update;
pub mod media_asset;
pub mod rate;
pub mod site_setting;
pub mod state;

pub use announcement::Entity as Announcement;
pub use contact_inquiry::Entity as ContactInquiry;
pub use mandi::Entity as Mandi;
pub use market_update::Entity as MarketUpdate;
pub use media_asset::Entity as MediaAsset;
pub use rate::Entity as Rate;
pub use site_setting::Entity as SiteSetting;
pub use state::Entity as State;
