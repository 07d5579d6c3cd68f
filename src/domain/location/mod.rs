pub mod model;
pub mod repository;

pub use model::{fallback, Mandi, State};
pub use repository::LocationRepository;
