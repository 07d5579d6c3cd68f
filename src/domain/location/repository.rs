//! Location lookup interface

use async_trait::async_trait;

use super::model::{Mandi, State};
use crate::shared::DomainResult;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// All states ordered by name
    async fn list_states(&self) -> DomainResult<Vec<State>>;
    /// Mandis ordered by name, optionally restricted to one state
    async fn list_mandis(&self, state_id: Option<i32>) -> DomainResult<Vec<Mandi>>;
    async fn find_state(&self, id: i32) -> DomainResult<Option<State>>;
    async fn find_mandi(&self, id: i32) -> DomainResult<Option<Mandi>>;
}
