//! SeaORM implementation of LocationRepository

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::domain::location::{LocationRepository, Mandi, State};
use crate::infrastructure::database::entities::{mandi, state};
use crate::shared::DomainResult;

fn state_to_domain(m: state::Model) -> State {
    State { id: m.id, name: m.name }
}

fn mandi_to_domain(m: mandi::Model) -> Mandi {
    Mandi { id: m.id, name: m.name, state_id: m.state_id }
}

pub struct SeaOrmLocationRepository {
    db: DatabaseConnection,
}

impl SeaOrmLocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationRepository for SeaOrmLocationRepository {
    async fn list_states(&self) -> DomainResult<Vec<State>> {
        let models = state::Entity::find()
            .order_by_asc(state::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(state_to_domain).collect())
    }

    async fn list_mandis(&self, state_id: Option<i32>) -> DomainResult<Vec<Mandi>> {
        let mut query = mandi::Entity::find().order_by_asc(mandi::Column::Name);
        if let Some(state_id) = state_id {
            query = query.filter(mandi::Column::StateId.eq(state_id));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(mandi_to_domain).collect())
    }

    async fn find_state(&self, id: i32) -> DomainResult<Option<State>> {
        let model = state::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(state_to_domain))
    }

    async fn find_mandi(&self, id: i32) -> DomainResult<Option<Mandi>> {
        let model = mandi::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(mandi_to_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::test_db;

    #[tokio::test]
    async fn lists_seeded_locations_by_name() {
        let repo = SeaOrmLocationRepository::new(test_db().await);

        let states: Vec<_> = repo.list_states().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(states, vec!["Gujarat", "Maharashtra"]);

        let mandis = repo.list_mandis(Some(2)).await.unwrap();
        assert_eq!(mandis, vec![Mandi { id: 2, name: "Rajkot".into(), state_id: 2 }]);
        assert_eq!(repo.list_mandis(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn finds_by_id() {
        let repo = SeaOrmLocationRepository::new(test_db().await);
        assert_eq!(repo.find_mandi(1).await.unwrap().map(|m| m.state_id), Some(1));
        assert!(repo.find_state(42).await.unwrap().is_none());
    }
}
