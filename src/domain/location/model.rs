use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An Indian state, the top level of the domestic location hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct State {
    pub id: i32,
    pub name: String,
}

/// A wholesale market (mandi) inside a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mandi {
    pub id: i32,
    pub name: String,
    pub state_id: i32,
}

/// Lists served when the database cannot be reached.
pub mod fallback {
    use super::{Mandi, State};

    const STATES: [&str; 10] = [
        "Andhra Pradesh",
        "Karnataka",
        "Maharashtra",
        "Tamil Nadu",
        "Telangana",
        "Gujarat",
        "Rajasthan",
        "Madhya Pradesh",
        "Uttar Pradesh",
        "Bihar",
    ];

    const MANDIS: [(&str, i32); 10] = [
        ("Nashik", 3),
        ("Pune", 3),
        ("Mumbai", 3),
        ("Bangalore", 2),
        ("Hyderabad", 5),
        ("Chennai", 4),
        ("Vijayawada", 1),
        ("Ahmedabad", 6),
        ("Jaipur", 7),
        ("Indore", 8),
    ];

    /// Sorted by name, like the database query.
    pub fn states() -> Vec<State> {
        let mut states: Vec<State> = STATES
            .iter()
            .zip(1..)
            .map(|(name, id)| State { id, name: name.to_string() })
            .collect();
        states.sort_by(|a, b| a.name.cmp(&b.name));
        states
    }

    pub fn mandis(state_id: Option<i32>) -> Vec<Mandi> {
        let mut mandis: Vec<Mandi> = MANDIS
            .iter()
            .zip(1..)
            .filter(|((_, sid), _)| state_id.map_or(true, |wanted| wanted == *sid))
            .map(|((name, sid), id)| Mandi { id, name: name.to_string(), state_id: *sid })
            .collect();
        mandis.sort_by(|a, b| a.name.cmp(&b.name));
        mandis
    }
}
