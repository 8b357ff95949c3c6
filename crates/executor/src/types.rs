use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A participant and the ids of the items they would like to receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub items_wishes_id: Vec<String>,
}

/// An item offered for exchange by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub users: Vec<User>,
    pub items: Vec<Item>,
}

impl Dataset {
    /// Display names keyed by user id.
    pub fn user_names(&self) -> HashMap<&str, &str> {
        self.users
            .iter()
            .map(|user| (user.id.as_str(), user.name.as_str()))
            .collect()
    }

    pub fn wish_count(&self) -> usize {
        self.users.iter().map(|user| user.items_wishes_id.len()).sum()
    }
}
