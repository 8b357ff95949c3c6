use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exchange_core::WishGraph;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::error::Error;
use super::types::{Dataset, Item, User};

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to open data file");
        Error::IoError(e)
    })?;

    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Reads the users and items collections from their JSON files.
pub fn read_dataset(users_path: &Path, items_path: &Path) -> Result<Dataset, Error> {
    let users: Vec<User> = read_json(users_path)?;
    let items: Vec<Item> = read_json(items_path)?;

    debug!(users = users.len(), items = items.len(), "Dataset loaded");

    Ok(Dataset { users, items })
}

/// Builds the wish graph, one edge per wish from the wishing user to the
/// item's owner, keyed by item id.
///
/// Every user becomes a node, in file order, even without wishes.
///
/// # Errors
/// - `Error::MissingOwner` if an item's owner is not a known user.
/// - `Error::MissingItem` if a user wishes for an unknown item.
/// - `Error::GraphError` wrapping `DuplicateKey` if an item is wished for twice.
pub fn build_graph(dataset: &Dataset) -> Result<WishGraph, Error> {
    let user_ids: HashSet<&str> = dataset.users.iter().map(|user| user.id.as_str()).collect();

    for item in &dataset.items {
        if !user_ids.contains(item.user_id.as_str()) {
            return Err(Error::MissingOwner {
                item_id: item.id.clone(),
                owner_id: item.user_id.clone(),
            });
        }
    }

    let items_by_id: HashMap<&str, &Item> = dataset
        .items
        .iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut graph = WishGraph::new();

    for user in &dataset.users {
        graph.add_node(&user.id);

        for item_id in &user.items_wishes_id {
            let item = items_by_id
                .get(item_id.as_str())
                .ok_or_else(|| Error::MissingItem {
                    user_id: user.id.clone(),
                    item_id: item_id.clone(),
                })?;

            graph.add_edge(&user.id, &item.user_id, &item.id, item.value, &item.name)?;
        }
    }

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Wish graph built"
    );

    Ok(graph)
}
