use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;
use uuid::{Builder, Uuid};

use super::config::GeneratorConfig;
use super::error::Error;
use super::types::{Dataset, Item, User};

const ITEM_NAMES: &[&str] = &[
    "pool stick", "toe ring", "USB drive", "cup", "twister", "purse", "lip gloss", "bracelet",
    "sun glasses", "rubber duck", "ice cube tray", "knife", "camera", "shovel", "wallet",
    "blouse", "phone", "desk", "lotion", "bookmark", "nail file", "shoes", "model car", "vase",
    "headphones", "shawl", "tv", "greeting card", "clay pot", "mouse pad", "bottle cap",
    "sketch pad", "piano", "playing card", "tire swing", "mp3 player", "thermometer", "soap",
    "charger", "helmet", "monitor", "pencil", "sailboat", "drill press", "cookie jar",
    "hair brush", "controller", "chalk", "computer", "canvas", "paint brush", "towel",
    "keyboard", "photo album", "fridge", "book", "sofa", "boom box", "lamp", "mirror",
    "picture frame", "remote", "radio", "watch", "candle", "blanket", "speakers", "pillow",
    "clock", "magnet", "pen", "coasters", "lamp shade", "toothbrush", "wagon", "rug", "bowl",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bilal", "Chen", "Dana", "Elif", "Farid", "Greta", "Hugo", "Ines", "Jonas", "Kemi",
    "Luca", "Maya", "Noor", "Oscar", "Priya", "Quinn", "Rosa", "Sami", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Abara", "Brandt", "Costa", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ito",
    "Jensen", "Kowalski", "Laine", "Moreau", "Novak", "Okafor", "Petrov", "Rossi", "Sato",
];

/// Deterministic synthetic dataset generator.
///
/// Every user owns `items_per_user` items and wishes for `wishes_per_user`
/// items owned by someone else. Each item is wished for by at most one user,
/// so the resulting graph never repeats an item key.
pub struct DatasetGenerator {
    rng: SmallRng,
    config: GeneratorConfig,
}

impl DatasetGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(DatasetGenerator {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
        })
    }

    fn uuid(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    fn value(&mut self) -> u64 {
        let GeneratorConfig {
            min_value,
            max_value,
            value_step,
            ..
        } = self.config;
        let steps = (max_value - min_value) / value_step;
        min_value + self.rng.random_range(0..=steps) * value_step
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn generate_item(&mut self, user_id: &str) -> Item {
        Item {
            id: self.uuid().to_string(),
            user_id: user_id.to_string(),
            name: self.pick(ITEM_NAMES).to_string(),
            value: self.value(),
        }
    }

    fn generate_user(&mut self, items: &mut Vec<Item>) -> User {
        let id = self.uuid().to_string();
        let name = format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES));

        for _ in 0..self.config.items_per_user {
            let item = self.generate_item(&id);
            items.push(item);
        }

        User {
            id,
            name,
            items_wishes_id: Vec::new(),
        }
    }

    pub fn generate(mut self) -> Dataset {
        let mut items = Vec::with_capacity(self.config.users * self.config.items_per_user);
        let mut users: Vec<User> = (0..self.config.users)
            .map(|_| self.generate_user(&mut items))
            .collect();

        // Unwished items, in random order.
        let mut pool: Vec<usize> = (0..items.len()).collect();
        pool.shuffle(&mut self.rng);

        for user in &mut users {
            let mut wishes = Vec::with_capacity(self.config.wishes_per_user);
            pool.retain(|&index| {
                let item = &items[index];
                if wishes.len() < self.config.wishes_per_user && item.user_id != user.id {
                    wishes.push(item.id.clone());
                    false
                } else {
                    true
                }
            });
            user.items_wishes_id = wishes;
        }

        info!(
            users = users.len(),
            items = items.len(),
            seed = self.config.seed,
            "Synthetic dataset generated"
        );

        Dataset { users, items }
    }
}

/// Writes `users.json` and `items.json` style files for a dataset.
pub fn write_dataset(dataset: &Dataset, users_path: &Path, items_path: &Path) -> Result<(), Error> {
    for path in [users_path, items_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
    }

    serde_json::to_writer(BufWriter::new(File::create(users_path)?), &dataset.users)?;
    serde_json::to_writer(BufWriter::new(File::create(items_path)?), &dataset.items)?;

    Ok(())
}
