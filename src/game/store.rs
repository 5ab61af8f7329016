use std::path::{Path, PathBuf};

use argon2::Argon2;
use sled::transaction::ConflictableTransactionError;
use sled::IVec;

use crate::config::{GameConfig, SecurityConfig};
use crate::game::errors::GameError;
use crate::game::types::{
    CharacterRecord, CharacterSummary, ItemRecord, StatBonuses, UserRecord,
    CHARACTER_SCHEMA_VERSION, ITEM_SCHEMA_VERSION, USER_SCHEMA_VERSION,
};

const TREE_ACCOUNTS: &str = "armory_accounts";
const TREE_SESSIONS: &str = "armory_sessions";
const TREE_CHARACTERS: &str = "armory_characters";
const TREE_CATALOG: &str = "armory_catalog";
const TREE_INVENTORY: &str = "armory_inventory";
const TREE_EQUIPMENT: &str = "armory_equipment";

/// Helper builder so tests can easily create throwaway stores with custom
/// paths and tuning.
pub struct GameStoreBuilder {
    path: PathBuf,
    game: GameConfig,
    security: SecurityConfig,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            game: GameConfig::default(),
            security: SecurityConfig::default(),
        }
    }

    /// Override the economy tuning (starting stats, grant amount, sell ratio).
    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    /// Override the security tuning (password rules, session TTL).
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    pub fn open(self) -> Result<GameStore, GameError> {
        GameStore::open_with_options(self.path, self.game, self.security)
    }
}

/// Sled-backed persistence for accounts, characters, the item catalog, and
/// the per-character economy state (inventory + equipment rows).
///
/// Inventory and equipment rows are keyed `"<character-id>:<item-code>"`.
/// A zero-quantity inventory row is never stored; the row is deleted instead.
pub struct GameStore {
    db: sled::Db,
    pub(crate) accounts: sled::Tree,
    pub(crate) sessions: sled::Tree,
    pub(crate) characters: sled::Tree,
    pub(crate) catalog: sled::Tree,
    pub(crate) inventory: sled::Tree,
    pub(crate) equipment: sled::Tree,
    pub(crate) argon2: Argon2<'static>,
    pub(crate) game: GameConfig,
    pub(crate) security: SecurityConfig,
}

impl GameStore {
    /// Open (or create) the store rooted at `path` with default tuning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        Self::open_with_options(
            path,
            GameConfig::default(),
            SecurityConfig::default(),
        )
    }

    fn open_with_options<P: AsRef<Path>>(
        path: P,
        game: GameConfig,
        security: SecurityConfig,
    ) -> Result<Self, GameError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        let sessions = db.open_tree(TREE_SESSIONS)?;
        let characters = db.open_tree(TREE_CHARACTERS)?;
        let catalog = db.open_tree(TREE_CATALOG)?;
        let inventory = db.open_tree(TREE_INVENTORY)?;
        let equipment = db.open_tree(TREE_EQUIPMENT)?;
        Ok(Self {
            db,
            accounts,
            sessions,
            characters,
            catalog,
            inventory,
            equipment,
            argon2: Argon2::default(),
            game,
            security,
        })
    }

    // ------------------------------------------------------------------
    // Key layout
    // ------------------------------------------------------------------

    pub(crate) fn user_key(username: &str) -> Vec<u8> {
        format!("users:{}", username.to_ascii_lowercase()).into_bytes()
    }

    pub(crate) fn session_key(token: &str) -> Vec<u8> {
        format!("sessions:{}", token).into_bytes()
    }

    /// Zero-padded so listings iterate in id order.
    pub(crate) fn character_key(id: u64) -> Vec<u8> {
        format!("id:{:020}", id).into_bytes()
    }

    pub(crate) fn character_name_key(name: &str) -> Vec<u8> {
        format!("name:{}", name.to_ascii_lowercase()).into_bytes()
    }

    pub(crate) fn item_key(code: u32) -> Vec<u8> {
        format!("items:{:010}", code).into_bytes()
    }

    /// Composite key shared by the inventory and equipment trees.
    pub(crate) fn entry_key(character_id: u64, code: u32) -> Vec<u8> {
        format!("{}:{}", character_id, code).into_bytes()
    }

    pub(crate) fn entry_prefix(character_id: u64) -> Vec<u8> {
        format!("{}:", character_id).into_bytes()
    }

    pub(crate) fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, GameError> {
        Ok(bincode::serialize(value)?)
    }

    pub(crate) fn deserialize<T: serde::de::DeserializeOwned>(
        bytes: IVec,
    ) -> Result<T, GameError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert or update a user record.
    pub fn put_user(&self, mut user: UserRecord) -> Result<(), GameError> {
        user.schema_version = USER_SCHEMA_VERSION;
        let key = Self::user_key(&user.username);
        let bytes = Self::serialize(&user)?;
        self.accounts.insert(key, bytes)?;
        self.accounts.flush()?;
        Ok(())
    }

    /// Fetch a user record by username.
    pub fn get_user(&self, username: &str) -> Result<UserRecord, GameError> {
        let key = Self::user_key(username);
        let Some(bytes) = self.accounts.get(&key)? else {
            return Err(GameError::NotFound(format!("user: {}", username)));
        };
        let record: UserRecord = Self::deserialize(bytes)?;
        if record.schema_version != USER_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "user",
                expected: USER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn user_exists(&self, username: &str) -> Result<bool, GameError> {
        Ok(self.accounts.contains_key(Self::user_key(username))?)
    }

    // ------------------------------------------------------------------
    // Characters
    // ------------------------------------------------------------------

    /// Create a character with the configured starting stats. The record and
    /// its name-index entry are written in one transaction; a taken name
    /// fails `AlreadyExists` with nothing written.
    pub fn create_character(&self, owner: &str, name: &str) -> Result<CharacterRecord, GameError> {
        let id = self.db.generate_id()?;
        let record = CharacterRecord::new(
            id,
            name,
            owner,
            self.game.starting_health,
            self.game.starting_power,
            self.game.starting_money,
        );
        let bytes = Self::serialize(&record)?;
        let result = self.characters.transaction(|chars| {
            let name_key = Self::character_name_key(name);
            if chars.get(&name_key)?.is_some() {
                return Err(ConflictableTransactionError::Abort(
                    GameError::AlreadyExists(format!("character name: {}", name)),
                ));
            }
            chars.insert(name_key, id.to_be_bytes().to_vec())?;
            chars.insert(Self::character_key(id), bytes.clone())?;
            Ok(())
        });
        map_txn_result(result)?;
        self.characters.flush()?;
        Ok(record)
    }

    /// Fetch a character record by id.
    pub fn get_character(&self, id: u64) -> Result<CharacterRecord, GameError> {
        let key = Self::character_key(id);
        let Some(bytes) = self.characters.get(&key)? else {
            return Err(GameError::NotFound(format!("character: {}", id)));
        };
        let record: CharacterRecord = Self::deserialize(bytes)?;
        if record.schema_version != CHARACTER_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "character",
                expected: CHARACTER_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// List the characters belonging to `owner`, in id order.
    pub fn list_characters(&self, owner: &str) -> Result<Vec<CharacterSummary>, GameError> {
        let owner = owner.to_ascii_lowercase();
        let mut out = Vec::new();
        for entry in self.characters.scan_prefix(b"id:") {
            let (_, bytes) = entry?;
            let record: CharacterRecord = Self::deserialize(bytes)?;
            if record.owner == owner {
                out.push(CharacterSummary {
                    id: record.id,
                    name: record.name,
                    health: record.health,
                    power: record.power,
                });
            }
        }
        Ok(out)
    }

    /// Delete a character and everything it owns.
    ///
    /// The character record and its name-index entry go first, in one
    /// transaction, so any concurrent economy transaction re-reading the
    /// character aborts with `NotFound`. The inventory and equipment rows are
    /// then swept; once the record is gone no new rows can appear, so the
    /// sweep leaves nothing dangling.
    pub fn delete_character(&self, id: u64) -> Result<(), GameError> {
        let result = self.characters.transaction(|chars| {
            let key = Self::character_key(id);
            let Some(bytes) = chars.get(&key)? else {
                return Err(ConflictableTransactionError::Abort(GameError::NotFound(
                    format!("character: {}", id),
                )));
            };
            let record: CharacterRecord = bincode::deserialize(&bytes)
                .map_err(|e| ConflictableTransactionError::Abort(GameError::Bincode(e)))?;
            chars.remove(key)?;
            chars.remove(Self::character_name_key(&record.name))?;
            Ok(())
        });
        map_txn_result(result)?;

        let prefix = Self::entry_prefix(id);
        for entry in self.inventory.scan_prefix(&prefix) {
            let (key, _) = entry?;
            self.inventory.remove(key)?;
        }
        for entry in self.equipment.scan_prefix(&prefix) {
            let (key, _) = entry?;
            self.equipment.remove(key)?;
        }
        self.characters.flush()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Item catalog
    // ------------------------------------------------------------------

    /// Create a catalog item. Duplicate codes are rejected.
    pub fn put_item(&self, mut item: ItemRecord) -> Result<(), GameError> {
        if item.price < 0 {
            return Err(GameError::InvalidArgument(format!(
                "item price must be non-negative, got {}",
                item.price
            )));
        }
        item.schema_version = ITEM_SCHEMA_VERSION;
        let key = Self::item_key(item.code);
        if self.catalog.contains_key(&key)? {
            return Err(GameError::AlreadyExists(format!("item code: {}", item.code)));
        }
        let bytes = Self::serialize(&item)?;
        self.catalog.insert(key, bytes)?;
        self.catalog.flush()?;
        Ok(())
    }

    /// Fetch a catalog item by code.
    pub fn get_item(&self, code: u32) -> Result<ItemRecord, GameError> {
        let key = Self::item_key(code);
        let Some(bytes) = self.catalog.get(&key)? else {
            return Err(GameError::NotFound(format!("item: {}", code)));
        };
        let record: ItemRecord = Self::deserialize(bytes)?;
        if record.schema_version != ITEM_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "item",
                expected: ITEM_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    /// List all catalog items in code order.
    pub fn list_items(&self) -> Result<Vec<ItemRecord>, GameError> {
        let mut out = Vec::new();
        for entry in self.catalog.scan_prefix(b"items:") {
            let (_, bytes) = entry?;
            out.push(Self::deserialize(bytes)?);
        }
        Ok(out)
    }

    /// Update an item's name and stat bonuses. The price of a published item
    /// is immutable.
    pub fn update_item(
        &self,
        code: u32,
        name: Option<String>,
        stat: Option<StatBonuses>,
    ) -> Result<ItemRecord, GameError> {
        let mut item = self.get_item(code)?;
        if let Some(name) = name {
            item.name = name;
        }
        if let Some(stat) = stat {
            item.health = stat.health;
            item.power = stat.power;
        }
        let bytes = Self::serialize(&item)?;
        self.catalog.insert(Self::item_key(code), bytes)?;
        self.catalog.flush()?;
        Ok(item)
    }

    // ------------------------------------------------------------------
    // Inventory / equipment reads
    // ------------------------------------------------------------------

    /// Current inventory quantity for `(character, code)`; 0 when absent.
    pub fn inventory_quantity(&self, character_id: u64, code: u32) -> Result<u32, GameError> {
        match self.inventory.get(Self::entry_key(character_id, code))? {
            Some(bytes) => Ok(Self::deserialize(bytes)?),
            None => Ok(0),
        }
    }

    /// Whether `(character, code)` currently has an equipment row.
    pub fn is_equipped(&self, character_id: u64, code: u32) -> Result<bool, GameError> {
        Ok(self
            .equipment
            .contains_key(Self::entry_key(character_id, code))?)
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn count_users(&self) -> usize {
        self.accounts.scan_prefix(b"users:").count()
    }

    pub fn count_characters(&self) -> usize {
        self.characters.scan_prefix(b"id:").count()
    }

    pub fn count_items(&self) -> usize {
        self.catalog.scan_prefix(b"items:").count()
    }
}

/// Collapse a sled transaction result into the domain error type.
pub(crate) fn map_txn_result<T>(
    result: Result<T, sled::transaction::TransactionError<GameError>>,
) -> Result<T, GameError> {
    match result {
        Ok(value) => Ok(value),
        Err(sled::transaction::TransactionError::Abort(e)) => Err(e),
        Err(sled::transaction::TransactionError::Storage(e)) => Err(GameError::Sled(e)),
    }
}
