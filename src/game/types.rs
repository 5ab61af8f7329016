use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USER_SCHEMA_VERSION: u8 = 1;
pub const SESSION_SCHEMA_VERSION: u8 = 1;
pub const CHARACTER_SCHEMA_VERSION: u8 = 1;
pub const ITEM_SCHEMA_VERSION: u8 = 1;

// ============================================================================
// Account Records
// ============================================================================

/// A registered user account. Keyed by lowercase username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub display_name: String,
    /// PHC-format Argon2id hash.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub schema_version: u8,
}

impl UserRecord {
    pub fn new(username: &str, display_name: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            username: username.to_string(),
            display_name: display_name.to_string(),
            password_hash,
            created_at: now,
            last_login: now,
            schema_version: USER_SCHEMA_VERSION,
        }
    }
}

/// A bearer session issued at login. Keyed by token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub token: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// ============================================================================
// Character & Catalog Records
// ============================================================================

/// A player-owned character: identity, stats, and currency balance.
///
/// `money`, `health`, and `power` are mutated exclusively by economy
/// transactions; collaborators only ever read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterRecord {
    pub id: u64,
    pub name: String,
    /// Owning account (lowercase username). Exactly one owner per character.
    pub owner: String,
    pub health: i64,
    pub power: i64,
    pub money: i64,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl CharacterRecord {
    pub fn new(id: u64, name: &str, owner: &str, health: i64, power: i64, money: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            owner: owner.to_ascii_lowercase(),
            health,
            power,
            money,
            created_at: Utc::now(),
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }
}

/// A catalog item definition. Read-only input to the economy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub code: u32,
    pub name: String,
    /// Non-negative purchase price.
    pub price: i64,
    /// Stat bonus applied to health while the item is equipped.
    pub health: i64,
    /// Stat bonus applied to power while the item is equipped.
    pub power: i64,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

/// Stat bonus block as it appears in item payloads (`"stat": {...}`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StatBonuses {
    #[serde(default)]
    pub health: i64,
    #[serde(default)]
    pub power: i64,
}

/// Item definition as submitted by catalog callers and seed files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemInput {
    pub code: u32,
    pub name: String,
    #[serde(default)]
    pub price: i64,
    pub stat: StatBonuses,
}

impl ItemInput {
    pub fn into_record(self) -> ItemRecord {
        ItemRecord {
            code: self.code,
            name: self.name,
            price: self.price,
            health: self.stat.health,
            power: self.stat.power,
            created_at: Utc::now(),
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Economy Operation Shapes
// ============================================================================

/// One line of a buy or sell order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderLine {
    pub code: u32,
    pub count: u32,
}

/// One row of a character's inventory projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryLine {
    pub code: u32,
    pub name: String,
    pub count: u32,
}

/// Health/power totals returned by equip and unequip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatSummary {
    pub health: i64,
    pub power: i64,
}

/// Result of a currency grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrantReceipt {
    pub name: String,
    pub balance: i64,
}

/// Listing row for a user's own characters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterSummary {
    pub id: u64,
    pub name: String,
    pub health: i64,
    pub power: i64,
}

/// Detail view of a character. `money` is present only when the requester
/// owns the character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterDetail {
    pub name: String,
    pub health: i64,
    pub power: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub money: Option<i64>,
}
