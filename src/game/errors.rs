use thiserror::Error;

/// Errors that can arise while interacting with the game storage layer or
/// executing economy transactions.
#[derive(Debug, Error)]
pub enum GameError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Creating a record whose unique key is already taken.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Missing, expired, or forged session token; bad credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Acting user does not own the target character.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Balance too low to cover a purchase.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Held quantity too low to cover a sale or equip.
    #[error("insufficient quantity of item {code}: need {requested}, have {available}")]
    InsufficientQuantity {
        code: u32,
        requested: u32,
        available: u32,
    },

    /// Equip requested for an item that already occupies its slot.
    #[error("item {0} is already equipped")]
    AlreadyEquipped(u32),

    /// Unequip requested for an item that is not equipped.
    #[error("item {0} is not equipped")]
    NotEquipped(u32),

    /// Malformed input: empty order, non-positive count, bad field value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal error (hashing failures, unexpected conditions).
    #[error("internal error: {0}")]
    Internal(String),
}
