//! Account registration, login, bearer sessions, and the character
//! resolution gate every economy handler goes through.

use chrono::{Duration, Utc};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier};
use uuid::Uuid;

use crate::game::errors::GameError;
use crate::game::store::GameStore;
use crate::game::types::{
    CharacterRecord, SessionRecord, UserRecord, SESSION_SCHEMA_VERSION,
};
use crate::validation::{validate_password, validate_username};

impl GameStore {
    /// Register a new user with an Argon2id-hashed password; fails if the
    /// username is taken or malformed.
    pub fn register_user(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<UserRecord, GameError> {
        let username = validate_username(username)
            .map_err(|e| GameError::InvalidArgument(format!("invalid username: {}", e)))?;
        validate_password(password, self.security.min_password_length)
            .map_err(|e| GameError::InvalidArgument(format!("invalid password: {}", e)))?;
        if display_name.trim().is_empty() {
            return Err(GameError::InvalidArgument(
                "display name must not be empty".to_string(),
            ));
        }
        if self.user_exists(&username)? {
            return Err(GameError::AlreadyExists(format!("username: {}", username)));
        }

        let salt = password_hash::SaltString::generate(&mut rand::thread_rng());
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| GameError::Internal(format!("password hash failure: {}", e)))?;
        let user = UserRecord::new(&username, display_name.trim(), hash.to_string());
        self.put_user(user.clone())?;
        Ok(user)
    }

    /// Verify credentials and issue a bearer session with the configured TTL.
    /// Unknown usernames and bad passwords are indistinguishable to callers.
    pub fn login(&self, username: &str, password: &str) -> Result<SessionRecord, GameError> {
        let mut user = match self.get_user(username) {
            Ok(user) => user,
            Err(GameError::NotFound(_)) => {
                return Err(GameError::Unauthorized(
                    "unknown username or password".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| GameError::Internal(format!("corrupt password hash: {}", e)))?;
        if self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(GameError::Unauthorized(
                "unknown username or password".to_string(),
            ));
        }

        user.last_login = Utc::now();
        self.put_user(user.clone())?;

        let now = Utc::now();
        let session = SessionRecord {
            token: Uuid::new_v4().to_string(),
            username: user.username,
            issued_at: now,
            expires_at: now + Duration::minutes(self.security.session_ttl_minutes),
            schema_version: SESSION_SCHEMA_VERSION,
        };
        let bytes = Self::serialize(&session)?;
        self.sessions.insert(Self::session_key(&session.token), bytes)?;
        self.sessions.flush()?;
        Ok(session)
    }

    /// Resolve a bearer token to its user. Expired tokens are removed as
    /// they are seen.
    pub fn resolve_session(&self, token: &str) -> Result<UserRecord, GameError> {
        let key = Self::session_key(token);
        let Some(bytes) = self.sessions.get(&key)? else {
            return Err(GameError::Unauthorized("invalid session token".to_string()));
        };
        let session: SessionRecord = Self::deserialize(bytes)?;
        if session.schema_version != SESSION_SCHEMA_VERSION {
            return Err(GameError::SchemaMismatch {
                entity: "session",
                expected: SESSION_SCHEMA_VERSION,
                found: session.schema_version,
            });
        }
        if session.is_expired(Utc::now()) {
            self.sessions.remove(&key)?;
            return Err(GameError::Unauthorized("session expired".to_string()));
        }
        self.get_user(&session.username)
    }

    /// Drop every expired session row. Returns the number removed.
    pub fn purge_expired_sessions(&self) -> Result<usize, GameError> {
        let now = Utc::now();
        let mut removed = 0;
        for entry in self.sessions.scan_prefix(b"sessions:") {
            let (key, bytes) = entry?;
            let session: SessionRecord = Self::deserialize(bytes)?;
            if session.is_expired(now) {
                self.sessions.remove(key)?;
                removed += 1;
            }
        }
        if removed > 0 {
            self.sessions.flush()?;
        }
        Ok(removed)
    }

    /// Ownership gate shared by every character-scoped operation: the acting
    /// user must own the target character.
    pub fn resolve_character(
        &self,
        character_id: u64,
        acting_user: &str,
    ) -> Result<CharacterRecord, GameError> {
        let character = self.get_character(character_id)?;
        if character.owner != acting_user.to_ascii_lowercase() {
            return Err(GameError::Forbidden(format!(
                "character {} does not belong to {}",
                character_id, acting_user
            )));
        }
        Ok(character)
    }
}
