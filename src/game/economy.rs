//! Economy transaction coordinator.
//!
//! Every operation here is a single sled multi-tree transaction over the
//! character ledger, the inventory rows, and (for equip/unequip) the
//! equipment rows. All reads that inform a write (balance checks, quantity
//! checks) happen inside the transaction closure against the same snapshot
//! the writes commit from, so two racing operations on one character can
//! never both pass a check that only one should pass; sled re-runs the
//! losing closure against fresh state. Catalog prices are read-only input
//! and are resolved before the transaction begins.

use std::collections::BTreeMap;

use sled::transaction::{ConflictableTransactionError, TransactionalTree};
use sled::{IVec, Transactional};

use crate::game::errors::GameError;
use crate::game::store::{map_txn_result, GameStore};
use crate::game::types::{
    CharacterRecord, GrantReceipt, InventoryLine, OrderLine, StatSummary,
};

type TxnResult<T> = Result<T, ConflictableTransactionError<GameError>>;

fn abort<T>(err: GameError) -> TxnResult<T> {
    Err(ConflictableTransactionError::Abort(err))
}

fn txn_encode<T: serde::Serialize>(value: &T) -> TxnResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| ConflictableTransactionError::Abort(GameError::Bincode(e)))
}

fn txn_decode<T: serde::de::DeserializeOwned>(bytes: IVec) -> TxnResult<T> {
    bincode::deserialize(&bytes)
        .map_err(|e| ConflictableTransactionError::Abort(GameError::Bincode(e)))
}

fn read_character(tree: &TransactionalTree, id: u64) -> TxnResult<CharacterRecord> {
    match tree.get(GameStore::character_key(id))? {
        Some(bytes) => txn_decode(bytes),
        None => abort(GameError::NotFound(format!("character: {}", id))),
    }
}

fn write_character(tree: &TransactionalTree, record: &CharacterRecord) -> TxnResult<()> {
    tree.insert(GameStore::character_key(record.id), txn_encode(record)?)?;
    Ok(())
}

fn read_quantity(tree: &TransactionalTree, character_id: u64, code: u32) -> TxnResult<u32> {
    match tree.get(GameStore::entry_key(character_id, code))? {
        Some(bytes) => txn_decode(bytes),
        None => Ok(0),
    }
}

/// Zero-quantity rows are deleted, never stored.
fn write_quantity(
    tree: &TransactionalTree,
    character_id: u64,
    code: u32,
    quantity: u32,
) -> TxnResult<()> {
    let key = GameStore::entry_key(character_id, code);
    if quantity == 0 {
        tree.remove(key)?;
    } else {
        tree.insert(key, txn_encode(&quantity)?)?;
    }
    Ok(())
}

fn validate_lines(lines: &[OrderLine]) -> Result<(), GameError> {
    if lines.is_empty() {
        return Err(GameError::InvalidArgument(
            "order must contain at least one line".to_string(),
        ));
    }
    for line in lines {
        if line.count == 0 {
            return Err(GameError::InvalidArgument(format!(
                "count for item {} must be positive",
                line.code
            )));
        }
    }
    Ok(())
}

impl GameStore {
    /// Credit the configured grant amount to the character's balance.
    pub fn grant_currency(&self, character_id: u64) -> Result<GrantReceipt, GameError> {
        let amount = self.game.currency_grant;
        let result = self.characters.transaction(|chars| {
            let mut character = read_character(chars, character_id)?;
            character.money += amount;
            write_character(chars, &character)?;
            Ok(GrantReceipt {
                name: character.name.clone(),
                balance: character.money,
            })
        });
        let receipt = map_txn_result(result)?;
        self.characters.flush()?;
        Ok(receipt)
    }

    /// Purchase one or more catalog items. All lines commit or none do:
    /// lines are priced in order against the catalog, then the balance check,
    /// the debit, and every quantity upsert happen in one transaction.
    /// Returns the remaining balance.
    pub fn buy_items(&self, character_id: u64, lines: &[OrderLine]) -> Result<i64, GameError> {
        validate_lines(lines)?;

        let mut total_cost: i64 = 0;
        let mut totals: BTreeMap<u32, u32> = BTreeMap::new();
        for line in lines {
            let item = self.get_item(line.code)?;
            total_cost = item
                .price
                .checked_mul(line.count as i64)
                .and_then(|cost| total_cost.checked_add(cost))
                .ok_or_else(|| {
                    GameError::InvalidArgument("order total overflows".to_string())
                })?;
            let slot = totals.entry(line.code).or_insert(0);
            *slot = slot.checked_add(line.count).ok_or_else(|| {
                GameError::InvalidArgument(format!("count for item {} overflows", line.code))
            })?;
        }

        let result = (&self.characters, &self.inventory).transaction(|(chars, inv)| {
            let mut character = read_character(chars, character_id)?;
            if character.money < total_cost {
                return abort(GameError::InsufficientFunds {
                    required: total_cost,
                    available: character.money,
                });
            }
            character.money -= total_cost;
            write_character(chars, &character)?;
            for (&code, &count) in &totals {
                let current = read_quantity(inv, character_id, code)?;
                let next = current.checked_add(count).ok_or_else(|| {
                    ConflictableTransactionError::Abort(GameError::InvalidArgument(format!(
                        "inventory quantity for item {} overflows",
                        code
                    )))
                })?;
                write_quantity(inv, character_id, code, next)?;
            }
            Ok(character.money)
        });
        let balance = map_txn_result(result)?;
        self.characters.flush()?;
        Ok(balance)
    }

    /// Sell held items back to the catalog at the configured refund ratio
    /// (unit refund = floor(price * percent / 100), totalled per line).
    /// Every line is validated against the transactional snapshot, with
    /// repeated codes checked cumulatively, before any write applies.
    /// Returns the remaining balance.
    pub fn sell_items(&self, character_id: u64, lines: &[OrderLine]) -> Result<i64, GameError> {
        validate_lines(lines)?;

        let percent = i64::from(self.game.sell_refund_percent);
        let mut unit_refunds: BTreeMap<u32, i64> = BTreeMap::new();
        for line in lines {
            if !unit_refunds.contains_key(&line.code) {
                let item = self.get_item(line.code)?;
                unit_refunds.insert(line.code, item.price * percent / 100);
            }
        }

        let result = (&self.characters, &self.inventory).transaction(|(chars, inv)| {
            let mut character = read_character(chars, character_id)?;
            let mut available: BTreeMap<u32, u32> = BTreeMap::new();
            let mut needed: BTreeMap<u32, u32> = BTreeMap::new();
            let mut total_refund: i64 = 0;
            for line in lines {
                if !available.contains_key(&line.code) {
                    available.insert(line.code, read_quantity(inv, character_id, line.code)?);
                }
                let held = available[&line.code];
                if held == 0 {
                    return abort(GameError::NotFound(format!(
                        "inventory entry for item {}",
                        line.code
                    )));
                }
                let wanted = needed.entry(line.code).or_insert(0);
                *wanted = wanted.checked_add(line.count).ok_or_else(|| {
                    ConflictableTransactionError::Abort(GameError::InvalidArgument(format!(
                        "count for item {} overflows",
                        line.code
                    )))
                })?;
                if *wanted > held {
                    return abort(GameError::InsufficientQuantity {
                        code: line.code,
                        requested: *wanted,
                        available: held,
                    });
                }
                total_refund += unit_refunds[&line.code] * i64::from(line.count);
            }
            character.money += total_refund;
            write_character(chars, &character)?;
            for (&code, &count) in &needed {
                write_quantity(inv, character_id, code, available[&code] - count)?;
            }
            Ok(character.money)
        });
        let balance = map_txn_result(result)?;
        self.characters.flush()?;
        Ok(balance)
    }

    /// Equip one held unit: creates the equipment row, applies the item's
    /// stat bonuses, and decrements the inventory entry by exactly one, all
    /// in one transaction. Returns the character's new stat totals.
    pub fn equip_item(&self, character_id: u64, code: u32) -> Result<StatSummary, GameError> {
        let item = self.get_item(code)?;
        let result = (&self.characters, &self.inventory, &self.equipment).transaction(
            |(chars, inv, equip)| {
                let mut character = read_character(chars, character_id)?;
                let quantity = read_quantity(inv, character_id, code)?;
                if quantity == 0 {
                    return abort(GameError::NotFound(format!(
                        "inventory entry for item {}",
                        code
                    )));
                }
                let slot_key = GameStore::entry_key(character_id, code);
                if equip.get(&slot_key)?.is_some() {
                    return abort(GameError::AlreadyEquipped(code));
                }
                equip.insert(slot_key, Vec::<u8>::new())?;
                character.health += item.health;
                character.power += item.power;
                write_character(chars, &character)?;
                write_quantity(inv, character_id, code, quantity - 1)?;
                Ok(StatSummary {
                    health: character.health,
                    power: character.power,
                })
            },
        );
        let stats = map_txn_result(result)?;
        self.characters.flush()?;
        Ok(stats)
    }

    /// Reverse of [`GameStore::equip_item`]: removes the equipment row,
    /// reverts the stat bonuses, and returns the unit to the inventory
    /// entry, all in one transaction.
    pub fn unequip_item(&self, character_id: u64, code: u32) -> Result<StatSummary, GameError> {
        let item = self.get_item(code)?;
        let result = (&self.characters, &self.inventory, &self.equipment).transaction(
            |(chars, inv, equip)| {
                let mut character = read_character(chars, character_id)?;
                let slot_key = GameStore::entry_key(character_id, code);
                if equip.get(&slot_key)?.is_none() {
                    return abort(GameError::NotEquipped(code));
                }
                equip.remove(slot_key)?;
                character.health -= item.health;
                character.power -= item.power;
                write_character(chars, &character)?;
                let quantity = read_quantity(inv, character_id, code)?;
                let next = quantity.checked_add(1).ok_or_else(|| {
                    ConflictableTransactionError::Abort(GameError::InvalidArgument(format!(
                        "inventory quantity for item {} overflows",
                        code
                    )))
                })?;
                write_quantity(inv, character_id, code, next)?;
                Ok(StatSummary {
                    health: character.health,
                    power: character.power,
                })
            },
        );
        let stats = map_txn_result(result)?;
        self.characters.flush()?;
        Ok(stats)
    }

    /// Read-only projection of a character's inventory joined with catalog
    /// metadata, in item-code order.
    pub fn get_inventory(&self, character_id: u64) -> Result<Vec<InventoryLine>, GameError> {
        self.get_character(character_id)?;
        let prefix = Self::entry_prefix(character_id);
        let mut out = Vec::new();
        for entry in self.inventory.scan_prefix(&prefix) {
            let (key, bytes) = entry?;
            let count: u32 = Self::deserialize(bytes)?;
            let text = String::from_utf8_lossy(&key);
            let Some(code) = text
                .rsplit(':')
                .next()
                .and_then(|raw| raw.parse::<u32>().ok())
            else {
                continue;
            };
            let item = self.get_item(code)?;
            out.push(InventoryLine {
                code,
                name: item.name,
                count,
            });
        }
        out.sort_by_key(|line| line.code);
        Ok(out)
    }
}
