//! Concurrency laws: same-character operations serialize, different
//! characters proceed independently, and no interleaving can double-spend a
//! balance or double-account an item unit.

use std::sync::Arc;
use std::thread;

use armory::game::{GameError, GameStore, GameStoreBuilder, ItemInput, OrderLine, StatBonuses};
use tempfile::TempDir;

fn open_shared_store(dir: &TempDir) -> Arc<GameStore> {
    Arc::new(GameStoreBuilder::new(dir.path()).open().expect("store"))
}

fn seed_item(store: &GameStore, code: u32, price: i64) {
    let input = ItemInput {
        code,
        name: format!("item-{}", code),
        price,
        stat: StatBonuses { health: 10, power: 1 },
    };
    store.put_item(input.into_record()).expect("put item");
}

fn line(code: u32, count: u32) -> OrderLine {
    OrderLine { code, count }
}

#[test]
fn racing_buys_cannot_both_pass_the_balance_check() {
    let tmp = TempDir::new().unwrap();
    let store = open_shared_store(&tmp);
    // Each purchase is affordable alone (6000 <= 10000) but not together.
    seed_item(&store, 1, 6000);
    let character = store.create_character("alice", "Brienne").unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let id = character.id;
            thread::spawn(move || store.buy_items(id, &[line(1, 1)]))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let refusals = results
        .iter()
        .filter(|r| matches!(r, Err(GameError::InsufficientFunds { .. })))
        .count();
    assert_eq!(successes, 1, "exactly one purchase may win the race");
    assert_eq!(refusals, 1, "the loser must see the decremented balance");

    let after = store.get_character(character.id).unwrap();
    assert_eq!(after.money, 4000);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 1);
}

#[test]
fn concurrent_grants_never_lose_updates() {
    let tmp = TempDir::new().unwrap();
    let store = open_shared_store(&tmp);
    let character = store.create_character("alice", "Brienne").unwrap();

    let threads: i64 = 8;
    let grants_per_thread: i64 = 5;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let store = Arc::clone(&store);
            let id = character.id;
            thread::spawn(move || {
                for _ in 0..grants_per_thread {
                    store.grant_currency(id).expect("grant");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    let expected = 10000 + 200 * threads * grants_per_thread;
    assert_eq!(store.get_character(character.id).unwrap().money, expected);
}

#[test]
fn different_characters_do_not_contend() {
    let tmp = TempDir::new().unwrap();
    let store = open_shared_store(&tmp);
    seed_item(&store, 1, 6000);
    let first = store.create_character("alice", "Brienne").unwrap();
    let second = store.create_character("bob", "Jaime").unwrap();

    let handles: Vec<_> = [first.id, second.id]
        .into_iter()
        .map(|id| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.buy_items(id, &[line(1, 1)]))
        })
        .collect();
    for handle in handles {
        // Both succeed: each character spends its own balance.
        assert_eq!(handle.join().expect("thread").unwrap(), 4000);
    }
}

#[test]
fn racing_equips_consume_exactly_one_unit() {
    let tmp = TempDir::new().unwrap();
    let store = open_shared_store(&tmp);
    seed_item(&store, 1, 100);
    let character = store.create_character("alice", "Brienne").unwrap();
    store.buy_items(character.id, &[line(1, 1)]).unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let id = character.id;
            thread::spawn(move || store.equip_item(id, 1))
        })
        .collect();
    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "only one equip may claim the single unit");

    // The unit is worn, not duplicated: inventory empty, slot occupied,
    // bonuses applied exactly once.
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 0);
    assert!(store.is_equipped(character.id, 1).unwrap());
    let after = store.get_character(character.id).unwrap();
    assert_eq!(after.health, 510);
    assert_eq!(after.power, 101);
}
