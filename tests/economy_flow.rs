//! Integration tests for the economy transaction coordinator: the money and
//! item-conservation laws, exercised through the public store API.

use armory::game::{
    GameError, GameStore, GameStoreBuilder, InventoryLine, ItemInput, OrderLine, StatBonuses,
};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> GameStore {
    GameStoreBuilder::new(dir.path()).open().expect("store")
}

fn seed_item(store: &GameStore, code: u32, name: &str, price: i64, health: i64, power: i64) {
    let input = ItemInput {
        code,
        name: name.to_string(),
        price,
        stat: StatBonuses { health, power },
    };
    store.put_item(input.into_record()).expect("put item");
}

fn line(code: u32, count: u32) -> OrderLine {
    OrderLine { code, count }
}

#[test]
fn worked_purchase_example() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Short Sword", 500, 0, 5);
    seed_item(&store, 2, "Tower Shield", 1000, 20, 0);
    let character = store.create_character("alice", "Brienne").unwrap();
    assert_eq!(character.money, 10000);

    // 2 x 500 + 1 x 1000 = 2000
    let remaining = store
        .buy_items(character.id, &[line(1, 2), line(2, 1)])
        .unwrap();
    assert_eq!(remaining, 8000);

    let inventory = store.get_inventory(character.id).unwrap();
    assert_eq!(
        inventory,
        vec![
            InventoryLine {
                code: 1,
                name: "Short Sword".to_string(),
                count: 2
            },
            InventoryLine {
                code: 2,
                name: "Tower Shield".to_string(),
                count: 1
            },
        ]
    );
}

#[test]
fn worked_sell_example() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Torch", 100, 0, 0);
    let character = store.create_character("alice", "Brienne").unwrap();
    store.buy_items(character.id, &[line(1, 3)]).unwrap();
    let before = store.get_character(character.id).unwrap().money;

    // floor(100 * 0.6) * 3 = 180
    let remaining = store.sell_items(character.id, &[line(1, 3)]).unwrap();
    assert_eq!(remaining, before + 180);
    assert!(store.get_inventory(character.id).unwrap().is_empty());
}

#[test]
fn money_is_conserved_across_a_buy_sell_cycle() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Torch", 250, 0, 0);
    let character = store.create_character("alice", "Brienne").unwrap();

    store.buy_items(character.id, &[line(1, 4)]).unwrap();
    store.sell_items(character.id, &[line(1, 4)]).unwrap();

    // paid 1000, refunded floor(250*0.6)*4 = 600
    let after = store.get_character(character.id).unwrap();
    assert_eq!(after.money, 10000 - 1000 + 600);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 0);
}

#[test]
fn failed_operations_leave_no_trace() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Torch", 100, 0, 0);
    seed_item(&store, 2, "Lantern", 9999, 0, 0);
    let character = store.create_character("alice", "Brienne").unwrap();
    store.buy_items(character.id, &[line(1, 2)]).unwrap();
    let snapshot = store.get_character(character.id).unwrap();

    // Overdraft across lines: the affordable first line must not commit.
    let err = store
        .buy_items(character.id, &[line(1, 1), line(2, 2)])
        .unwrap_err();
    assert!(matches!(err, GameError::InsufficientFunds { .. }));
    assert_eq!(store.get_character(character.id).unwrap(), snapshot);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 2);
    assert_eq!(store.inventory_quantity(character.id, 2).unwrap(), 0);

    // Overselling across duplicate lines: nothing moves either.
    let err = store
        .sell_items(character.id, &[line(1, 2), line(1, 1)])
        .unwrap_err();
    assert!(matches!(err, GameError::InsufficientQuantity { .. }));
    assert_eq!(store.get_character(character.id).unwrap(), snapshot);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 2);
}

#[test]
fn equip_unequip_round_trip_is_exactly_reversible() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Helm", 300, 40, 7);
    let character = store.create_character("alice", "Brienne").unwrap();
    store.buy_items(character.id, &[line(1, 2)]).unwrap();
    let before = store.get_character(character.id).unwrap();

    let worn = store.equip_item(character.id, 1).unwrap();
    assert_eq!(worn.health, before.health + 40);
    assert_eq!(worn.power, before.power + 7);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 1);
    assert!(store.is_equipped(character.id, 1).unwrap());

    let bare = store.unequip_item(character.id, 1).unwrap();
    assert_eq!(bare.health, before.health);
    assert_eq!(bare.power, before.power);
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 2);
    assert!(!store.is_equipped(character.id, 1).unwrap());

    // Balance is untouched by the round trip.
    assert_eq!(store.get_character(character.id).unwrap().money, before.money);
}

#[test]
fn each_unit_is_accounted_exactly_once() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    seed_item(&store, 1, "Helm", 300, 40, 7);
    let character = store.create_character("alice", "Brienne").unwrap();
    store.buy_items(character.id, &[line(1, 1)]).unwrap();

    store.equip_item(character.id, 1).unwrap();
    // The only unit is now worn; it cannot also be sold.
    let err = store.sell_items(character.id, &[line(1, 1)]).unwrap_err();
    assert!(matches!(err, GameError::NotFound(_)));

    store.unequip_item(character.id, 1).unwrap();
    store.sell_items(character.id, &[line(1, 1)]).unwrap();
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 0);
    assert!(!store.is_equipped(character.id, 1).unwrap());
}

#[test]
fn grants_accumulate_on_the_persisted_balance() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    let character = store.create_character("alice", "Brienne").unwrap();

    for expected in [10200, 10400, 10600] {
        let receipt = store.grant_currency(character.id).unwrap();
        assert_eq!(receipt.balance, expected);
        assert_eq!(receipt.name, "Brienne");
    }
    assert_eq!(store.get_character(character.id).unwrap().money, 10600);
}
