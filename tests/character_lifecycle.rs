//! Integration tests for account and character lifecycle: registration,
//! login, ownership, and cascading deletion.

use armory::game::{GameError, GameStore, GameStoreBuilder, ItemInput, OrderLine, StatBonuses};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> GameStore {
    GameStoreBuilder::new(dir.path()).open().expect("store")
}

#[test]
fn full_account_and_character_flow() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);

    store
        .register_user("alice42", "hunter22", "Alice")
        .expect("register");
    let session = store.login("alice42", "hunter22").expect("login");
    let user = store.resolve_session(&session.token).expect("session");

    let character = store
        .create_character(&user.username, "Brienne")
        .expect("create");
    assert_eq!(character.health, 500);
    assert_eq!(character.power, 100);
    assert_eq!(character.money, 10000);

    let listed = store.list_characters(&user.username).expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Brienne");

    // Ownership gate: the owner passes, anyone else is refused.
    assert!(store.resolve_character(character.id, "alice42").is_ok());
    store
        .register_user("bob99", "hunter22", "Bob")
        .expect("register");
    assert!(matches!(
        store.resolve_character(character.id, "bob99"),
        Err(GameError::Forbidden(_))
    ));
}

#[test]
fn characters_survive_store_reopen() {
    let tmp = TempDir::new().unwrap();
    let id = {
        let store = open_store(&tmp);
        let character = store.create_character("alice42", "Brienne").unwrap();
        character.id
    };

    let store = open_store(&tmp);
    let character = store.get_character(id).expect("persisted");
    assert_eq!(character.name, "Brienne");
    assert_eq!(character.money, 10000);
}

#[test]
fn deletion_cascades_and_frees_the_name() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    let input = ItemInput {
        code: 1,
        name: "Helm".to_string(),
        price: 100,
        stat: StatBonuses { health: 40, power: 7 },
    };
    store.put_item(input.into_record()).unwrap();

    let character = store.create_character("alice42", "Brienne").unwrap();
    store
        .buy_items(character.id, &[OrderLine { code: 1, count: 3 }])
        .unwrap();
    store.equip_item(character.id, 1).unwrap();

    store.delete_character(character.id).expect("delete");

    assert!(matches!(
        store.get_character(character.id),
        Err(GameError::NotFound(_))
    ));
    assert_eq!(store.inventory_quantity(character.id, 1).unwrap(), 0);
    assert!(!store.is_equipped(character.id, 1).unwrap());
    assert!(store.list_characters("alice42").unwrap().is_empty());

    // The name index row went with the record.
    let reborn = store.create_character("bob99", "Brienne").expect("reuse");
    assert_ne!(reborn.id, character.id);
}

#[test]
fn deleting_a_missing_character_reports_not_found() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp);
    assert!(matches!(
        store.delete_character(4242),
        Err(GameError::NotFound(_))
    ));
}
