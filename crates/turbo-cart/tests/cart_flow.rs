//! End-to-end cart flows over in-memory stores.

use turbo_cache::Cache;
use turbo_cart::prelude::*;
use turbo_db::{MemoryRecordStore, RecordStore};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn vat() -> Condition {
    Condition::new("VAT", ConditionType::Tax, ConditionTarget::CartSubtotal, "10%").unwrap()
}

#[test]
fn shirt_with_vat_then_removed() {
    let cart = Cart::in_memory();

    let shirt = cart
        .add(CartItem::new(1, "Shirt", 20.00, 2, ItemOptions::new()).unwrap())
        .unwrap();
    assert!(approx(cart.subtotal().unwrap(), 40.0));

    cart.add_condition(vat()).unwrap();
    assert!(approx(cart.total().unwrap(), 44.0));
    assert_eq!(cart.total_formatted(None).unwrap(), "44.00");

    cart.remove(&shirt.row_id).unwrap();
    assert_eq!(cart.total().unwrap(), 0.0);
    assert_eq!(cart.conditions().unwrap().len(), 1);
}

#[test]
fn option_order_does_not_split_lines() {
    let cart = Cart::in_memory();
    let a = ItemOptions::new().with("size", "L").with("color", "red");
    let b = ItemOptions::new().with("color", "red").with("size", "L");

    cart.add(CartItem::new("sku-1", "Tee", 15.0, 1, a).unwrap()).unwrap();
    let merged = cart
        .add(CartItem::new("sku-1", "Tee", 15.0, 2, b).unwrap())
        .unwrap();

    assert_eq!(merged.quantity, 3);
    assert_eq!(cart.count_rows().unwrap(), 1);
}

#[test]
fn park_mutate_restore_round_trip() {
    let cart = Cart::in_memory();
    let shirt = cart
        .add(
            CartItem::new(1, "Shirt", 20.0, 2, ItemOptions::new().with("size", "M"))
                .unwrap()
                .with_condition(
                    Condition::new("sale", ConditionType::Discount, ConditionTarget::Item, "-10%")
                        .unwrap(),
                ),
        )
        .unwrap();
    let hat = cart
        .add(CartItem::new(2, "Hat", 12.5, 1, ItemOptions::new()).unwrap())
        .unwrap();
    let parked = cart.content().unwrap();
    let parked_total = cart.total().unwrap();

    cart.park("user-42", Some(&OwnerId::new("42"))).unwrap();

    // Keep mutating the live cart
    cart.update(&shirt.row_id, 9).unwrap();
    cart.remove(&hat.row_id).unwrap();
    cart.add(CartItem::new(3, "Socks", 3.0, 4, ItemOptions::new()).unwrap())
        .unwrap();

    assert!(cart.restore("user-42").unwrap());

    // Parked rows overwrite their live counterparts exactly
    for item in &parked {
        assert_eq!(&cart.get(&item.row_id).unwrap(), item);
    }
    assert_eq!(cart.get(&shirt.row_id).unwrap().quantity, 2);
    assert_eq!(cart.count_rows().unwrap(), 3);

    // Identical totals once the unparked line is gone
    let socks = cart.search(|item| item.name == "Socks").unwrap();
    cart.remove(&socks[0].row_id).unwrap();
    assert!(approx(cart.total().unwrap(), parked_total));
    assert!(!cart.restore("user-42").unwrap());
}

#[test]
fn park_rejects_duplicates_and_save_overwrites() {
    let records = MemoryRecordStore::new();
    let cart = Cart::new(Cache::in_memory(), records.clone());
    cart.add(CartItem::new(1, "Shirt", 20.0, 1, ItemOptions::new()).unwrap())
        .unwrap();

    cart.park("code", None).unwrap();
    assert!(matches!(
        cart.park("code", None),
        Err(CartError::AlreadyStored(_))
    ));

    cart.add(CartItem::new(2, "Hat", 5.0, 1, ItemOptions::new()).unwrap())
        .unwrap();
    cart.save("code", None).unwrap();

    let record = records.find("code").unwrap().unwrap();
    let stored: CartContent = serde_json::from_str(&record.content).unwrap();
    assert_eq!(stored.len(), 2);
}

#[test]
fn carts_sharing_stores_see_each_other() {
    let cache = Cache::in_memory();
    let records = MemoryRecordStore::new();
    let first = Cart::new(cache.clone(), records.clone());
    let second = Cart::new(cache, records);

    first
        .add(CartItem::new(1, "Shirt", 20.0, 1, ItemOptions::new()).unwrap())
        .unwrap();
    first.add_condition(vat()).unwrap();

    assert_eq!(second.count().unwrap(), 1);
    assert!(approx(second.total().unwrap(), 22.0));

    first.park("shared", None).unwrap();
    second.destroy().unwrap();
    assert!(second.merge("shared").unwrap());
    assert_eq!(first.count().unwrap(), 1);
}

#[test]
fn events_announce_the_park_lifecycle() {
    let sink = RecordingSink::new();
    let cart = Cart::in_memory()
        .with_config(CartConfig::default().with_saved_event(false))
        .with_events(sink.clone());

    cart.add(CartItem::new(1, "Shirt", 20.0, 1, ItemOptions::new()).unwrap())
        .unwrap();
    cart.park("p", None).unwrap();
    cart.merge("p").unwrap();
    cart.restore("p").unwrap();
    cart.save("p", None).unwrap();
    cart.erase("p").unwrap();

    assert_eq!(
        sink.names(),
        vec![
            "cart.added",
            "cart.stored",
            "cart.added",
            "cart.merged",
            "cart.restored",
            "cart.stored",
            "cart.erased",
        ]
    );
}

#[test]
fn item_conditions_through_the_cart() {
    let cart = Cart::in_memory();
    let row = cart
        .add(CartItem::new(1, "Desk", 100.0, 1, ItemOptions::new()).unwrap())
        .unwrap()
        .row_id;

    cart.add_item_condition(
        &row,
        Condition::new("sale", ConditionType::Discount, ConditionTarget::Item, "-10%").unwrap(),
    )
    .unwrap();
    cart.add_item_condition(
        &row,
        Condition::new("fee", ConditionType::Fee, ConditionTarget::Item, "+5").unwrap(),
    )
    .unwrap();
    assert!(approx(cart.total().unwrap(), 95.0));

    cart.clear_item_conditions(&row).unwrap();
    cart.add_item_condition(
        &row,
        Condition::new("fee", ConditionType::Fee, ConditionTarget::Item, "+5").unwrap(),
    )
    .unwrap();
    cart.add_item_condition(
        &row,
        Condition::new("sale", ConditionType::Discount, ConditionTarget::Item, "-10%").unwrap(),
    )
    .unwrap();
    assert!(approx(cart.total().unwrap(), 94.5));
}

#[test]
fn cart_built_from_config_file() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "key_prefix = \"shop\"\ndefault_instance = \"main\"\n\n[format]\ndecimals = 0"
    )
    .unwrap();

    let cache = Cache::in_memory();
    let config = CartConfig::load(file.path()).unwrap();
    let cart = Cart::new(cache.clone(), MemoryRecordStore::new()).with_config(config);

    cart.add(CartItem::new(1, "Lamp", 1999.6, 1, ItemOptions::new()).unwrap())
        .unwrap();
    assert_eq!(cart.instance(), "main");
    assert!(cache.exists("shop:main").unwrap());
    assert_eq!(cart.total_formatted(None).unwrap(), "2,000");
}
