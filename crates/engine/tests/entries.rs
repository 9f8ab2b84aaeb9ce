use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Direction, Engine, EngineError, EntryFilter, EntryInput, EntryKind, EntryStatus, Money,
    PaymentMethod,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn input(description: &str, category_id: Uuid, original: i64) -> EntryInput {
    EntryInput {
        description: description.to_string(),
        category_id,
        cost_center_id: None,
        payment_method: PaymentMethod::Pix,
        due_date: date(2024, 5, 10),
        original_value: Money::new(original),
        received_value: None,
        payment_date: None,
    }
}

#[tokio::test]
async fn categories_are_unique_and_sorted() {
    let (engine, _db) = engine_with_db().await;

    engine.create_category("Salário").await.unwrap();
    engine.create_category("  Moradia ").await.unwrap();
    let err = engine.create_category("Moradia").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("Moradia".to_string()));
    assert!(matches!(
        engine.create_category("   ").await.unwrap_err(),
        EngineError::InvalidName(_)
    ));

    let labels: Vec<String> = engine
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.label)
        .collect();
    assert_eq!(labels, vec!["Moradia", "Salário"]);
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Moradia").await.unwrap();
    let cost_center = engine.create_cost_center("Casa").await.unwrap();

    let mut new = input("Aluguel", category.id, -150_000);
    new.cost_center_id = Some(cost_center.id);
    let entry = engine.create_entry(&new).await.unwrap();

    assert!(matches!(
        engine.delete_category(category.id).await.unwrap_err(),
        EngineError::InUse(_)
    ));
    assert!(matches!(
        engine.delete_cost_center(cost_center.id).await.unwrap_err(),
        EngineError::InUse(_)
    ));

    engine.delete_entry(entry.id).await.unwrap();
    engine.delete_category(category.id).await.unwrap();
    engine.delete_cost_center(cost_center.id).await.unwrap();
    assert!(matches!(
        engine.delete_category(category.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn create_entry_keeps_sign_and_references() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Moradia").await.unwrap();

    for (direction, kind) in [
        (Direction::Receiving, EntryKind::Receivable),
        (Direction::Paying, EntryKind::Payable),
    ] {
        let mut new = input("Aluguel", category.id, 0);
        new.original_value = direction.apply(Money::new(25_090));
        let entry = engine.create_entry(&new).await.unwrap();
        assert_eq!(entry.kind(), kind);
        assert_eq!(entry.status(), EntryStatus::Open);
        assert_eq!(entry.category, category);

        let stored = engine.entry(entry.id).await.unwrap();
        assert_eq!(stored.original_value, new.original_value);
    }
}

#[tokio::test]
async fn invalid_entry_reports_fields_and_persists_nothing() {
    let (engine, _db) = engine_with_db().await;

    let mut new = input("", Uuid::new_v4(), 0);
    new.cost_center_id = Some(Uuid::new_v4());
    new.payment_date = Some(date(2024, 5, 11));

    let err = engine.create_entry(&new).await.unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "description",
            "category",
            "cost_center",
            "original_value",
            "received_value"
        ]
    );
    assert!(engine.list_recent_entries(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_as_paid_defaults_to_original_value() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Serviços").await.unwrap();
    let entry = engine
        .create_entry(&input("Consultoria", category.id, 80_000))
        .await
        .unwrap();

    let paid = engine
        .mark_as_paid(entry.id, None, date(2024, 5, 12))
        .await
        .unwrap();
    assert_eq!(paid.status(), EntryStatus::Settled);
    assert_eq!(paid.received_value, Some(Money::new(80_000)));
    assert_eq!(paid.payment_date, Some(date(2024, 5, 12)));
    assert_eq!(paid.outstanding_value(), Money::ZERO);

    let err = engine
        .mark_as_paid(entry.id, Some(Money::new(-10)), date(2024, 5, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn clone_copies_user_fields() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Moradia").await.unwrap();
    let mut new = input("Condomínio", category.id, -45_000);
    new.payment_method = PaymentMethod::Debit;
    let original = engine.create_entry(&new).await.unwrap();

    let copy = engine.clone_entry(original.id).await.unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.description, original.description);
    assert_eq!(copy.payment_method, PaymentMethod::Debit);
    assert_eq!(copy.original_value, original.original_value);
    assert_eq!(engine.list_recent_entries(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_and_delete_unknown_entry_fail() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Moradia").await.unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        engine
            .update_entry(missing, &input("x", category.id, 1))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.delete_entry(missing).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn list_entries_searches_filters_and_clamps_page() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Geral").await.unwrap();
    for i in 0..12 {
        engine
            .create_entry(&input(&format!("Conta {i:02}"), category.id, -(i + 1) * 100))
            .await
            .unwrap();
    }
    engine
        .create_entry(&input("Salário", category.id, 500_000))
        .await
        .unwrap();

    let first = engine.list_entries("", EntryFilter::All, 0).await.unwrap();
    assert_eq!(first.page, 1);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.total_entries, 13);
    assert_eq!(first.entries.len(), 10);
    assert_eq!(first.entries[0].description, "Conta 00");

    let last = engine.list_entries("", EntryFilter::All, 99).await.unwrap();
    assert_eq!(last.page, 2);
    assert_eq!(last.entries.len(), 3);

    let search = engine
        .list_entries("conta 1", EntryFilter::All, 1)
        .await
        .unwrap();
    assert_eq!(search.total_entries, 2);

    let receivables = engine
        .list_entries("", EntryFilter::Receivables, 1)
        .await
        .unwrap();
    assert_eq!(receivables.total_entries, 1);
    assert_eq!(receivables.entries[0].description, "Salário");

    let empty = engine
        .list_entries("nada", EntryFilter::Settled, 3)
        .await
        .unwrap();
    assert_eq!(empty.page, 1);
    assert!(empty.entries.is_empty());
}

#[tokio::test]
async fn totals_follow_ledger_rules() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Geral").await.unwrap();

    let empty = engine.totals().await.unwrap();
    assert_eq!(empty.receivables, Money::ZERO);
    assert_eq!(empty.outstanding, Money::ZERO);

    let sale = engine
        .create_entry(&input("Venda", category.id, 100_000))
        .await
        .unwrap();
    engine
        .create_entry(&input("Serviço", category.id, 20_000))
        .await
        .unwrap();
    let rent = engine
        .create_entry(&input("Aluguel", category.id, -50_000))
        .await
        .unwrap();
    engine
        .mark_as_paid(sale.id, Some(Money::new(60_000)), date(2024, 5, 15))
        .await
        .unwrap();
    engine
        .mark_as_paid(rent.id, None, date(2024, 5, 15))
        .await
        .unwrap();

    let totals = engine.totals().await.unwrap();
    assert_eq!(totals.receivables, Money::new(120_000));
    assert_eq!(totals.payables, Money::new(50_000));
    assert_eq!(totals.result, Money::new(10_000));
    assert_eq!(totals.outstanding, Money::new(60_000));
}

#[tokio::test]
async fn oversized_amounts_are_refused_and_totals_stay_available() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Geral").await.unwrap();

    for original in [i64::MIN, i64::MAX / 2 + 1, Money::MAX_ABS_MINOR + 1] {
        let err = engine
            .create_entry(&input("Enorme", category.id, original))
            .await
            .unwrap_err();
        let EngineError::Validation(errors) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(errors.messages("original_value").len(), 1);
    }

    let mut paid = input("Venda", category.id, 10_000);
    paid.received_value = Some(Money::new(i64::MAX));
    paid.payment_date = Some(paid.due_date);
    assert!(matches!(
        engine.create_entry(&paid).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    for _ in 0..2 {
        engine
            .create_entry(&input("Teto", category.id, Money::MAX_ABS_MINOR))
            .await
            .unwrap();
    }
    engine
        .create_entry(&input("Teto", category.id, -Money::MAX_ABS_MINOR))
        .await
        .unwrap();

    let totals = engine.totals().await.unwrap();
    assert_eq!(totals.receivables, Money::new(2 * Money::MAX_ABS_MINOR));
    assert_eq!(totals.payables, Money::new(Money::MAX_ABS_MINOR));
    assert_eq!(totals.outstanding, Money::new(2 * Money::MAX_ABS_MINOR));
}

#[tokio::test]
async fn recent_entries_are_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let category = engine.create_category("Geral").await.unwrap();
    for name in ["Primeiro", "Segundo", "Terceiro"] {
        engine
            .create_entry(&input(name, category.id, 1_000))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let recent = engine.list_recent_entries(2).await.unwrap();
    let names: Vec<&str> = recent.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["Terceiro", "Segundo"]);
}
