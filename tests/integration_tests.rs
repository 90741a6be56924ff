//! Integration tests for fabrication-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use fabrication_core::{
    sample_catalog,
    utils::{MemoryStorage, StrictEntryValidator},
    Catalog, CoreError, EngineConfig, EntryKind, EntryStatus, ExpenseRequest, LineItemRequest,
    Material, NewEntry, OrderDraft, OrderRequest, PaymentLedger, PaymentMethod, PricingCategory,
    PricingEngine, Privilege,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Order worth exactly 1,000,000 with a 200,000 baseline advance
async fn million_order(ledger: &mut PaymentLedger<MemoryStorage>) -> String {
    let catalog = Catalog::builder(1)
        .material(Material::new(
            "pylon",
            "Pylon sign",
            BigDecimal::from(1_000_000),
            PricingCategory::PerUnit,
        ))
        .build()
        .unwrap();
    let mut draft = OrderDraft::new();
    draft
        .add_line_item(&catalog, LineItemRequest::per_unit("pylon", 1))
        .unwrap();

    let order = ledger
        .create_order(
            OrderRequest::new("Corner bakery", PaymentMethod::Cash)
                .advance(BigDecimal::from(200_000)),
            &mut draft,
            &catalog,
        )
        .await
        .unwrap();
    assert_eq!(order.total_amount, BigDecimal::from(1_000_000));
    assert_eq!(order.remaining_balance, BigDecimal::from(800_000));
    order.id
}

#[tokio::test]
async fn test_complete_order_workflow() {
    init_tracing();
    let catalog = sample_catalog().unwrap();
    let mut ledger = PaymentLedger::new(MemoryStorage::new());

    let mut draft = OrderDraft::new();
    draft
        .add_line_item(
            &catalog,
            LineItemRequest::new("banner", 1.5, 2.0, 3)
                .material_width(1.6)
                .assembly("installation"),
        )
        .unwrap();
    draft
        .add_line_item(&catalog, LineItemRequest::linear("letters", 25.0, 4))
        .unwrap();
    draft
        .add_line_item(&catalog, LineItemRequest::per_unit("badge", 10))
        .unwrap();

    let preview = draft
        .price(&catalog, &BigDecimal::from(10), Default::default())
        .unwrap();
    // 495,000 + 900,000 + 350,000 material, 12,000 waste, 150,000 installation
    assert_eq!(preview.material_cost, BigDecimal::from(1_745_000));
    assert_eq!(preview.waste_cost, BigDecimal::from(12_000));
    assert_eq!(preview.service_cost, BigDecimal::from(150_000));
    assert_eq!(preview.total_cost, BigDecimal::from(1_907_000));
    assert_eq!(preview.discount_amount, BigDecimal::from(190_700));
    assert_eq!(preview.final_cost, BigDecimal::from(1_716_300));

    let order = ledger
        .create_order(
            OrderRequest::new("Harbour cafe", PaymentMethod::BankTransfer)
                .advance(BigDecimal::from(716_300))
                .discount(BigDecimal::from(10)),
            &mut draft,
            &catalog,
        )
        .await
        .unwrap();
    assert!(draft.is_empty());
    assert_eq!(order.items.len(), 3);
    assert_eq!(order.breakdown, preview);
    assert_eq!(order.remaining_balance, BigDecimal::from(1_000_000));

    let installment = ledger
        .add_entry(
            &order.id,
            NewEntry::payment(
                BigDecimal::from(1_000_000),
                PaymentMethod::DigitalWallet,
                date(10),
            )
            .description("Final installment"),
            Privilege::Manager,
        )
        .await
        .unwrap();
    assert_eq!(installment.status, EntryStatus::Approved);

    let summary = ledger.summary(&order.id).await.unwrap();
    assert!(summary.is_settled);
    assert_eq!(summary.paid_total, BigDecimal::from(1_716_300));
}

/// Records the 300,000 approved and 400,000 pending payments; returns their IDs
async fn record_payments(
    ledger: &mut PaymentLedger<MemoryStorage>,
    order_id: &str,
) -> (String, String) {
    let approved = ledger
        .add_entry(
            order_id,
            NewEntry::payment(BigDecimal::from(300_000), PaymentMethod::Cash, date(2)),
            Privilege::Manager,
        )
        .await
        .unwrap();
    let pending = ledger
        .add_entry(
            order_id,
            NewEntry::payment(BigDecimal::from(400_000), PaymentMethod::BankTransfer, date(3)),
            Privilege::Staff,
        )
        .await
        .unwrap();
    assert_eq!(approved.status, EntryStatus::Approved);
    assert_eq!(pending.status, EntryStatus::Pending);
    (approved.id, pending.id)
}

#[tokio::test]
async fn test_pending_payment_waits_for_approval() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let order_id = million_order(&mut ledger).await;
    let (_, pending) = record_payments(&mut ledger, &order_id).await;

    assert_eq!(
        ledger.remaining_balance(&order_id).await.unwrap(),
        BigDecimal::from(500_000)
    );

    ledger.approve(&pending).await.unwrap();
    assert_eq!(
        ledger.remaining_balance(&order_id).await.unwrap(),
        BigDecimal::from(100_000)
    );

    let stored = ledger.get_parent_required(&order_id).await.unwrap();
    assert_eq!(*stored.remaining_balance(), BigDecimal::from(100_000));
}

#[tokio::test]
async fn test_deleting_approved_payment_restores_balance() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let order_id = million_order(&mut ledger).await;
    let (approved, pending) = record_payments(&mut ledger, &order_id).await;

    let deleted = ledger.delete_entry(&approved).await.unwrap();
    assert_eq!(deleted.amount, BigDecimal::from(300_000));
    assert_eq!(
        ledger.remaining_balance(&order_id).await.unwrap(),
        BigDecimal::from(800_000)
    );

    ledger.approve(&pending).await.unwrap();
    let stored = ledger.get_parent_required(&order_id).await.unwrap();
    assert_eq!(*stored.remaining_balance(), BigDecimal::from(400_000));
}

async fn pay(
    ledger: &mut PaymentLedger<MemoryStorage>,
    order_id: &str,
    amount: i64,
    privilege: Privilege,
) -> String {
    ledger
        .add_entry(
            order_id,
            NewEntry::payment(BigDecimal::from(amount), PaymentMethod::Cash, date(5)),
            privilege,
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_persisted_balance_ignores_mutation_order() {
    let mut first = PaymentLedger::new(MemoryStorage::new());
    let first_id = million_order(&mut first).await;
    pay(&mut first, &first_id, 300_000, Privilege::Manager).await;
    let transfer = pay(&mut first, &first_id, 400_000, Privilege::Staff).await;
    first.approve(&transfer).await.unwrap();
    let refunded = pay(&mut first, &first_id, 150_000, Privilege::Manager).await;
    first.delete_entry(&refunded).await.unwrap();
    let bounced = pay(&mut first, &first_id, 50_000, Privilege::Staff).await;
    first.reject(&bounced).await.unwrap();

    let mut second = PaymentLedger::new(MemoryStorage::new());
    let second_id = million_order(&mut second).await;
    let refunded = pay(&mut second, &second_id, 150_000, Privilege::Manager).await;
    let bounced = pay(&mut second, &second_id, 50_000, Privilege::Staff).await;
    second.reject(&bounced).await.unwrap();
    let transfer = pay(&mut second, &second_id, 400_000, Privilege::Staff).await;
    second.delete_entry(&refunded).await.unwrap();
    pay(&mut second, &second_id, 300_000, Privilege::Manager).await;
    second.approve(&transfer).await.unwrap();

    let first_parent = first.get_parent_required(&first_id).await.unwrap();
    let second_parent = second.get_parent_required(&second_id).await.unwrap();
    assert_eq!(*first_parent.remaining_balance(), BigDecimal::from(100_000));
    assert_eq!(
        first_parent.remaining_balance(),
        second_parent.remaining_balance()
    );

    let first_summary = first.summary(&first_id).await.unwrap();
    let second_summary = second.summary(&second_id).await.unwrap();
    assert_eq!(first_summary.approved_total, second_summary.approved_total);
    assert_eq!(first_summary.rejected_total, second_summary.rejected_total);
    assert_eq!(first_summary.entry_count, 3);
    assert_eq!(second_summary.entry_count, 3);
}

#[tokio::test]
async fn test_terminal_statuses_cannot_change() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let order_id = million_order(&mut ledger).await;

    let entry = ledger
        .add_entry(
            &order_id,
            NewEntry::payment(BigDecimal::from(50_000), PaymentMethod::Cash, date(4)),
            Privilege::Staff,
        )
        .await
        .unwrap();
    let rejected = ledger.reject(&entry.id).await.unwrap();
    assert_eq!(rejected.status, EntryStatus::Rejected);

    assert!(matches!(
        ledger.approve(&entry.id).await,
        Err(CoreError::InvalidTransition(_))
    ));
    assert!(matches!(
        ledger.set_status(&entry.id, EntryStatus::Pending).await,
        Err(CoreError::InvalidTransition(_))
    ));
    assert!(matches!(
        ledger.approve("missing").await,
        Err(CoreError::Reference(_))
    ));

    // rejected entries can still be deleted, without any balance effect
    let before = ledger.remaining_balance(&order_id).await.unwrap();
    ledger.delete_entry(&entry.id).await.unwrap();
    assert_eq!(ledger.remaining_balance(&order_id).await.unwrap(), before);
    assert!(matches!(
        ledger.delete_entry(&entry.id).await,
        Err(CoreError::Reference(_))
    ));
}

#[tokio::test]
async fn test_entry_validation() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let order_id = million_order(&mut ledger).await;

    for amount in [0, -100] {
        let result = ledger
            .add_entry(
                &order_id,
                NewEntry::payment(BigDecimal::from(amount), PaymentMethod::Cash, date(5)),
                Privilege::Manager,
            )
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    let unknown_parent = ledger
        .add_entry(
            "no-such-order",
            NewEntry::payment(BigDecimal::from(100), PaymentMethod::Cash, date(5)),
            Privilege::Manager,
        )
        .await;
    assert!(matches!(unknown_parent, Err(CoreError::Reference(_))));
}

#[tokio::test]
async fn test_strict_validator_requires_description() {
    let mut ledger = PaymentLedger::with_validator(
        MemoryStorage::new(),
        Box::new(StrictEntryValidator::new(40)),
    );
    let expense = ledger
        .record_expense(ExpenseRequest::new(
            "Aluminium profiles",
            BigDecimal::from(90_000),
            PaymentMethod::Cash,
        ))
        .await
        .unwrap();

    let missing = ledger
        .add_entry(
            &expense.id,
            NewEntry::payment(BigDecimal::from(10_000), PaymentMethod::Cash, date(6)),
            Privilege::Manager,
        )
        .await;
    assert!(matches!(missing, Err(CoreError::Validation(_))));

    let ok = ledger
        .add_entry(
            &expense.id,
            NewEntry::payment(BigDecimal::from(10_000), PaymentMethod::Cash, date(6))
                .description("First installment"),
            Privilege::Manager,
        )
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn test_order_creation_rules() {
    let catalog = sample_catalog().unwrap();
    let mut ledger = PaymentLedger::new(MemoryStorage::new());

    let mut empty = OrderDraft::new();
    let result = ledger
        .create_order(
            OrderRequest::new("Nobody", PaymentMethod::Cash),
            &mut empty,
            &catalog,
        )
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));

    let mut draft = OrderDraft::new();
    draft
        .add_line_item(&catalog, LineItemRequest::per_unit("badge", 2))
        .unwrap();

    let too_much_advance = ledger
        .create_order(
            OrderRequest::new("Gym", PaymentMethod::Cash).advance(BigDecimal::from(70_001)),
            &mut draft,
            &catalog,
        )
        .await;
    assert!(matches!(too_much_advance, Err(CoreError::Validation(_))));

    let bad_discount = ledger
        .create_order(
            OrderRequest::new("Gym", PaymentMethod::Cash).discount(BigDecimal::from(120)),
            &mut draft,
            &catalog,
        )
        .await;
    assert!(matches!(bad_discount, Err(CoreError::Validation(_))));

    // failed attempts keep the draft intact
    assert_eq!(draft.len(), 1);

    let order = ledger
        .create_order(
            OrderRequest::new("Gym", PaymentMethod::Cash).advance(BigDecimal::from(70_000)),
            &mut draft,
            &catalog,
        )
        .await
        .unwrap();
    assert_eq!(order.remaining_balance, BigDecimal::from(0));
}

#[tokio::test]
async fn test_expense_ledger_has_no_approval_workflow() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let expense = ledger
        .record_expense(
            ExpenseRequest::new("Workshop rent", BigDecimal::from(500_000), PaymentMethod::BankTransfer)
                .advance(BigDecimal::from(100_000)),
        )
        .await
        .unwrap();
    assert_eq!(expense.remaining_balance, BigDecimal::from(400_000));

    let entry = ledger
        .add_entry(
            &expense.id,
            NewEntry::payment(BigDecimal::from(150_000), PaymentMethod::Cash, date(7)),
            Privilege::Staff,
        )
        .await
        .unwrap();
    assert_eq!(entry.status, EntryStatus::Approved);
    assert_eq!(
        ledger.remaining_balance(&expense.id).await.unwrap(),
        BigDecimal::from(250_000)
    );

    assert!(matches!(
        ledger.reject(&entry.id).await,
        Err(CoreError::InvalidTransition(_))
    ));

    let too_large = ledger
        .record_expense(
            ExpenseRequest::new("Paint", BigDecimal::from(1_000), PaymentMethod::Cash)
                .advance(BigDecimal::from(2_000)),
        )
        .await;
    assert!(matches!(too_large, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_history_order_and_baseline_row() {
    let mut ledger = PaymentLedger::new(MemoryStorage::new());
    let order_id = million_order(&mut ledger).await;

    let later = ledger
        .add_entry(
            &order_id,
            NewEntry::payment(BigDecimal::from(10_000), PaymentMethod::Cash, date(20)),
            Privilege::Manager,
        )
        .await
        .unwrap();
    let earlier = ledger
        .add_entry(
            &order_id,
            NewEntry::advance(BigDecimal::from(20_000), PaymentMethod::DigitalWallet, date(8)),
            Privilege::Staff,
        )
        .await
        .unwrap();

    let history = ledger.history(&order_id).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[0].baseline);
    assert_eq!(history[0].amount, BigDecimal::from(200_000));
    assert_eq!(history[1].id, earlier.id);
    assert_eq!(history[1].kind, EntryKind::Advance);
    assert_eq!(history[2].id, later.id);

    assert!(matches!(
        ledger.delete_entry(&history[0].id).await,
        Err(CoreError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn test_failed_status_change_is_reverted() {
    let storage = MemoryStorage::new();
    let mut ledger = PaymentLedger::new(storage.clone());
    let order_id = million_order(&mut ledger).await;

    let entry = ledger
        .add_entry(
            &order_id,
            NewEntry::payment(BigDecimal::from(100_000), PaymentMethod::Cash, date(9)),
            Privilege::Staff,
        )
        .await
        .unwrap();

    storage.set_fail_balance_updates(true);
    assert!(matches!(
        ledger.approve(&entry.id).await,
        Err(CoreError::Storage(_))
    ));
    assert!(matches!(
        ledger.delete_entry(&entry.id).await,
        Err(CoreError::Storage(_))
    ));
    storage.set_fail_balance_updates(false);

    let stored = ledger.get_entry_required(&entry.id).await.unwrap();
    assert_eq!(stored.status, EntryStatus::Pending);

    ledger.approve(&entry.id).await.unwrap();
    assert_eq!(
        ledger.remaining_balance(&order_id).await.unwrap(),
        BigDecimal::from(700_000)
    );
}

#[tokio::test]
async fn test_ledger_from_config() {
    let mut config = EngineConfig::default();
    config.ledger.strict_validation = true;
    config.pricing.per_unit_waste = true;

    let catalog = sample_catalog().unwrap();
    let mut ledger = PaymentLedger::from_config(MemoryStorage::new(), &config);
    let mut draft = OrderDraft::new();
    draft
        .add_line_item(&catalog, LineItemRequest::per_unit("badge", 10))
        .unwrap();

    let order = ledger
        .create_order(
            OrderRequest::new("Museum", PaymentMethod::Cash),
            &mut draft,
            &catalog,
        )
        .await
        .unwrap();
    // badge waste at 1,000 per piece is billed when enabled
    assert_eq!(order.total_amount, BigDecimal::from(360_000));

    let undescribed = ledger
        .add_entry(
            &order.id,
            NewEntry::payment(BigDecimal::from(1_000), PaymentMethod::Cash, date(1)),
            Privilege::Manager,
        )
        .await;
    assert!(matches!(undescribed, Err(CoreError::Validation(_))));
}

#[test]
fn test_price_lines_for_tables() {
    let catalog = sample_catalog().unwrap();
    let mut draft = OrderDraft::new();
    draft
        .add_line_item(
            &catalog,
            LineItemRequest::new("banner", 1.0, 1.0, 1)
                .material_width(1.6)
                .disassembly("removal"),
        )
        .unwrap();

    let lines = PricingEngine::default()
        .price_lines(draft.items(), &catalog)
        .unwrap();
    assert_eq!(lines[0].print_area, 1.0);
    assert_eq!(lines[0].material_used, 1.6);
    assert_eq!(lines[0].waste, 0.6);
    assert_eq!(lines[0].material_cost, BigDecimal::from(55_000));
    assert_eq!(lines[0].waste_cost, BigDecimal::from(12_000));
    assert_eq!(lines[0].service_cost, BigDecimal::from(10_000));

    let json = serde_json::to_string(&lines).unwrap();
    assert!(json.contains("\"category\":\"area\""));
}
