//! Order workflow example: price a draft, take an advance, collect installments

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use fabrication_core::utils::MemoryStorage;
use fabrication_core::{
    sample_catalog, ExpenseRequest, LineItemRequest, NewEntry, OrderDraft, OrderRequest,
    PaymentLedger, PaymentMethod, PricingEngine, PricingOptions, Privilege,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fabrication_core=info".into()),
        )
        .init();

    println!("Fabrication Core - Order Workflow Example\n");

    let catalog = sample_catalog()?;
    let mut ledger = PaymentLedger::new(MemoryStorage::new());

    // 1. Build a draft order
    println!("Building draft (catalog v{})...", catalog.version());
    let mut draft = OrderDraft::new();
    draft.add_line_item(
        &catalog,
        LineItemRequest::new("banner", 3.0, 3.0, 1)
            .material_width(3.2)
            .assembly("installation"),
    )?;
    draft.add_line_item(&catalog, LineItemRequest::linear("letters", 25.0, 4))?;
    let badges = draft.add_line_item(&catalog, LineItemRequest::per_unit("badge", 10))?;

    for line in PricingEngine::default().price_lines(draft.items(), &catalog)? {
        println!(
            "  {:<20} print {:>6} m²  waste {:>6} m²  cost {}",
            line.material_name, line.print_area, line.waste, line.line_total
        );
    }

    // Hidden items stay in the draft but are not priced
    draft.toggle_visibility(badges)?;
    let preview = draft.price(&catalog, &BigDecimal::from(10), PricingOptions::default())?;
    println!("\nWithout badges: {}", preview.final_cost);
    draft.toggle_visibility(badges)?;

    // 2. Turn the draft into an order with a baseline advance
    let order = ledger
        .create_order(
            OrderRequest::new("Corner Bakery", PaymentMethod::Cash)
                .discount(BigDecimal::from(10))
                .advance(BigDecimal::from(716_300)),
            &mut draft,
            &catalog,
        )
        .await?;

    println!("\nOrder {}", order.id);
    println!("  Total cost:   {}", order.breakdown.total_cost);
    println!("  Discount:     {}", order.breakdown.discount_amount);
    println!("  Final cost:   {}", order.breakdown.final_cost);
    println!("  Advance:      {}", order.baseline_advance);
    println!("  Remaining:    {}", order.remaining_balance);

    // 3. Installments: staff entries wait for a manager
    let date = |day| NaiveDate::from_ymd_opt(2024, 5, day).ok_or("invalid date");
    let installment = ledger
        .add_entry(
            &order.id,
            NewEntry::payment(BigDecimal::from(600_000), PaymentMethod::BankTransfer, date(10)?)
                .description("First installment"),
            Privilege::Staff,
        )
        .await?;
    println!(
        "\nStaff installment recorded as {:?}, remaining {}",
        installment.status,
        ledger.remaining_balance(&order.id).await?
    );

    ledger.approve(&installment.id).await?;
    println!(
        "Approved by manager, remaining {}",
        ledger.remaining_balance(&order.id).await?
    );

    ledger
        .add_entry(
            &order.id,
            NewEntry::payment(BigDecimal::from(400_000), PaymentMethod::DigitalWallet, date(20)?),
            Privilege::Manager,
        )
        .await?;

    // 4. History and summary
    println!("\nPayment history:");
    for entry in ledger.history(&order.id).await? {
        println!(
            "  {} {:>10} {:?} {:?}{}",
            entry.entry_date,
            entry.amount,
            entry.method,
            entry.status,
            if entry.baseline { " (advance)" } else { "" }
        );
    }

    let summary = ledger.summary(&order.id).await?;
    println!(
        "\nPaid {} of {}, settled: {}",
        summary.paid_total, summary.total_amount, summary.is_settled
    );

    // 5. Expenses use the same ledger without approvals
    let expense = ledger
        .record_expense(ExpenseRequest::new(
            "Vinyl roll restock",
            BigDecimal::from(2_000_000),
            PaymentMethod::BankTransfer,
        ))
        .await?;
    ledger
        .add_entry(
            &expense.id,
            NewEntry::payment(BigDecimal::from(500_000), PaymentMethod::BankTransfer, date(21)?),
            Privilege::Staff,
        )
        .await?;
    println!(
        "\nExpense '{}' remaining {}",
        expense.description,
        ledger.remaining_balance(&expense.id).await?
    );

    Ok(())
}

