//! Plain-text rendering of calculation results, history, and errors.
//!
//! Values are printed as bare two-decimal numbers; currency symbols and
//! locale formatting are deliberately out of scope.

use rust_decimal::Decimal;

use fee_core::calculations::common::parse_or_zero;
use fee_core::calculations::vat_normalized;
use fee_core::models::{CategoryTable, HistoryEntry, ListingInputs, ProfitBreakdown};
use fee_core::validation::ValidationErrors;

pub fn print_validation_errors(errors: &ValidationErrors) {
    eprintln!("Cannot proceed; {} field(s) need attention:", errors.len());
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

pub fn print_breakdown(
    inputs: &ListingInputs,
    results: &ProfitBreakdown,
    categories: &CategoryTable,
) {
    let category = categories.resolve(&inputs.category_id);
    let mode = if inputs.price_includes_vat {
        "inc. VAT"
    } else {
        "ex. VAT"
    };

    if !inputs.item_name.is_empty() {
        println!("{}", inputs.item_name);
    }
    println!(
        "Category: {} ({}% referral fee)",
        category.name, category.fee_percentage
    );
    println!("Sale price entered {mode}");
    println!();

    money_row("Total customer payment", results.total_revenue);
    money_row("VAT on item price", results.vat_amount);
    money_row("Referral fee", results.referral_fee);
    money_row("Total marketplace fees", results.total_marketplace_fees);
    money_row("Total costs", results.total_costs);
    money_row("Net profit", results.net_profit);
    percent_row("Profit margin", results.profit_margin);
    percent_row("Return on investment", results.roi);
}

pub fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("No saved calculations.");
        return;
    }

    println!(
        "{:>5}  {:<19}  {:<24}  {:>14}  {:>12}  {:>9}",
        "id", "saved at", "item", "price (ex VAT)", "net profit", "margin"
    );
    for entry in entries {
        // History always shows the ex-VAT price, whichever way it was entered.
        let price = vat_normalized(
            parse_or_zero(&entry.inputs.sale_price),
            parse_or_zero(&entry.inputs.vat_percentage),
            entry.inputs.price_includes_vat,
        );
        let name = display_name(&entry.inputs.item_name);

        println!(
            "{:>5}  {:<19}  {:<24}  {:>14}  {:>12}  {:>8}%",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            name,
            format!("{:.2}", price.ex_vat),
            format!("{:.2}", entry.results.net_profit),
            format!("{:.2}", entry.results.profit_margin),
        );
    }
}

pub fn print_categories(categories: &CategoryTable) {
    println!("{:<14}  {:>5}  {}", "id", "fee", "name");
    for category in categories.categories() {
        println!(
            "{:<14}  {:>4}%  {}",
            category.id, category.fee_percentage, category.name
        );
    }
}

fn money_row(
    label: &str,
    value: Decimal,
) {
    println!("{label:<24} {:>12}", format!("{value:.2}"));
}

fn percent_row(
    label: &str,
    value: Decimal,
) {
    println!("{label:<24} {:>11}%", format!("{value:.2}"));
}

fn display_name(name: &str) -> String {
    let name = if name.is_empty() { "(unnamed)" } else { name };
    name.chars().take(24).collect()
}
