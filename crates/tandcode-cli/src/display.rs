//! Plain-text rendering of pipeline output and catalog statistics.

use chrono::Local;
use tandcode_ai::{CategorySelection, CodingResponse};
use tandcode_core::{CatalogSummary, Decimal, EnrichedSuggestion};

/// Print a response: summary sentence, then one card per suggestion.
pub fn print_response(response: &CodingResponse) {
    println!("{}", response.response);
    println!();

    for (i, item) in response.suggestions.iter().enumerate() {
        print_suggestion_card(i + 1, item);
    }

    if !response.suggestions.is_empty() {
        let total: Decimal = response.suggestions.iter().map(|s| s.line_total).sum();
        println!("  {:<16} EUR {}", "Total", total);
    }

    let categories: Vec<&str> = response.categories.iter().map(|c| c.as_str()).collect();
    println!("  {:<16} {}", "Categories", categories.join(", "));
    println!(
        "  {:<16} {}",
        "Generated",
        response
            .generated_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_suggestion_card(n: usize, item: &EnrichedSuggestion) {
    let s = &item.suggestion;
    let marker = if s.is_companion { " (companion)" } else { "" };
    println!("=== {n}. {} {}{marker} ===", s.code, s.description);

    if !s.tooth_numbers.is_empty() {
        let teeth: Vec<String> = s.tooth_numbers.iter().map(|t| t.to_string()).collect();
        println!("  {:<16} {}", "Teeth", teeth.join(", "));
    }
    println!("  {:<16} {}", "Quantity", s.quantity);
    println!("  {:<16} EUR {} (EUR {} each)", "Amount", item.line_total, item.tariff);
    println!("  {:<16} {}", "Confidence", s.confidence.as_str());
    if !s.reasoning.is_empty() {
        println!("  {:<16} {}", "Reasoning", s.reasoning);
    }
    for note in &s.corrections {
        println!("  {:<16} {}", "Corrected", note);
    }
    println!();
}

/// Print the classifier's view of a note.
pub fn print_selection(selection: &CategorySelection) {
    println!("Mode: {}", selection.mode.as_str());
    if selection.hits.is_empty() {
        println!("  (no trigger matched)");
    }
    for (category, trigger) in &selection.hits {
        println!("  {:<16} {}", category.as_str(), trigger);
    }
    let categories: Vec<&str> = selection.categories.iter().map(|c| c.as_str()).collect();
    println!("Categories: {}", categories.join(", "));
}

pub fn print_catalog_summary(summary: &CatalogSummary) {
    println!("=== Catalog ({} entries) ===", summary.total_entries);
    for (category, count) in &summary.per_category {
        println!("  {:<16} {:>4}", category.as_str(), count);
    }
    println!();
    println!("  {:<16} {:>4}", "with keywords", summary.with_keywords);
    println!("  {:<16} {:>4}", "with companions", summary.with_companions);
    println!("  {:<16} {:>4}", "per tooth", summary.requiring_tooth);
}
