use colored::*;

use ordr_core::flow::FlowSnapshot;

pub const RECEIPT_WIDTH: usize = 40;

pub fn header(title: &str) {
    println!();
    println!("{} {}", "──".blue().bold(), title.bold());
}

pub fn separator() {
    println!("{}", "─".repeat(RECEIPT_WIDTH).dimmed());
}

/// Renders the current order like the kiosk's receipt panel.
pub fn receipt(snapshot: &FlowSnapshot) {
    separator();
    match &snapshot.client {
        Some(client) => println!("{}", format!("Order for {client}").bold()),
        None => println!("{}", "Your Order".bold()),
    }
    separator();

    for line in &snapshot.lines {
        let label = format!("{} {} x{}", line.item.emoji, line.item.name, line.quantity);
        let amount = format!("{:.2}", line.item.price * f64::from(line.quantity));
        println!("{label:<32}{amount:>8}");
    }

    separator();
    println!("{:<32}{:>8}", "Subtotal", format!("{:.2}", snapshot.subtotal));
    println!("{:<32}{:>8}", "Tax (8%)", format!("{:.2}", snapshot.tax));
    println!(
        "{:<32}{:>8}",
        "Total".bold(),
        format!("{:.2}", snapshot.total).bold()
    );
    separator();
}
