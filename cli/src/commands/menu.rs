use colored::*;

use ordr_common::menu::MENU_ITEMS;
use ordr_core::command;

use crate::terminal::print;

/// Prints the catalog with the gesture token and ASL sign for each item.
pub fn menu() {
    print::header("menu");

    for item in MENU_ITEMS {
        let token = command::token_for(item.id).unwrap_or("-");
        println!(
            "{} {:<16} {:>6}   {} {}",
            item.emoji,
            item.name.bold(),
            format!("{:.2}", item.price),
            format!("[{token}]").cyan(),
            item.asl_sign.dimmed()
        );
    }

    println!();
    println!(
        "{} {}",
        "[1-3]".cyan(),
        "Hold up fingers to choose a quantity".dimmed()
    );
    println!(
        "{} {}",
        "[FINISH]".cyan(),
        "Thumbs up to complete the order".dimmed()
    );
}
