//! Output formatting and progress spinners for CLI

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::game::{Game, Player};

/// Create a spinner for long-running fits
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format an optional statistic, `n/a` when undefined
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
}

/// One-line payoff layout: `Out (5, 5) | In→Left (10, 10) | In→Right (0, 0)`
pub fn payoff_layout(game: &Game) -> String {
    game.terminal_states()
        .map(|terminal| {
            let route: Vec<String> = game
                .history(terminal)
                .iter()
                .map(|step| game.available(step.state)[step.action].label.to_string())
                .collect();
            let reward = game.reward(terminal);
            format!(
                "{} ({}, {})",
                route.join("→"),
                reward[Player::One],
                reward[Player::Two]
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
