// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pledgewall status`: queue and goal summary.
//!
//! `--json` prints a structured report for scripting. Colors are disabled
//! with `--plain` or when stdout is not a terminal.

use std::io::IsTerminal;

use pledgewall_core::{DisplayStore, PledgeError, QueueStatus};
use serde::Serialize;

use crate::format;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub store: String,
    /// `None` when no queue exists.
    pub queue: Option<QueueStatus>,
    pub revealed_total: f64,
    pub goal_target: Option<f64>,
    pub theme_set: bool,
    pub logo_set: bool,
}

pub async fn collect(store: &dyn DisplayStore, location: &str) -> Result<StatusReport, PledgeError> {
    let queue = store.load_queue().await?;
    let goal = store.load_goal().await?;
    Ok(StatusReport {
        store: location.to_string(),
        queue: queue.as_ref().map(|q| q.status()),
        revealed_total: queue.as_ref().map(|q| q.revealed_total()).unwrap_or(0.0),
        goal_target: goal.map(|g| g.target),
        theme_set: store.load_theme().await?.is_some(),
        logo_set: store.load_logo().await?.is_some(),
    })
}

pub async fn run_status(
    store: &dyn DisplayStore,
    location: &str,
    json: bool,
    plain: bool,
) -> Result<(), PledgeError> {
    let report = collect(store, location).await?;
    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| PledgeError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_report(&report, use_color);
    }
    Ok(())
}

fn print_report(report: &StatusReport, use_color: bool) {
    println!();
    println!("  pledgewall status");
    println!("  {}", "-".repeat(35));
    println!("    Store:    {}", report.store);

    match report.queue {
        Some(queue) => {
            let state = if queue.is_active { "playing" } else { "paused" };
            if use_color {
                use colored::Colorize;
                let state = if queue.is_active {
                    state.green()
                } else {
                    state.yellow()
                };
                println!("    Queue:    {state}");
            } else {
                println!("    Queue:    {state}");
            }
            println!(
                "    Revealed: {} of {} donations",
                queue.processed_donations, queue.total_donations
            );
        }
        None => println!("    Queue:    empty (no donations added yet)"),
    }

    let raised = format::amount(report.revealed_total);
    match report.goal_target {
        Some(target) => println!("    Goal:     {raised} of {}", format::amount(target)),
        None => println!("    Goal:     {raised} raised, no target set"),
    }
    println!(
        "    Theme:    {}",
        if report.theme_set { "custom" } else { "default" }
    );
    println!("    Logo:     {}", if report.logo_set { "set" } else { "none" });
    println!();
}
