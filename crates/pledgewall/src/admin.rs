// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin commands over the shared store.
//!
//! Each command returns the one-line status message shown on success.

use std::path::Path;

use pledgewall_core::settings::THEME_PRESETS;
use pledgewall_core::{
    DisplayStore, Donation, DonationGoal, LogoUpload, PledgeError, ThemeConfig,
};
use pledgewall_import::{import_file, parse_amount};
use tracing::info;

use crate::format;

const NO_QUEUE: &str = "No donations in queue";

/// Manual entry of a single donation.
pub async fn add(store: &dyn DisplayStore, name: &str, amount: &str) -> Result<String, PledgeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PledgeError::InvalidInput("donor name must not be empty".into()));
    }
    let amount = parse_amount(amount).ok_or_else(|| {
        PledgeError::InvalidInput(format!("`{amount}` is not a valid non-negative amount"))
    })?;

    let donation = Donation::new(name, amount)?;
    let queue = store.append_donations(std::slice::from_ref(&donation)).await?;
    info!(id = %donation.id, amount, queue_len = queue.len(), "donation added");
    Ok(format!(
        "Added {} from {name} ({} in queue)",
        format::amount(amount),
        queue.len()
    ))
}

/// CSV import. Nothing is written unless every row parses.
pub async fn import(store: &dyn DisplayStore, path: &Path) -> Result<String, PledgeError> {
    let donations = import_file(path)?;
    if donations.is_empty() {
        return Ok(format!("No donations found in {}", path.display()));
    }
    let queue = store.append_donations(&donations).await?;
    Ok(format!(
        "Successfully imported {} donations ({} in queue)",
        donations.len(),
        queue.len()
    ))
}

pub async fn set_active(store: &dyn DisplayStore, active: bool) -> Result<String, PledgeError> {
    let queue = store
        .set_active(active)
        .await?
        .ok_or_else(|| PledgeError::NotFound(NO_QUEUE.into()))?;
    Ok(playback_message(queue.is_active))
}

pub async fn toggle(store: &dyn DisplayStore) -> Result<String, PledgeError> {
    let queue = store
        .toggle_active()
        .await?
        .ok_or_else(|| PledgeError::NotFound(NO_QUEUE.into()))?;
    Ok(playback_message(queue.is_active))
}

fn playback_message(active: bool) -> String {
    if active {
        "Donation display started".to_string()
    } else {
        "Donation display paused".to_string()
    }
}

pub async fn reset(store: &dyn DisplayStore) -> Result<String, PledgeError> {
    store.reset_queue().await?;
    info!("queue reset");
    Ok("Queue reset".to_string())
}

pub async fn clear(store: &dyn DisplayStore) -> Result<String, PledgeError> {
    store.clear_all().await?;
    info!("all records cleared");
    Ok("All data cleared".to_string())
}

pub async fn set_goal(store: &dyn DisplayStore, target: u64) -> Result<String, PledgeError> {
    let goal = DonationGoal::with_target(target as f64)?;
    store.save_goal(&goal).await?;
    Ok(format!("Goal set to {}", format::amount(goal.target)))
}

pub async fn theme_preset(store: &dyn DisplayStore, name: &str) -> Result<String, PledgeError> {
    let theme = ThemeConfig::preset(name).ok_or_else(|| {
        let known: Vec<&str> = THEME_PRESETS.iter().map(|(n, ..)| *n).collect();
        PledgeError::InvalidInput(format!(
            "unknown theme `{name}`, expected one of: {}",
            known.join(", ")
        ))
    })?;
    store.save_theme(&theme).await?;
    Ok(format!("Theme set to {}", name.trim()))
}

pub async fn theme_custom(
    store: &dyn DisplayStore,
    primary: &str,
    secondary: &str,
    accent: &str,
    text: &str,
) -> Result<String, PledgeError> {
    let theme = ThemeConfig::custom(primary, secondary, accent, text)?;
    store.save_theme(&theme).await?;
    Ok("Custom theme saved".to_string())
}

pub async fn set_logo(store: &dyn DisplayStore, upload: LogoUpload) -> Result<String, PledgeError> {
    let logo = upload.into_config()?;
    store.save_logo(&logo).await?;
    Ok(format!("Logo saved ({}x{})", logo.width, logo.height))
}

pub async fn remove_logo(store: &dyn DisplayStore) -> Result<String, PledgeError> {
    store.remove_logo().await?;
    Ok("Logo removed".to_string())
}
