// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Goal, logo and theme records.
//!
//! These are plain key-value settings: each is written whole by the admin
//! and read independently by every display.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PledgeError;

/// Fundraising goal.
///
/// The admin persists `current = 0`; displays derive the live value from
/// revealed donations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DonationGoal {
    pub target: f64,
    pub current: f64,
}

impl DonationGoal {
    /// A goal as written by the admin: the target with a zero running total.
    pub fn with_target(target: f64) -> Result<Self, PledgeError> {
        if !target.is_finite() || target < 0.0 {
            return Err(PledgeError::InvalidInput(format!(
                "goal target must be a non-negative number, got {target}"
            )));
        }
        Ok(Self {
            target,
            current: 0.0,
        })
    }
}

/// Height every uploaded logo is scaled to.
pub const LOGO_TARGET_HEIGHT: u32 = 150;
/// Smallest accepted source dimension, in pixels.
pub const LOGO_MIN_DIMENSION: u32 = 50;
/// Largest accepted upload, in bytes.
pub const LOGO_MAX_BYTES: u64 = 2 * 1024 * 1024;
/// Accepted upload content types.
pub const LOGO_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Logo shown at the bottom of a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoConfig {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A candidate logo before validation and scaling.
#[derive(Debug, Clone)]
pub struct LogoUpload {
    pub url: String,
    pub content_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl LogoUpload {
    /// Validates the upload and scales it to [`LOGO_TARGET_HEIGHT`], keeping the aspect ratio.
    pub fn into_config(self) -> Result<LogoConfig, PledgeError> {
        if self.url.trim().is_empty() {
            return Err(PledgeError::InvalidInput("logo url must not be empty".into()));
        }
        if let Some(ct) = self.content_type.as_deref()
            && !LOGO_CONTENT_TYPES.contains(&ct)
        {
            return Err(PledgeError::InvalidInput(
                "please upload a valid image file (JPEG, PNG, GIF, or WEBP)".into(),
            ));
        }
        if let Some(size) = self.size_bytes
            && size > LOGO_MAX_BYTES
        {
            return Err(PledgeError::InvalidInput(
                "image size should be less than 2MB".into(),
            ));
        }
        if self.width < LOGO_MIN_DIMENSION || self.height < LOGO_MIN_DIMENSION {
            return Err(PledgeError::InvalidInput(format!(
                "image dimensions should be at least {LOGO_MIN_DIMENSION}x{LOGO_MIN_DIMENSION} pixels"
            )));
        }

        let width = (f64::from(self.width) * f64::from(LOGO_TARGET_HEIGHT)
            / f64::from(self.height))
        .round() as u32;

        Ok(LogoConfig {
            url: self.url,
            width,
            height: LOGO_TARGET_HEIGHT,
        })
    }
}

/// Display colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    /// Main gradient start color.
    pub primary_color: String,
    /// Main gradient end color.
    pub secondary_color: String,
    /// Highlights and amounts.
    pub accent_color: String,
    pub text_color: String,
}

impl Default for ThemeConfig {
    /// Fallback used by displays when no theme has been stored.
    fn default() -> Self {
        Self::from_colors("#4B0082", "#2E0854", "#E056FD", "#FFFFFF")
    }
}

/// Named color schemes offered to the admin: (name, primary, secondary, accent, text).
pub const THEME_PRESETS: [(&str, &str, &str, &str, &str); 6] = [
    ("Royal Purple", "#4B0082", "#2D004F", "#FF69B4", "#FFF"),
    ("Ocean Blue", "#1e40af", "#1e3a8a", "#60a5fa", "#fff"),
    ("Forest Green", "#064e3b", "#065f46", "#34d399", "#fff"),
    ("Sunset Orange", "#7c2d12", "#9a3412", "#fb923c", "#fff"),
    ("Night Sky", "#1e293b", "#0f172a", "#38bdf8", "#fff"),
    ("Light Theme", "#f3e8ff", "#e9d5ff", "#9333ea", "#4c1d95"),
];

impl ThemeConfig {
    fn from_colors(primary: &str, secondary: &str, accent: &str, text: &str) -> Self {
        Self {
            primary_color: primary.to_string(),
            secondary_color: secondary.to_string(),
            accent_color: accent.to_string(),
            text_color: text.to_string(),
        }
    }

    /// Looks up a preset by name, ignoring case and surrounding whitespace.
    pub fn preset(name: &str) -> Option<Self> {
        let wanted = name.trim();
        THEME_PRESETS
            .iter()
            .find(|(n, ..)| n.eq_ignore_ascii_case(wanted))
            .map(|(_, p, s, a, t)| Self::from_colors(p, s, a, t))
    }

    /// Builds a custom theme, validating every color.
    pub fn custom(
        primary: &str,
        secondary: &str,
        accent: &str,
        text: &str,
    ) -> Result<Self, PledgeError> {
        for (field, value) in [
            ("primary", primary),
            ("secondary", secondary),
            ("accent", accent),
            ("text", text),
        ] {
            if !is_hex_color(value) {
                return Err(PledgeError::InvalidInput(format!(
                    "{field} color `{value}` must be #rgb or #rrggbb"
                )));
            }
        }
        Ok(Self::from_colors(primary, secondary, accent, text))
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Decodes a persisted settings record.
pub fn decode_record<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, PledgeError> {
    serde_json::from_str(raw).map_err(|source| PledgeError::CorruptRecord {
        key: key.to_string(),
        source,
    })
}

/// Encodes a record for persistence.
pub fn encode_record<T: Serialize>(key: &str, value: &T) -> Result<String, PledgeError> {
    serde_json::to_string(value).map_err(|source| PledgeError::Encode {
        key: key.to_string(),
        source,
    })
}
