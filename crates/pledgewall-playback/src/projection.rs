// SPDX-FileCopyrightText: 2026 Pledgewall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The projection a display renders, chosen by [`DisplayMode`].

use std::time::Duration;

use pledgewall_core::{DisplayDonation, DisplayMode, Donation};
use serde::Serialize;
use tokio::time::Instant;

use crate::ticker::{Bubble, TickerProjection};
use crate::wall::LiveWall;

/// Sizes and lifetimes for both projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionSettings {
    pub max_visible: usize,
    pub lifetime: Duration,
    pub highlight: Duration,
    pub banner: Duration,
    pub grid_size: usize,
}

#[derive(Debug)]
pub enum Projection {
    Ticker(TickerProjection),
    Live(LiveWall),
}

impl Projection {
    pub fn new(mode: DisplayMode, settings: &ProjectionSettings) -> Self {
        match mode {
            DisplayMode::Ticker => Projection::Ticker(TickerProjection::new(
                settings.max_visible,
                settings.lifetime,
                settings.highlight,
            )),
            DisplayMode::Live => Projection::Live(LiveWall::new(settings.banner, settings.grid_size)),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self {
            Projection::Ticker(_) => DisplayMode::Ticker,
            Projection::Live(_) => DisplayMode::Live,
        }
    }

    pub fn push(&mut self, donation: Donation, now: Instant) {
        match self {
            Projection::Ticker(ticker) => ticker.push(donation, now),
            Projection::Live(wall) => wall.push(donation, now),
        }
    }

    /// Returns `true` if anything visible changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self {
            Projection::Ticker(ticker) => ticker.expire(now),
            Projection::Live(wall) => wall.expire(now),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Projection::Ticker(ticker) => ticker.clear(),
            Projection::Live(wall) => wall.clear(),
        }
    }

    pub fn view(&self) -> ProjectionView {
        match self {
            Projection::Ticker(ticker) => ProjectionView::Ticker {
                bubbles: ticker.bubbles(),
            },
            Projection::Live(wall) => ProjectionView::Live {
                banner: wall.banner().cloned(),
                grid: wall.grid().cloned().collect(),
            },
        }
    }
}

/// Renderer-facing copy of a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProjectionView {
    Ticker { bubbles: Vec<Bubble> },
    Live {
        banner: Option<DisplayDonation>,
        grid: Vec<DisplayDonation>,
    },
}

impl ProjectionView {
    /// Number of donations currently on screen.
    pub fn visible(&self) -> usize {
        match self {
            ProjectionView::Ticker { bubbles } => bubbles.len(),
            ProjectionView::Live { banner, grid } => usize::from(banner.is_some()) + grid.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pledgewall_test_utils::fixtures;

    fn settings() -> ProjectionSettings {
        ProjectionSettings {
            max_visible: 5,
            lifetime: Duration::from_millis(8000),
            highlight: Duration::from_millis(3000),
            banner: Duration::from_millis(1500),
            grid_size: 12,
        }
    }

    #[test]
    fn live_view_serializes_with_kind_tag() {
        let mut projection = Projection::new(DisplayMode::Live, &settings());
        let now = Instant::now();
        projection.push(fixtures::donations(&[20.0]).remove(0), now);

        let json = serde_json::to_value(projection.view()).unwrap();
        assert_eq!(json["kind"], "live");
        assert_eq!(json["banner"]["amount"], 20.0);
        assert_eq!(json["banner"]["isNew"], true);
        assert_eq!(json["grid"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn clear_empties_either_projection() {
        for mode in [DisplayMode::Ticker, DisplayMode::Live] {
            let mut projection = Projection::new(mode, &settings());
            assert_eq!(projection.mode(), mode);
            projection.push(fixtures::donations(&[1.0]).remove(0), Instant::now());
            assert_eq!(projection.view().visible(), 1);
            projection.clear();
            assert_eq!(projection.view().visible(), 0);
        }
    }
}
