//! Inventory interaction.
//!
//! Slot contents come from the telemetry feed; clicks go through the same
//! centre-biased sampling as every other target. Slots are numbered
//! row-major, 0 through 27, matching the feed's slot indices.

use std::sync::Arc;

use ochre_cv::point;

use crate::error::Result;
use crate::input::{InputDriver, SpeedProfile, click_at};
use crate::screen::{ScreenSource, Zones};
use crate::telemetry::TelemetryFeed;

/// Slots in a full inventory.
pub const INVENTORY_CAPACITY: usize = 28;

pub struct Inventory<S, I, F> {
    screen: Arc<S>,
    input: Arc<I>,
    feed: F,
}

impl<S: ScreenSource, I: InputDriver, F: TelemetryFeed> Inventory<S, I, F> {
    pub fn new(screen: Arc<S>, input: Arc<I>, feed: F) -> Self {
        Self {
            screen,
            input,
            feed,
        }
    }

    /// Left-clicks a centre-biased point inside the given slot. An
    /// out-of-range index is logged and ignored rather than failing the
    /// calling script.
    pub fn click_slot(&self, index: usize) -> Result<()> {
        let zones = Zones::new(self.screen.window_bounds());
        let Some(slot) = zones.inventory_slot(index) else {
            log::warn!("inventory slot {index} out of range");
            return Ok(());
        };
        let target = point::point_in_rect(
            slot,
            point::heuristic_tightness(slot),
            &mut rand::thread_rng(),
        );
        click_at(&*self.input, target, SpeedProfile::Fast)?;
        log::info!("clicked inventory slot {index}");
        Ok(())
    }

    /// True when every slot is occupied. A feed failure reads as not full.
    pub async fn is_full(&self) -> bool {
        match self.feed.inventory().await {
            Ok(inv) => inv.items.len() >= INVENTORY_CAPACITY,
            Err(e) => {
                log::warn!("inventory fetch failed: {e}");
                false
            }
        }
    }

    /// Total quantity of `name` across all slots. A feed failure reads as
    /// zero.
    pub async fn count_of(&self, name: &str) -> u32 {
        match self.feed.inventory().await {
            Ok(inv) => inv.count_of(name),
            Err(e) => {
                log::warn!("inventory fetch failed: {e}");
                0
            }
        }
    }

    /// The first slot index holding `name`, if any. A feed failure reads as
    /// absent.
    pub async fn first_slot_of(&self, name: &str) -> Option<u32> {
        match self.feed.inventory().await {
            Ok(inv) => inv.items.iter().find(|i| i.name == name).map(|i| i.slot),
            Err(e) => {
                log::warn!("inventory fetch failed: {e}");
                None
            }
        }
    }
}
