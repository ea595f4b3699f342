//! Idle detection.
//!
//! Two complementary ways of knowing the player has stopped doing things:
//! watching the chatbox for the notifier plugin's red "idle"/"moving" line
//! (pure vision, works when the feed is down), and requiring the activity
//! feed's idle flag to hold continuously for a duration (robust against
//! single-poll flickers). Extracted chat text carries no spaces, so matching
//! is substring-based.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ochre_core::colour;
use ochre_cv::ocr::{FontCache, extract_text};
use ochre_cv::segment::colour_mask;
use tokio::time::Instant;

use crate::error::Result;
use crate::screen::{ScreenSource, Zones};
use crate::stop::StopToken;
use crate::telemetry::TelemetryFeed;

const CHAT_FONT: &str = "Plain 12";

pub struct IdleWatcher<S, F> {
    screen: Arc<S>,
    feed: F,
    fonts: Arc<FontCache>,
    stop: StopToken,
    /// Timestamp text of the last notifier line already acted on, so one
    /// message is not consumed twice.
    last_message: Mutex<String>,
}

impl<S: ScreenSource, F: TelemetryFeed> IdleWatcher<S, F> {
    pub fn new(screen: Arc<S>, feed: F, fonts: Arc<FontCache>, stop: StopToken) -> Self {
        Self {
            screen,
            feed,
            fonts,
            stop,
            last_message: Mutex::new(String::new()),
        }
    }

    /// Blocks until the chatbox shows a fresh idle/moving notifier line or
    /// `timeout` elapses. Read failures are logged and the poll continues.
    pub async fn wait_until_idle(&self, timeout: Duration) -> Result<()> {
        // Grace delay so a notifier line from the previous action is not
        // mistaken for a fresh one.
        self.stop.wait_millis(600).await?;

        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            self.stop.wait_millis(300).await?;
            let (message, timestamp) = match self.read_latest_line() {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("failed to read chat line: {e}");
                    continue;
                }
            };

            if message.contains("idle") || message.contains("moving") {
                let mut last = self.last_message.lock().expect("idle watcher poisoned");
                if *last != timestamp {
                    *last = timestamp;
                    log::info!("idle message detected: `{message}`");
                    return Ok(());
                }
            }
        }
        log::info!("timed out waiting for an idle message");
        Ok(())
    }

    /// The red notifier text and its black timestamp from the latest
    /// chatbox line.
    fn read_latest_line(&self) -> Result<(String, String)> {
        let zone = Zones::new(self.screen.window_bounds()).latest_chat_line();
        let frame = self.screen.capture_rect(zone)?;
        let glyphs = self.fonts.get(CHAT_FONT)?;
        let message = extract_text(&colour_mask(&frame, &colour::CHAT_RED), &glyphs);
        let timestamp = extract_text(&colour_mask(&frame, &colour::BLACK), &glyphs);
        Ok((message, timestamp))
    }

    /// Blocks until the activity feed reports idle continuously for
    /// `required`, or until `max_wait` elapses. Returns whether continuous
    /// idle was observed. Feed failures neither confirm nor reset the
    /// running streak.
    pub async fn wait_for_continuous_idle(
        &self,
        required: Duration,
        max_wait: Duration,
    ) -> Result<bool> {
        let deadline = Instant::now() + max_wait;
        let mut idle_since: Option<Instant> = None;

        while Instant::now() < deadline {
            self.stop.check()?;
            match self.feed.activity().await {
                Ok(activity) if activity.is_idle => {
                    let since = *idle_since.get_or_insert_with(Instant::now);
                    if since.elapsed() >= required {
                        log::info!("continuous idle for {}s observed", required.as_secs());
                        return Ok(true);
                    }
                }
                Ok(_) => idle_since = None,
                Err(e) => log::debug!("activity fetch failed while waiting for idle: {e}"),
            }
            self.stop.wait_millis(100).await?;
        }
        log::info!(
            "timed out waiting for continuous idle of {}s",
            required.as_secs()
        );
        Ok(false)
    }
}
