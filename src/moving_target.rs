//! Moving-target acquisition.
//!
//! Clicking an NPC or an animated obstacle is speculative: the target may
//! have moved by the time the click lands, and the client only renders its
//! acknowledgment sprite at the click point after a short delay. Instead of
//! idling through that delay, the protocol always starts computing the
//! *next* candidate point first, then waits, then verifies. A failed
//! verification retries with the already-computed point near-instantly; a
//! successful one cancels the pending computation. That overlap is the whole
//! point of this module — verification adds almost no latency per retry.

use std::sync::Arc;
use std::time::Duration;

use ochre_core::{ColourRange, Point, Rect};
use ochre_cv::segment::closest_to_centre;
use ochre_cv::template::match_template;
use ochre_cv::{Frame, Template, point, segment};

use crate::error::Result;
use crate::input::{InputDriver, SpeedProfile, click_at};
use crate::screen::{ScreenSource, Zones};
use crate::speculate::Speculative;
use crate::stop::StopToken;

/// Decides whether a captured click patch shows the acknowledgment sprite.
pub trait AckVerifier: Send + Sync {
    fn verify(&self, patch: &Frame) -> bool;
}

/// Checks the patch against each frame of the acknowledgment animation; any
/// one matching within the threshold counts.
pub struct SpriteVerifier {
    sprites: Vec<Template>,
    threshold: f64,
}

impl SpriteVerifier {
    /// `sprites` are the animation frames; 0.15 is a workable threshold for
    /// the squared-difference matcher (permissive: the sprite renders over
    /// arbitrary scenery).
    pub fn new(sprites: Vec<Template>, threshold: f64) -> Self {
        Self { sprites, threshold }
    }
}

impl AckVerifier for SpriteVerifier {
    fn verify(&self, patch: &Frame) -> bool {
        self.sprites
            .iter()
            .any(|sprite| matches!(match_template(sprite, patch, self.threshold), Ok(Some(_))))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MovingTargetConfig {
    /// How long the client takes to render the acknowledgment sprite. The
    /// speculative next-point pass runs inside this window.
    pub ack_delay: Duration,
    /// Additional clicks after the initial one before giving up.
    pub retry_budget: u32,
    /// Point-sampling attempts per candidate blob.
    pub sample_attempts: u32,
    /// Half-size of the verification patch. 7 gives a 14x14 capture, sized
    /// for an 11x11 sprite with a little rendering slack.
    pub patch_radius: i32,
}

impl Default for MovingTargetConfig {
    fn default() -> Self {
        Self {
            ack_delay: Duration::from_millis(120),
            retry_budget: 10,
            sample_attempts: 15,
            patch_radius: 7,
        }
    }
}

/// The acquisition protocol over a colour-marked target.
pub struct MovingTarget<S, I, V> {
    screen: Arc<S>,
    input: Arc<I>,
    verifier: V,
    stop: StopToken,
    config: MovingTargetConfig,
}

impl<S, I, V> MovingTarget<S, I, V>
where
    S: ScreenSource + 'static,
    I: InputDriver,
    V: AckVerifier,
{
    pub fn new(screen: Arc<S>, input: Arc<I>, verifier: V, stop: StopToken) -> Self {
        Self::with_config(screen, input, verifier, stop, MovingTargetConfig::default())
    }

    pub fn with_config(
        screen: Arc<S>,
        input: Arc<I>,
        verifier: V,
        stop: StopToken,
        config: MovingTargetConfig,
    ) -> Self {
        Self {
            screen,
            input,
            verifier,
            stop,
            config,
        }
    }

    /// Clicks the marked target and confirms the click landed. Returns true
    /// iff a click was verified within the retry budget; a missing target or
    /// an exhausted budget is false, never an error.
    pub async fn acquire(&self, range: &ColourRange) -> Result<bool> {
        self.stop.check()?;
        let Some(mut click_point) = locate(&*self.screen, range, &self.config) else {
            return Ok(false);
        };
        click_at(&*self.input, click_point, SpeedProfile::Fast)?;

        for _ in 0..self.config.retry_budget {
            // Start the next search before this click's outcome is known.
            let next_point = self.speculate(*range);

            if let Err(e) = self.stop.wait(self.config.ack_delay).await {
                next_point.cancel();
                return Err(e);
            }

            if self.verified(click_point) {
                next_point.cancel();
                return Ok(true);
            }

            // The backup was computed during the wait; retrieving it is
            // near-instant.
            match next_point.join().await.flatten() {
                Some(p) => {
                    click_point = p;
                    click_at(&*self.input, click_point, SpeedProfile::Fast)?;
                }
                None => {
                    log::warn!("no fallback point for colour {}", range.name);
                    return Ok(false);
                }
            }
        }

        log::error!(
            "failed to verify click on {} after {} retries",
            range.name,
            self.config.retry_budget
        );
        Ok(false)
    }

    fn speculate(&self, range: ColourRange) -> Speculative<Option<Point>> {
        let screen = Arc::clone(&self.screen);
        let config = self.config;
        Speculative::compute(move || locate(&*screen, &range, &config))
    }

    /// Captures the patch around the last click and checks it for the
    /// acknowledgment sprite. Capture failures count as unverified.
    fn verified(&self, click_point: Point) -> bool {
        let patch_rect = Rect::around(click_point, self.config.patch_radius);
        match self.screen.capture_rect(patch_rect) {
            Ok(patch) => self.verifier.verify(&patch),
            Err(e) => {
                log::warn!("click patch capture failed: {e}");
                false
            }
        }
    }
}

/// One full perception pass: capture the game view, segment by colour, take
/// the most central blob and sample a click point inside its contour. Any
/// failure along the way is a miss, not an error.
fn locate<S: ScreenSource>(
    screen: &S,
    range: &ColourRange,
    config: &MovingTargetConfig,
) -> Option<Point> {
    let window = screen.window_bounds();
    let view = Zones::new(window).game_view();
    let frame = match screen.capture_rect(view) {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("game view capture failed: {e}");
            return None;
        }
    };

    let blobs = segment::segment(&frame, range);
    let blob = closest_to_centre(&blobs, window)?;
    let tightness = point::heuristic_tightness(blob.bounds);
    point::point_in_blob(
        blob,
        config.sample_attempts,
        tightness,
        &mut rand::thread_rng(),
    )
}
