//! Minimap-projection walking.
//!
//! The walker moves the player to a destination tile by clicking projected
//! points on the minimap: read the position overlay, fetch a tile path from
//! the external provider, repeatedly pick an intermediate target a few tiles
//! ahead, rotate its world-space offset by the compass heading onto minimap
//! pixels, click, and poll until movement settles. While each step settles,
//! the following click point is speculatively precomputed on a background
//! task so it is ready the instant the step lands. A settle that ends on the
//! wrong tile is a veer: the speculative point is discarded and, past a
//! small tolerance, the whole path is re-requested.
//!
//! Projection assumes the minimap at default zoom; other zoom levels
//! misalign tile clicks.

pub mod position;
pub mod provider;

pub use position::{OcrPositionReader, PositionSource};
pub use provider::{PathProvider, ProviderError, PathResponse};

use std::sync::Arc;
use std::time::Duration;

use ochre_core::{Point, Rect, Tile};
use rand::Rng;

use crate::error::{Error, Result};
use crate::input::{InputDriver, SpeedProfile, click_at};
use crate::screen::{ScreenSource, Zones};
use crate::speculate::Speculative;
use crate::stop::StopToken;

#[derive(Debug, Clone, Copy)]
pub struct WalkerConfig {
    /// Tiles ahead along the path for a normal intermediate click.
    pub min_horizon: usize,
    pub max_horizon: usize,
    /// Shorter horizon used when re-deriving a target after a veer.
    pub recovery_min_horizon: usize,
    pub recovery_max_horizon: usize,
    /// Veers beyond this many tiles from the re-derived target discard the
    /// path entirely.
    pub drift_tolerance: i32,
    /// Minimap scale at default zoom.
    pub pixels_per_tile: i32,
    /// Position poll interval while waiting for movement to settle.
    pub settle_tick: Duration,
    /// Provider attempts before `path_to` gives up.
    pub provider_retry_budget: u32,
    /// Randomized backoff bounds after a rate-limit response, milliseconds.
    pub backoff_millis: (u64, u64),
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            min_horizon: 8,
            max_horizon: 10,
            recovery_min_horizon: 5,
            recovery_max_horizon: 7,
            drift_tolerance: 7,
            pixels_per_tile: 4,
            settle_tick: Duration::from_millis(650),
            provider_retry_budget: 20,
            backoff_millis: (600, 700),
        }
    }
}

pub struct Walker<Pos, P, S, I> {
    position: Arc<Pos>,
    provider: P,
    screen: Arc<S>,
    input: Arc<I>,
    stop: StopToken,
    config: WalkerConfig,
}

impl<Pos, P, S, I> Walker<Pos, P, S, I>
where
    Pos: PositionSource + 'static,
    P: PathProvider,
    S: ScreenSource + 'static,
    I: InputDriver,
{
    pub fn new(
        position: Arc<Pos>,
        provider: P,
        screen: Arc<S>,
        input: Arc<I>,
        stop: StopToken,
    ) -> Self {
        Self::with_config(
            position,
            provider,
            screen,
            input,
            stop,
            WalkerConfig::default(),
        )
    }

    pub fn with_config(
        position: Arc<Pos>,
        provider: P,
        screen: Arc<S>,
        input: Arc<I>,
        stop: StopToken,
        config: WalkerConfig,
    ) -> Self {
        Self {
            position,
            provider,
            screen,
            input,
            stop,
            config,
        }
    }

    /// Walks the player to `destination`, clicking intermediate minimap
    /// points until the position readout matches it. The destination's
    /// plane is not consulted: a walk never changes floors.
    ///
    /// Runs until arrival, until the path empties with no recovery (logged,
    /// returns Ok), or until the provider's retry budget is exhausted
    /// (fatal).
    pub async fn path_to(&self, destination: Tile, members: bool) -> Result<()> {
        let cfg = &self.config;
        let mut path = self.fetch_path(destination, members).await?;
        if path.is_empty() {
            log::error!("provider returned an empty path to {destination}");
            return Ok(());
        }

        let mut target = choose_next_target(&mut path, cfg.min_horizon, cfg.max_horizon);
        let start = self.position.position()?;
        log::info!("walking to {destination}, first click at {target}");
        click_at(
            &*self.input,
            self.click_location(target, start),
            SpeedProfile::Medium,
        )?;

        loop {
            self.stop.check()?;
            if self.position.position()?.same_square(destination) {
                log::info!("arrived at {destination}");
                return Ok(());
            }
            if path.is_empty() {
                log::warn!("no remaining path tiles, leaving walk loop");
                return Ok(());
            }

            let next_target = choose_next_target(&mut path, cfg.min_horizon, cfg.max_horizon);
            // The player should settle on `target`; precompute the click for
            // the step after while the current one plays out.
            let pending = self.speculate_click(next_target, target);
            log::debug!("precomputing next click at {next_target}");

            let position = match self.settle_and_read().await {
                Ok(position) => position,
                Err(e) => {
                    pending.cancel();
                    return Err(e);
                }
            };
            let click_point;
            if !position.same_square(target) {
                log::error!("veered off path at {position}, recalculating");
                pending.cancel();
                let _ = pending.join().await;

                if path.is_empty() {
                    log::warn!("veered with no path remaining, leaving walk loop");
                    return Ok(());
                }
                target = choose_next_target(
                    &mut path,
                    cfg.recovery_min_horizon,
                    cfg.recovery_max_horizon,
                );
                if !position.within(target, cfg.drift_tolerance) {
                    log::error!("too far from path, requesting a fresh one");
                    path = self.fetch_path(destination, members).await?;
                    if path.is_empty() {
                        log::error!("provider returned an empty path after recalculating");
                        return Ok(());
                    }
                    target = choose_next_target(&mut path, cfg.min_horizon, cfg.max_horizon);
                }
                click_point = self.click_location(target, self.position.position()?);
            } else {
                match pending.join().await.flatten() {
                    Some(point) => {
                        click_point = point;
                        target = next_target;
                    }
                    None => {
                        // Speculation lost; compute in line.
                        click_point = self.click_location(next_target, position);
                        target = next_target;
                    }
                }
            }

            click_at(&*self.input, click_point, SpeedProfile::Medium)?;
        }
    }

    /// The underlying path provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Requests a path, absorbing rate-limit sentinels (short randomized
    /// backoff) and malformed responses up to the retry budget. Transport
    /// failure and budget exhaustion are fatal.
    async fn fetch_path(&self, destination: Tile, members: bool) -> Result<Vec<Tile>> {
        let start = self.position.position()?;
        let budget = self.config.provider_retry_budget;
        let (backoff_min, backoff_max) = self.config.backoff_millis;

        for attempt in 1..=budget {
            self.stop.check()?;
            match self.provider.request_path(start, destination, members).await {
                Ok(path) => return Ok(path),
                Err(ProviderError::RateLimited) => {
                    log::warn!("path provider rate limited (attempt {attempt}/{budget})");
                    self.stop.wait_random_millis(backoff_min, backoff_max).await?;
                }
                Err(ProviderError::Malformed(msg)) => {
                    log::error!("failed to decode path response: {msg}");
                }
                Err(other) => return Err(Error::Provider(other)),
            }
        }
        Err(Error::Provider(ProviderError::Exhausted { attempts: budget }))
    }

    /// Projects `target` onto the minimap given where the player currently
    /// stands.
    fn click_location(&self, target: Tile, player: Tile) -> Point {
        let marker = Zones::new(self.screen.window_bounds()).player_marker();
        let heading = self.position.heading_degrees();
        project_to_minimap(target, player, heading, marker, self.config.pixels_per_tile)
    }

    fn speculate_click(&self, target: Tile, expected_player: Tile) -> Speculative<Option<Point>> {
        let screen = Arc::clone(&self.screen);
        let position = Arc::clone(&self.position);
        let pixels_per_tile = self.config.pixels_per_tile;
        Speculative::compute(move || {
            let marker = Zones::new(screen.window_bounds()).player_marker();
            let heading = position.heading_degrees();
            Some(project_to_minimap(
                target,
                expected_player,
                heading,
                marker,
                pixels_per_tile,
            ))
        })
    }

    /// Polls the position at the settle tick until two consecutive reads
    /// are identical, then reads once more for the drift check.
    async fn settle_and_read(&self) -> Result<Tile> {
        let mut last = self.position.position()?;
        self.stop.wait(self.config.settle_tick).await?;
        loop {
            let now = self.position.position()?;
            if now == last {
                break;
            }
            last = now;
            self.stop.wait(self.config.settle_tick).await?;
        }
        self.position.position()
    }
}

/// Picks the next intermediate target a randomized number of tiles ahead,
/// clamped to the path's end, and drains the consumed prefix. The chosen
/// tile stays at the head of the path so a veer can re-derive from it.
fn choose_next_target(path: &mut Vec<Tile>, min_horizon: usize, max_horizon: usize) -> Tile {
    debug_assert!(!path.is_empty());
    let horizon = rand::thread_rng().gen_range(min_horizon..=max_horizon);
    if path.len() > horizon {
        let target = path[horizon];
        path.drain(..horizon);
        target
    } else {
        let target = *path.last().expect("checked non-empty");
        path.clear();
        target
    }
}

/// Converts a target tile's world-space offset from the player into a
/// minimap click point, rotated by the camera heading around the player
/// marker's centre.
pub fn project_to_minimap(
    target: Tile,
    player: Tile,
    heading_degrees: f64,
    marker: Rect,
    pixels_per_tile: i32,
) -> Point {
    let dx = ((target.x - player.x) * pixels_per_tile) as f64;
    // Screen y grows downward, world y grows northward.
    let dy = ((player.y - target.y) * pixels_per_tile) as f64;

    let half = (pixels_per_tile - 1) as f64 / 2.0;
    let origin_x = marker.x as f64 + half;
    let origin_y = marker.y as f64 + half;

    let theta = heading_degrees.to_radians();
    let rot_x = theta.cos() * dx - theta.sin() * dy;
    let rot_y = theta.sin() * dx + theta.cos() * dy;

    Point::new(
        (origin_x + rot_x).round() as i32,
        (origin_y + rot_y).round() as i32,
    )
}
