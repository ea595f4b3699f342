//! Ochre — a vision-and-targeting engine for pixel-driven game automation.
//!
//! The engine perceives a running client purely through pixel capture and
//! acts through synthetic input; it never touches game memory or the
//! network protocol. Perception lives in [`ochre_cv`] (segmentation,
//! template matching, glyph OCR, point selection); this crate supplies the
//! stateful components built on top of it:
//!
//! - [`moving_target`]: click/verify/retry acquisition of targets that move
//!   between click and confirmation, with speculative next-point
//!   computation overlapped into the acknowledgment delay.
//! - [`walker`]: minimap-projection pathing with drift detection and
//!   recovery over an external path provider.
//! - [`combat`]: a debounced polling state machine over the telemetry
//!   feed's in-combat flag.
//! - [`idle`], [`hud`], [`inventory`]: idle-notifier waits, HUD text
//!   readouts and inventory slot interaction.
//!
//! The capture, input, pathfinding and telemetry boundaries are traits
//! ([`screen::ScreenSource`], [`input::InputDriver`],
//! [`walker::PathProvider`], [`telemetry::TelemetryFeed`]) wired up by the
//! host. One [`stop::StopToken`] threads through every wait so a stop
//! request unwinds all loops promptly.

pub mod assets;
pub mod combat;
pub mod error;
pub mod hud;
pub mod idle;
pub mod input;
pub mod inventory;
pub mod moving_target;
pub mod screen;
pub mod speculate;
pub mod stop;
pub mod telemetry;
pub mod walker;

pub use assets::AssetStore;
pub use combat::{CombatConfig, CombatMonitor};
pub use error::{Error, Result};
pub use hud::Hud;
pub use idle::IdleWatcher;
pub use input::{InputDriver, KeyAction, MouseButton, SpeedProfile};
pub use inventory::Inventory;
pub use moving_target::{AckVerifier, MovingTarget, MovingTargetConfig, SpriteVerifier};
pub use screen::{ScreenSource, Zones};
pub use speculate::Speculative;
pub use stop::StopToken;
pub use telemetry::{
    ActivitySnapshot, CombatSnapshot, FeedError, InventorySnapshot, SkillsSnapshot, TelemetryFeed,
};
pub use walker::{PathProvider, PositionSource, ProviderError, Walker, WalkerConfig};

// Re-export the vision layer and core types for consumers.
pub use ochre_core::{ColourRange, Point, Rect, Tile, colour};
pub use ochre_cv as cv;
