//! Telemetry feed boundary.
//!
//! An external helper process exposes best-effort JSON snapshots of combat
//! state, player activity and inventory. The feed is eventually consistent
//! and occasionally unreachable; consumers treat every failure as "no data
//! this poll" and never let it end a script. Field names below match the
//! feed's wire format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("telemetry feed unreachable: {0}")]
    Unreachable(String),

    #[error("telemetry payload malformed: {0}")]
    Malformed(String),
}

/// One poll of the combat endpoint. No identity persists across polls; the
/// poller derives its own timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSnapshot {
    #[serde(rename = "In combat", default)]
    pub in_combat: bool,

    #[serde(rename = "NPC name", default)]
    pub npc_name: Option<String>,
}

/// One poll of the events endpoint: idle flag, recent chat and resource
/// counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    #[serde(rename = "Is idle", default)]
    pub is_idle: bool,

    #[serde(rename = "Animation ID", default)]
    pub animation_id: i32,

    #[serde(rename = "Last chat message", default)]
    pub last_chat_message: String,

    #[serde(rename = "Last 5 chat messages", default)]
    pub recent_chat: Vec<String>,

    #[serde(rename = "Current run energy", default)]
    pub run_energy: i32,

    #[serde(rename = "Current special attack energy", default)]
    pub special_attack_energy: i32,

    #[serde(rename = "World location", default)]
    pub world_location: String,
}

/// One occupied inventory slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub slot: u32,
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
}

/// One poll of the inventory endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub items: Vec<InventoryItem>,
}

impl InventorySnapshot {
    /// The item in `slot`, if occupied.
    pub fn item_in_slot(&self, slot: u32) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.slot == slot)
    }

    /// Total quantity across slots holding `name`.
    pub fn count_of(&self, name: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.name == name)
            .map(|i| i.quantity)
            .sum()
    }
}

/// One tracked skill from the skills endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillItem {
    #[serde(rename = "Skill name")]
    pub skill_name: String,

    #[serde(rename = "Level", default)]
    pub level: i32,

    #[serde(rename = "Boosted level", default)]
    pub boosted_level: i32,

    #[serde(rename = "Boosted amount", default)]
    pub boosted_amount: i32,

    #[serde(rename = "Current XP", default)]
    pub current_xp: i64,
}

/// One poll of the skills endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsSnapshot {
    #[serde(default)]
    pub skills: Vec<SkillItem>,
}

impl SkillsSnapshot {
    pub fn skill(&self, name: &str) -> Option<&SkillItem> {
        self.skills.iter().find(|s| s.skill_name == name)
    }
}

/// The remote feed itself. Implementations wrap whatever transport the host
/// uses; mocks script snapshot sequences in tests.
#[allow(async_fn_in_trait)]
pub trait TelemetryFeed: Send + Sync {
    async fn combat(&self) -> Result<CombatSnapshot, FeedError>;
    async fn activity(&self) -> Result<ActivitySnapshot, FeedError>;
    async fn inventory(&self) -> Result<InventorySnapshot, FeedError>;
    async fn skills(&self) -> Result<SkillsSnapshot, FeedError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combat_snapshot_wire_format() {
        let snapshot: CombatSnapshot =
            serde_json::from_str(r#"{"In combat": true, "NPC name": "Hill Giant"}"#).unwrap();
        assert!(snapshot.in_combat);
        assert_eq!(snapshot.npc_name.as_deref(), Some("Hill Giant"));
    }

    #[test]
    fn test_combat_snapshot_tolerates_missing_fields() {
        let snapshot: CombatSnapshot = serde_json::from_str("{}").unwrap();
        assert!(!snapshot.in_combat);
        assert!(snapshot.npc_name.is_none());
    }

    #[test]
    fn test_activity_snapshot_wire_format() {
        let snapshot: ActivitySnapshot = serde_json::from_str(
            r#"{
                "Is idle": true,
                "Animation ID": -1,
                "Last chat message": "You swing your pick at the rock.",
                "Last 5 chat messages": ["a", "b"],
                "Current run energy": 74,
                "Current special attack energy": 100,
                "World location": "3221,3218,0"
            }"#,
        )
        .unwrap();
        assert!(snapshot.is_idle);
        assert_eq!(snapshot.run_energy, 74);
        assert_eq!(snapshot.recent_chat.len(), 2);
    }

    #[test]
    fn test_skills_snapshot_wire_format() {
        let snapshot: SkillsSnapshot = serde_json::from_str(
            r#"{"skills": [
                {"Skill name": "Mining", "Level": 62, "Boosted level": 65,
                 "Boosted amount": 3, "Current XP": 333804},
                {"Skill name": "Fishing", "Level": 40}
            ]}"#,
        )
        .unwrap();
        let mining = snapshot.skill("Mining").unwrap();
        assert_eq!(mining.level, 62);
        assert_eq!(mining.boosted_amount, 3);
        assert_eq!(mining.current_xp, 333804);
        assert_eq!(snapshot.skill("Fishing").unwrap().boosted_level, 0);
        assert!(snapshot.skill("Smithing").is_none());
    }

    #[test]
    fn test_inventory_helpers() {
        let inv = InventorySnapshot {
            items: vec![
                InventoryItem {
                    slot: 0,
                    name: "Iron ore".into(),
                    quantity: 1,
                },
                InventoryItem {
                    slot: 3,
                    name: "Iron ore".into(),
                    quantity: 1,
                },
            ],
        };
        assert_eq!(inv.count_of("Iron ore"), 2);
        assert!(inv.item_in_slot(3).is_some());
        assert!(inv.item_in_slot(1).is_none());
    }
}
