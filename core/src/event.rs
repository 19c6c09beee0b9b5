//! Events emitted by the engine — hosts render them, tests assert on them.
//!
//! Variants are added per feature — never removed or reordered.

use crate::types::{ItemId, Seconds, TimestampMs};
use serde::{Deserialize, Serialize};

/// Every observable thing a tick (or a resume) can do beyond plain
/// number accrual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    AchievementUnlocked {
        id: ItemId,
    },
    MilestoneUnlocked {
        id: ItemId,
    },
    LuckyEventStarted {
        id: ItemId,
        ends_at_ms: TimestampMs,
    },
    LuckyEventExpired {
        id: ItemId,
    },
    InstantEventTriggered {
        id: ItemId,
        reward: f64,
    },
    OfflineProgressApplied {
        seconds: Seconds,
        earned: f64,
    },
}

/// Extract a stable string name from a GameEvent variant.
/// Used for log lines and event-stream tagging.
pub fn event_type_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::AchievementUnlocked { .. }   => "achievement_unlocked",
        GameEvent::MilestoneUnlocked { .. }     => "milestone_unlocked",
        GameEvent::LuckyEventStarted { .. }     => "lucky_event_started",
        GameEvent::LuckyEventExpired { .. }     => "lucky_event_expired",
        GameEvent::InstantEventTriggered { .. } => "instant_event_triggered",
        GameEvent::OfflineProgressApplied { .. } => "offline_progress_applied",
    }
}
