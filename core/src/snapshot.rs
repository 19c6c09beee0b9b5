//! Snapshot codec — the full save state to/from text.
//!
//! The persisted artifact is one JSON object: schema version, the state
//! record, and the wall-clock save time (the offline catch-up anchor).
//! The export/import variants wrap the same JSON in base64 for clipboard
//! transport. Decoding fails closed: a corrupt blob yields an Err and the
//! caller's in-memory state is never touched.

use crate::error::{GameError, GameResult};
use crate::state::GameState;
use crate::types::TimestampMs;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Bump when a field changes meaning; additions alone keep it.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    pub schema_version: u32,
    pub state: GameState,
    pub saved_at_ms: TimestampMs,
}

impl SaveSnapshot {
    pub fn capture(state: &GameState, saved_at_ms: TimestampMs) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            state: state.clone(),
            saved_at_ms,
        }
    }

    pub fn encode(&self) -> GameResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> GameResult<Self> {
        let snapshot: SaveSnapshot =
            serde_json::from_str(text).map_err(|e| GameError::SaveCorrupt {
                reason: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Base64-wrapped JSON for clipboard transport between devices.
    pub fn encode_export(&self) -> GameResult<String> {
        Ok(STANDARD.encode(self.encode()?))
    }

    pub fn decode_export(blob: &str) -> GameResult<Self> {
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| GameError::SaveCorrupt {
                reason: format!("base64: {e}"),
            })?;
        let text = String::from_utf8(bytes).map_err(|e| GameError::SaveCorrupt {
            reason: format!("utf8: {e}"),
        })?;
        Self::decode(&text)
    }

    /// Reject snapshots no load should ever apply: future schema
    /// versions and non-finite or negative core counters.
    fn validate(&self) -> GameResult<()> {
        if self.schema_version == 0 || self.schema_version > SCHEMA_VERSION {
            return Err(GameError::SaveCorrupt {
                reason: format!("unsupported schema version {}", self.schema_version),
            });
        }
        let s = &self.state;
        let counters = [
            ("currency", s.currency),
            ("total_earned", s.total_earned),
            ("click_earned", s.click_earned),
            ("generator_earned", s.generator_earned),
            ("total_clicks", s.total_clicks),
        ];
        for (name, value) in counters {
            if !value.is_finite() || value < 0.0 {
                return Err(GameError::SaveCorrupt {
                    reason: format!("{name} is {value}"),
                });
            }
        }
        Ok(())
    }
}
