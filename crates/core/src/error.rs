//! Typed failures surfaced by configuration checks and the generation passes.

use thiserror::Error;

use crate::types::StairDir;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("could not place an up stair on floor {floor}")]
    StairPlacementFailed { floor: usize },
    #[error("room layout of floor {floor} failed validation {attempts} times")]
    RoomGrowthExhausted { floor: usize, attempts: u32 },
    #[error("plot of room {room} on floor {floor} failed validation {attempts} times")]
    PlotValidationExhausted { floor: usize, room: usize, attempts: u32 },
    #[error("no enemy template is beatable for room {room} on floor {floor}")]
    NoFeasibleEnemies { floor: usize, room: usize },
    #[error("floor {floor} has no room containing its {dir:?} stair")]
    StairRoomMissing { floor: usize, dir: StairDir },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
