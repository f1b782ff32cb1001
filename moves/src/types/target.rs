//! Category and targeting of a move

use serde::Deserialize;

/// Damage class of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Category {
    Physical,
    Special,
    Status,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Physical => "Physical",
            Category::Special => "Special",
            Category::Status => "Status",
        }
    }
}

/// Who a move can be aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveTarget {
    Normal,
    #[serde(rename = "self")]
    User,
    AdjacentAlly,
    AdjacentAllyOrSelf,
    AdjacentFoe,
    All,
    AllAdjacent,
    AllAdjacentFoes,
    Allies,
    AllySide,
    AllyTeam,
    Any,
    FoeSide,
    RandomNormal,
    Scripted,
}

impl MoveTarget {
    /// Whether the move hits more than one battler
    pub fn is_spread(&self) -> bool {
        matches!(self, MoveTarget::AllAdjacent | MoveTarget::AllAdjacentFoes)
    }
}
