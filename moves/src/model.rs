//! Normalized move model

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::Value;

use crate::catalog::MoveCatalog;
use crate::effects::{Boost, EffectTable};
use crate::error::MoveError;
use crate::types::{Category, MoveTarget, Secondary, Status, Type};

/// Hidden Power variants carry their type and power in the id
const VARIABLE_POWER_PREFIX: &str = "hiddenpower";
/// Z-moves are named after their base move and have no entries of their own
const ULTIMATE_MOVE_PREFIX: char = 'z';

/// Reduce a move name to its catalog id.
///
/// Drops `-`, `'` and spaces, lowercases, and collapses numbered
/// variable-power variants (`hiddenpowerfire60`) to their base id.
pub fn to_move_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .filter(|c| !matches!(c, '-' | '\'' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    if id.starts_with(VARIABLE_POWER_PREFIX) && id.ends_with(|c: char| c.is_ascii_digit()) {
        let base_len = id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        id.truncate(base_len);
    }

    id
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Accuracy {
    AlwaysHits(bool),
    Percent(u8),
}

/// Scalar fields every record must carry
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveData {
    accuracy: Accuracy,
    base_power: u16,
    category: Category,
    pp: u8,
    priority: i8,
    #[serde(default)]
    flags: BTreeMap<String, Value>,
    target: MoveTarget,
    #[serde(rename = "type")]
    move_type: String,
    #[serde(default)]
    secondary: Option<Value>,
    #[serde(default)]
    secondaries: Option<Vec<Value>>,
}

/// A move's numeric parameters and probabilistic secondary effects.
///
/// Built in one step from a catalog record; there is no way to obtain a
/// partially populated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    name: String,
    accuracy: u8,
    base_power: u16,
    category: Category,
    max_pp: u8,
    priority: i8,
    flags: BTreeSet<String>,
    target: MoveTarget,
    move_type: Type,
    boosts: BTreeMap<Status, Boost>,
    auto_boosts: BTreeMap<Status, Boost>,
    secondaries: BTreeMap<Secondary, u8>,
}

impl Move {
    /// Resolve a move name against the catalog
    pub fn resolve(catalog: &MoveCatalog, identifier: &str) -> Result<Self, MoveError> {
        let id = to_move_id(identifier);

        if id.starts_with(ULTIMATE_MOVE_PREFIX) && !catalog.contains(&id) {
            return Err(MoveError::UnsupportedMove(id));
        }

        let record = catalog.lookup(&id)?;
        let data: MoveData = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|source| MoveError::InvalidRecord {
                id: id.clone(),
                source,
            })?;

        let move_type = Type::from_protocol(&data.move_type).ok_or_else(|| {
            MoveError::InvalidField {
                id: id.clone(),
                field: "type",
                value: data.move_type.clone(),
            }
        })?;

        let accuracy = match data.accuracy {
            Accuracy::AlwaysHits(true) => 100,
            Accuracy::AlwaysHits(false) => {
                return Err(MoveError::InvalidField {
                    id,
                    field: "accuracy",
                    value: "false".to_string(),
                });
            }
            Accuracy::Percent(accuracy) if accuracy <= 100 => accuracy,
            Accuracy::Percent(accuracy) => {
                return Err(MoveError::InvalidField {
                    id,
                    field: "accuracy",
                    value: accuracy.to_string(),
                });
            }
        };

        let mut effects = EffectTable::new();
        if let Some(secondary) = &data.secondary {
            effects.add(&id, secondary);
        }
        for secondary in data.secondaries.iter().flatten() {
            effects.add(&id, secondary);
        }

        Ok(Self {
            accuracy,
            base_power: data.base_power,
            category: data.category,
            max_pp: data.pp,
            priority: data.priority,
            flags: data.flags.into_keys().collect(),
            target: data.target,
            move_type,
            boosts: effects.boosts,
            auto_boosts: effects.auto_boosts,
            secondaries: effects.secondaries,
            name: id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hit chance in percent; moves that never miss report 100
    pub fn accuracy(&self) -> u8 {
        self.accuracy
    }

    pub fn base_power(&self) -> u16 {
        self.base_power
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn max_pp(&self) -> u8 {
        self.max_pp
    }

    pub fn priority(&self) -> i8 {
        self.priority
    }

    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn target(&self) -> MoveTarget {
        self.target
    }

    pub fn move_type(&self) -> Type {
        self.move_type
    }

    /// Secondary stat changes applied to the target
    pub fn boosts(&self) -> &BTreeMap<Status, Boost> {
        &self.boosts
    }

    /// Secondary stat changes applied to the user
    pub fn auto_boosts(&self) -> &BTreeMap<Status, Boost> {
        &self.auto_boosts
    }

    /// Chance, in percent, of each secondary condition
    pub fn secondaries(&self) -> &BTreeMap<Secondary, u8> {
        &self.secondaries
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({})", self.name)
    }
}
