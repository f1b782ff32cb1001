//! Secondary effect decoding.
//!
//! Rule data spells secondary effects several ways: stat boosts on the
//! target, a named status or volatile status, or boosts applied to the user
//! through a nested `self` record. Each sub-record is decoded into one
//! [`SecondaryEffect`] shape before being folded into a [`Move`](crate::Move).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::types::{Secondary, Status};

/// Chance used when a sub-record does not state one
pub const DEFAULT_CHANCE: u8 = 100;

/// Stat change carried by a secondary effect: (magnitude, chance percent)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boost {
    pub magnitude: i8,
    pub chance: u8,
}

impl Boost {
    pub fn new(magnitude: i8, chance: u8) -> Self {
        Self { magnitude, chance }
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0 && self.chance == 0
    }
}

/// One decoded secondary-effect sub-record
#[derive(Debug, Clone, PartialEq)]
pub enum SecondaryEffect {
    /// `{ chance, boosts: { stat: delta } }`
    TargetBoosts {
        boosts: Vec<(String, i8)>,
        chance: u8,
    },
    /// `{ chance, status }` or `{ chance, volatileStatus }`
    Condition { name: String, chance: u8 },
    /// `{ chance, self: { boosts: { stat: delta } } }`
    UserBoosts {
        boosts: Vec<(String, i8)>,
        chance: u8,
    },
    /// Anything else, kept for diagnostics
    Unrecognized(Map<String, Value>),
}

impl SecondaryEffect {
    pub fn decode(record: &Map<String, Value>) -> Self {
        let chance = record
            .get("chance")
            .and_then(Value::as_u64)
            .map_or(DEFAULT_CHANCE, |chance| chance.min(100) as u8);

        if let Some(Value::Object(boosts)) = record.get("boosts") {
            return Self::TargetBoosts {
                boosts: decode_boosts(boosts),
                chance,
            };
        }

        let condition = record
            .get("status")
            .and_then(Value::as_str)
            .or_else(|| record.get("volatileStatus").and_then(Value::as_str));
        if let Some(name) = condition {
            return Self::Condition {
                name: name.to_string(),
                chance,
            };
        }

        if let Some(Value::Object(user)) = record.get("self")
            && let Some(Value::Object(boosts)) = user.get("boosts")
        {
            return Self::UserBoosts {
                boosts: decode_boosts(boosts),
                chance,
            };
        }

        Self::Unrecognized(record.clone())
    }
}

fn decode_boosts(boosts: &Map<String, Value>) -> Vec<(String, i8)> {
    boosts
        .iter()
        .filter_map(|(stat, delta)| {
            let delta = delta.as_i64()?.clamp(i8::MIN as i64, i8::MAX as i64) as i8;
            Some((stat.clone(), delta))
        })
        .collect()
}

/// Fresh boost table with every tracked status at (0, 0)
pub fn empty_boosts() -> BTreeMap<Status, Boost> {
    Status::ALL.iter().map(|s| (*s, Boost::default())).collect()
}

/// Accumulates decoded effects for one move
#[derive(Debug)]
pub(crate) struct EffectTable {
    pub boosts: BTreeMap<Status, Boost>,
    pub auto_boosts: BTreeMap<Status, Boost>,
    pub secondaries: BTreeMap<Secondary, u8>,
}

impl EffectTable {
    pub fn new() -> Self {
        Self {
            boosts: empty_boosts(),
            auto_boosts: empty_boosts(),
            secondaries: BTreeMap::new(),
        }
    }

    /// Fold one sub-record into the table. Unknown shapes and keys are
    /// logged and skipped.
    pub fn add(&mut self, move_id: &str, record: &Value) {
        let Value::Object(record) = record else {
            if !matches!(record, Value::Null | Value::Bool(false)) {
                tracing::warn!(move_id, effect = %record, "Secondary effect is not an object");
            }
            return;
        };

        match SecondaryEffect::decode(record) {
            SecondaryEffect::TargetBoosts { boosts, chance } => {
                apply_boosts(&mut self.boosts, move_id, &boosts, chance);
            }
            SecondaryEffect::UserBoosts { boosts, chance } => {
                apply_boosts(&mut self.auto_boosts, move_id, &boosts, chance);
            }
            SecondaryEffect::Condition { name, chance } => match Secondary::from_protocol(&name) {
                Some(secondary) => {
                    self.secondaries.insert(secondary, chance);
                }
                None => tracing::warn!(move_id, condition = %name, "Unknown secondary"),
            },
            SecondaryEffect::Unrecognized(mut record) => {
                record.remove("chance");
                if !record.is_empty() {
                    let effect = Value::Object(record);
                    tracing::warn!(move_id, effect = %effect, "Unrecognized secondary effect");
                }
            }
        }
    }
}

fn apply_boosts(
    table: &mut BTreeMap<Status, Boost>,
    move_id: &str,
    boosts: &[(String, i8)],
    chance: u8,
) {
    for (stat, delta) in boosts {
        match Status::from_protocol(stat) {
            Some(status) => {
                table.insert(status, Boost::new(*delta, chance));
            }
            None => tracing::debug!(move_id, stat = %stat, "Dropping untracked boost"),
        }
    }
}
