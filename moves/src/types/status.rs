//! Status conditions a move can inflict as a secondary effect

/// Non-volatile status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    BadPoison, // Toxic
    Poison,
    Sleep,
    Paralysis,
    Burn,
    Freeze,
}

impl Status {
    /// Every non-volatile status, in the order boost tables are keyed
    pub const ALL: [Status; 6] = [
        Status::BadPoison,
        Status::Poison,
        Status::Sleep,
        Status::Paralysis,
        Status::Burn,
        Status::Freeze,
    ];

    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadPoison),
            "slp" => Some(Status::Sleep),
            _ => None,
        }
    }

    /// Convert to protocol format
    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadPoison => "tox",
            Status::Sleep => "slp",
        }
    }

    /// Get display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Burn => "Burn",
            Status::Freeze => "Freeze",
            Status::Paralysis => "Paralysis",
            Status::Poison => "Poison",
            Status::BadPoison => "Toxic",
            Status::Sleep => "Sleep",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conditions tracked as chance-based secondary effects of a move.
///
/// This is a closed set: badly poisoned is deliberately absent, moves that
/// inflict it do so as a primary effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Secondary {
    Paralysis,
    Burn,
    Freeze,
    Poison,
    Sleep,
    Flinch,
    Confusion,
}

impl Secondary {
    /// Parse a `status` or `volatileStatus` value from rule data
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s {
            "par" => Some(Secondary::Paralysis),
            "brn" => Some(Secondary::Burn),
            "frz" => Some(Secondary::Freeze),
            "psn" => Some(Secondary::Poison),
            "slp" => Some(Secondary::Sleep),
            "flinch" => Some(Secondary::Flinch),
            "confusion" => Some(Secondary::Confusion),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Secondary::Paralysis => "par",
            Secondary::Burn => "brn",
            Secondary::Freeze => "frz",
            Secondary::Poison => "psn",
            Secondary::Sleep => "slp",
            Secondary::Flinch => "flinch",
            Secondary::Confusion => "confusion",
        }
    }

    /// The non-volatile status behind this effect, if it is one
    pub fn status(&self) -> Option<Status> {
        Status::from_protocol(self.to_protocol())
    }
}

impl std::fmt::Display for Secondary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_protocol())
    }
}
