//! Move rule data for Pokemon Showdown agents.
//!
//! # Overview
//!
//! - [`MoveCatalog`] - read-only table of raw rule records, keyed by move id
//! - [`Move`] - normalized numeric parameters and secondary effects of one move
//! - [`Status`], [`Secondary`], [`Type`], [`Category`], [`MoveTarget`] - domain enums
//!
//! # Example Usage
//!
//! ```ignore
//! use pokeagent_moves::{MoveCatalog, Secondary};
//!
//! let catalog = MoveCatalog::load("data/moves.json")?;
//! let flamethrower = catalog.resolve("Flamethrower")?;
//!
//! assert_eq!(flamethrower.secondaries().get(&Secondary::Burn), Some(&10));
//! ```

pub mod catalog;
pub mod effects;
pub mod error;
pub mod model;
pub mod types;

pub use catalog::{MoveCatalog, RawRecord};
pub use effects::{Boost, SecondaryEffect};
pub use error::{DataLoadError, MoveError};
pub use model::{Move, to_move_id};
pub use types::{Category, MoveTarget, Secondary, Status, Type};
