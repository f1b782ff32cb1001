//! Domain types shared by the catalog and the move model

mod pokemon_type;
mod status;
mod target;

pub use pokemon_type::Type;
pub use status::{Secondary, Status};
pub use target::{Category, MoveTarget};
