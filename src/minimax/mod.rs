pub mod search;
pub mod transposition_table;
pub mod types;

pub use search::{MinimaxConfig, MinimaxSearch, MoveOrdering};
pub use types::*;
