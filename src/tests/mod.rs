pub mod tree_game;




#[cfg(feature = "chess")]
pub mod chess_scenarios;


#[cfg(feature = "serde")]
pub mod serialization;
