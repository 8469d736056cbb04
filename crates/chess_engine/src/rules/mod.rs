//! Chess rules module - legality, move application and game status
//!
//! Wraps a [`Board`](crate::board::Board) and a side-to-move flag and turns
//! pseudo-legal generation into legal play by discarding any move that
//! would leave the mover's own king attacked.
//!
//! # Module Structure
//!
//! - `engine` - [`RulesEngine`] state and legal-move / check queries
//! - `moves` - Move validation and execution
//! - `state` - [`GameStatus`] and terminal transitions (resign, abandon)

mod engine;
mod moves;
mod state;


pub use engine::RulesEngine;
pub use state::GameStatus;
