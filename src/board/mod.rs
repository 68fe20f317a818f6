pub mod filter;
pub mod lists;
pub mod manager;

pub use filter::Filter;
pub use manager::{AppliedMove, BoardManager, Move, MoveOutcome, RollbackOutcome};

#[cfg(test)]
mod tests;
