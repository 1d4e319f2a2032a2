//! Zones and the in-play board.

pub mod board;
pub mod zone;

pub use board::{Board, DEFAULT_BENCH_LIMIT};
pub use zone::Zone;
