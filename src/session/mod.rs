//*** START FILE: src/session/mod.rs ***//
pub mod board;
pub mod controller;
pub mod sampling;

pub use board::RankingBoard;
pub use controller::{
    ActiveSession, ControllerState, SessionController, StartOutcome, SubmitOutcome, DEFAULT_SAMPLE_SIZE,
};
//*** END FILE: src/session/mod.rs ***//
