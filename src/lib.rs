//*** START FILE: src/lib.rs ***//

// Declare all modules that are part of this library
pub mod config;
pub mod error;
pub mod types {
    pub mod corpus;
    pub mod session;
}
pub mod parsing;
pub mod store;
pub mod pool;
pub mod annotation_log;
pub mod session;
pub mod access;
pub mod events;
pub mod export;
pub mod annotator;

pub use annotator::{Annotator, ProgressStats};
pub use config::Config;
pub use error::{Error, Result};
//*** END FILE: src/lib.rs ***//
