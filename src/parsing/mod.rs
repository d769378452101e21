//*** START FILE: src/parsing/mod.rs ***//
pub mod csv_loader;

// Re-export the main parsing function for convenience
pub use csv_loader::parse_csv_to_corpus;
//*** END FILE: src/parsing/mod.rs ***//
