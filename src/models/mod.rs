pub mod engine;
pub mod replay;
pub mod score;
pub mod settings;
pub mod stats;
