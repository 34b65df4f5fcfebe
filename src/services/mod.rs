pub mod ai;
pub mod analyzer;
pub mod export;
pub mod input;
pub mod session;
