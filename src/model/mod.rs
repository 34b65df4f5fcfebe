pub mod analysis;
pub mod choice;
pub mod notice;
pub mod table;
