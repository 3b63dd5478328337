pub mod history;
pub mod persistence;
