pub mod account;
pub mod appointment;
pub mod directory;
pub mod error;
