pub mod memory;
pub mod postgrest;
pub mod store;
