pub mod not_found;
pub mod ping;
pub mod version;
