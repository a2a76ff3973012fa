pub mod config;
pub mod extract;
pub mod fetch;
pub mod serve;
pub mod table;
