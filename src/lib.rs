pub mod artifact;
pub mod config;
pub mod error;
pub mod fetch;
pub mod job;
pub mod locate;
pub mod table;
