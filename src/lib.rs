pub mod config;
pub mod error;
pub mod net;
pub mod pinger;
pub mod processing;
pub mod srv;
