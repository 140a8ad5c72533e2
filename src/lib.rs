pub mod config;
pub mod daemon;
pub mod dns;
pub mod updater;
