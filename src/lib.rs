pub mod commands;
pub mod config;
pub mod confirm;
pub mod key;
pub mod parameters;
pub mod process;
pub mod provisioner;
