pub mod config;
pub mod error;
pub mod menu;
pub mod order;
