pub mod cli;
pub mod config;
pub mod generate;
pub mod tree;
pub mod verify;
pub mod whitelist;
