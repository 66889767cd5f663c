pub mod config;
pub mod error;
pub mod files;
pub mod geometry;
pub mod interface;
pub mod memory;
pub mod roles;
pub mod state;
pub mod stats;
pub mod store;
pub mod structure;
pub mod targets;
pub mod tick;
pub mod view;
pub mod vm;
pub mod world;
