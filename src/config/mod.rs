//! Configuration management for plugin-loader

pub mod config;
pub mod plugins;


// Re-export main types for convenience
pub use config::Config;
pub use plugins::PluginRoots;
