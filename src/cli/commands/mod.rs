//! CLI command modules

pub mod info;
pub mod init;
pub mod load;
pub mod plugins;
pub mod validate;
