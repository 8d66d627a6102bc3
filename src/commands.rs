//! CLI command implementations / CLI 命令实现

pub mod explore;
pub mod init;
pub mod run;
