//! # Concrete Runners Module / 具体运行器模块
//!
//! Runner implementations bundled with the engine. The orchestrator itself
//! only ever talks to the [`crate::core::runner::TestRunner`] trait; how a
//! leaf package actually executes is decided entirely in here.
//!
//! 引擎内置的运行器实现。编排器自身只与
//! [`crate::core::runner::TestRunner`] trait 交互；
//! 叶子包实际如何执行完全在此处决定。

pub mod process;

pub use process::{ProcessRunner, ProcessRunnerFactory};
