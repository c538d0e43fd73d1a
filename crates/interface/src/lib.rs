//! propinject Interface - 交互层
//!
//! 职责：
//! - CLI 命令行工具
//! - 输出格式 (pretty / json / minimal)

pub mod cli;


pub use cli::{CliConfig, CliError, OutputFormat, run_cli};
