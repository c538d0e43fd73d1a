//! propinject Runtime - 文件补丁执行
//!
//! 职责：
//! - 解析目标路径 (workspace + 相对路径)
//! - 读取文件、调用 LineInjector、原子写回
//! - 通过 BuildLog 输出构建日志
//!
//! 架构：
//! - patcher: File Patch Orchestrator
//! - build_log: 日志接收端 (console / tracing / memory)
//! - fs: 原子写入

pub mod build_log;
pub mod fs;
pub mod patcher;

pub use build_log::{BuildLog, ConsoleLog, ConsoleStream, LogLevel, LogLine, MemoryLog, TracingLog};
pub use fs::atomic_write;
pub use patcher::{FilePatcher, PatchError, PatchStatus, PatchSummary, apply_config};
