//! propinject Core - 核心数据模型
//!
//! 包含：
//! - Directive: 单条注入指令 (`key=value` / `key:value`)
//! - LineInjector: 行匹配与替换
//! - InjectConfig: 任务配置

mod config;
mod directive;
mod error;
mod injector;

pub use config::*;
pub use directive::*;
pub use error::*;
pub use injector::*;
