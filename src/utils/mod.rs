//! 工具模块 - 日志与校验

pub mod logger;
pub mod validation;
