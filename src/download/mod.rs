//! 抓取流程模块入口。
//!
//! 子模块：
//! - `models`  — 数据模型（Progress / PersistOutcome / RunOutcome 等）
//! - `persist` — 校验、写入章节文件、推进进度
//! - `runner`  — 单次运行编排

pub mod models;
pub mod persist;
pub mod runner;
