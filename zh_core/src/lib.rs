//! `zh_core`：纯逻辑层，不做任何文件 I/O。
//!
//! 设计目标：
//! - **核心可复用**：码表/词库的来源通过 trait 注入，CLI 与测试共用一套逻辑
//! - **分层清晰**：matcher（单字） / segmenter（切分） -> filter -> resolver（组词） -> 输出（`WordChain`）
//! - **资源有界**：所有查询的内存与读取量都由 `config` 中的上限约束
pub mod config;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod filter;
pub mod input;
pub mod matcher;
pub mod model;
pub mod resolver;
pub mod segmenter;
pub mod split;

pub use engine::Engine;
pub use error::{DecodeError, Result};
