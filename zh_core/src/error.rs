//! `error`：所有公开操作共用的错误类型。
//!
//! 约定：
//! - `NotFound` 表示“换一个输入再试”，其余错误表示资源/配置问题
//! - 搜索预算或窗口上限耗尽不是错误，由结果上的 `truncated` 标志报告
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// 输入不是 1-20 个小写字母
    #[error("输入无效 {input:?}：{reason}")]
    InvalidInput { input: String, reason: &'static str },

    /// 没有精确匹配，也没有模糊匹配
    #[error("没有匹配：{0:?}")]
    NotFound(String),

    /// 码表/词库文件无法打开或读取
    #[error("无法读取 {}：{source}", .path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 文件内容不符合格式约定（越界、记录不完整、首字母未排序等）
    #[error("文件格式错误 {}：{reason}", .path.display())]
    MalformedStore { path: PathBuf, reason: String },

    /// 结果缓冲区无法分配，或写入会超出容量
    #[error("缓冲区分配失败（{requested} 字节）")]
    AllocationFailed { requested: usize },

    #[error("配置错误：{0}")]
    Config(String),
}

impl DecodeError {
    pub fn store(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedStore {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
