//! `segmenter`：把连续拼音串切分为音节段。

use crate::{error::Result, split::SplitMethodList};

/// Segmenter：枚举 `run` 的全部可行切分，按排名返回。
///
/// 约定：
/// - 没有任何可行切分时返回 `NotFound`
/// - 搜索预算耗尽时返回已找到的部分结果，并标记 `is_truncated`
pub trait Segmenter: Send + Sync {
    fn segment(&self, run: &str) -> Result<SplitMethodList>;
}
