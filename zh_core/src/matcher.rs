use crate::{error::Result, model::Logograms};

/// 单字码表查询：core 不关心码表来自文件还是内存。
///
/// 约定：
/// - 输入必须是 1-20 个小写字母，否则返回 `InvalidInput`
/// - 结果按码表顺序存放，最优候选在末尾（见 `Logograms::ranked`）
pub trait CodeMatcher: Send + Sync {
    /// 精确匹配 `syllable`，最多返回 `max_count` 个最常用字。
    fn match_exact(&self, syllable: &str, max_count: usize) -> Result<Logograms>;

    /// 模糊匹配：先取精确音节的常用字，再取同前缀音节，最后补齐精确音节的其余字。
    /// - `capacity`: 返回字数上限（实现可自行 clamp）
    fn match_fuzzy(&self, prefix: &str, capacity: usize) -> Result<Logograms>;
}
