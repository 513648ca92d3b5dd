//! `filter`：切分结果后处理（去重/裁剪）。

use crate::split::SplitMethodList;

/// Filter：对切分列表做后处理，控制后续组词的开销。
pub trait Filter: Send + Sync {
    fn apply(&self, splits: SplitMethodList) -> SplitMethodList;
}

/// 默认 filter：边界相同者只保留排名最前的一条，截断到 limit。
///
/// 列表本身已按排名有序，因此 filter 是幂等的。
pub struct DedupTruncate {
    pub limit: usize,
}

impl Filter for DedupTruncate {
    fn apply(&self, mut splits: SplitMethodList) -> SplitMethodList {
        splits.dedup_boundaries();
        splits.truncate(self.limit.max(1));
        splits
    }
}
