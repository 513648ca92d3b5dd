//! `split`：切分方式及其有序列表。
//!
//! 约定：
//! - `SplitMethod.boundaries[i]` 是第 i 段在原串中的结束位置（不含）
//! - 第 i 段为完整音节时 `WeightMask` 对应位为 1，前面的段占高位
//! - `SplitMethodList` 始终按（段数升序，权重降序，边界字典序）排列
use std::cmp::Ordering;

/// 一次切分最多的段数
pub const MAX_SEGMENTS: usize = 4;

/// 每段是否为完整音节的位域，第 0 段占最高位。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeightMask(u8);

impl WeightMask {
    pub const EMPTY: Self = Self(0);

    fn bit(segment: usize) -> u8 {
        debug_assert!(segment < MAX_SEGMENTS);
        1 << (MAX_SEGMENTS - 1 - segment)
    }

    /// 设置/清除第 `segment` 段的精确位。
    #[must_use]
    pub fn with_exact(self, segment: usize, exact: bool) -> Self {
        if exact {
            Self(self.0 | Self::bit(segment))
        } else {
            Self(self.0 & !Self::bit(segment))
        }
    }

    pub fn is_exact(self, segment: usize) -> bool {
        self.0 & Self::bit(segment) != 0
    }

    /// 前 `len` 段是否全部为完整音节。
    pub fn is_fully_exact(self, len: usize) -> bool {
        (0..len.min(MAX_SEGMENTS)).all(|i| self.is_exact(i))
    }

    /// 原始位值，仅用于展示。
    pub fn bits(self) -> u8 {
        self.0
    }
}

/// 一种切分方式。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMethod {
    ends: [u8; MAX_SEGMENTS],
    len: u8,
    weight: WeightMask,
    occurrences: u8,
}

impl SplitMethod {
    pub fn new(boundaries: &[u8], weight: WeightMask) -> Self {
        assert!(boundaries.len() <= MAX_SEGMENTS, "too many segments");
        let mut ends = [0; MAX_SEGMENTS];
        ends[..boundaries.len()].copy_from_slice(boundaries);
        Self {
            ends,
            len: boundaries.len() as u8,
            weight,
            occurrences: 0,
        }
    }

    pub fn boundaries(&self) -> &[u8] {
        &self.ends[..usize::from(self.len)]
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn weight(&self) -> WeightMask {
        self.weight
    }

    /// 词库中命中的词条数
    pub fn occurrences(&self) -> u8 {
        self.occurrences
    }

    /// 记录一次词库命中，返回累计次数。
    pub fn record_occurrence(&mut self) -> u8 {
        self.occurrences = self.occurrences.saturating_add(1);
        self.occurrences
    }

    /// 第 `i` 段在 `run` 中的文本。
    pub fn segment<'a>(&self, run: &'a str, i: usize) -> Option<&'a str> {
        let end = usize::from(*self.boundaries().get(i)?);
        let start = if i == 0 { 0 } else { usize::from(self.ends[i - 1]) };
        run.get(start..end)
    }

    pub fn segments<'a>(&self, run: &'a str) -> impl Iterator<Item = &'a str> + use<'a> {
        let this = self.clone();
        (0..self.len()).filter_map(move |i| this.segment(run, i))
    }

    /// 展示用 preedit（例如 `"ni hao"`）。
    pub fn preedit(&self, run: &str) -> String {
        self.segments(run).collect::<Vec<_>>().join(" ")
    }

    /// 排名比较：段数少者优先，其次权重高者优先，最后按边界字典序。
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        self.len
            .cmp(&other.len)
            .then_with(|| other.weight.cmp(&self.weight))
            .then_with(|| self.boundaries().cmp(other.boundaries()))
    }
}

/// 按排名有序的切分列表。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitMethodList {
    items: Vec<SplitMethod>,
    truncated: bool,
}

impl SplitMethodList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按排名插入；边界与权重完全相同的条目已存在时忽略，返回 false。
    pub fn insert(&mut self, method: SplitMethod) -> bool {
        match self.items.binary_search_by(|m| m.rank_cmp(&method)) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, method);
                true
            }
        }
    }

    /// 删除与排名更靠前的条目边界相同（只差权重）的条目。
    pub fn dedup_boundaries(&mut self) {
        let mut seen: Vec<[u8; MAX_SEGMENTS + 1]> = Vec::with_capacity(self.items.len());
        self.items.retain(|m| {
            let mut key = [0; MAX_SEGMENTS + 1];
            key[0] = m.len;
            key[1..].copy_from_slice(&m.ends);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
    }

    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn remove(&mut self, index: usize) -> SplitMethod {
        self.items.remove(index)
    }

    pub fn first(&self) -> Option<&SplitMethod> {
        self.items.first()
    }

    pub fn get(&self, index: usize) -> Option<&SplitMethod> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SplitMethod> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 搜索是否因预算耗尽而提前结束（结果可能不完整）。
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    pub fn into_vec(self) -> Vec<SplitMethod> {
        self.items
    }
}

impl<'a> IntoIterator for &'a SplitMethodList {
    type Item = &'a SplitMethod;
    type IntoIter = std::slice::Iter<'a, SplitMethod>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
