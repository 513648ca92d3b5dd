//! `segment`：全拼串切分（有界深度优先搜索）。
//!
//! - 每一层取剩余串的前 `MAX_SYLLABLE_LEN` 个字母，与首字母分区内的音节求公共前缀
//! - 公共前缀 ≥ 2 的音节各开一个分支；前缀等于整个音节时该段记为精确
//! - 没有任何 ≥ 2 的公共前缀时只吃掉一个字母，分区第 0 位是单字母音节时记为精确
//! - 超过 `MAX_SEGMENTS` 段或遇到空分区算一次失败，失败累计到预算时整个搜索终止
use std::sync::Arc;

use tracing::{debug, trace, warn};
use zh_core::{
    error::{DecodeError, Result},
    input,
    segmenter::Segmenter,
    split::{MAX_SEGMENTS, SplitMethod, SplitMethodList, WeightMask},
};

use crate::index::{MAX_SYLLABLE_LEN, SyllableIndex};

pub struct PinyinSegmenter {
    index: Arc<SyllableIndex>,
    budget: usize,
}

impl PinyinSegmenter {
    pub fn new(index: Arc<SyllableIndex>) -> Self {
        Self { index, budget: 100 }
    }

    /// 设置失败分支预算；0 按 1 处理。
    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = budget.max(1);
        self
    }
}

impl Segmenter for PinyinSegmenter {
    fn segment(&self, run: &str) -> Result<SplitMethodList> {
        let bytes = input::validate(run)?;
        let mut search = Search {
            index: &self.index,
            run: bytes,
            budget: self.budget,
            failures: 0,
            aborted: false,
            ends: [0; MAX_SEGMENTS],
            weight: WeightMask::EMPTY,
            out: SplitMethodList::new(),
        };
        search.descend(0, 0);

        let Search {
            failures,
            aborted,
            mut out,
            ..
        } = search;
        if aborted {
            out.mark_truncated();
            warn!(run, failures, found = out.len(), "segmentation budget exhausted");
        } else {
            debug!(run, failures, found = out.len(), "segmented");
        }
        if out.is_empty() {
            return Err(DecodeError::NotFound(run.to_owned()));
        }
        Ok(out)
    }
}

/// 单次切分的搜索状态（每次调用独占）。
struct Search<'a> {
    index: &'a SyllableIndex,
    run: &'a [u8],
    budget: usize,
    failures: usize,
    aborted: bool,
    ends: [u8; MAX_SEGMENTS],
    weight: WeightMask,
    out: SplitMethodList,
}

impl Search<'_> {
    fn fail(&mut self) {
        self.failures += 1;
        if self.failures >= self.budget {
            self.aborted = true;
        }
    }

    fn descend(&mut self, start: usize, depth: usize) {
        if self.aborted {
            return;
        }
        if start == self.run.len() {
            self.out.insert(SplitMethod::new(&self.ends[..depth], self.weight));
            return;
        }
        if depth == MAX_SEGMENTS {
            self.fail();
            return;
        }
        let bucket = self.index.bucket(self.run[start]);
        if bucket.is_empty() {
            self.fail();
            return;
        }

        let rest = &self.run[start..self.run.len().min(start + MAX_SYLLABLE_LEN)];
        // 同一 (长度, 精确) 的分支子树相同，只走一次
        let mut tried: Vec<(usize, bool)> = Vec::new();
        for entry in bucket.entries() {
            let syllable = entry.syllable.as_bytes();
            let common = syllable.iter().zip(rest).take_while(|(a, b)| a == b).count();
            if common < 2 {
                continue;
            }
            let branch = (common, common == syllable.len());
            if tried.contains(&branch) {
                continue;
            }
            tried.push(branch);
            trace!(start, depth, syllable = entry.syllable, common, "branch");
            self.step(start, depth, branch.0, branch.1);
            if self.aborted {
                return;
            }
        }
        if tried.is_empty() {
            self.step(start, depth, 1, bucket.has_single_letter());
        }
    }

    fn step(&mut self, start: usize, depth: usize, consumed: usize, exact: bool) {
        let saved = self.weight;
        self.ends[depth] = (start + consumed) as u8;
        self.weight = saved.with_exact(depth, exact);
        self.descend(start + consumed, depth + 1);
        self.weight = saved;
    }
}
