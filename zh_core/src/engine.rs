use tracing::debug;

use crate::config::ResolveLimits;
use crate::dictionary::WordSource;
use crate::error::Result;
use crate::filter::{DedupTruncate, Filter};
use crate::matcher::CodeMatcher;
use crate::model::Logograms;
use crate::resolver::{Resolution, WordResolver};
use crate::segmenter::Segmenter;
use crate::split::SplitMethodList;

/// 引擎：把单字匹配、切分、filter 与组词串成一条流水线。
///
/// 结构：
/// - matcher（码表查单字） + segmenter（切分） -> filter（去重/截断） -> resolver（查词库/组装输出）
///
/// 引擎本身只持有只读数据，`&Engine` 可以在多个线程中同时使用。
pub struct Engine<M, S, W> {
    matcher: M,
    segmenter: S,
    words: W,
    /// 切分结果保留的条数
    keep: usize,
    limits: ResolveLimits,
}

impl<M, S, W> Engine<M, S, W>
where
    M: CodeMatcher,
    S: Segmenter,
    W: WordSource,
{
    pub fn new(matcher: M, segmenter: S, words: W) -> Self {
        Self {
            matcher,
            segmenter,
            words,
            keep: 3,
            limits: ResolveLimits::default(),
        }
    }

    /// 设置 filter 保留的切分条数；0 会按 1 处理。
    pub fn keep(mut self, n: usize) -> Self {
        self.keep = n.max(1);
        self
    }

    pub fn resolve_limits(mut self, limits: ResolveLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    pub fn limits(&self) -> &ResolveLimits {
        &self.limits
    }

    pub fn match_exact(&self, syllable: &str, max_count: usize) -> Result<Logograms> {
        self.matcher.match_exact(syllable, max_count)
    }

    pub fn match_fuzzy(&self, prefix: &str, capacity: usize) -> Result<Logograms> {
        self.matcher.match_fuzzy(prefix, capacity)
    }

    /// 完整切分列表（未经 filter）。
    pub fn segment(&self, run: &str) -> Result<SplitMethodList> {
        self.segmenter.segment(run)
    }

    pub fn filter(&self, splits: SplitMethodList) -> SplitMethodList {
        DedupTruncate { limit: self.keep }.apply(splits)
    }

    /// segment -> filter -> resolve。
    pub fn resolve(&self, run: &str) -> Result<Resolution> {
        let all = self.segment(run)?;
        let total = all.len();
        let splits = self.filter(all);
        debug!(run, total, kept = splits.len(), "splits filtered");

        let resolver = WordResolver {
            matcher: &self.matcher,
            words: &self.words,
            limits: &self.limits,
        };
        resolver.resolve(run, splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::RecordStream;
    use crate::error::DecodeError;
    use crate::resolver::Leading;
    use crate::split::{SplitMethod, WeightMask};

    /// "ab" 固定切成 [2] 与 [1,2]。
    struct TwoWay;

    impl Segmenter for TwoWay {
        fn segment(&self, run: &str) -> Result<SplitMethodList> {
            if run != "ab" {
                return Err(DecodeError::NotFound(run.to_owned()));
            }
            let mut list = SplitMethodList::new();
            list.insert(SplitMethod::new(&[2], WeightMask::EMPTY.with_exact(0, true)));
            list.insert(SplitMethod::new(&[2], WeightMask::EMPTY));
            list.insert(SplitMethod::new(&[1, 2], WeightMask::EMPTY));
            Ok(list)
        }
    }

    struct OneGlyph;

    impl CodeMatcher for OneGlyph {
        fn match_exact(&self, _: &str, _: usize) -> Result<Logograms> {
            Ok(Logograms::from_records("甲".as_bytes().to_vec()))
        }

        fn match_fuzzy(&self, prefix: &str, capacity: usize) -> Result<Logograms> {
            self.match_exact(prefix, capacity)
        }
    }

    struct NoWords;

    impl WordSource for NoWords {
        fn records_from(&self, _: u8) -> Result<Option<Box<dyn RecordStream + '_>>> {
            Ok(None)
        }
    }

    #[test]
    fn resolve_runs_the_filtered_splits() {
        let engine = Engine::new(OneGlyph, TwoWay, NoWords).keep(3);
        assert_eq!(engine.segment("ab").unwrap().len(), 3);
        assert_eq!(engine.filter(engine.segment("ab").unwrap()).len(), 2);

        let res = engine.resolve("ab").unwrap();
        assert_eq!(res.leading, Leading::Exact);
        assert_eq!(res.chain.candidates(), ["甲"]);
    }

    #[test]
    fn keep_zero_still_keeps_one() {
        let engine = Engine::new(OneGlyph, TwoWay, None::<NoWords>).keep(0);
        assert_eq!(engine.filter(engine.segment("ab").unwrap()).len(), 1);
    }

    #[test]
    fn segmentation_errors_pass_through() {
        let engine = Engine::new(OneGlyph, TwoWay, NoWords);
        assert!(engine.resolve("zz").unwrap_err().is_not_found());
    }
}
