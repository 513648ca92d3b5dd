use std::sync::Arc;

use tracing::{debug, trace};
use zh_core::{
    config::SearchLimits,
    error::{DecodeError, Result},
    matcher::CodeMatcher,
    model::{Logograms, RECORD_WIDTH},
};
use zh_pinyin::{HashAccelerator, LetterBucket, SyllableEntry, SyllableIndex};

use crate::char_store::{CharStore, StoreReader};

/// 基于码表文件的单字查询。
pub struct StoreMatcher {
    index: Arc<SyllableIndex>,
    hash: Option<HashAccelerator>,
    store: CharStore,
    limits: SearchLimits,
}

/// `verify` 的结果。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub syllables: usize,
    pub glyphs: usize,
    /// 记录不是单个 3 字节 UTF-8 字符的音节
    pub invalid: Vec<&'static str>,
}

impl StoreMatcher {
    pub fn new(index: Arc<SyllableIndex>, store: CharStore) -> Self {
        Self {
            index,
            hash: None,
            store,
            limits: SearchLimits::default(),
        }
    }

    pub fn with_hash_boost(mut self, hash: HashAccelerator) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn index(&self) -> &SyllableIndex {
        &self.index
    }

    pub fn store(&self) -> &CharStore {
        &self.store
    }

    pub fn is_hash_boosted(&self) -> bool {
        self.hash.is_some()
    }

    /// 逐个音节读出全部字，检查每条记录都是一个完整的汉字。
    pub fn verify(&self) -> Result<VerifyReport> {
        let mut reader = self.store.reader()?;
        let mut report = VerifyReport::default();
        for bucket in self.index.buckets() {
            for entry in bucket.entries() {
                let mut fill = BackFill::with_capacity(usize::from(entry.count))?;
                fill.take(&mut reader, bucket, entry, 0, usize::from(entry.count))?;
                let codes = fill.finish();
                let valid = codes.records().all(|r| {
                    std::str::from_utf8(r).is_ok_and(|s| s.chars().count() == 1)
                });
                if !valid {
                    report.invalid.push(entry.syllable);
                }
                report.syllables += 1;
                report.glyphs += codes.len();
            }
        }
        debug!(
            syllables = report.syllables,
            glyphs = report.glyphs,
            invalid = report.invalid.len(),
            "code table verified"
        );
        Ok(report)
    }
}

impl CodeMatcher for StoreMatcher {
    fn match_exact(&self, syllable: &str, max_count: usize) -> Result<Logograms> {
        let set = self.index.find(syllable, 0, self.hash.as_ref())?;
        let Some(exact) = set.exact else {
            return Err(DecodeError::NotFound(syllable.to_owned()));
        };

        let mut reader = self.store.reader()?;
        let mut fill = BackFill::with_capacity(max_count.min(usize::from(exact.count)))?;
        fill.take(&mut reader, set.bucket, exact, 0, max_count)?;
        let codes = fill.finish();
        debug!(syllable, read = codes.len(), "exact match");
        Ok(codes)
    }

    fn match_fuzzy(&self, prefix: &str, capacity: usize) -> Result<Logograms> {
        let capacity = capacity.min(self.limits.max_fuzzy_results);
        let (types, depth) = if prefix.len() == 1 {
            (self.limits.single_types, self.limits.single_depth)
        } else {
            (self.limits.types, self.limits.depth)
        };
        let set = self.index.find(prefix, types, self.hash.as_ref())?;
        if set.is_empty() {
            return Err(DecodeError::NotFound(prefix.to_owned()));
        }

        let mut reader = self.store.reader()?;
        let mut fill = BackFill::with_capacity(capacity)?;
        let head = self.limits.head_depth;

        // 1) 精确音节最常用的 head 个字
        if let Some(exact) = set.exact {
            fill.take(&mut reader, set.bucket, exact, 0, head)?;
        }
        // 2) 同前缀音节，各取 depth 个
        for entry in &set.vague {
            if fill.remaining() == 0 {
                break;
            }
            fill.take(&mut reader, set.bucket, entry, 0, depth)?;
        }
        // 3) 精确音节其余的字
        if let Some(exact) = set.exact.filter(|e| usize::from(e.count) > head) {
            let rest = fill.remaining();
            fill.take(&mut reader, set.bucket, exact, head, rest)?;
        }

        let codes = fill.finish();
        debug!(
            prefix,
            exact = set.exact.is_some(),
            siblings = set.vague.len(),
            read = codes.len(),
            "fuzzy match"
        );
        Ok(codes)
    }
}

/// 从尾部向前填充的定容结果缓冲区，结束时把已填部分移到开头。
struct BackFill {
    buf: Vec<u8>,
    /// 开头尚未填充的字数
    free: usize,
}

impl BackFill {
    fn with_capacity(records: usize) -> Result<Self> {
        let requested = records
            .checked_mul(RECORD_WIDTH)
            .ok_or(DecodeError::AllocationFailed { requested: usize::MAX })?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(requested)
            .map_err(|_| DecodeError::AllocationFailed { requested })?;
        buf.resize(requested, 0);
        Ok(Self { buf, free: records })
    }

    fn remaining(&self) -> usize {
        self.free
    }

    /// 跳过音节末尾 `skip` 个字，再往前取至多 `want` 个字，写到空闲区末尾。
    fn take(
        &mut self,
        reader: &mut StoreReader<'_>,
        bucket: &LetterBucket,
        entry: &SyllableEntry,
        skip: usize,
        want: usize,
    ) -> Result<usize> {
        let available = usize::from(entry.count).saturating_sub(skip);
        let n = want.min(available).min(self.free);
        if n == 0 {
            return Ok(0);
        }
        let from = (available - n) * RECORD_WIDTH;
        let pos = bucket.position(entry) + from as u64;
        let end = self.free * RECORD_WIDTH;
        let start = end - n * RECORD_WIDTH;
        reader.read_at(pos, &mut self.buf[start..end])?;
        self.free -= n;
        trace!(syllable = entry.syllable, skip, read = n, "filled");
        Ok(n)
    }

    fn finish(mut self) -> Logograms {
        self.buf.drain(..self.free * RECORD_WIDTH);
        Logograms::from_records(self.buf)
    }
}
