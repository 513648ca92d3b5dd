//! `index`：26 个首字母分区的音节索引。
//!
//! 约定：
//! - 码表文件按首字母分区，分区起点为 `LetterBucket::base_offset`
//! - 音节在分区内的字节偏移为 `SyllableEntry::offset`，每字 `RECORD_WIDTH` 字节
//! - 单字母音节（`a`、`e`、`m`、`n`、`o`）只能出现在分区第 0 位
use tracing::debug;
use zh_core::{
    error::{DecodeError, Result},
    input,
    model::RECORD_WIDTH,
};

use crate::{
    hash::HashAccelerator,
    table::{CODE_TABLE, RawBucket},
};

/// 最长音节的字母数（`zhuang`）
pub const MAX_SYLLABLE_LEN: usize = 6;

const TABLE_ASSET: &str = "asset/code_table.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyllableEntry {
    pub syllable: &'static str,
    /// 该音节下的字数
    pub count: u16,
    /// 分区内字节偏移
    pub offset: u32,
}

impl SyllableEntry {
    pub fn byte_len(&self) -> u64 {
        u64::from(self.count) * RECORD_WIDTH as u64
    }
}

#[derive(Debug, Clone)]
pub struct LetterBucket {
    initial: u8,
    base_offset: u32,
    entries: Vec<SyllableEntry>,
}

impl LetterBucket {
    pub fn initial(&self) -> u8 {
        self.initial
    }

    pub fn base_offset(&self) -> u32 {
        self.base_offset
    }

    pub fn entries(&self) -> &[SyllableEntry] {
        &self.entries
    }

    pub fn get(&self, slot: usize) -> Option<&SyllableEntry> {
        self.entries.get(slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 分区第 0 位是否为单字母音节。
    pub fn has_single_letter(&self) -> bool {
        self.entries.first().is_some_and(|e| e.syllable.len() == 1)
    }

    /// 音节在码表文件中的绝对字节位置。
    pub fn position(&self, entry: &SyllableEntry) -> u64 {
        u64::from(self.base_offset) + u64::from(entry.offset)
    }
}

/// 一次查询的命中：精确音节（如有）与同前缀音节（按优先顺序）。
#[derive(Debug, Clone)]
pub struct MatchSet<'a> {
    pub bucket: &'a LetterBucket,
    pub exact: Option<&'a SyllableEntry>,
    pub vague: Vec<&'a SyllableEntry>,
}

impl MatchSet<'_> {
    pub fn is_empty(&self) -> bool {
        self.exact.is_none() && self.vague.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SyllableIndex {
    buckets: Vec<LetterBucket>,
}

impl SyllableIndex {
    /// 编译进二进制的码表索引。
    pub fn builtin() -> Result<Self> {
        Self::from_raw(&CODE_TABLE)
    }

    pub(crate) fn from_raw(raw: &[RawBucket]) -> Result<Self> {
        if raw.len() != 26 {
            return Err(DecodeError::malformed(
                TABLE_ASSET,
                format!("需要 26 个首字母分区，实际 {}", raw.len()),
            ));
        }

        let mut buckets = Vec::with_capacity(26);
        for (initial, bucket) in (b'a'..=b'z').zip(raw) {
            let mut entries: Vec<SyllableEntry> = Vec::with_capacity(bucket.syllables.len());
            for (slot, &(syllable, count, offset)) in bucket.syllables.iter().enumerate() {
                let fault = |reason: &str| {
                    DecodeError::malformed(TABLE_ASSET, format!("音节 {syllable:?}：{reason}"))
                };
                if syllable.is_empty()
                    || syllable.len() > MAX_SYLLABLE_LEN
                    || !syllable.bytes().all(|b| b.is_ascii_lowercase())
                {
                    return Err(fault("必须是 1-6 个小写字母"));
                }
                if syllable.as_bytes()[0] != initial {
                    return Err(fault("首字母与分区不符"));
                }
                if syllable.len() == 1 && slot != 0 {
                    return Err(fault("单字母音节必须位于分区第 0 位"));
                }
                if count == 0 {
                    return Err(fault("字数为 0"));
                }
                if entries.iter().any(|e| e.syllable == syllable) {
                    return Err(fault("重复"));
                }
                entries.push(SyllableEntry {
                    syllable,
                    count,
                    offset,
                });
            }
            buckets.push(LetterBucket {
                initial,
                base_offset: bucket.char_start,
                entries,
            });
        }

        let index = Self { buckets };
        debug!(
            syllables = index.syllable_count(),
            glyphs = index.glyph_count(),
            extent = index.extent(),
            "syllable index built"
        );
        Ok(index)
    }

    /// `initial` 必须是 `a-z`。
    pub fn bucket(&self, initial: u8) -> &LetterBucket {
        &self.buckets[input::letter_index(initial)]
    }

    pub fn buckets(&self) -> &[LetterBucket] {
        &self.buckets
    }

    pub fn lookup(&self, syllable: &str) -> Option<&SyllableEntry> {
        let initial = *syllable.as_bytes().first()?;
        if !initial.is_ascii_lowercase() {
            return None;
        }
        self.bucket(initial)
            .entries
            .iter()
            .find(|e| e.syllable == syllable)
    }

    pub fn syllable_count(&self) -> usize {
        self.buckets.iter().map(LetterBucket::len).sum()
    }

    pub fn glyph_count(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|b| &b.entries)
            .map(|e| usize::from(e.count))
            .sum()
    }

    /// 码表文件至少需要的字节数（最后一条记录的结束位置）。
    pub fn extent(&self) -> u64 {
        self.buckets
            .iter()
            .flat_map(|b| b.entries.iter().map(move |e| b.position(e) + e.byte_len()))
            .max()
            .unwrap_or(0)
    }

    /// 查找 `prefix` 的精确音节与至多 `vague_cap` 个同前缀音节。
    ///
    /// - 无加速表：按码表顺序线性扫描
    /// - 有加速表：单字母输入直接取整个分区；多字母输入先用位图排除，再按优先顺序扫描候选
    pub fn find<'a>(
        &'a self,
        prefix: &str,
        vague_cap: usize,
        hash: Option<&'a HashAccelerator>,
    ) -> Result<MatchSet<'a>> {
        let bytes = input::validate(prefix)?;
        let bucket = self.bucket(bytes[0]);
        let mut set = MatchSet {
            bucket,
            exact: None,
            vague: Vec::new(),
        };
        if bucket.is_empty() {
            return Ok(set);
        }

        match hash {
            None => {
                for entry in &bucket.entries {
                    if entry.syllable == prefix {
                        set.exact = Some(entry);
                    } else if set.vague.len() < vague_cap && entry.syllable.starts_with(prefix) {
                        set.vague.push(entry);
                    }
                }
            }
            Some(_) if bytes.len() == 1 => {
                let skip = usize::from(bucket.has_single_letter());
                if skip == 1 {
                    set.exact = bucket.entries.first();
                }
                set.vague.extend(bucket.entries[skip..].iter().take(vague_cap));
            }
            Some(hash) => {
                if !hash.contains_prefix(bytes[0], bytes[1]) {
                    return Ok(set);
                }
                for &slot in hash.candidates(bytes[0], bytes[1]) {
                    let Some(entry) = bucket.get(usize::from(slot)) else {
                        continue;
                    };
                    if entry.syllable == prefix {
                        set.exact = Some(entry);
                    } else if set.vague.len() < vague_cap && entry.syllable.starts_with(prefix) {
                        set.vague.push(entry);
                    }
                }
            }
        }
        Ok(set)
    }
}
