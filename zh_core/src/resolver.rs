//! `resolver`：把排好序的切分方式解析为候选块（单字 + 多字词）。
//!
//! 流程：
//! - 最优切分的第一段总是走 `CodeMatcher::match_fuzzy`，得到单字候选
//! - 最优切分只有一段时，它已经被单字候选完全覆盖，不再参与词库匹配
//! - 其余多段切分按首字母顺序扫描词库，命中的词汇总为一个 `Words` 块
//! - 整串是一个完整音节时单字在前，否则单字作为首音节的兜底放到最后
use tracing::{debug, trace, warn};

use crate::{
    config::ResolveLimits,
    dictionary::{WordRecord, WordSource},
    error::{DecodeError, Result},
    input,
    matcher::CodeMatcher,
    model::{RECORD_WIDTH, WordBlock, WordChain, WordList},
    split::{SplitMethod, SplitMethodList},
};

/// 首音节单字候选的性质。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leading {
    /// 整串恰好是一个完整音节
    Exact,
    /// 整串是一个音节的前缀
    Vague,
    /// 整串有多段，单字候选只覆盖第一段
    Partial,
}

/// 组词结果。
#[derive(Debug, Clone)]
pub struct Resolution {
    /// 最优切分
    pub best: SplitMethod,
    pub leading: Leading,
    pub chain: WordChain,
    /// 切分预算、词库窗口或词数上限是否提前耗尽
    pub truncated: bool,
}

/// 词库解析器（基于 `WordSource` 的流式扫描），首音节兜底走 `CodeMatcher`。
pub struct WordResolver<'a, M, W> {
    pub matcher: &'a M,
    pub words: &'a W,
    pub limits: &'a ResolveLimits,
}

impl<'a, M, W> WordResolver<'a, M, W>
where
    M: CodeMatcher,
    W: WordSource,
{
    pub fn resolve(&self, run: &str, mut splits: SplitMethodList) -> Result<Resolution> {
        let bytes = input::validate(run)?;
        let Some(best) = splits.first().cloned() else {
            return Err(DecodeError::NotFound(run.to_owned()));
        };
        let mut truncated = splits.is_truncated();

        // 0) 首音节单字
        let first = best.segment(run, 0).unwrap_or(run);
        let codes = match self.matcher.match_fuzzy(first, self.limits.code_capacity) {
            Ok(codes) => Some(codes),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        let leading = if best.len() == 1 {
            splits.remove(0);
            if best.weight().is_exact(0) {
                Leading::Exact
            } else {
                Leading::Vague
            }
        } else {
            Leading::Partial
        };

        // 1) 多段切分查词库
        let (words, scan_truncated) = self.scan(bytes[0], run, &splits)?;
        truncated |= scan_truncated;

        // 2) 组装输出
        let mut chain = WordChain::default();
        let mut fallback = None;
        match (leading, codes) {
            (Leading::Exact, Some(codes)) if codes.len() > self.limits.head_display => {
                let (head, overflow) = codes.split_head(self.limits.head_display);
                chain.push(WordBlock::Codes(head));
                chain.push(WordBlock::Codes(overflow));
            }
            (Leading::Exact, Some(codes)) => chain.push(WordBlock::Codes(codes)),
            (_, codes) => fallback = codes,
        }
        chain.push(WordBlock::Words(words));
        if let Some(codes) = fallback {
            chain.push(WordBlock::Codes(codes));
        }
        if chain.is_empty() {
            return Err(DecodeError::NotFound(run.to_owned()));
        }

        debug!(
            run,
            preedit = %best.preedit(run),
            ?leading,
            blocks = chain.blocks().len(),
            candidates = chain.candidate_count(),
            truncated,
            "resolved"
        );
        Ok(Resolution {
            best,
            leading,
            chain,
            truncated,
        })
    }

    /// 扫描首字母 `initial` 的词条，返回（命中的词，是否提前结束）。
    fn scan(&self, initial: u8, run: &str, splits: &SplitMethodList) -> Result<(WordList, bool)> {
        let mut words = WordList::default();
        let mut active: Vec<SplitMethod> = splits.iter().filter(|m| m.len() >= 2).cloned().collect();
        if active.is_empty() {
            return Ok((words, false));
        }
        let Some(mut stream) = self.words.records_from(initial)? else {
            return Ok((words, false));
        };

        let mut truncated = false;
        let mut records = 0usize;
        'scan: while !active.is_empty() {
            let Some(record) = stream.next_record()? else {
                truncated = stream.is_truncated();
                break;
            };
            records += 1;
            match record.initial() {
                Some(c) if c > initial => break,
                Some(c) if c == initial => {}
                _ => continue,
            }

            let syllables: Vec<&str> = record.syllables().collect();
            let mut i = 0;
            while i < active.len() {
                let split = &mut active[i];
                if !matches_split(run, split, &syllables) {
                    i += 1;
                    continue;
                }
                trace!(key = %record.key, preedit = %split.preedit(run), "record matched");
                for word in usable_words(&record, split.len()) {
                    if words.len() >= self.limits.max_words {
                        truncated = true;
                        break 'scan;
                    }
                    words.push(word);
                }
                let seen = split.record_occurrence();
                if split.weight().is_fully_exact(split.len()) || seen >= self.limits.vague_word_depth {
                    active.remove(i);
                } else {
                    i += 1;
                }
            }
        }

        if truncated {
            warn!(run, records, words = words.len(), "word scan stopped early");
        } else {
            debug!(run, records, words = words.len(), "word scan finished");
        }
        Ok((words, truncated))
    }
}

/// 记录的音节序列是否符合切分：精确段要求相等，非精确段允许词条音节更长。
fn matches_split(run: &str, split: &SplitMethod, syllables: &[&str]) -> bool {
    if syllables.len() != split.len() {
        return false;
    }
    split
        .segments(run)
        .zip(syllables)
        .enumerate()
        .all(|(i, (segment, syllable))| {
            if split.weight().is_exact(i) {
                *syllable == segment
            } else {
                syllable.starts_with(segment)
            }
        })
}

/// 字数与切分段数一致、且每个字都是定宽记录的词。
fn usable_words(record: &WordRecord, glyphs: usize) -> impl Iterator<Item = &str> {
    record
        .words
        .iter()
        .map(String::as_str)
        .filter(move |w| w.len() == glyphs * RECORD_WIDTH && w.chars().count() == glyphs)
}
