//! `model`：查询结果的数据结构。
//!
//! 码表中的每个字固定占 `RECORD_WIDTH` 字节（UTF-8 汉字），同一音节内
//! 越常用的字越靠后，因此结果缓冲区里“最后一个字”是最优候选。
use std::borrow::Cow;

/// 码表中每个字的字节宽度
pub const RECORD_WIDTH: usize = 3;

/// 单字结果：按码表顺序存放的定宽记录（最优候选在末尾）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Logograms {
    bytes: Vec<u8>,
}

impl Logograms {
    pub fn from_records(bytes: Vec<u8>) -> Self {
        debug_assert_eq!(bytes.len() % RECORD_WIDTH, 0);
        Self { bytes }
    }

    /// 字数
    pub fn len(&self) -> usize {
        self.bytes.len() / RECORD_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn record(&self, index: usize) -> Option<&[u8]> {
        self.bytes.chunks_exact(RECORD_WIDTH).nth(index)
    }

    /// 按存放顺序遍历（最优候选在最后）。
    pub fn records(&self) -> std::slice::ChunksExact<'_, u8> {
        self.bytes.chunks_exact(RECORD_WIDTH)
    }

    /// 按候选顺序遍历（最优候选在最前）。
    pub fn ranked(&self) -> std::iter::Rev<std::slice::ChunksExact<'_, u8>> {
        self.records().rev()
    }

    /// 拆成（最优的 `head` 个字，其余字），两部分都保持存放顺序。
    pub fn split_head(mut self, head: usize) -> (Logograms, Logograms) {
        let keep = self.len().saturating_sub(head) * RECORD_WIDTH;
        let head = self.bytes.split_off(keep);
        (Logograms { bytes: head }, self)
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// 多字词结果：`lengths[i]` 是第 i 个词的字数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    lengths: Vec<u8>,
    text: String,
}

impl WordList {
    /// 追加一个词；已存在的词不重复追加，返回是否追加。
    pub fn push(&mut self, word: &str) -> bool {
        let glyphs = word.chars().count();
        if glyphs == 0 || glyphs > usize::from(u8::MAX) || self.contains(word) {
            return false;
        }
        self.lengths.push(glyphs as u8);
        self.text.push_str(word);
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.iter().any(|w| w == word)
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let mut rest = self.text.as_str();
        self.lengths.iter().map(move |&n| {
            let end = rest
                .char_indices()
                .nth(usize::from(n))
                .map_or(rest.len(), |(i, _)| i);
            let (word, tail) = rest.split_at(end);
            rest = tail;
            word
        })
    }
}

/// 组词输出中的一块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordBlock {
    /// 单字候选
    Codes(Logograms),
    /// 多字词候选
    Words(WordList),
}

impl WordBlock {
    /// 块内候选数
    pub fn len(&self) -> usize {
        match self {
            Self::Codes(codes) => codes.len(),
            Self::Words(words) => words.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 组词输出：按展示顺序排列的块。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordChain {
    blocks: Vec<WordBlock>,
}

impl WordChain {
    /// 追加一块；空块忽略。
    pub fn push(&mut self, block: WordBlock) {
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    pub fn blocks(&self) -> &[WordBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// 所有块的候选总数
    pub fn candidate_count(&self) -> usize {
        self.blocks.iter().map(WordBlock::len).sum()
    }

    /// 按展示顺序展开全部候选（单字块按候选顺序）。
    pub fn candidates(&self) -> Vec<Cow<'_, str>> {
        let mut out = Vec::with_capacity(self.candidate_count());
        for block in &self.blocks {
            match block {
                WordBlock::Codes(codes) => {
                    out.extend(codes.ranked().map(String::from_utf8_lossy));
                }
                WordBlock::Words(words) => out.extend(words.iter().map(Cow::Borrowed)),
            }
        }
        out
    }

    pub fn into_blocks(self) -> Vec<WordBlock> {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyphs(s: &str) -> Logograms {
        Logograms::from_records(s.as_bytes().to_vec())
    }

    #[test]
    fn ranked_order_puts_the_last_record_first() {
        let codes = glyphs("甲乙丙");
        assert_eq!(codes.len(), 3);
        let ranked: Vec<_> = codes.ranked().map(|r| std::str::from_utf8(r).unwrap()).collect();
        assert_eq!(ranked, ["丙", "乙", "甲"]);
        assert_eq!(codes.record(1), Some("乙".as_bytes()));
    }

    #[test]
    fn split_head_takes_the_best_records() {
        let (head, rest) = glyphs("甲乙丙丁").split_head(3);
        assert_eq!(head.to_text(), "乙丙丁");
        assert_eq!(rest.to_text(), "甲");

        let (head, rest) = glyphs("甲").split_head(3);
        assert_eq!(head.to_text(), "甲");
        assert!(rest.is_empty());
    }

    #[test]
    fn word_list_keeps_lengths_and_skips_duplicates() {
        let mut words = WordList::default();
        assert!(words.push("你好"));
        assert!(words.push("中华人民"));
        assert!(!words.push("你好"));
        assert!(!words.push(""));
        assert_eq!(words.lengths(), &[2, 4]);
        assert_eq!(words.iter().collect::<Vec<_>>(), ["你好", "中华人民"]);
    }

    #[test]
    fn chain_skips_empty_blocks_and_flattens_candidates() {
        let mut chain = WordChain::default();
        let mut words = WordList::default();
        words.push("你好");
        chain.push(WordBlock::Words(words));
        chain.push(WordBlock::Codes(Logograms::default()));
        chain.push(WordBlock::Codes(glyphs("泥你")));
        assert_eq!(chain.blocks().len(), 2);
        assert_eq!(chain.candidate_count(), 3);
        assert_eq!(chain.candidates(), ["你好", "你", "泥"]);
    }
}
