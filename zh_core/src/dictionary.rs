use crate::error::Result;

/// 词库中的一条记录：空格分隔的音节序列及其候选词。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    /// 例如 `"ni hao"`
    pub key: String,
    pub words: Vec<String>,
}

impl WordRecord {
    pub fn new(key: impl Into<String>, words: Vec<String>) -> Self {
        Self {
            key: key.into(),
            words,
        }
    }

    pub fn syllables(&self) -> impl Iterator<Item = &str> {
        self.key.split(' ').filter(|s| !s.is_empty())
    }

    /// 记录的首字母
    pub fn initial(&self) -> Option<u8> {
        self.key.bytes().next()
    }
}

/// 按顺序逐条读取词库记录。
pub trait RecordStream {
    /// 读取下一条记录；词库读完（或达到读取上限）时返回 `None`。
    fn next_record(&mut self) -> Result<Option<WordRecord>>;

    /// 是否因读取上限提前结束。
    fn is_truncated(&self) -> bool;
}

/// 词库抽象：core 不关心词库来自文件/内存。
///
/// 约定：
/// - 记录按首字母升序排列，同一首字母的记录连续存放
/// - `records_from(initial)` 从该首字母的第一条记录开始；没有该首字母的记录时返回 `None`
/// - 每次调用返回独立的流（各自持有读缓冲），可在多个线程中同时使用
pub trait WordSource: Send + Sync {
    fn records_from(&self, initial: u8) -> Result<Option<Box<dyn RecordStream + '_>>>;
}

/// 未配置词库时：任何首字母都没有记录。
impl<T: WordSource> WordSource for Option<T> {
    fn records_from(&self, initial: u8) -> Result<Option<Box<dyn RecordStream + '_>>> {
        match self {
            Some(source) => source.records_from(initial),
            None => Ok(None),
        }
    }
}
