//! 词库：按首字母排序的 JSON 对象，每个成员是一条记录。
//!
//! ```json
//! {"a yi": ["阿姨"], "ni hao": ["你好", "拟好"], "ni men": ["你们"]}
//! ```
//!
//! 读取用定长窗口逐条切出记录：在窗口里找到字符串之外的第一个 `]`，
//! 切出的片段再交给 `serde_json` 解析，窗口内容本身不被修改。
use std::{
    fs::File,
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use tracing::{debug, trace};
use zh_core::{
    config::ResolveLimits,
    dictionary::{RecordStream, WordRecord, WordSource},
    error::{DecodeError, Result},
    input,
};

/// 从任意 `Read` 逐条读取词库记录。
pub struct RecordReader<R> {
    inner: R,
    path: PathBuf,
    window: Vec<u8>,
    /// 未消费区间 `window[start..end]`
    start: usize,
    end: usize,
    /// `window[start]` 在文件中的偏移
    offset: u64,
    windows: usize,
    max_windows: Option<usize>,
    eof: bool,
    done: bool,
    truncated: bool,
    last_initial: Option<u8>,
}

impl<R: Read> RecordReader<R> {
    /// `offset` 是 `inner` 当前位置在文件中的偏移；`max_windows` 为 `None` 时不限读取次数。
    pub fn new(
        inner: R,
        path: impl Into<PathBuf>,
        offset: u64,
        window_size: usize,
        max_windows: Option<usize>,
    ) -> Result<Self> {
        let window_size = window_size.max(1);
        let mut window = Vec::new();
        window
            .try_reserve_exact(window_size)
            .map_err(|_| DecodeError::AllocationFailed {
                requested: window_size,
            })?;
        window.resize(window_size, 0);
        Ok(Self {
            inner,
            path: path.into(),
            window,
            start: 0,
            end: 0,
            offset,
            windows: 0,
            max_windows,
            eof: false,
            done: false,
            truncated: false,
            last_initial: None,
        })
    }

    /// 读取下一条记录及其在文件中的偏移。
    pub fn next_entry(&mut self) -> Result<Option<(u64, WordRecord)>> {
        loop {
            if self.done {
                return Ok(None);
            }
            self.skip_separators();
            if self.start < self.end {
                if self.window[self.start] == b'}' {
                    self.done = true;
                    return Ok(None);
                }
                if let Some(len) = delimit(&self.window[self.start..self.end]) {
                    let at = self.offset;
                    let record = self.parse(at, self.start, len)?;
                    self.consume(len);
                    return Ok(Some((at, record)));
                }
            }
            if !self.refill()? {
                return Ok(None);
            }
        }
    }

    /// 是否因窗口读取次数达到上限而提前结束。
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    fn consume(&mut self, n: usize) {
        self.start += n;
        self.offset += n as u64;
    }

    fn skip_separators(&mut self) {
        let skipped = self.window[self.start..self.end]
            .iter()
            .take_while(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b',' | b'{'))
            .count();
        self.consume(skipped);
    }

    /// 把未消费部分移到窗口开头并读入新数据；没有更多数据时返回 false。
    fn refill(&mut self) -> Result<bool> {
        if self.eof {
            self.done = true;
            if self.start < self.end {
                return Err(DecodeError::malformed(
                    &self.path,
                    format!("偏移 {} 处的记录不完整", self.offset),
                ));
            }
            return Ok(false);
        }
        if self.start == 0 && self.end == self.window.len() {
            return Err(DecodeError::malformed(
                &self.path,
                format!("偏移 {} 处的记录超过读取窗口（{} 字节）", self.offset, self.window.len()),
            ));
        }
        if self.max_windows.is_some_and(|max| self.windows >= max) {
            self.done = true;
            self.truncated = true;
            debug!(path = %self.path.display(), windows = self.windows, "window budget exhausted");
            return Ok(false);
        }

        self.window.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        let n = loop {
            match self.inner.read(&mut self.window[self.end..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::store(&self.path, e)),
            }
        };
        self.windows += 1;
        self.end += n;
        if n == 0 {
            self.eof = true;
        }
        trace!(read = n, buffered = self.end, windows = self.windows, "window refilled");
        Ok(true)
    }

    fn parse(&mut self, at: u64, start: usize, len: usize) -> Result<WordRecord> {
        let bytes = &self.window[start..start + len];
        let fault = |reason: String| DecodeError::malformed(&self.path, format!("偏移 {at} 处：{reason}"));

        let mut keys = serde_json::Deserializer::from_slice(bytes).into_iter::<String>();
        let key = match keys.next() {
            Some(Ok(key)) => key,
            Some(Err(e)) => return Err(fault(e.to_string())),
            None => return Err(fault("缺少音节".to_owned())),
        };
        let rest = bytes[keys.byte_offset()..].trim_ascii_start();
        let Some(value) = rest.strip_prefix(b":") else {
            return Err(fault("音节后缺少 `:`".to_owned()));
        };
        let words: Vec<String> = serde_json::from_slice(value).map_err(|e| fault(e.to_string()))?;

        let record = WordRecord::new(key, words);
        let Some(initial) = record.initial().filter(u8::is_ascii_lowercase) else {
            return Err(fault(format!("音节 {:?} 不以 a-z 开头", record.key)));
        };
        if self.last_initial.is_some_and(|last| initial < last) {
            return Err(fault(format!("音节 {:?} 的首字母未按顺序排列", record.key)));
        }
        self.last_initial = Some(initial);
        Ok(record)
    }
}

impl<R: Read> RecordStream for RecordReader<R> {
    fn next_record(&mut self) -> Result<Option<WordRecord>> {
        Ok(self.next_entry()?.map(|(_, record)| record))
    }

    fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// 一条完整记录的长度（到字符串之外的第一个 `]` 为止）；窗口内不完整时返回 `None`。
fn delimit(bytes: &[u8]) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match b {
                b'"' => in_string = true,
                b']' => return Some(i + 1),
                _ => {}
            }
        }
    }
    None
}

/// 扫描整个词库，记录每个首字母第一条记录的偏移，同时检查首字母顺序。
pub fn scan_offsets<R: Read>(
    reader: R,
    path: impl Into<PathBuf>,
    window_size: usize,
) -> Result<[Option<u64>; 26]> {
    let mut records = RecordReader::new(reader, path, 0, window_size, None)?;
    let mut offsets = [None; 26];
    let mut count = 0usize;
    while let Some((at, record)) = records.next_entry()? {
        if let Some(initial) = record.initial() {
            offsets[input::letter_index(initial)].get_or_insert(at);
        }
        count += 1;
    }
    debug!(records = count, letters = offsets.iter().flatten().count(), "word store scanned");
    Ok(offsets)
}

/// 文件词库：打开时扫描一次首字母偏移，之后每次查询独立打开文件。
#[derive(Debug, Clone)]
pub struct WordStore {
    path: PathBuf,
    offsets: [Option<u64>; 26],
    window_size: usize,
    max_windows: usize,
}

impl WordStore {
    pub fn open(path: impl Into<PathBuf>, limits: &ResolveLimits) -> Result<Self> {
        let path = path.into();
        let file = File::open(&path).map_err(|e| DecodeError::store(&path, e))?;
        let offsets = scan_offsets(file, &path, limits.window_size)?;
        Ok(Self::with_offsets(path, offsets, limits))
    }

    /// 使用已知的首字母偏移，不扫描文件。
    pub fn with_offsets(path: impl Into<PathBuf>, offsets: [Option<u64>; 26], limits: &ResolveLimits) -> Self {
        Self {
            path: path.into(),
            offsets,
            window_size: limits.window_size,
            max_windows: limits.max_windows,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offsets(&self) -> &[Option<u64>; 26] {
        &self.offsets
    }
}

impl WordSource for WordStore {
    fn records_from(&self, initial: u8) -> Result<Option<Box<dyn RecordStream + '_>>> {
        if !initial.is_ascii_lowercase() {
            return Ok(None);
        }
        let Some(offset) = self.offsets[input::letter_index(initial)] else {
            return Ok(None);
        };
        let mut file = File::open(&self.path).map_err(|e| DecodeError::store(&self.path, e))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| DecodeError::store(&self.path, e))?;
        let reader = RecordReader::new(file, &self.path, offset, self.window_size, Some(self.max_windows))?;
        Ok(Some(Box::new(reader)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const SAMPLE: &str = r#"{
  "a yi": ["阿姨"],
  "ni hao": ["你好", "拟好"],
  "ni men": ["你们"],
  "xi an": ["西安"]
}
"#;

    fn reader(src: &str, window: usize, max_windows: Option<usize>) -> RecordReader<Cursor<Vec<u8>>> {
        RecordReader::new(Cursor::new(src.as_bytes().to_vec()), "words.json", 0, window, max_windows).unwrap()
    }

    fn keys(mut r: RecordReader<Cursor<Vec<u8>>>) -> Result<Vec<String>> {
        let mut out = Vec::new();
        while let Some(record) = r.next_record()? {
            out.push(record.key);
        }
        Ok(out)
    }

    #[test]
    fn delimit_ignores_brackets_inside_strings() {
        assert_eq!(delimit(br#""a": ["]"]"#), Some(10));
        assert_eq!(delimit(br#""a": ["\"]"]"#), Some(12));
        assert_eq!(delimit(br#""a": ["x""#), None);
        assert_eq!(delimit(b""), None);
    }

    #[test]
    fn reads_every_record_with_small_windows() {
        for window in [40, 64, 1024] {
            let got = keys(reader(SAMPLE, window, None)).unwrap();
            assert_eq!(got, ["a yi", "ni hao", "ni men", "xi an"], "window {window}");
        }
    }

    #[test]
    fn entries_carry_their_file_offsets() {
        let mut r = reader(SAMPLE, 64, None);
        while let Some((at, record)) = r.next_entry().unwrap() {
            let at = at as usize;
            assert!(SAMPLE[at..].starts_with(&format!("{:?}", record.key)), "{}", record.key);
        }
        assert!(!r.is_truncated());
    }

    #[test]
    fn record_larger_than_the_window_is_malformed() {
        let err = keys(reader(SAMPLE, 16, None)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedStore { .. }));
    }

    #[test]
    fn window_budget_truncates_without_error() {
        let mut r = reader(SAMPLE, 40, Some(1));
        let mut read = 0;
        while r.next_record().unwrap().is_some() {
            read += 1;
        }
        assert!(r.is_truncated());
        assert!(read < 4);
    }

    #[test]
    fn out_of_order_initials_are_malformed() {
        let src = r#"{"ni hao": ["你好"], "a yi": ["阿姨"]}"#;
        let err = keys(reader(src, 64, None)).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedStore { .. }));
    }

    #[test]
    fn broken_records_are_malformed() {
        for src in [
            r#"{"ni hao" ["你好"]}"#,
            r#"{"ni hao": "你好"]}"#,
            r#"{"Ni hao": ["你好"]}"#,
            r#"{"ni hao": ["你好""#,
        ] {
            let err = keys(reader(src, 64, None)).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedStore { .. }), "{src}");
        }
    }

    #[test]
    fn scan_finds_the_first_record_of_each_letter() {
        let offsets = scan_offsets(Cursor::new(SAMPLE.as_bytes()), "words.json", 64).unwrap();
        let letters: Vec<char> = (b'a'..=b'z')
            .zip(offsets)
            .filter_map(|(c, at)| at.map(|_| char::from(c)))
            .collect();
        assert_eq!(letters, ['a', 'n', 'x']);
        let n = offsets[input::letter_index(b'n')].unwrap() as usize;
        assert!(SAMPLE[n..].starts_with(r#""ni hao""#));
    }

    #[test]
    fn empty_object_has_no_records() {
        assert!(keys(reader("{}", 8, None)).unwrap().is_empty());
        assert!(keys(reader("", 8, None)).unwrap().is_empty());
    }
}
