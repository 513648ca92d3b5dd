#![allow(dead_code)]

use std::{fs, path::PathBuf, sync::Arc};

use tempfile::TempDir;
use zh_core::model::Logograms;
use zh_dict::{CharStore, StoreMatcher};
use zh_pinyin::{HashAccelerator, SyllableIndex};

pub const WORDS: &str = r#"{
  "ni hao": ["你好", "拟好"],
  "ni men": ["你们"],
  "nian ling": ["年龄"],
  "xi an": ["西安"],
  "xian zai": ["现在", "先在"],
  "zhong guo": ["中国"],
  "zhong wen": ["中文"]
}
"#;

/// 码表中每条记录都是一个不同的字：`U+4E00 + 记录在文件中的字节位置`。
pub fn glyph_at(pos: u64) -> char {
    char::from_u32(0x4E00 + pos as u32).unwrap()
}

/// 某音节的全部字（码表顺序，最常用的在最后）。
pub fn glyphs(index: &SyllableIndex, syllable: &str) -> Vec<char> {
    let bucket = index.bucket(syllable.as_bytes()[0]);
    let entry = index.lookup(syllable).unwrap();
    (0..u64::from(entry.count))
        .map(|i| glyph_at(bucket.position(entry) + i * 3))
        .collect()
}

pub fn text(chars: &[char]) -> String {
    chars.iter().collect()
}

pub fn chars(codes: &Logograms) -> Vec<char> {
    codes.to_text().chars().collect()
}

pub struct Fixture {
    pub dir: TempDir,
    pub index: Arc<SyllableIndex>,
    pub code_table: PathBuf,
    pub word_dict: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(SyllableIndex::builtin().unwrap());

        let mut table = vec![b'\n'; index.extent() as usize];
        for bucket in index.buckets() {
            for entry in bucket.entries() {
                for i in 0..u64::from(entry.count) {
                    let pos = bucket.position(entry) + i * 3;
                    glyph_at(pos).encode_utf8(&mut table[pos as usize..pos as usize + 3]);
                }
            }
        }
        let code_table = dir.path().join("zh_pinyin.bin");
        fs::write(&code_table, table).unwrap();

        let word_dict = dir.path().join("zh_word_dict.json");
        fs::write(&word_dict, WORDS).unwrap();

        Self {
            dir,
            index,
            code_table,
            word_dict,
        }
    }

    pub fn matcher(&self, hash_boost: bool) -> StoreMatcher {
        let store = CharStore::open(&self.code_table, &self.index).unwrap();
        let matcher = StoreMatcher::new(self.index.clone(), store);
        if hash_boost {
            matcher.with_hash_boost(HashAccelerator::builtin(&self.index).unwrap())
        } else {
            matcher
        }
    }

    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}
