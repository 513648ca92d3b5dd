//! 文件数据源：单字码表（`zh_pinyin.bin`）与 JSON 词库。
pub mod char_store;
pub mod matcher;
pub mod word_store;

pub use char_store::CharStore;
pub use matcher::{StoreMatcher, VerifyReport};
pub use word_store::{RecordReader, WordStore, scan_offsets};
