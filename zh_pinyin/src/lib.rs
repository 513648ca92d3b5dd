//! 全拼（quanpin）相关：音节索引、模糊匹配加速表与切分。
//!
//! 码表索引与加速表在构建期由 `build.rs` 从 `asset/` 生成，运行时只做一次校验。
pub mod hash;
pub mod index;
pub mod segment;
mod table;

pub use hash::HashAccelerator;
pub use index::{LetterBucket, MatchSet, SyllableEntry, SyllableIndex};
pub use segment::PinyinSegmenter;
