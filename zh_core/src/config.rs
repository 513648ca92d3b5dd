//! `config`：码表/词库路径与各类搜索上限。
//!
//! 配置文件为 TOML，所有字段都有默认值，文件里只需写要覆盖的部分：
//!
//! ```toml
//! code_table = "bin/zh_pinyin.bin"
//! word_dict = "bin/zh_word_dict.json"
//!
//! [segment]
//! budget = 200
//! ```
use std::{fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{DecodeError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// 单字码表（二进制，每字 3 字节）
    pub code_table: PathBuf,
    /// 词库（JSON，按首字母排序）；为空时不做组词
    pub word_dict: Option<PathBuf>,
    /// 是否启用哈希加速表
    pub hash_boost: bool,
    pub search: SearchLimits,
    pub segment: SegmentLimits,
    pub resolve: ResolveLimits,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            code_table: PathBuf::from("bin").join("zh_pinyin.bin"),
            word_dict: None,
            hash_boost: true,
            search: SearchLimits::default(),
            segment: SegmentLimits::default(),
            resolve: ResolveLimits::default(),
        }
    }
}

impl DecoderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DecodeError::Config(e.to_string()))
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let s = fs::read_to_string(&path).map_err(|e| DecodeError::store(&path, e))?;
        Self::from_toml_str(&s)
    }
}

/// 单字模糊匹配的填充策略。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchLimits {
    /// 精确匹配时先取的最常用字数
    pub head_depth: usize,
    /// 单字母输入：最多取多少个同前缀音节、每个取几个字
    pub single_types: usize,
    pub single_depth: usize,
    /// 多字母输入：最多取多少个同前缀音节、每个取几个字
    pub types: usize,
    pub depth: usize,
    /// 一次模糊匹配最多返回的字数
    pub max_fuzzy_results: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            head_depth: 10,
            single_types: 25,
            single_depth: 1,
            types: 10,
            depth: 3,
            max_fuzzy_results: 130,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmentLimits {
    /// 失败分支计数达到该值时整个搜索终止
    pub budget: usize,
    /// 过滤后保留的切分方式数
    pub keep: usize,
}

impl Default for SegmentLimits {
    fn default() -> Self {
        Self { budget: 100, keep: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveLimits {
    /// 词库读取窗口（字节）；单条记录不能超过窗口
    pub window_size: usize,
    /// 一次组词最多读取多少次窗口
    pub max_windows: usize,
    /// 非全精确切分最多匹配多少条词条后退出
    pub vague_word_depth: u8,
    /// 一次组词最多收集的词数
    pub max_words: usize,
    /// 精确单音节结果超过该数目时拆成“首屏 + 其余”两块
    pub head_display: usize,
    /// 首音节单字候选的容量
    pub code_capacity: usize,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self {
            window_size: 1024,
            max_windows: 64,
            vague_word_depth: 4,
            max_words: 64,
            head_display: 10,
            code_capacity: 130,
        }
    }
}
