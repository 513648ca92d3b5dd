use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zh_core::{
    config::DecoderConfig,
    engine::Engine,
    model::{Logograms, WordBlock},
};
use zh_dict::{CharStore, StoreMatcher, WordStore};
use zh_pinyin::{HashAccelerator, PinyinSegmenter, SyllableIndex};

/// 离线拼音解码：单字查询、切分与组词。
#[derive(Parser, Debug)]
#[command(name = "zh_cli", version)]
struct Cli {
    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 单字码表（覆盖配置）
    #[arg(long)]
    code_table: Option<PathBuf>,

    /// 词库（覆盖配置）
    #[arg(long)]
    word_dict: Option<PathBuf>,

    /// 不使用哈希加速表
    #[arg(long)]
    no_hash_boost: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 精确匹配一个音节
    Exact {
        syllable: String,
        /// 最多返回的字数
        #[arg(short = 'n', long, default_value_t = 10)]
        max: usize,
    },
    /// 模糊匹配一个音节前缀
    Fuzzy {
        prefix: String,
        /// 结果容量
        #[arg(short = 'n', long, default_value_t = 130)]
        capacity: usize,
    },
    /// 列出切分方式
    Split {
        run: String,
        /// 不经过 filter，列出全部切分
        #[arg(long)]
        all: bool,
    },
    /// 切分并查词库
    Resolve { run: String },
    /// 检查码表中每个音节都能读出
    Verify,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let engine = build_engine(&config)?;
    let mut out = io::stdout().lock();

    match &cli.command {
        Command::Exact { syllable, max } => {
            let codes = engine.match_exact(syllable, *max)?;
            print_codes(&mut out, &codes)?;
        }
        Command::Fuzzy { prefix, capacity } => {
            let codes = engine.match_fuzzy(prefix, *capacity)?;
            print_codes(&mut out, &codes)?;
        }
        Command::Split { run, all } => {
            let splits = engine.segment(run)?;
            let truncated = splits.is_truncated();
            let splits = if *all { splits } else { engine.filter(splits) };
            for (i, m) in splits.iter().enumerate() {
                writeln!(out, "{}. {}\t(weight {:04b})", i + 1, m.preedit(run), m.weight().bits())?;
            }
            if truncated {
                writeln!(out, "(切分预算耗尽，结果可能不完整)")?;
            }
        }
        Command::Resolve { run } => {
            let res = engine.resolve(run)?;
            writeln!(out, "> {} ({:?})", res.best.preedit(run), res.leading)?;
            for block in res.chain.blocks() {
                match block {
                    WordBlock::Codes(codes) => {
                        let text: Vec<String> = codes.ranked().map(|r| String::from_utf8_lossy(r).into_owned()).collect();
                        writeln!(out, "  字: {}", text.join(" "))?;
                    }
                    WordBlock::Words(words) => {
                        writeln!(out, "  词: {}", words.iter().collect::<Vec<_>>().join(" "))?;
                    }
                }
            }
            if res.truncated {
                writeln!(out, "(读取上限耗尽，结果可能不完整)")?;
            }
        }
        Command::Verify => {
            let report = engine.matcher().verify()?;
            writeln!(out, "音节: {}  字: {}", report.syllables, report.glyphs)?;
            if !report.invalid.is_empty() {
                writeln!(out, "无效记录: {}", report.invalid.join(" "))?;
                anyhow::bail!("码表中有 {} 个音节的记录无效", report.invalid.len());
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<DecoderConfig> {
    let mut config = match &cli.config {
        Some(path) => DecoderConfig::from_path(path).with_context(|| format!("加载配置 {}", path.display()))?,
        None => DecoderConfig::default(),
    };
    if let Some(path) = &cli.code_table {
        config.code_table = path.clone();
    }
    if let Some(path) = &cli.word_dict {
        config.word_dict = Some(path.clone());
    }
    if cli.no_hash_boost {
        config.hash_boost = false;
    }
    Ok(config)
}

fn build_engine(config: &DecoderConfig) -> Result<Engine<StoreMatcher, PinyinSegmenter, Option<WordStore>>> {
    let index = Arc::new(SyllableIndex::builtin()?);
    let store = CharStore::open(&config.code_table, &index)?;
    let mut matcher = StoreMatcher::new(index.clone(), store).limits(config.search.clone());
    if config.hash_boost {
        matcher = matcher.with_hash_boost(HashAccelerator::builtin(&index)?);
    }
    let segmenter = PinyinSegmenter::new(index).budget(config.segment.budget);
    let words = config
        .word_dict
        .as_ref()
        .map(|path| WordStore::open(path, &config.resolve))
        .transpose()?;

    info!(
        code_table = %config.code_table.display(),
        word_dict = ?config.word_dict,
        hash_boost = config.hash_boost,
        "engine ready"
    );
    Ok(Engine::new(matcher, segmenter, words)
        .keep(config.segment.keep)
        .resolve_limits(config.resolve.clone()))
}

fn print_codes(out: &mut impl Write, codes: &Logograms) -> io::Result<()> {
    for (i, record) in codes.ranked().enumerate() {
        writeln!(out, "{}. {}", i + 1, String::from_utf8_lossy(record))?;
    }
    Ok(())
}
