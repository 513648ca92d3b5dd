//! 把 `asset/` 下的码表索引与哈希顺序表编译为 Rust 静态数组。
use std::{env, error::Error, fmt::Write as _, fs, path::Path};

fn parse_hex(s: &str) -> Result<u32, Box<dyn Error>> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    Ok(u32::from_str_radix(digits, 16)?)
}

fn rows(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn gen_code_table(src: &str, out: &mut String) -> Result<(), Box<dyn Error>> {
    let mut buckets: Vec<(char, u32, Vec<String>)> = Vec::new();
    for (line_no, line) in rows(src) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if let Some(letter) = fields[0].strip_prefix('@') {
            let [_, start] = fields[..] else {
                return Err(format!("code_table.txt:{line_no}: 应为 `@<letter> <char_start>`").into());
            };
            let expected = char::from(b'a' + buckets.len() as u8);
            if letter.len() != 1 || !letter.starts_with(expected) {
                return Err(format!("code_table.txt:{line_no}: 期望首字母 {expected}，实际 {letter}").into());
            }
            buckets.push((expected, parse_hex(start)?, Vec::new()));
            continue;
        }
        let [syllable, count, offset] = fields[..] else {
            return Err(format!("code_table.txt:{line_no}: 应为 `<syllable> <count> <offset>`").into());
        };
        let Some((_, _, entries)) = buckets.last_mut() else {
            return Err(format!("code_table.txt:{line_no}: 音节出现在首字母之前").into());
        };
        let count: u16 = count.parse()?;
        entries.push(format!("({syllable:?}, {count}, {:#x})", parse_hex(offset)?));
    }
    if buckets.len() != 26 {
        return Err(format!("code_table.txt: 需要 26 个首字母，实际 {}", buckets.len()).into());
    }

    writeln!(out, "pub(crate) static CODE_TABLE: [RawBucket; 26] = [")?;
    for (letter, start, entries) in &buckets {
        writeln!(out, "    // {letter}")?;
        writeln!(
            out,
            "    RawBucket {{ char_start: {start:#x}, syllables: &[{}] }},",
            entries.join(", ")
        )?;
    }
    writeln!(out, "];")?;
    Ok(())
}

fn gen_hash_order(src: &str, out: &mut String) -> Result<(), Box<dyn Error>> {
    writeln!(out, "pub(crate) static HASH_ORDER: &[(&str, &[u8])] = &[")?;
    for (line_no, line) in rows(src) {
        let mut fields = line.split_whitespace();
        let prefix = fields.next().unwrap_or_default();
        if prefix.len() != 2 || !prefix.bytes().all(|b| b.is_ascii_lowercase()) {
            return Err(format!("hash_order.txt:{line_no}: 前缀必须是两个小写字母").into());
        }
        let order = fields.map(str::parse::<u8>).collect::<Result<Vec<_>, _>>()?;
        let order: Vec<String> = order.iter().map(u8::to_string).collect();
        writeln!(out, "    ({prefix:?}, &[{}]),", order.join(", "))?;
    }
    writeln!(out, "];")?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR")?;
    let asset = Path::new(&manifest_dir).join("asset");
    let table = asset.join("code_table.txt");
    let order = asset.join("hash_order.txt");
    println!("cargo:rerun-if-changed={}", table.display());
    println!("cargo:rerun-if-changed={}", order.display());

    let mut out = String::new();
    gen_code_table(&fs::read_to_string(&table)?, &mut out)?;
    gen_hash_order(&fs::read_to_string(&order)?, &mut out)?;

    let out_dir = env::var("OUT_DIR")?;
    fs::write(Path::new(&out_dir).join("code_table_gen.rs"), out)?;
    Ok(())
}
