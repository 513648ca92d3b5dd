mod common;

use common::{Fixture, chars, glyphs};
use zh_core::{config::SearchLimits, error::DecodeError, matcher::CodeMatcher};
use zh_dict::CharStore;

#[test]
fn exact_match_reads_the_most_common_tail() {
    let f = Fixture::new();
    for hash in [false, true] {
        let m = f.matcher(hash);
        let gui = glyphs(&f.index, "gui");
        assert_eq!(gui.len(), 28);

        assert_eq!(chars(&m.match_exact("gui", 5).unwrap()), gui[23..]);
        assert_eq!(chars(&m.match_exact("gui", 100).unwrap()), gui);
        assert!(m.match_exact("gui", 0).unwrap().is_empty());
    }
}

#[test]
fn every_indexed_syllable_matches_exactly() {
    let f = Fixture::new();
    for hash in [false, true] {
        let m = f.matcher(hash);
        for bucket in f.index.buckets() {
            for entry in bucket.entries() {
                let codes = m.match_exact(entry.syllable, 8).unwrap();
                assert!(!codes.is_empty(), "{}", entry.syllable);
                assert!(codes.len() <= 8 && codes.len() <= usize::from(entry.count));
            }
        }
    }
}

#[test]
fn exact_match_rejects_unknown_and_invalid_syllables() {
    let f = Fixture::new();
    for hash in [false, true] {
        let m = f.matcher(hash);
        for missing in ["gv", "gx", "i", "u", "v", "g", "zhuangg"] {
            assert!(m.match_exact(missing, 10).unwrap_err().is_not_found(), "{missing}");
        }
        for bad in ["Gui", "", "gu i", "abcdefghijklmnopqrstu"] {
            assert!(
                matches!(m.match_exact(bad, 10), Err(DecodeError::InvalidInput { .. })),
                "{bad:?}"
            );
        }
    }
}

#[test]
fn fuzzy_gui_returns_the_whole_syllable_in_store_order() {
    let f = Fixture::new();
    for hash in [false, true] {
        let codes = f.matcher(hash).match_fuzzy("gui", 130).unwrap();
        assert_eq!(chars(&codes), glyphs(&f.index, "gui"));
    }
}

#[test]
fn fuzzy_fill_is_head_then_siblings_then_remainder() {
    let f = Fixture::new();
    let xian = glyphs(&f.index, "xian");
    let xiang = glyphs(&f.index, "xiang");
    assert_eq!((xian.len(), xiang.len()), (50, 30));

    for hash in [false, true] {
        let codes = f.matcher(hash).match_fuzzy("xian", 130).unwrap();
        let mut expected = xian[..40].to_vec();
        expected.extend_from_slice(&xiang[27..]);
        expected.extend_from_slice(&xian[40..]);
        assert_eq!(chars(&codes), expected);

        let ranked: Vec<&[u8]> = codes.ranked().take(11).collect();
        assert_eq!(ranked[0], xian[49].to_string().as_bytes());
        assert_eq!(ranked[10], xiang[29].to_string().as_bytes());
    }
}

#[test]
fn sibling_order_follows_the_accelerator() {
    let f = Fixture::new();
    let best = |syllable: &str| *glyphs(&f.index, syllable).last().unwrap();

    let plain = chars(&f.matcher(false).match_fuzzy("gu", 130).unwrap());
    let fast = chars(&f.matcher(true).match_fuzzy("gu", 130).unwrap());
    assert_eq!(plain.len(), 10 + 7 * 3 + 33);
    assert_eq!(fast.len(), plain.len());
    // 倒数第 11 个字是第一个同前缀音节的最常用字
    assert_eq!(plain[plain.len() - 11], best("gua"));
    assert_eq!(fast[fast.len() - 11], best("guang"));
}

#[test]
fn single_letter_prefix_takes_one_glyph_per_syllable() {
    let f = Fixture::new();
    for hash in [false, true] {
        let m = f.matcher(hash);
        let codes = m.match_fuzzy("g", 130).unwrap();
        assert_eq!(codes.len(), 19);
        let first = codes.ranked().next().unwrap();
        let gua = *glyphs(&f.index, "gua").last().unwrap();
        assert_eq!(first, gua.to_string().as_bytes());

        let a = glyphs(&f.index, "a");
        assert_eq!(chars(&m.match_fuzzy("a", 5).unwrap()), a[2..]);
    }
}

#[test]
fn fuzzy_capacity_is_bounded() {
    let f = Fixture::new();
    let limits = SearchLimits {
        max_fuzzy_results: 12,
        ..SearchLimits::default()
    };
    let m = f.matcher(true).limits(limits);
    let codes = m.match_fuzzy("xian", 130).unwrap();
    assert_eq!(codes.len(), 12);

    assert!(m.match_fuzzy("xian", 0).unwrap().is_empty());
}

#[test]
fn fuzzy_without_candidates_is_not_found() {
    let f = Fixture::new();
    for hash in [false, true] {
        let m = f.matcher(hash);
        for prefix in ["i", "uang", "vv", "gx", "zhuangg"] {
            assert!(m.match_fuzzy(prefix, 130).unwrap_err().is_not_found(), "{prefix}");
        }
    }
}

#[test]
fn store_faults_are_reported_as_such() {
    let f = Fixture::new();
    let missing = f.dir.path().join("missing.bin");
    assert!(matches!(
        CharStore::open(&missing, &f.index),
        Err(DecodeError::StoreUnavailable { .. })
    ));

    let short = f.write("short.bin", vec![0u8; 16]);
    assert!(matches!(
        CharStore::open(&short, &f.index),
        Err(DecodeError::MalformedStore { .. })
    ));
}

#[test]
fn verify_walks_the_whole_table() {
    let f = Fixture::new();
    let report = f.matcher(true).verify().unwrap();
    assert_eq!(report.syllables, 408);
    assert_eq!(report.glyphs, 7287);
    assert!(report.invalid.is_empty());

    let mut table = std::fs::read(&f.code_table).unwrap();
    let gui = f.index.lookup("gui").unwrap();
    let pos = f.index.bucket(b'g').position(gui) as usize;
    table[pos..pos + 3].copy_from_slice(b"abc");
    let broken = f.write("broken.bin", table);
    let m = zh_dict::StoreMatcher::new(f.index.clone(), CharStore::open(&broken, &f.index).unwrap());
    assert_eq!(m.verify().unwrap().invalid, ["gui"]);
}
