//! `hash`：模糊匹配加速表。
//!
//! 每个首字母按第二个字母分桶（`(second - 'a') % HASH_DIV`），桶内是预排好优先级的
//! 分区下标；另有每个首字母一个 26 位的位图，记录哪些两字母前缀存在。
use tracing::debug;
use zh_core::{
    error::{DecodeError, Result},
    input,
};

use crate::{index::SyllableIndex, table::HASH_ORDER};

/// 第二个字母的分桶模数
pub const HASH_DIV: usize = 11;

const ORDER_ASSET: &str = "asset/hash_order.txt";

#[derive(Debug, Clone)]
pub struct HashAccelerator {
    slots: [[&'static [u8]; HASH_DIV]; 26],
    masks: [u32; 26],
}

fn slot_of(second: u8) -> usize {
    usize::from(second - b'a') % HASH_DIV
}

impl HashAccelerator {
    /// 用编译进二进制的优先顺序表构建，并与 `index` 交叉校验。
    pub fn builtin(index: &SyllableIndex) -> Result<Self> {
        Self::from_order(index, HASH_ORDER)
    }

    /// 位图由码表推导：前缀 `xy` 对应的位为 1，当且仅当存在以 `xy` 开头的音节。
    /// 每个存在的前缀都必须在 `order` 中恰好出现一次，且列出全部以它开头的音节。
    pub(crate) fn from_order(index: &SyllableIndex, order: &'static [(&'static str, &'static [u8])]) -> Result<Self> {
        let mut masks = [0u32; 26];
        for bucket in index.buckets() {
            for entry in bucket.entries() {
                if let &[initial, second, ..] = entry.syllable.as_bytes() {
                    masks[input::letter_index(initial)] |= 1 << (second - b'a');
                }
            }
        }

        let mut slots: [[&'static [u8]; HASH_DIV]; 26] = [[&[]; HASH_DIV]; 26];
        let mut seen = [0u32; 26];
        for &(prefix, list) in order {
            let fault = |reason: &str| DecodeError::malformed(ORDER_ASSET, format!("前缀 {prefix:?}：{reason}"));
            let &[initial, second] = prefix.as_bytes() else {
                return Err(fault("必须是两个字母"));
            };
            if !initial.is_ascii_lowercase() || !second.is_ascii_lowercase() {
                return Err(fault("必须是小写字母"));
            }
            let (letter, bit) = (input::letter_index(initial), 1u32 << (second - b'a'));
            if masks[letter] & bit == 0 {
                return Err(fault("码表中没有以它开头的音节"));
            }
            if seen[letter] & bit != 0 {
                return Err(fault("重复出现"));
            }
            seen[letter] |= bit;

            let slot = &mut slots[letter][slot_of(second)];
            if !slot.is_empty() {
                return Err(fault("与其他前缀落在同一个桶"));
            }

            let bucket = index.bucket(initial);
            let expected = bucket.entries().iter().filter(|e| e.syllable.starts_with(prefix)).count();
            let mut listed: Vec<u8> = list.to_vec();
            listed.sort_unstable();
            listed.dedup();
            let covered = listed.len() == list.len()
                && listed.len() == expected
                && listed.iter().all(|&i| {
                    bucket
                        .get(usize::from(i))
                        .is_some_and(|e| e.syllable.starts_with(prefix))
                });
            if !covered {
                return Err(fault("下标与码表不一致"));
            }
            *slot = list;
        }
        if seen != masks {
            return Err(DecodeError::malformed(ORDER_ASSET, "缺少部分两字母前缀"));
        }

        debug!(prefixes = order.len(), "hash accelerator built");
        Ok(Self { slots, masks })
    }

    /// 是否存在以 `initial second` 开头的音节。
    pub fn contains_prefix(&self, initial: u8, second: u8) -> bool {
        self.masks[input::letter_index(initial)] & (1 << (second - b'a')) != 0
    }

    /// 该前缀所在桶的候选下标（按优先级）。
    pub fn candidates(&self, initial: u8, second: u8) -> &'static [u8] {
        self.slots[input::letter_index(initial)][slot_of(second)]
    }

    pub fn mask(&self, initial: u8) -> u32 {
        self.masks[input::letter_index(initial)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_masks_match_the_reference_table() {
        const REFERENCE: [u32; 26] = [
            0x6100, 0x104111, 0x104191, 0x104111, 0x22100, 0x104011, 0x104011, 0x106011, 0x0, 0x100100,
            0x104011, 0x304111, 0x104111, 0x304151, 0x100000, 0x104111, 0x100100, 0x104111, 0x104191,
            0x104111, 0x0, 0x0, 0x104011, 0x100100, 0x104111, 0x104191,
        ];
        let index = SyllableIndex::builtin().unwrap();
        let hash = HashAccelerator::builtin(&index).unwrap();
        for (letter, expected) in (b'a'..=b'z').zip(REFERENCE) {
            assert_eq!(hash.mask(letter), expected, "{}", char::from(letter));
        }
    }

    #[test]
    fn candidates_follow_priority_order() {
        let index = SyllableIndex::builtin().unwrap();
        let hash = HashAccelerator::builtin(&index).unwrap();
        assert!(hash.contains_prefix(b'z', b'h'));
        assert!(!hash.contains_prefix(b'z', b'x'));
        let names: Vec<&str> = hash
            .candidates(b'h', b'a')
            .iter()
            .map(|&i| index.bucket(b'h').entries()[usize::from(i)].syllable)
            .collect();
        assert_eq!(names, ["hang", "hai", "han", "hao", "ha"]);
    }

    #[test]
    fn inconsistent_orders_are_rejected() {
        let index = SyllableIndex::builtin().unwrap();
        let bad: [&'static [(&'static str, &'static [u8])]; 4] = [
            // ai 在 a 分区的下标是 1，缺 an/ang/ao 等前缀
            &[("ai", &[1])],
            // 下标指向不以该前缀开头的音节
            &[("ai", &[2])],
            &[("ax", &[1])],
            &[("ai", &[1, 1])],
        ];
        for order in bad {
            assert!(HashAccelerator::from_order(&index, order).is_err(), "{order:?}");
        }
    }
}
