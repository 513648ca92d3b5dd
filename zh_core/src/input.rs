//! 输入校验：所有查询都只接受 1-20 个 `a-z`。
use crate::error::{DecodeError, Result};

/// 单次查询允许的最大字母数
pub const MAX_INPUT_LEN: usize = 20;

/// 校验输入并返回其字节视图。
pub fn validate(input: &str) -> Result<&[u8]> {
    let bytes = input.as_bytes();
    let reason = if bytes.is_empty() {
        "输入为空"
    } else if bytes.len() > MAX_INPUT_LEN {
        "超过 20 个字母"
    } else if !bytes.iter().all(u8::is_ascii_lowercase) {
        "只接受小写字母 a-z"
    } else {
        return Ok(bytes);
    };
    Err(DecodeError::InvalidInput {
        input: input.to_owned(),
        reason,
    })
}

/// 首字母在 26 个字母中的下标。调用方需保证已经过 `validate`。
pub fn letter_index(initial: u8) -> usize {
    usize::from(initial - b'a')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_runs_up_to_twenty_letters() {
        assert_eq!(validate("nihao").unwrap(), b"nihao");
        assert!(validate(&"a".repeat(20)).is_ok());
    }

    #[test]
    fn rejects_empty_long_and_foreign_input() {
        for bad in ["", "Nihao", "ni hao", "ni'hao", "你好", &"a".repeat(21)] {
            assert!(
                matches!(validate(bad), Err(DecodeError::InvalidInput { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
