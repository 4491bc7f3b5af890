//! Human readable byte sizes.
//!
//! The display format is deliberately coarse: the digit after the dot is the
//! last digit of the remainder dropped by the final division, not a rounded
//! fraction. `1536` renders as `1.2K`.

use crate::error::StartupError;

const UNITS: [char; 6] = ['B', 'K', 'M', 'G', 'T', 'P'];

/// Render a byte count as `<int>.<digit><unit>`, or `??` past petabytes.
pub fn to_human(bytes: u64) -> String {
    let mut size = bytes;
    let mut rest = 0;
    for unit in UNITS {
        if size < 1024 {
            return format!("{}.{}{}", size, rest % 10, unit);
        }
        rest = size % 1024;
        size /= 1024;
    }
    "??".to_string()
}

/// Parse a size such as `512K` or `1G` into bytes.
pub fn from_human(text: &str) -> Result<u64, StartupError> {
    let invalid = || StartupError::InvalidSizeFormat(text.to_string());

    let unit = text.chars().last().ok_or_else(invalid)?;
    let exponent = match unit {
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        _ => return Err(invalid()),
    };

    let digits = &text[..text.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let count: u64 = digits.parse().map_err(|_| invalid())?;

    count.checked_mul(1u64 << (10 * exponent)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_human_bytes() {
        assert_eq!(to_human(0), "0.0B");
        assert_eq!(to_human(1), "1.0B");
        assert_eq!(to_human(1023), "1023.0B");
    }

    #[test]
    fn test_to_human_uses_previous_remainder_digit() {
        assert_eq!(to_human(1024), "1.0K");
        // 1536 % 1024 = 512, last digit 2
        assert_eq!(to_human(1536), "1.2K");
        assert_eq!(to_human(1025), "1.1K");
        assert_eq!(to_human(1 << 20), "1.0M");
        assert_eq!(to_human(1 << 30), "1.0G");
        assert_eq!(to_human(3 * (1 << 30) + 7 * (1 << 20)), "3.7G");
    }

    #[test]
    fn test_to_human_largest_units() {
        assert_eq!(to_human(1 << 50), "1.0P");
        assert_eq!(to_human(1023 << 50), "1023.0P");
        assert_eq!(to_human(1 << 60), "??");
        assert_eq!(to_human(u64::MAX), "??");
    }

    #[test]
    fn test_from_human_units() {
        assert_eq!(from_human("1K").unwrap(), 1024);
        assert_eq!(from_human("10M").unwrap(), 10 << 20);
        assert_eq!(from_human("1G").unwrap(), 1 << 30);
        assert_eq!(from_human("2T").unwrap(), 2 << 40);
        assert_eq!(from_human("1P").unwrap(), 1 << 50);
        assert_eq!(from_human("0K").unwrap(), 0);
    }

    #[test]
    fn test_from_human_rejects_bad_input() {
        for text in ["", "1Q", "1", "K", "1B", "1k", "-1K", "+1K", "1.5G", " 1G", "1 G", "1é"] {
            assert!(
                matches!(from_human(text), Err(StartupError::InvalidSizeFormat(_))),
                "expected {:?} to be rejected",
                text
            );
        }
    }

    #[test]
    fn test_from_human_rejects_overflow() {
        assert!(from_human("20000P").is_err());
        assert!(from_human("99999999999999999999K").is_err());
    }
}
