//! Thread identifier rules.
//!
//! Valid thread ids:
//! - Must be non-empty
//! - Must consist only of ASCII letters (`a-z`, `A-Z`) and digits (`0-9`)
//!
//! The restricted alphabet keeps ids safe to embed in object keys and file
//! names, and lets a namespace listing tell thread objects apart from the
//! header object (`_head`) and from unrelated keys.

use chrono::Local;
use rand::Rng;

use crate::error::TypeError;

/// Returns `true` if `id` is a well-formed thread id.
pub fn is_valid_thread_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validate a thread id, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use chatvault_types::validate_thread_id;
///
/// assert!(validate_thread_id("240612093015a1b2").is_ok());
/// assert!(validate_thread_id("").is_err());
/// assert!(validate_thread_id("../etc").is_err());
/// ```
pub fn validate_thread_id(id: &str) -> Result<(), TypeError> {
    if id.is_empty() {
        return Err(TypeError::InvalidThreadId {
            id: id.to_string(),
            reason: "thread id must not be empty".into(),
        });
    }

    if let Some(ch) = id.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(TypeError::InvalidThreadId {
            id: id.to_string(),
            reason: format!("contains forbidden character: {ch:?}"),
        });
    }

    Ok(())
}

/// Mint a new thread id: local time as `yyMMddHHmmss` followed by a random
/// lowercase hex suffix.
///
/// Ids minted this way sort lexicographically by creation time, which is what
/// makes the store's descending listing order read as newest-first.
pub fn mint_thread_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..=i32::MAX as u32);
    format!("{}{suffix:x}", Local::now().format("%y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        assert!(validate_thread_id("abc123").is_ok());
        assert!(validate_thread_id("ABC").is_ok());
        assert!(validate_thread_id("0").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(validate_thread_id("").is_err());
        assert!(!is_valid_thread_id(""));
    }

    #[test]
    fn reject_path_and_punctuation() {
        for bad in ["a/b", "a.b", "..", "_head", "a-b", "a b", "a\nb"] {
            assert!(validate_thread_id(bad).is_err(), "{bad:?} should be rejected");
            assert!(!is_valid_thread_id(bad));
        }
    }

    #[test]
    fn reject_non_ascii_letters() {
        assert!(validate_thread_id("スレッド").is_err());
        assert!(validate_thread_id("café").is_err());
    }

    #[test]
    fn error_names_offending_character() {
        let err = validate_thread_id("ab-c").unwrap_err();
        assert!(err.to_string().contains("'-'"));
    }

    #[test]
    fn minted_ids_are_valid() {
        for _ in 0..32 {
            let id = mint_thread_id();
            assert!(is_valid_thread_id(&id), "{id}");
            assert!(id.len() > 12);
            assert!(id[..12].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
