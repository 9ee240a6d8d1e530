//! Wide bit-flag helpers.
//!
//! Permission sets are wider than 64 bits and travel as decimal strings, so
//! they are handled as `u128` end to end.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// Permission Flags
// ============================================================================

/// Named permission bits.
pub mod permissions {
    /// Create instant invite.
    pub const CREATE_INSTANT_INVITE: u128 = super::flag(0);
}

// ============================================================================
// Helpers
// ============================================================================

/// Returns the flag with the given bit index set.
#[inline]
#[must_use]
pub const fn flag(index: u32) -> u128 {
    1u128 << index
}

/// Whether `flags` contains every bit of `check`.
#[inline]
#[must_use]
pub const fn has(flags: u128, check: u128) -> bool {
    flags & check == check
}

/// Whether `flags` contains any bit of `check`.
#[inline]
#[must_use]
pub const fn has_any(flags: u128, check: u128) -> bool {
    flags & check != 0
}

/// Unions a set of flags.
#[inline]
#[must_use]
pub fn combine(flags: &[u128]) -> u128 {
    flags.iter().fold(0, |acc, f| acc | f)
}

/// Returns `flags` with every bit of `add` set.
#[inline]
#[must_use]
pub const fn add(flags: u128, add: u128) -> u128 {
    flags | add
}

/// Returns `flags` with every bit of `remove` cleared.
#[inline]
#[must_use]
pub const fn remove(flags: u128, remove: u128) -> u128 {
    flags & !remove
}

/// Decodes a wire flag value: a decimal string or a plain integer.
///
/// # Errors
///
/// Returns a description of the mismatch for anything else; callers wrap it
/// with command context.
pub fn parse_big_flags(value: &Value) -> Result<u128, String> {
    match value {
        Value::String(s) => s
            .parse::<u128>()
            .map_err(|e| format!("invalid decimal flag string {s:?}: {e}")),
        Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| format!("invalid numeric flag value {n}")),
        other => Err(format!("expected string or number flags, got {other}")),
    }
}

/// Whether a wire-encoded permission set grants `permission`.
///
/// # Errors
///
/// Propagates the decode error for a malformed permission value.
pub fn can(permission: u128, permissions: &Value) -> Result<bool, String> {
    Ok(has(parse_big_flags(permissions)?, permission))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_indexing() {
        assert_eq!(flag(0), 1);
        assert_eq!(flag(11), 2048);
        // Wider than u64.
        assert_eq!(flag(80), 1u128 << 80);
    }

    #[test]
    fn test_has_requires_all_bits() {
        let flags = combine(&[flag(0), flag(11), flag(80)]);
        assert!(has(flags, flag(11)));
        assert!(has(flags, flag(0) | flag(80)));
        assert!(!has(flags, flag(1)));
        assert!(!has(flags, flag(11) | flag(12)));
    }

    #[test]
    fn test_parse_big_flags() {
        assert_eq!(parse_big_flags(&json!("1208925819614629174706176")).expect("wide string"),
            1u128 << 80);
        assert_eq!(parse_big_flags(&json!(2048)).expect("number"), 2048);
        assert!(parse_big_flags(&json!("not-a-number")).is_err());
        assert!(parse_big_flags(&json!(-5)).is_err());
        assert!(parse_big_flags(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_has_any_and_set_arithmetic() {
        let base = combine(&[flag(3), flag(64)]);
        assert!(has_any(base, flag(3) | flag(7)));
        assert!(!has_any(base, flag(7)));

        let grown = add(base, flag(7));
        assert!(has(grown, flag(7)));
        // Removing bits that are not set leaves the rest untouched.
        assert_eq!(remove(grown, flag(7) | flag(9)), base);
    }

    #[test]
    fn test_can_checks_wire_permissions() {
        let granted = json!((1u128 << 80 | 1).to_string());
        assert!(can(permissions::CREATE_INSTANT_INVITE, &granted).expect("decode"));
        assert!(!can(flag(5), &granted).expect("decode"));
        assert!(can(flag(0), &json!(null)).is_err());
    }

    #[test]
    fn test_create_instant_invite_bit() {
        assert_eq!(permissions::CREATE_INSTANT_INVITE, 1);
    }
}
