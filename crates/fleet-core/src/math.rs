//! Checked arithmetic helpers - no unwrap, no panics, no as casts
//!
//! Overflow returns `None` rather than saturating: a silently clamped
//! product would corrupt share accounting and break conservation.

/// Floor of `a * b / den`. `None` on overflow or zero divisor.
pub fn mul_div_floor(a: u128, b: u128, den: u128) -> Option<u128> {
    if den == 0 {
        return None;
    }
    a.checked_mul(b).map(|p| p / den)
}

/// Ceiling of `a * b / den`. `None` on overflow or zero divisor.
pub fn mul_div_ceil(a: u128, b: u128, den: u128) -> Option<u128> {
    if den == 0 {
        return None;
    }
    let p = a.checked_mul(b)?;
    let q = p / den;
    if p % den == 0 {
        Some(q)
    } else {
        q.checked_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor() {
        assert_eq!(mul_div_floor(10, 3, 4), Some(7)); // 30 / 4 = 7.5
        assert_eq!(mul_div_floor(10, 4, 4), Some(10));
        assert_eq!(mul_div_floor(0, 100, 7), Some(0));
    }

    #[test]
    fn test_mul_div_ceil() {
        assert_eq!(mul_div_ceil(10, 3, 4), Some(8));
        assert_eq!(mul_div_ceil(10, 4, 4), Some(10));
        assert_eq!(mul_div_ceil(0, 100, 7), Some(0));
    }

    #[test]
    fn test_zero_divisor() {
        assert_eq!(mul_div_floor(1, 1, 0), None);
        assert_eq!(mul_div_ceil(1, 1, 0), None);
    }

    #[test]
    fn test_overflow() {
        assert_eq!(mul_div_floor(u128::MAX, 2, 1), None);
        assert_eq!(mul_div_ceil(u128::MAX, 2, 1), None);
    }
}
