//! Care percentage to cost percentage mapping.
//!
//! The table is applied to each party on its own, so carers and parents each
//! get a cost percentage from their own care without assuming the shares
//! add up to 100.

/// Maps a rounded care percentage to a cost percentage.
///
/// | care     | cost                |
/// |----------|---------------------|
/// | 0–13     | 0                   |
/// | 14–34    | 24                  |
/// | 35–47    | 25 + 2 × (care − 35) |
/// | 48–52    | 50                  |
/// | 53–65    | 51 + 2 × (care − 53) |
/// | 66–86    | 76                  |
/// | 87–100   | 100                 |
///
/// The upper rows mirror the lower ones so that
/// `cost_percentage(p) + cost_percentage(100 − p) == 100`. Values above 100
/// are treated as 100.
///
/// # Examples
///
/// ```
/// use child_support_engine::calculation::cost_percentage;
///
/// assert_eq!(cost_percentage(0), 0);
/// assert_eq!(cost_percentage(40), 35);
/// assert_eq!(cost_percentage(60), 65);
/// assert_eq!(cost_percentage(100), 100);
/// ```
pub fn cost_percentage(care: u8) -> u8 {
    match care {
        0..=13 => 0,
        14..=34 => 24,
        35..=47 => 25 + 2 * (care - 35),
        48..=52 => 50,
        53..=65 => 51 + 2 * (care - 53),
        66..=86 => 76,
        _ => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(cost_percentage(13), 0);
        assert_eq!(cost_percentage(14), 24);
        assert_eq!(cost_percentage(34), 24);
        assert_eq!(cost_percentage(35), 25);
        assert_eq!(cost_percentage(47), 49);
        assert_eq!(cost_percentage(48), 50);
        assert_eq!(cost_percentage(52), 50);
        assert_eq!(cost_percentage(53), 51);
        assert_eq!(cost_percentage(65), 75);
        assert_eq!(cost_percentage(66), 76);
        assert_eq!(cost_percentage(86), 76);
        assert_eq!(cost_percentage(87), 100);
    }

    #[test]
    fn test_symmetric_for_every_percentage() {
        for p in 0..=100u8 {
            assert_eq!(
                cost_percentage(p) + cost_percentage(100 - p),
                100,
                "asymmetric at {}",
                p
            );
        }
    }

    #[test]
    fn test_monotonic_for_every_percentage() {
        for p in 0..100u8 {
            assert!(cost_percentage(p) <= cost_percentage(p + 1));
        }
    }

    #[test]
    fn test_out_of_range_care_saturates() {
        assert_eq!(cost_percentage(120), 100);
    }
}
