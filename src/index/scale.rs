//! Compression of the EPA 0-500 index onto the 1-5 display scale.

/// Maps an EPA-scale index (0-500) to the 1-5 display scale.
///
/// | EPA range | Display |
/// |-----------|---------|
/// | <= 50     | 1       |
/// | <= 100    | 2       |
/// | <= 150    | 3       |
/// | <= 200    | 4       |
/// | > 200     | 5       |
pub fn scale_to_display(epa: u16) -> u8 {
    match epa {
        0..=50 => 1,
        51..=100 => 2,
        101..=150 => 3,
        151..=200 => 4,
        _ => 5,
    }
}

/// Human-readable category for a display-scale index.
pub fn category(display: u8) -> &'static str {
    match display {
        1 => "good",
        2 => "moderate",
        3 => "unhealthy for sensitive groups",
        4 => "unhealthy",
        _ => "very unhealthy",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_boundaries() {
        assert_eq!(scale_to_display(0), 1);
        assert_eq!(scale_to_display(50), 1);
        assert_eq!(scale_to_display(51), 2);
        assert_eq!(scale_to_display(100), 2);
        assert_eq!(scale_to_display(101), 3);
        assert_eq!(scale_to_display(150), 3);
        assert_eq!(scale_to_display(151), 4);
        assert_eq!(scale_to_display(200), 4);
        assert_eq!(scale_to_display(201), 5);
        assert_eq!(scale_to_display(500), 5);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(category(1), "good");
        assert_eq!(category(5), "very unhealthy");
    }
}
