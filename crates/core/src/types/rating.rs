//! Star ratings for reviews and testimonials.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned for a rating outside 1-5.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {value}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingError {
    pub value: i32,
}

/// A whole-star rating between 1 and 5.
///
/// ```
/// use hearth_core::Rating;
///
/// assert_eq!(Rating::new(4).unwrap().get(), 4);
/// assert!(Rating::new(0).is_err());
/// assert!(Rating::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns [`RatingError`] if `value` is not in 1-5.
    pub fn new(value: i32) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { value })
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Filled and empty stars, e.g. `★★★★☆`.
    #[must_use]
    pub fn stars(self) -> String {
        let filled = usize::from(self.0);
        let empty = usize::from(Self::MAX - self.0);
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

impl TryFrom<i32> for Rating {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        for v in 1..=5 {
            assert!(Rating::new(v).is_ok());
        }
        assert_eq!(Rating::new(0), Err(RatingError { value: 0 }));
        assert_eq!(Rating::new(-3), Err(RatingError { value: -3 }));
        assert_eq!(Rating::new(300), Err(RatingError { value: 300 }));
    }

    #[test]
    fn test_stars() {
        assert_eq!(Rating::new(3).unwrap().stars(), "★★★☆☆");
        assert_eq!(Rating::new(5).unwrap().stars(), "★★★★★");
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Rating::new(7).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5, got 7");
    }
}
