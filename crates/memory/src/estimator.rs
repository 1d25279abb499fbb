use monk_core::Message;

/// Pluggable token cost estimate for a message.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, message: &Message) -> usize;
}

/// `ceil(chars / chars_per_token)` plus a fixed per-message overhead.
#[derive(Debug, Clone, Copy)]
pub struct CharRatioEstimator {
    chars_per_token: f64,
    overhead: usize,
}

impl CharRatioEstimator {
    pub fn new(chars_per_token: f64, overhead: usize) -> Self {
        let chars_per_token = if chars_per_token.is_finite() && chars_per_token > 0.0 {
            chars_per_token
        } else {
            4.0
        };
        Self {
            chars_per_token,
            overhead,
        }
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(4.0, 4)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, message: &Message) -> usize {
        let chars = message.content.chars().count();
        (chars as f64 / self.chars_per_token).ceil() as usize + self.overhead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_and_overhead() {
        let estimator = CharRatioEstimator::new(4.0, 4);
        assert_eq!(estimator.estimate(&Message::user("")), 4);
        assert_eq!(estimator.estimate(&Message::user("abcd")), 5);
        assert_eq!(estimator.estimate(&Message::user("abcde")), 6);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let estimator = CharRatioEstimator::new(1.0, 0);
        assert_eq!(estimator.estimate(&Message::user("éé")), 2);
    }

    #[test]
    fn test_bad_ratio_falls_back() {
        let estimator = CharRatioEstimator::new(0.0, 0);
        assert_eq!(estimator.estimate(&Message::user("abcdefgh")), 2);
    }
}
