//! Review integrity heuristic.
//!
//! # Invariants
//! - The score starts at `BASE_SCORE` and only ever adds bonuses.
//! - The result never exceeds `MAX_SCORE`.

const BASE_SCORE: u32 = 50;
const MAX_SCORE: u32 = 100;

const DETAILED_COMMENT_CHARS: usize = 100;
const LONG_COMMENT_CHARS: usize = 200;
const COMMENT_BONUS: u32 = 10;
const IMAGE_BONUS: u32 = 10;

const ACTIVE_AUTHOR_REVIEWS: usize = 5;
const PROLIFIC_AUTHOR_REVIEWS: usize = 20;
const AUTHOR_BONUS: u32 = 5;

/// Inputs to the integrity heuristic, detached from the review itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegritySignals {
    /// Comment length in characters, not bytes.
    pub comment_chars: usize,
    pub image_count: usize,
    /// Reviews written by the author, the scored one included.
    pub author_review_count: usize,
}

/// Computes the 0..=100 integrity score for one review.
pub fn integrity_score(signals: IntegritySignals) -> u8 {
    let mut score = BASE_SCORE;

    if signals.comment_chars > DETAILED_COMMENT_CHARS {
        score += COMMENT_BONUS;
    }
    if signals.comment_chars > LONG_COMMENT_CHARS {
        score += COMMENT_BONUS;
    }
    if signals.image_count > 0 {
        score += IMAGE_BONUS;
    }
    if signals.author_review_count > ACTIVE_AUTHOR_REVIEWS {
        score += AUTHOR_BONUS;
    }
    if signals.author_review_count > PROLIFIC_AUTHOR_REVIEWS {
        score += AUTHOR_BONUS;
    }

    u8::try_from(score.min(MAX_SCORE)).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::{integrity_score, IntegritySignals};

    fn signals(comment_chars: usize, image_count: usize, author_review_count: usize) -> IntegritySignals {
        IntegritySignals {
            comment_chars,
            image_count,
            author_review_count,
        }
    }

    #[test]
    fn short_review_from_new_author_scores_base() {
        assert_eq!(integrity_score(signals(10, 0, 1)), 50);
    }

    #[test]
    fn thresholds_are_strictly_greater_than() {
        assert_eq!(integrity_score(signals(100, 0, 5)), 50);
        assert_eq!(integrity_score(signals(101, 0, 6)), 65);
        assert_eq!(integrity_score(signals(201, 0, 21)), 80);
    }

    #[test]
    fn all_bonuses_reach_cap() {
        assert_eq!(integrity_score(signals(500, 3, 50)), 90);
        assert!(integrity_score(signals(usize::MAX, usize::MAX, usize::MAX)) <= 100);
    }

    #[test]
    fn score_is_monotonic_in_every_signal() {
        let lengths = [0, 100, 101, 200, 201, 1000];
        let images = [0, 1, 5];
        let counts = [0, 5, 6, 20, 21, 100];
        for window in lengths.windows(2) {
            for &img in &images {
                for &cnt in &counts {
                    assert!(
                        integrity_score(signals(window[0], img, cnt))
                            <= integrity_score(signals(window[1], img, cnt))
                    );
                }
            }
        }
        for window in counts.windows(2) {
            for &len in &lengths {
                assert!(
                    integrity_score(signals(len, 0, window[0]))
                        <= integrity_score(signals(len, 0, window[1]))
                );
            }
        }
        for &len in &lengths {
            assert!(integrity_score(signals(len, 0, 1)) <= integrity_score(signals(len, 1, 1)));
        }
    }
}
