//! # Precision
//!
//! Nested insertion into a single gap with the default rank limit.

#[cfg(test)]
mod tests {
    use position_ordering::{RankAllocator, RankValue, DEFAULT_MAX_RANK_LENGTH};

    const NESTED_INSERTIONS: usize = 1 << 16;

    #[test]
    fn test_nested_insertions_toward_lower_bound() {
        let allocator = RankAllocator::default();
        let lower = allocator.initial();
        let mut upper = allocator.after(&lower).unwrap();

        for step in 0..NESTED_INSERTIONS {
            let mid = allocator
                .between(&lower, &upper)
                .unwrap_or_else(|e| panic!("exhausted after {step} insertions: {e}"));
            assert!(lower < mid && mid < upper, "step {step}");
            upper = mid;
        }
        assert!(upper.len() <= DEFAULT_MAX_RANK_LENGTH);
    }

    #[test]
    fn test_nested_insertions_toward_upper_bound() {
        let allocator = RankAllocator::default();
        let upper = allocator.initial();
        let mut lower = allocator.before(&upper).unwrap();

        for step in 0..NESTED_INSERTIONS {
            let mid = allocator
                .between(&lower, &upper)
                .unwrap_or_else(|e| panic!("exhausted after {step} insertions: {e}"));
            assert!(lower < mid && mid < upper, "step {step}");
            lower = mid;
        }
        assert!(lower.len() <= DEFAULT_MAX_RANK_LENGTH);
    }

    #[test]
    fn test_small_limit_reports_exhaustion() {
        let allocator = RankAllocator::new(4);
        let lower = RankValue::parse("i").unwrap();
        let mut upper = RankValue::parse("j").unwrap();

        let mut inserted = 0;
        while let Ok(mid) = allocator.between(&lower, &upper) {
            assert!(mid.len() <= 4);
            upper = mid;
            inserted += 1;
        }
        // Roughly five halvings per base-36 symbol.
        assert!((10..=20).contains(&inserted), "inserted {inserted}");
    }
}
