//! Static split of the scenario range across worker threads

use std::ops::Range;

/// Split scenarios `1..=num_scenarios` into `num_threads` contiguous ranges
///
/// Every range holds `num_scenarios / num_threads` scenarios; the remainder is
/// appended to the last range. With more threads than scenarios the leading
/// ranges are empty.
pub fn partition_scenarios(num_scenarios: u32, num_threads: usize) -> Vec<Range<i32>> {
    let n = num_scenarios as i32;
    let t = num_threads.max(1) as i32;
    let per_thread = n / t;

    (0..t)
        .map(|i| {
            let start = i * per_thread + 1;
            let mut end = (start + per_thread).min(n + 1);
            if i == t - 1 {
                end += n % t;
            }
            start..end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flatten(parts: &[Range<i32>]) -> Vec<i32> {
        parts.iter().flat_map(|r| r.clone()).collect()
    }

    #[test]
    fn test_even_split() {
        let parts = partition_scenarios(12, 3);
        assert_eq!(parts, vec![1..5, 5..9, 9..13]);
    }

    #[test]
    fn test_remainder_goes_last() {
        let parts = partition_scenarios(10, 4);
        assert_eq!(parts, vec![1..3, 3..5, 5..7, 7..11]);
    }

    #[test]
    fn test_more_threads_than_scenarios() {
        let parts = partition_scenarios(3, 5);
        assert_eq!(flatten(&parts), vec![1, 2, 3]);
        assert!(parts[..4].iter().all(|r| r.is_empty()));
    }

    #[test]
    fn test_covers_every_scenario_once() {
        for n in 1..40 {
            for t in 1..9 {
                assert_eq!(flatten(&partition_scenarios(n, t)), (1..=n as i32).collect::<Vec<_>>(), "n={} t={}", n, t);
            }
        }
    }
}
