use std::num::NonZeroUsize;
use handoff_bench::stats::{auto_histogram, default_bin_count, histogram, percentile, percentile_sorted, Stats};
use handoff_common::HandoffError;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn bins(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

fn assert_monotonic(s: &Stats) {
    assert!(s.minimum <= s.p1, "{s:?}");
    assert!(s.p1 <= s.p10, "{s:?}");
    assert!(s.p10 <= s.p50, "{s:?}");
    assert!(s.p50 <= s.p90, "{s:?}");
    assert!(s.p90 <= s.p99, "{s:?}");
    assert!(s.p99 <= s.p999, "{s:?}");
    assert!(s.p999 <= s.maximum, "{s:?}");
}

#[test]
fn test_percentile_interpolates_between_ranks() {
    // h = 0.5 * 3 = 1.5 → 20 + 0.5 * (30 - 20) = 25
    assert_eq!(percentile(&[10, 20, 30, 40], 0.5), Ok(25));
    assert_eq!(percentile_sorted(&[10, 20, 30, 40], 0.5), Ok(25));
}

#[test]
fn test_percentile_endpoints() {
    let data = [40, 10, 30, 20];
    assert_eq!(percentile(&data, 0.0), Ok(10));
    assert_eq!(percentile(&data, 1.0), Ok(40));
    // h = 0.25 * 3 = 0.75 → 10 + 0.75 * 10 = 17.5, truncated
    assert_eq!(percentile(&data, 0.25), Ok(17));
}

#[test]
fn test_percentile_single_value() {
    assert_eq!(percentile(&[7], 0.0), Ok(7));
    assert_eq!(percentile(&[7], 0.99), Ok(7));
    assert_eq!(percentile(&[7], 1.0), Ok(7));
}

#[test]
fn test_percentile_rejects_out_of_range_probability() {
    for p in [1.5, -0.1, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(percentile(&[1, 2, 3], p), Err(HandoffError::InvalidArgument(_))),
            "p = {p} should be rejected"
        );
    }
    // Checked before the empty shortcut.
    assert!(matches!(percentile(&[], 1.5), Err(HandoffError::InvalidArgument(_))));
}

#[test]
fn test_percentile_empty_returns_zero() {
    assert_eq!(percentile(&[], 0.5), Ok(0));
}

#[test]
fn test_compute_known_values() {
    // sorted 100..=1000 step 100, n = 10
    let data: Vec<u64> = (1..=10).map(|i| i * 100).collect();
    let s = Stats::compute(&data);
    assert_eq!(s.count, 10);
    assert_eq!(s.minimum, 100);
    assert_eq!(s.maximum, 1000);
    assert_eq!(s.average, 550);
    // p50: h = 4.5 → 500 + 0.5 * 100
    assert_eq!(s.p50, 550);
    // p999: h = 8.991 → between the two largest values
    assert!(s.p999 > 900 && s.p999 < 1000, "p999 = {}", s.p999);
    assert_monotonic(&s);
}

#[test]
fn test_compute_average_truncates() {
    let s = Stats::compute(&[1, 2]);
    assert_eq!(s.average, 1);
}

#[test]
fn test_compute_does_not_overflow_on_large_values() {
    let s = Stats::compute(&[u64::MAX, u64::MAX, u64::MAX]);
    assert_eq!(s.average, u64::MAX);
    assert_eq!(s.p999, u64::MAX);
}

#[test]
fn test_compute_empty_is_all_zero() {
    assert_eq!(Stats::compute(&[]), Stats::default());
    let s = Stats::compute(&[]);
    assert_eq!(s.count, 0);
    assert_eq!(s.maximum, 0);
    assert_eq!(s.p99, 0);
}

#[test]
fn test_compute_leaves_input_untouched() {
    let data = vec![5, 3, 9, 1];
    let _ = Stats::compute(&data);
    assert_eq!(data, vec![5, 3, 9, 1]);
}

#[test]
fn test_compute_is_order_independent_and_monotonic() {
    let mut rng = StdRng::seed_from_u64(42);
    for len in [1usize, 2, 3, 17, 250, 2000] {
        let mut data: Vec<u64> = (0..len).map(|_| rng.gen_range(0..50_000_000)).collect();
        let expected = Stats::compute(&data);
        assert_monotonic(&expected);
        for _ in 0..5 {
            data.shuffle(&mut rng);
            assert_eq!(Stats::compute(&data), expected, "permutation changed stats for n={len}");
        }
    }
}

#[test]
fn test_default_bin_count() {
    assert_eq!(default_bin_count(0).get(), 1);
    assert_eq!(default_bin_count(1).get(), 1);
    assert_eq!(default_bin_count(10).get(), 4);
    assert_eq!(default_bin_count(2000).get(), 45);
    assert_eq!(default_bin_count(1_000_000).get(), 100);
}

#[test]
fn test_histogram_equal_width_bins() {
    // range [0, 100], 4 bins of width 25
    let data = [0, 10, 25, 49, 50, 74, 75, 100];
    let h = histogram(&data, bins(4));
    assert_eq!(h.len(), 4);
    let counts: Vec<usize> = h.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![2, 2, 2, 2]);
    assert_eq!(h[0].range, 0.0..25.0);
    assert_eq!(h[1].range, 25.0..50.0);
    assert_eq!(h[3].range, 75.0..100.0);
    for (i, bin) in h.iter().enumerate() {
        assert_eq!(bin.index, i);
    }
}

#[test]
fn test_histogram_max_goes_to_last_bin() {
    let h = histogram(&[0, 100], bins(10));
    assert_eq!(h.len(), 10);
    assert_eq!(h[0].count, 1);
    assert_eq!(h[9].count, 1);
    assert_eq!(h[9].range.end, 100.0);
}

#[test]
fn test_histogram_keeps_empty_bins() {
    let h = histogram(&[0, 1, 1000], bins(5));
    let counts: Vec<usize> = h.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![2, 0, 0, 0, 1]);
}

#[test]
fn test_histogram_single_value() {
    let h = histogram(&[42, 42, 42], bins(8));
    assert_eq!(h.len(), 1);
    assert_eq!(h[0].range, 42.0..43.0);
    assert_eq!(h[0].count, 3);
}

#[test]
fn test_histogram_empty_has_no_bins() {
    assert!(histogram(&[], bins(3)).is_empty());
    assert!(auto_histogram(&[]).is_empty());
}

#[test]
fn test_histogram_counts_sum_to_sample_count() {
    let mut rng = StdRng::seed_from_u64(7);
    for len in [1usize, 2, 9, 100, 2000] {
        let data: Vec<u64> = (0..len).map(|_| rng.gen_range(1_000..20_000_000)).collect();
        let h = auto_histogram(&data);
        assert_eq!(h.iter().map(|b| b.count).sum::<usize>(), len, "n = {len}");
        for bin in &h {
            let in_range = data
                .iter()
                .filter(|&&v| {
                    let v = v as f64;
                    v >= bin.range.start && (v < bin.range.end || bin.index + 1 == h.len())
                })
                .count();
            assert!(in_range >= bin.count, "bin {} claims more samples than its range holds", bin.index);
        }
    }
}
