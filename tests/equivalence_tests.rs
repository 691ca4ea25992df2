//! Equivalence tests: query operators agree with naive reference versions
//!
//! Uses quickcheck for randomized inputs; every operator is compared with a
//! straightforward loop over a `Vec`.

use quickcheck::{quickcheck, TestResult};
use sweep_report::query::{Field, Q};

/// First index holding the largest score; NaN and `None` never win.
fn reference_argmax(scores: &[Option<f64>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.iter().enumerate() {
        let Some(s) = score.filter(|s| !s.is_nan()) else {
            continue;
        };
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((i, s));
        }
    }
    best.map(|(i, _)| i)
}

quickcheck! {
    fn qc_unique_matches_first_occurrence(values: Vec<u8>) -> bool {
        let mut expected = Vec::new();
        for v in &values {
            if !expected.contains(v) {
                expected.push(*v);
            }
        }
        Q::new(values).unique().to_vec() == expected
    }

    fn qc_filter_matches_vec_filter(values: Vec<i32>, threshold: i32) -> bool {
        let expected: Vec<i32> = values.iter().copied().filter(|v| *v > threshold).collect();
        Q::new(values).filter(|v| *v > threshold).to_vec() == expected
    }

    fn qc_group_by_key_matches_buckets(values: Vec<(u8, u16)>) -> bool {
        let q = Q::new(values.clone());
        let groups = q.group_by_key(|(k, _)| k % 4);

        let mut order: Vec<u8> = Vec::new();
        for (k, _) in &values {
            if !order.contains(&(k % 4)) {
                order.push(k % 4);
            }
        }
        if groups.keys().to_vec() != order {
            return false;
        }
        order.iter().all(|key| {
            let bucket: Vec<(u8, u16)> = values.iter().copied().filter(|(k, _)| k % 4 == *key).collect();
            groups.get(key).map(Q::to_vec) == Some(bucket)
        })
    }

    fn qc_argmax_takes_first_maximum(scores: Vec<Option<u8>>) -> bool {
        let scores: Vec<Option<f64>> = scores.into_iter().map(|s| s.map(f64::from)).collect();
        let indexed = Q::new((0..scores.len()).collect::<Vec<_>>());
        let found = indexed.argmax(|i| scores[*i]).copied();
        found == reference_argmax(&scores)
    }

    fn qc_sorted_by_key_is_stable(values: Vec<(u8, u8)>) -> bool {
        let mut expected = values.clone();
        expected.sort_by_key(|(k, _)| *k);
        Q::new(values).sorted_by_key(|(k, _)| *k).to_vec() == expected
    }

    fn qc_mean_of_constant(value: u8, len: u8) -> TestResult {
        if len == 0 {
            return TestResult::discard();
        }
        let x = f64::from(value) / 255.0;
        let q = Q::new(vec![x; usize::from(len)]);
        let mean = q.mean().unwrap();
        let std = q.std().unwrap();
        TestResult::from_bool((mean - x).abs() < 1e-12 && std < 1e-9)
    }

    fn qc_int_and_float_fields_compare_numerically(value: i32) -> bool {
        let int = Field::Int(i64::from(value));
        let float = Field::Float(f64::from(value));
        int == float && int.cmp(&float) == std::cmp::Ordering::Equal
    }

    fn qc_field_order_matches_numeric_order(a: i16, b: i16) -> bool {
        let left = Field::Int(i64::from(a));
        let right = Field::Float(f64::from(b) + 0.5);
        left.cmp(&right) == f64::from(a).partial_cmp(&(f64::from(b) + 0.5)).unwrap()
    }
}
