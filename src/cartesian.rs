//! Cartesian enumeration of a label space.
//!
//! Visits every label-value assignment exactly once per call. The walk is
//! an iterative odometer over per-dimension indices rather than a
//! recursive backtrack, so arbitrarily many label dimensions cost no
//! stack depth. One assignment buffer is mutated in place; no allocation
//! happens per combination.

/// Invoke `visit` once for every combination of one value per dimension.
///
/// Dimensions are walked in slice order with the last dimension varying
/// fastest, so enumeration order is deterministic for a given label
/// space. Zero dimensions yield exactly one empty assignment; any empty
/// dimension yields none (the product is zero).
pub fn for_each_assignment<F>(values: &[Vec<String>], mut visit: F)
where
    F: FnMut(&[&str]),
{
    if values.iter().any(|dimension| dimension.is_empty()) {
        return;
    }
    let mut indices = vec![0usize; values.len()];
    let mut assignment: Vec<&str> = values.iter().map(|dimension| dimension[0].as_str()).collect();
    loop {
        visit(&assignment);

        // Advance the odometer: bump the last dimension, carrying into
        // earlier ones as each wraps. A carry out of dimension 0 means
        // every combination has been visited.
        let mut dimension = values.len();
        loop {
            if dimension == 0 {
                return;
            }
            dimension -= 1;
            indices[dimension] += 1;
            if indices[dimension] < values[dimension].len() {
                assignment[dimension] = values[dimension][indices[dimension]].as_str();
                break;
            }
            indices[dimension] = 0;
            assignment[dimension] = values[dimension][0].as_str();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dims(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|dimension| dimension.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    fn collect(values: &[Vec<String>]) -> Vec<Vec<String>> {
        let mut seen = Vec::new();
        for_each_assignment(values, |assignment| {
            seen.push(assignment.iter().map(|v| v.to_string()).collect());
        });
        seen
    }

    #[test]
    fn visits_the_full_product_exactly_once() {
        let values = dims(&[&["a", "b", "c"], &["w", "x", "y", "z"]]);
        let seen = collect(&values);
        assert_eq!(seen.len(), 12);
        let distinct: HashSet<&Vec<String>> = seen.iter().collect();
        assert_eq!(distinct.len(), 12, "duplicate assignment emitted");
        for a in ["a", "b", "c"] {
            for b in ["w", "x", "y", "z"] {
                assert!(seen.contains(&vec![a.to_string(), b.to_string()]));
            }
        }
    }

    #[test]
    fn enumeration_order_is_deterministic() {
        let values = dims(&[&["1", "2"], &["p", "q"], &["m"]]);
        assert_eq!(collect(&values), collect(&values));
    }

    #[test]
    fn last_dimension_varies_fastest() {
        let values = dims(&[&["a", "b"], &["x", "y"]]);
        let seen = collect(&values);
        assert_eq!(
            seen,
            vec![
                vec!["a".to_string(), "x".to_string()],
                vec!["a".to_string(), "y".to_string()],
                vec!["b".to_string(), "x".to_string()],
                vec!["b".to_string(), "y".to_string()],
            ]
        );
    }

    #[test]
    fn no_dimensions_yields_one_empty_assignment() {
        let mut calls = 0;
        for_each_assignment(&[], |assignment| {
            assert!(assignment.is_empty());
            calls += 1;
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn an_empty_dimension_yields_nothing() {
        let values = dims(&[&["a", "b"], &[]]);
        assert!(collect(&values).is_empty());
    }
}
