//! Top-N ordering of search results.

use std::cmp::Ordering;

use promportal_types::SearchResult;

/// Sort results by value and keep the first `n`.
///
/// Descending order (`ascending == false`) puts the largest value first.
/// Results without a value always sort after results with one, in either
/// direction, so they never outrank a computed value. Ties keep their input
/// order. An `n` larger than the result count keeps everything.
pub fn rank(mut results: Vec<SearchResult>, n: usize, ascending: bool) -> Vec<SearchResult> {
    results.sort_by(|a, b| compare(a.value, b.value, ascending));
    results.truncate(n);
    results
}

fn compare(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if ascending => x.total_cmp(&y),
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
