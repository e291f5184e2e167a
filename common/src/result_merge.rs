//! Left outer join of two independently fetched result series.

use serde_json::{Map, Value};

/// A loosely typed result row as returned by the query backend.
pub type Row = Map<String, Value>;

/// Join `right` onto `left` by the composite key `key_fields`.
///
/// Every left row yields exactly one output row, in left order. The first right row with an
/// equal key supplies the `merge_fields`; fields it lacks, and all merge fields of unmatched
/// rows, become `null`. Both inputs are small per-chart series, so the scan is quadratic.
pub fn outer_join<K: AsRef<str>, M: AsRef<str>>(
    left: &[Row],
    right: &[Row],
    key_fields: &[K],
    merge_fields: &[M],
) -> Vec<Row> {
    left.iter()
        .map(|left_row| {
            let matched = right.iter().find(|right_row| keys_equal(left_row, right_row, key_fields));
            let mut output = left_row.clone();
            for field in merge_fields {
                let field = field.as_ref();
                let value = matched
                    .and_then(|right_row| right_row.get(field))
                    .cloned()
                    .unwrap_or(Value::Null);
                output.insert(field.to_string(), value);
            }
            output
        })
        .collect()
}

fn keys_equal<K: AsRef<str>>(a: &Row, b: &Row, key_fields: &[K]) -> bool {
    key_fields
        .iter()
        .all(|field| key_values_equal(a.get(field.as_ref()), b.get(field.as_ref())))
}

/// Strict equality without type coercion, except that numbers compare by value (`2020 == 2020.0`).
fn key_values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
