use std::cmp::Ordering;
use std::mem;

use crate::{
    ast::{Direction, OrderKey},
    table::Row,
    value::Value,
};

/// Sort `rows` in place by `keys`, highest priority first.
///
/// Each key compares numerically when both values are numbers and by their
/// string forms otherwise; absent columns compare as the empty string.
/// Later keys only break ties of earlier ones, and rows equal on every key
/// keep their relative order.
pub fn order_by(rows: &mut Vec<Row>, keys: &[OrderKey]) {
    if rows.len() <= 1 || keys.is_empty() {
        return;
    }
    stable_sort_by(rows, |a, b| compare_rows(a, b, keys));
}

pub fn compare_rows(a: &Row, b: &Row, keys: &[OrderKey]) -> Ordering {
    let mut ordering = Ordering::Equal;
    for key in keys {
        ordering = compare_key(a, b, key);
        if ordering != Ordering::Equal {
            break;
        }
    }
    ordering
}

fn compare_key(a: &Row, b: &Row, key: &OrderKey) -> Ordering {
    let null = Value::Null;
    let left = a.get(&key.column).unwrap_or(&null);
    let right = b.get(&key.column).unwrap_or(&null);

    let ordering = left
        .numeric_cmp(right)
        .unwrap_or_else(|| left.as_string().cmp(&right.as_string()));
    match key.direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Bottom-up merge sort.
///
/// Mixing numeric and text values in one column makes the comparison
/// intransitive ("10" < "5a" < "9" < "10"), and `slice::sort_by` may panic on
/// such comparators. This never does.
fn stable_sort_by<T>(items: &mut Vec<T>, mut compare: impl FnMut(&T, &T) -> Ordering) {
    let len = items.len();
    let mut order: Vec<usize> = (0..len).collect();
    let mut scratch = vec![0usize; len];

    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j, mut k) = (start, mid, start);
            while i < mid && j < end {
                // Take from the right run only when strictly smaller
                if compare(&items[order[j]], &items[order[i]]) == Ordering::Less {
                    scratch[k] = order[j];
                    j += 1;
                } else {
                    scratch[k] = order[i];
                    i += 1;
                }
                k += 1;
            }
            scratch[k..k + (mid - i)].copy_from_slice(&order[i..mid]);
            k += mid - i;
            scratch[k..k + (end - j)].copy_from_slice(&order[j..end]);
            start = end;
        }
        mem::swap(&mut order, &mut scratch);
        width *= 2;
    }

    let mut slots: Vec<Option<T>> = mem::take(items).into_iter().map(Some).collect();
    *items = order.into_iter().filter_map(|idx| slots[idx].take()).collect();
}

#[test]
fn test_stable_sort_keeps_ties_in_place() {
    let mut items = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd'), (1, 'e')];
    stable_sort_by(&mut items, |a, b| a.0.cmp(&b.0));
    assert_eq!(items, vec![(1, 'b'), (1, 'e'), (2, 'd'), (3, 'a'), (3, 'c')]);
}

#[test]
fn test_intransitive_comparison_does_not_panic() {
    let mut items: Vec<Row> = ["10", "5a", "9", "abc", "1"]
        .iter()
        .map(|v| Row::from([("v".to_string(), Value::from(*v))]))
        .collect();
    order_by(&mut items, &[OrderKey::new("v", Direction::Asc)]);
    assert_eq!(items.len(), 5);
}
