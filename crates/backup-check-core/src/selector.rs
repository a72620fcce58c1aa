//! Latest-backup selection over a single listing.

use std::cmp::Reverse;

use crate::storage::ObjectSummary;

/// Pick the most recently modified object, optionally restricted to keys
/// ending with `suffix`.
///
/// Only the objects handed in are considered. A listing cut short at the
/// store's page limit can therefore miss a newer backup; that cannot be
/// detected here. Objects with equal timestamps keep their listing order.
pub fn select_latest(
    mut objects: Vec<ObjectSummary>,
    suffix: Option<&str>,
) -> Option<ObjectSummary> {
    objects.sort_by_key(|o| Reverse(o.last_modified));

    match suffix {
        Some(suffix) => objects.into_iter().find(|o| o.key.ends_with(suffix)),
        None => objects.into_iter().next(),
    }
}
