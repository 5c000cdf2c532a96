//! Position assignment and WIP admission rules for lanes and tasks.
//!
//! Positions are plain integers ordered ascending. They are dense on append
//! but gap-tolerant: deletions leave holes, and nothing compacts them,
//! because display order only depends on relative order. The same rules
//! apply to lanes within a board and tasks within a lane.

/// Position assigned to a newly created entity when the caller supplies
/// none: one past the current maximum, or 0 for an empty scope.
pub fn append_position<I>(existing: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    existing.into_iter().max().map_or(0, |max| max + 1)
}

/// Whether a task may enter a lane, given the lane's WIP limit and its
/// current committed occupancy (which must not count the moving task).
///
/// Same-lane reorders always pass: the limit only applies to cross-lane
/// moves, and tasks already in a lane are never evicted by it.
pub fn wip_allows_move(wip_limit: Option<i64>, occupancy: i64, same_lane: bool) -> bool {
    if same_lane {
        return true;
    }
    match wip_limit {
        Some(limit) => occupancy < limit,
        None => true,
    }
}
