//! Static workspace partition.
//!
//! Every monitor owns a fixed block of ten workspaces: monitor `0` gets
//! `1..=10`, monitor `1` gets `11..=20`, and so on.  The compositor does not
//! enforce this, so a monitor holding more than ten workspaces will have the
//! extra ones attributed to its neighbour.

/// Number of workspaces reserved per monitor.
pub const WORKSPACES_PER_MONITOR: i32 = 10;

/// Highest monitor id whose block still fits in an `i32` workspace id.
pub const MAX_PARTITIONED_MONITOR: usize = ((i32::MAX - WORKSPACES_PER_MONITOR) / WORKSPACES_PER_MONITOR) as usize;

/// Inclusive `(first, last)` workspace ids reserved for `monitor_id`.
///
/// Ids above [`MAX_PARTITIONED_MONITOR`] share its block.
pub fn workspace_range_for_monitor(monitor_id: usize) -> (i32, i32) {
    let index = i32::try_from(monitor_id.min(MAX_PARTITIONED_MONITOR)).unwrap_or(0);
    let start = index
        .saturating_mul(WORKSPACES_PER_MONITOR)
        .saturating_add(1);
    (start, start.saturating_add(WORKSPACES_PER_MONITOR - 1))
}

/// The monitor whose block contains `workspace_id`.
///
/// Non-positive ids map to monitor `0`.
pub fn monitor_for_workspace(workspace_id: i32) -> usize {
    if workspace_id <= 0 {
        return 0;
    }
    ((workspace_id - 1) / WORKSPACES_PER_MONITOR) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges() {
        assert_eq!(workspace_range_for_monitor(0), (1, 10));
        assert_eq!(workspace_range_for_monitor(1), (11, 20));
        assert_eq!(workspace_range_for_monitor(4), (41, 50));
    }

    #[test]
    fn lookup() {
        assert_eq!(monitor_for_workspace(1), 0);
        assert_eq!(monitor_for_workspace(10), 0);
        assert_eq!(monitor_for_workspace(11), 1);
        assert_eq!(monitor_for_workspace(35), 3);
    }

    #[test]
    fn non_positive_maps_to_first_monitor() {
        assert_eq!(monitor_for_workspace(0), 0);
        assert_eq!(monitor_for_workspace(-7), 0);
    }

    #[test]
    fn large_ids_do_not_overflow() {
        let edge = MAX_PARTITIONED_MONITOR;
        let (first, last) = workspace_range_for_monitor(edge);
        assert!(first > 0 && last >= first);
        assert_eq!(monitor_for_workspace(first), edge);
        assert_eq!(monitor_for_workspace(last), edge);

        assert_eq!(workspace_range_for_monitor(usize::MAX), (first, last));
        assert_eq!(workspace_range_for_monitor(300_000_000), (first, last));
    }

    #[test]
    fn partition_round_trip() {
        for id in 0..64 {
            let (first, last) = workspace_range_for_monitor(id);
            assert_eq!(monitor_for_workspace(first), id);
            assert_eq!(monitor_for_workspace(last), id);
        }
    }
}
