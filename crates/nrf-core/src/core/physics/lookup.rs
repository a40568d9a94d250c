/// Index of the grid point nearest to `target` on an ascending grid.
///
/// Ties resolve to the lower index. Returns `None` for an empty grid or a NaN target.
pub fn nearest_index(grid: &[f64], target: f64) -> Option<usize> {
    if grid.is_empty() || target.is_nan() {
        return None;
    }

    let upper = grid.partition_point(|&e| e < target);
    if upper == 0 {
        return Some(0);
    }
    if upper == grid.len() {
        return Some(grid.len() - 1);
    }

    let below = upper - 1;
    if (target - grid[below]).abs() <= (grid[upper] - target).abs() {
        Some(below)
    } else {
        Some(upper)
    }
}

/// Checks that a grid is non-decreasing and free of NaNs.
pub fn is_ascending(grid: &[f64]) -> bool {
    grid.iter().all(|e| !e.is_nan()) && grid.windows(2).all(|w| w[0] <= w[1])
}
