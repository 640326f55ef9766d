// torolife - Toroidal Cellular Automaton Viewer
// Copyright (c) 2025 Filipe da Veiga Ventura Alves
// Licensed under MIT License

//! Screen pixel <-> cell index translation under a wrapping camera.
//!
//! The grid is a ring of `count` cells in raster order. The camera is an offset
//! into that ring, so every combination of indices goes through [`wrap`].

/// Reduces `value` into `[0, count)`.
#[inline]
pub fn wrap(value: i64, count: usize) -> usize {
    debug_assert!(count > 0);
    value.rem_euclid(count as i64) as usize
}

/// Cell shown at `pixel_index` when the camera is rotated by `camera_position`.
#[inline]
pub fn cell_index_for(pixel_index: usize, camera_position: usize, count: usize) -> usize {
    wrap(pixel_index as i64 + camera_position as i64, count)
}

/// Linear pixel index of `(x, y)`. No wraparound: callers bounds-check first.
#[inline]
pub fn pixel_to_cell_index(x: usize, y: usize, width: usize) -> usize {
    x + y * width
}

/// Camera offset change for a drag of `(dx, dy)` pixels, normalized to `[0, count)`.
#[inline]
pub fn camera_delta_for(dx: i64, dy: i64, width: usize, count: usize) -> usize {
    wrap(dx + dy * width as i64, count)
}

/// Moves `camera_position` by a delta from [`camera_delta_for`].
#[inline]
pub fn advance_camera(camera_position: usize, delta: usize, count: usize) -> usize {
    wrap(camera_position as i64 + delta as i64, count)
}

/// Pointer coordinates as grid pixels, or `None` when outside the grid.
///
/// Cursor positions can be negative or past the edge while a drag leaves the
/// window, so this check must run before [`pixel_to_cell_index`].
pub fn pointer_pixel(x: i32, y: i32, width: usize, height: usize) -> Option<(usize, usize)> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= width || y >= height {
        return None;
    }
    Some((x, y))
}
