//! The classical full-matrix Myers edit-graph search, see
//! "An O(ND) Difference Algorithm and its Variations" [Myers 1986].
//!
//! The graph has `left_len + 1` columns and `right_len + 1` rows;
//! diagonals are indexed by `k = x - y`. The search keeps one row of
//! furthest-reaching x positions per edit distance `d`, which makes the
//! state quadratic: a byte budget decides upfront whether this algorithm
//! runs at all or hands over to its fallback.

use crate::atoms::Section;
use crate::chunk::Accumulator;
use crate::engine::Outcome;
use crate::Error;

pub(crate) mod divide;

pub(crate) fn diff(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    permitted_state_size: usize,
    acc: &mut Accumulator<'_>,
) -> Result<Outcome, Error> {
    let n = left.len() as u64;
    let m = right.len() as u64;
    let max = n + m;

    // state budget check before any work happens
    let width = 2 * max + 1;
    let Some(bytes) = (max + 1)
        .checked_mul(width)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<i32>() as u64))
    else {
        return Ok(Outcome::Fallback);
    };
    if permitted_state_size != 0 && bytes > permitted_state_size as u64 {
        return Ok(Outcome::Fallback);
    }
    if bytes > isize::MAX as u64 {
        return Ok(Outcome::Fallback);
    }

    if max == 0 {
        return Ok(Outcome::Solved);
    }

    let cells = (bytes / std::mem::size_of::<i32>() as u64) as usize;
    let mut kd = Vec::new();
    kd.try_reserve_exact(cells).map_err(|_| Error::OutOfMemory)?;
    kd.resize(cells, 0i32);

    let n = n as i32;
    let m = m as i32;
    let max = max as i32;
    let width = width as usize;
    let row = |d: i32| d as usize * width;
    let idx = |d: i32, k: i32| d as usize * width + (max + k) as usize;

    // forward sweep
    let mut endpoint = None;
    'sweep: for d in 0..=max {
        let mut k = -d;
        while k <= d {
            if k < -m || k > n {
                k += 2;
                continue;
            }
            let x = if d == 0 {
                0
            } else {
                // Predecessors live on the neighbouring diagonals one
                // step up. A neighbour is usable when it exists at
                // d - 1 and stepping from it stays inside the graph.
                let from_left = k > -d && k - 1 >= -m && kd[idx(d - 1, k - 1)] < n;
                let from_up = k < d && k + 1 <= n && kd[idx(d - 1, k + 1)] - (k + 1) < m;
                if !from_left && !from_up {
                    k += 2;
                    continue;
                }
                // prefer k - 1 on ties: deletion before insertion
                if !from_up || (from_left && kd[idx(d - 1, k - 1)] >= kd[idx(d - 1, k + 1)]) {
                    kd[idx(d - 1, k - 1)] + 1
                } else {
                    kd[idx(d - 1, k + 1)]
                }
            };
            let mut x = x;
            while x < n && x - k < m && left.atoms_eq(x as u32, &right, (x - k) as u32) {
                x += 1;
            }
            kd[idx(d, k)] = x;
            if x == n && x - k == m {
                endpoint = Some((d, k));
                break 'sweep;
            }
            k += 2;
        }
    }
    let Some((dstar, kstar)) = endpoint else {
        return Ok(Outcome::Fallback);
    };

    // Backtrack from (dstar, kstar), reusing each kd row as a two-slot
    // waypoint store. The slots sit on diagonals the backtrack reads
    // only before they are written.
    {
        let mut x = kd[idx(dstar, kstar)];
        let mut y = x - kstar;
        let mut k = kstar;
        let mut d = dstar;
        loop {
            kd[row(d)] = x;
            kd[row(d) + 1] = y;
            if d == 0 {
                break;
            }
            let from_left = k > -d && k - 1 >= -m;
            let from_up = k < d && k + 1 <= n;
            let prev_k = if !from_up {
                k - 1
            } else if !from_left {
                k + 1
            } else if y == 0 || (x > 0 && kd[idx(d - 1, k - 1)] >= kd[idx(d - 1, k + 1)]) {
                k - 1
            } else {
                k + 1
            };
            x = kd[idx(d - 1, prev_k)];
            y = x - prev_k;
            k = prev_k;
            d -= 1;
        }
    }

    // Validate every step between waypoints before recording anything:
    // each must be a lone edit, a snake, or an edit followed by a snake
    // whose atoms really are equal. Anything else means the state was
    // inconsistent and the fallback takes over with a clean slate.
    let mut px = 0i32;
    let mut py = 0i32;
    for d in 0..=dstar {
        let x = kd[row(d)];
        let y = kd[row(d) + 1];
        let dx = x - px;
        let dy = y - py;
        if dx < 0 || dy < 0 || (dx - dy).abs() > 1 || (d == 0 && dx != dy) {
            return Ok(Outcome::Fallback);
        }
        let snake = dx.min(dy);
        let (sx, sy) = (x - snake, y - snake);
        for i in 0..snake {
            if !left.atoms_eq((sx + i) as u32, &right, (sy + i) as u32) {
                return Ok(Outcome::Fallback);
            }
        }
        px = x;
        py = y;
    }

    // forward emission: the lone edit of each step first, then its snake
    let mut px = 0u32;
    let mut py = 0u32;
    for d in 0..=dstar {
        let x = kd[row(d)] as u32;
        let y = kd[row(d) + 1] as u32;
        let dx = x - px;
        let dy = y - py;
        if dx == dy + 1 {
            acc.add(true, left.global_range(px..px + 1), right.global_range(py..py));
            acc.add(true, left.global_range(px + 1..x), right.global_range(py..y));
        } else if dy == dx + 1 {
            acc.add(true, left.global_range(px..px), right.global_range(py..py + 1));
            acc.add(true, left.global_range(px..x), right.global_range(py + 1..y));
        } else {
            acc.add(true, left.global_range(px..x), right.global_range(py..y));
        }
        px = x;
        py = y;
    }
    Ok(Outcome::Solved)
}
