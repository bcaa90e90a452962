//! Linear-space Myers: bidirectional search for a mid-snake.
//!
//! One forward column `F[k]` sweeps from the top-left corner and one
//! backward column `B[c]` from the bottom-right, each holding the
//! furthest-reaching x per diagonal. The two indexings are offset by
//! `delta = right_len - left_len` so that `c = 0` sits on the
//! bottom-right corner. Where the sweeps meet, the crossing interval is
//! a verified snake; it splits the problem into two subproblems that are
//! emitted as unsolved chunks for the inner algorithm.

use std::ops::Range;

use crate::atoms::Section;
use crate::chunk::Accumulator;
use crate::engine::Outcome;
use crate::Error;

struct MidSnake {
    left: Range<i32>,
    right: Range<i32>,
}

pub(crate) fn diff(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    acc: &mut Accumulator<'_>,
) -> Result<Outcome, Error> {
    let n = left.len() as i32;
    let m = right.len() as i32;
    if n == 0 && m == 0 {
        return Ok(Outcome::Solved);
    }
    let delta = m - n;
    let dmax = (n + m) / 2 + 1;
    let width = (2 * dmax + 1) as usize;
    let at = |k: i32| (k + dmax) as usize;
    // Stale forward cells read as "no progress" (x = 0), stale backward
    // cells as "still at the right edge" (x = n); either fails the
    // crossing checks harmlessly.
    let mut fwd = vec![0i32; width];
    let mut bwd = vec![n; width];

    let mut snake = None;
    'search: for d in 0..=dmax {
        // forward step
        let mut k = -d;
        while k <= d {
            if k < -m || k > n {
                k += 2;
                continue;
            }
            let start_x = if d == 0 {
                0
            } else {
                let from_left = k > -d && k - 1 >= -m && fwd[at(k - 1)] < n;
                let from_up = k < d && k + 1 <= n && fwd[at(k + 1)] - (k + 1) < m;
                if !from_left && !from_up {
                    k += 2;
                    continue;
                }
                if !from_up || (from_left && fwd[at(k - 1)] >= fwd[at(k + 1)]) {
                    fwd[at(k - 1)] + 1
                } else {
                    fwd[at(k + 1)]
                }
            };
            if start_x > n || start_x - k > m || start_x < 0 || start_x - k < 0 {
                k += 2;
                continue;
            }
            let mut x = start_x;
            while x < n && x - k < m && left.atoms_eq(x as u32, &right, (x - k) as u32) {
                x += 1;
            }
            fwd[at(k)] = x;
            // Crossing check against the backward sweep at d - 1, only
            // decisive when delta is odd. The snake start guards against
            // apparent crossings inherited from adjacent diagonals: the
            // crossing interval must lie inside this step's snake.
            if delta % 2 != 0 && d > 0 {
                let c = k + delta;
                if c >= -(d - 1) && c <= d - 1 && c >= -n && c <= m {
                    let bx = bwd[at(c)];
                    if x >= bx && start_x <= bx {
                        snake = Some(MidSnake {
                            left: bx..x,
                            right: bx - k..x - k,
                        });
                        break 'search;
                    }
                }
            }
            k += 2;
        }

        // backward step
        let mut c = -d;
        while c <= d {
            if c < -n || c > m {
                c += 2;
                continue;
            }
            let k = c - delta;
            let start_x = if d == 0 {
                n
            } else {
                let from_right = c < d && c + 1 <= m && bwd[at(c + 1)] > 0;
                let from_down = c > -d && c - 1 >= -n && bwd[at(c - 1)] - ((c - 1) - delta) > 0;
                if !from_right && !from_down {
                    c += 2;
                    continue;
                }
                // prefer c + 1 on ties: the mirrored deletion-first rule
                if !from_down || (from_right && bwd[at(c + 1)] <= bwd[at(c - 1)]) {
                    bwd[at(c + 1)] - 1
                } else {
                    bwd[at(c - 1)]
                }
            };
            if start_x < 0 || start_x - k < 0 || start_x > n || start_x - k > m {
                c += 2;
                continue;
            }
            let mut x = start_x;
            let mut y = x - k;
            while x > 0 && y > 0 && left.atoms_eq((x - 1) as u32, &right, (y - 1) as u32) {
                x -= 1;
                y -= 1;
            }
            bwd[at(c)] = x;
            // crossing check against the forward sweep at the same d,
            // decisive when delta is even
            if delta % 2 == 0 && k >= -d && k <= d && k >= -m && k <= n {
                let fx = fwd[at(k)];
                if x <= fx && start_x >= fx {
                    snake = Some(MidSnake {
                        left: x..fx,
                        right: y..fx - k,
                    });
                    break 'search;
                }
            }
            c += 2;
        }
    }

    let Some(mid) = snake else {
        return Ok(Outcome::Fallback);
    };
    debug_assert_eq!(
        mid.left.end - mid.left.start,
        mid.right.end - mid.right.start
    );

    emit_region(left, right, acc, 0..mid.left.start, 0..mid.right.start);
    acc.add(
        true,
        left.global_range(mid.left.start as u32..mid.left.end as u32),
        right.global_range(mid.right.start as u32..mid.right.end as u32),
    );
    emit_region(left, right, acc, mid.left.end..n, mid.right.end..m);
    Ok(Outcome::Solved)
}

/// The region on one side of the mid-snake: unsolved when both sides are
/// non-empty, otherwise a plain deletion or insertion.
fn emit_region(
    left: Section<'_, '_>,
    right: Section<'_, '_>,
    acc: &mut Accumulator<'_>,
    l: Range<i32>,
    r: Range<i32>,
) {
    let solved = l.is_empty() || r.is_empty();
    acc.add(
        solved,
        left.global_range(l.start as u32..l.end as u32),
        right.global_range(r.start as u32..r.end as u32),
    );
}
