//! Padding strategies for the geometry/texture images' unoccupied
//! background pixels (spec §4.5 item 4). All four apply to a
//! `Plane<u8, 3>` in place; callers run whichever strategy the encoder
//! config picks (all four are kept since a decoder-side dilation must
//! match whatever the encoder used).

use crate::video::Plane;
use std::collections::VecDeque;

/// Breadth-first "paint by nearest occupied neighbour" dilation: spreads
/// each occupied pixel's colour outward into unoccupied neighbours,
/// closest first, matching the teacher's `heightmap.rs` flood-fill
/// `VecDeque`-based BFS.
pub fn dilate_bfs(plane: &mut Plane<u8, 3>, occupancy: &Plane<u8, 1>, iterations: usize) {
    let (w, h) = (plane.width, plane.height);
    let mut filled = vec![false; w * h];
    let mut queue = VecDeque::new();
    for y in 0..h {
        for x in 0..w {
            if *occupancy.get(x, y, 0) != 0 {
                filled[y * w + x] = true;
                queue.push_back((x, y));
            }
        }
    }

    for _ in 0..iterations {
        let mut next = VecDeque::new();
        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if filled[ny * w + nx] {
                    continue;
                }
                filled[ny * w + nx] = true;
                for c in 0..3 {
                    let v = *plane.get(x, y, c);
                    plane.set(nx, ny, c, v);
                }
                next.push_back((nx, ny));
            }
        }
        queue = next;
        if queue.is_empty() {
            break;
        }
    }
}

/// Solves a discrete Laplace equation (each unoccupied pixel becomes the
/// average of its occupied/already-solved neighbours) via Gauss-Seidel
/// relaxation, producing a smooth harmonic fill of the background
/// instead of BFS's blocky nearest-colour spread.
pub fn harmonic_fill(plane: &mut Plane<u8, 3>, occupancy: &Plane<u8, 1>, passes: usize) {
    let (w, h) = (plane.width, plane.height);
    let mut values: Vec<[f64; 3]> = (0..w * h)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            [
                *plane.get(x, y, 0) as f64,
                *plane.get(x, y, 1) as f64,
                *plane.get(x, y, 2) as f64,
            ]
        })
        .collect();
    let occupied: Vec<bool> = (0..w * h)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            *occupancy.get(x, y, 0) != 0
        })
        .collect();

    for _ in 0..passes {
        for y in 0..h {
            for x in 0..w {
                let idx = y * w + x;
                if occupied[idx] {
                    continue;
                }
                let mut sum = [0.0f64; 3];
                let mut count = 0.0;
                for (dx, dy) in [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)] {
                    let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                    if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                        continue;
                    }
                    let n_idx = ny as usize * w + nx as usize;
                    for c in 0..3 {
                        sum[c] += values[n_idx][c];
                    }
                    count += 1.0;
                }
                if count > 0.0 {
                    for c in 0..3 {
                        values[idx][c] = sum[c] / count;
                    }
                }
            }
        }
    }

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if occupied[idx] {
                continue;
            }
            for c in 0..3 {
                plane.set(x, y, c, values[idx][c].round().clamp(0.0, 255.0) as u8);
            }
        }
    }
}

/// Push-pull pyramidal fill: downsample in a mip chain averaging only
/// occupied pixels, then upsample back, blending each level's fill into
/// gaps the finer level couldn't reach, followed by a one-pixel
/// smoothing pass — cheaper than [`harmonic_fill`] for large background
/// areas.
pub fn push_pull_smoothed(plane: &mut Plane<u8, 3>, occupancy: &Plane<u8, 1>) {
    let (w, h) = (plane.width, plane.height);
    if w < 2 || h < 2 {
        return;
    }

    let mut levels: Vec<(usize, usize, Vec<[f64; 3]>, Vec<bool>)> = Vec::new();
    {
        let values: Vec<[f64; 3]> = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                [
                    *plane.get(x, y, 0) as f64,
                    *plane.get(x, y, 1) as f64,
                    *plane.get(x, y, 2) as f64,
                ]
            })
            .collect();
        let occ: Vec<bool> = (0..w * h)
            .map(|i| {
                let (x, y) = (i % w, i / w);
                *occupancy.get(x, y, 0) != 0
            })
            .collect();
        levels.push((w, h, values, occ));
    }

    while levels.last().unwrap().0 > 1 && levels.last().unwrap().1 > 1 {
        let (pw, ph, pv, po) = levels.last().unwrap();
        let (nw, nh) = (pw / 2, ph / 2);
        let mut values = vec![[0.0f64; 3]; nw * nh];
        let mut occ = vec![false; nw * nh];
        for ny in 0..nh {
            for nx in 0..nw {
                let mut sum = [0.0f64; 3];
                let mut count = 0.0;
                for dy in 0..2 {
                    for dx in 0..2 {
                        let idx = (ny * 2 + dy) * pw + (nx * 2 + dx);
                        if po[idx] {
                            for c in 0..3 {
                                sum[c] += pv[idx][c];
                            }
                            count += 1.0;
                        }
                    }
                }
                if count > 0.0 {
                    for c in 0..3 {
                        values[ny * nw + nx][c] = sum[c] / count;
                    }
                    occ[ny * nw + nx] = true;
                }
            }
        }
        levels.push((nw, nh, values, occ));
    }

    for level in (0..levels.len() - 1).rev() {
        let (pw, _ph, pvalues, pocc) = levels[level + 1].clone();
        let (cw, ch, cvalues, cocc) = &mut levels[level];
        let (cw, ch) = (*cw, *ch);
        for cy in 0..ch {
            for cx in 0..cw {
                let idx = cy * cw + cx;
                if cocc[idx] {
                    continue;
                }
                let (py, px) = (cy / 2, cx / 2);
                let p_idx = py * pw + px;
                if pocc[p_idx] {
                    cvalues[idx] = pvalues[p_idx];
                    cocc[idx] = true;
                }
            }
        }
    }

    let (_, _, values, _) = &levels[0];
    for y in 0..h {
        for x in 0..w {
            if *occupancy.get(x, y, 0) != 0 {
                continue;
            }
            let v = values[y * w + x];
            for c in 0..3 {
                plane.set(x, y, c, v[c].round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    smooth_background_box_blur(plane, occupancy);
}

/// One-pass 3x3 box blur restricted to background pixels, smoothing the
/// seams a pyramidal fill leaves behind, using rayon over rows as the
/// teacher's `heightmap.rs` Gaussian blur does with `par_chunks_mut`.
fn smooth_background_box_blur(plane: &mut Plane<u8, 3>, occupancy: &Plane<u8, 1>) {
    use rayon::prelude::*;
    let (w, h) = (plane.width, plane.height);
    let source = plane.data.clone();
    plane
        .data
        .par_chunks_mut(w * 3)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..w {
                if *occupancy.get(x, y, 0) != 0 {
                    continue;
                }
                for c in 0..3 {
                    let mut sum = 0u32;
                    let mut count = 0u32;
                    for dy in -1i32..=1 {
                        for dx in -1i32..=1 {
                            let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                            if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                                continue;
                            }
                            let idx = (ny as usize * w + nx as usize) * 3 + c;
                            sum += source[idx] as u32;
                            count += 1;
                        }
                    }
                    row[x * 3 + c] = (sum / count.max(1)) as u8;
                }
            }
        });
}

/// Group dilation: pixels that belong to *any* patch's occupied block
/// in the same `occupancy_resolution`-sized block but fall outside that
/// patch's exact occupancy bit are filled from the block's average
/// colour, trading precision at patch boundaries for denser backgrounds
/// at block seams (spec §4.5 item 4, "group dilation").
pub fn group_dilation(plane: &mut Plane<u8, 3>, occupancy: &Plane<u8, 1>, block_size: usize) {
    let (w, h) = (plane.width, plane.height);
    for by in (0..h).step_by(block_size) {
        for bx in (0..w).step_by(block_size) {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for y in by..(by + block_size).min(h) {
                for x in bx..(bx + block_size).min(w) {
                    if *occupancy.get(x, y, 0) != 0 {
                        for c in 0..3 {
                            sum[c] += *plane.get(x, y, c) as u32;
                        }
                        count += 1;
                    }
                }
            }
            if count == 0 {
                continue;
            }
            let avg = [sum[0] / count, sum[1] / count, sum[2] / count];
            for y in by..(by + block_size).min(h) {
                for x in bx..(bx + block_size).min(w) {
                    if *occupancy.get(x, y, 0) == 0 {
                        for c in 0..3 {
                            plane.set(x, y, c, avg[c] as u8);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_pixel_plane(w: usize, h: usize) -> (Plane<u8, 3>, Plane<u8, 1>) {
        let mut plane: Plane<u8, 3> = Plane::new(w, h);
        let mut occ: Plane<u8, 1> = Plane::new(w, h);
        plane.set(0, 0, 0, 200);
        plane.set(0, 0, 1, 100);
        plane.set(0, 0, 2, 50);
        occ.set(0, 0, 0, 255);
        (plane, occ)
    }

    #[test]
    fn bfs_dilation_spreads_colour_outward() {
        let (mut plane, occ) = single_pixel_plane(4, 4);
        dilate_bfs(&mut plane, &occ, 4);
        assert_eq!(*plane.get(1, 0, 0), 200);
        assert_eq!(*plane.get(0, 1, 1), 100);
    }

    #[test]
    fn group_dilation_fills_block_with_average() {
        let (mut plane, occ) = single_pixel_plane(4, 4);
        group_dilation(&mut plane, &occ, 4);
        assert_eq!(*plane.get(3, 3, 0), 200);
    }

    #[test]
    fn harmonic_fill_leaves_occupied_pixels_untouched() {
        let (mut plane, occ) = single_pixel_plane(4, 4);
        harmonic_fill(&mut plane, &occ, 8);
        assert_eq!(*plane.get(0, 0, 0), 200);
    }
}
