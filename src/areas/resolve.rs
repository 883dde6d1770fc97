//! Overlap resolution and pruning for the rectangles of one page.

use std::collections::VecDeque;

use crate::geometry::Rect;

/// Make the rectangle sets pairwise disjoint.
///
/// For every pair `i < j` the earlier set is cut: each of its rectangles
/// that intersects a rectangle of the later set is replaced by the
/// difference. Sets only ever shrink, so a pair once made disjoint stays
/// disjoint. A cut set has its pairs checked again from the top.
///
/// `max_steps` bounds the number of rectangle differences performed. When
/// it runs out, the remaining overlapping rectangles of the earlier set are
/// dropped instead of cut. Returns `false` in that case.
pub(crate) fn resolve_overlaps(sets: &mut [Vec<Rect>], max_steps: usize) -> bool {
    let n = sets.len();
    let mut queue: VecDeque<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();
    let mut steps = 0usize;
    let mut exhausted = false;

    while let Some((i, j)) = queue.pop_front() {
        if !overlaps(&sets[i], &sets[j]) {
            continue;
        }

        let cutters = sets[j].clone();
        let mut pieces = std::mem::take(&mut sets[i]);
        for cut in &cutters {
            if exhausted {
                pieces.retain(|r| !r.intersects(cut));
                continue;
            }
            let mut next = Vec::with_capacity(pieces.len());
            for rect in &pieces {
                if rect.intersects(cut) {
                    steps += 1;
                    next.extend(rect.difference(cut));
                } else {
                    next.push(*rect);
                }
            }
            pieces = next;
            if steps > max_steps {
                log::warn!("overlap resolution exceeded {max_steps} steps; dropping overlaps");
                exhausted = true;
            }
        }
        sets[i] = pieces;

        queue.extend((i + 1..n).filter(|&k| k != j).map(|k| (i, k)));
    }

    !exhausted
}

/// Keep only rectangles that cover at least part of one of `content`.
pub(crate) fn prune_empty(rects: &mut Vec<Rect>, content: &[Rect]) {
    rects.retain(|r| content.iter().any(|c| r.intersects(c)));
}

fn overlaps(a: &[Rect], b: &[Rect]) -> bool {
    a.iter().any(|r| b.iter().any(|s| r.intersects(s)))
}
