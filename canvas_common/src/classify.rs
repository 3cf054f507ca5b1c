// Copyright 2025 the Vello Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping of untagged glyph contours into outer boundaries and their holes.
//!
//! Font outlines hand out one contour per sub-path without saying which ones are holes.
//! A contour is classified by casting a ray from its first vertex towards `+x` and counting
//! how often it crosses every other contour: an even total makes it an outer boundary, an
//! odd total a hole. Rays passing exactly through a vertex are not treated specially, so
//! degenerate outlines may be misclassified.

use crate::earcut::Earcut;
use crate::kurbo::Point;
use smallvec::SmallVec;

/// One outer contour together with the holes that belong to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourGroup {
    /// Index of the outer contour.
    pub outer: usize,
    /// Indices of the hole contours, in increasing order.
    pub holes: SmallVec<[usize; 4]>,
}

/// Classify `contours` and group the holes under their outer contours.
///
/// Groups are ordered by the index of their outer contour. A hole is assigned to every
/// outer contour it crosses an odd number of times. Empty contours are ignored.
pub fn classify_contours<C: AsRef<[Point]>>(contours: &[C]) -> Vec<ContourGroup> {
    let n = contours.len();
    // crossings[i * n + j]: how often the ray of contour `i` crosses contour `j`.
    let mut crossings = vec![0_u32; n * n];

    for (i, contour) in contours.iter().enumerate() {
        let Some(&origin) = contour.as_ref().first() else {
            continue;
        };
        for (j, other) in contours.iter().enumerate() {
            if i != j {
                crossings[i * n + j] = ray_crossings(origin, other.as_ref());
            }
        }
    }

    let is_outer: Vec<bool> = (0..n)
        .map(|i| {
            !contours[i].as_ref().is_empty()
                && crossings[i * n..(i + 1) * n].iter().sum::<u32>() % 2 == 0
        })
        .collect();

    (0..n)
        .filter(|&outer| is_outer[outer])
        .map(|outer| ContourGroup {
            outer,
            holes: (0..n)
                .filter(|&hole| {
                    !contours[hole].as_ref().is_empty()
                        && !is_outer[hole]
                        && crossings[hole * n + outer] % 2 == 1
                })
                .collect(),
        })
        .collect()
}

/// Render groups in the sentinel layout `[outer, hole0, hole1, ..., -1, outer, ...]`.
pub fn flatten_groups(groups: &[ContourGroup]) -> Vec<i32> {
    let mut out = Vec::with_capacity(groups.iter().map(|g| g.holes.len() + 2).sum());
    for group in groups {
        out.push(group.outer as i32);
        out.extend(group.holes.iter().map(|&h| h as i32));
        out.push(-1);
    }
    out
}

/// Classify glyph contours and triangulate every resulting group.
///
/// Indices refer to the vertices of `contours` flattened in input order.
pub fn classify_and_triangulate<C: AsRef<[Point]>>(contours: &[C]) -> Vec<u32> {
    let mut out = Vec::new();
    Earcut::new().triangulate_contours(contours, &mut out);
    out
}

impl Earcut {
    /// Like [`classify_and_triangulate`], reusing this triangulator and `out`.
    ///
    /// `out` is cleared first.
    pub fn triangulate_contours<C: AsRef<[Point]>>(&mut self, contours: &[C], out: &mut Vec<u32>) {
        out.clear();

        let mut offsets = Vec::with_capacity(contours.len());
        let mut offset = 0_u32;
        for contour in contours {
            offsets.push(offset);
            offset += contour.as_ref().len() as u32;
        }

        let mut local = Vec::new();
        let mut to_global: Vec<u32> = Vec::new();
        for group in classify_contours(contours) {
            let holes: SmallVec<[&[Point]; 4]> =
                group.holes.iter().map(|&h| contours[h].as_ref()).collect();

            to_global.clear();
            for &c in core::iter::once(&group.outer).chain(&group.holes) {
                let len = contours[c].as_ref().len() as u32;
                to_global.extend(offsets[c]..offsets[c] + len);
            }

            self.triangulate(contours[group.outer].as_ref(), &holes[..], &mut local);
            out.extend(local.iter().map(|&i| to_global[i as usize]));
        }
    }
}

/// Count the crossings of the ray from `origin` towards `+x` with the edges of `contour`.
fn ray_crossings(origin: Point, contour: &[Point]) -> u32 {
    let Some(&last) = contour.last() else {
        return 0;
    };

    let mut count = 0;
    let mut a = last;
    for &b in contour {
        let (min_y, max_y) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
        // Half-open in y, so a ray through a shared vertex counts only one of its edges.
        if a != b && min_y < origin.y && origin.y <= max_y {
            let x = a.x + (origin.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x > origin.x {
                count += 1;
            }
        }
        a = b;
    }
    count
}
