//! Scanline union of same-layer rectangles into a disjoint cover.

use std::collections::BTreeSet;

use crate::geometry::{Boundary, Bounds, Dbu, DbuXy, Dimension};

/// Merge `source` into disjoint rectangles covering the same area.
///
/// Stripes are cut at every `dim` coordinate of the input. Inside a stripe
/// the perpendicular intervals of the rectangles crossing it are joined when
/// they touch or overlap, and a run that continues unchanged into the next
/// stripe keeps growing instead of being emitted twice. Zero-area input
/// rectangles do not contribute, unless every input rectangle is
/// degenerate: then the input is returned as is.
pub fn merge_bounds(source: &[Bounds], dim: Dimension) -> Vec<Bounds> {
    if source.len() < 2 {
        return source.to_vec();
    }
    let reverse = dim.reverse();

    let mut stripes = BTreeSet::new();
    let mut lower = DbuXy::default();
    let mut upper = DbuXy::default();
    lower[reverse] = Dbu::MAX;
    upper[reverse] = -Dbu::MAX;
    for bound in source {
        stripes.insert(bound.lower[dim]);
        stripes.insert(bound.upper[dim]);
        lower[reverse] = lower[reverse].min(bound.lower[reverse]);
        upper[reverse] = upper[reverse].max(bound.upper[reverse]);
    }

    let mut target = Vec::with_capacity(source.len());
    let mut open: Vec<Bounds> = Vec::new();
    let mut spans: Vec<(Dbu, Dbu)> = Vec::with_capacity(source.len());
    let boundaries: Vec<Dbu> = stripes.into_iter().collect();
    for pair in boundaries.windows(2) {
        lower[dim] = pair[0];
        upper[dim] = pair[1];
        let stripe = Bounds::from_corners(lower, upper);

        spans.clear();
        spans.extend(
            source
                .iter()
                .filter(|rect| rect.overlaps(&stripe))
                .map(|rect| (rect.lower[reverse], rect.upper[reverse])),
        );
        spans.sort_unstable();

        let mut continued = Vec::with_capacity(open.len());
        for (low, upp) in join_spans(&spans) {
            let existing = open.iter().position(|run| {
                run[Boundary::Lower][reverse] == low && run[Boundary::Upper][reverse] == upp
            });
            match existing {
                Some(index) => {
                    let mut run = open.swap_remove(index);
                    run.upper[dim] = stripe.upper[dim];
                    continued.push(run);
                }
                None => {
                    let mut run = stripe;
                    run.lower[reverse] = low;
                    run.upper[reverse] = upp;
                    continued.push(run);
                }
            }
        }
        target.append(&mut open);
        open = continued;
    }
    target.append(&mut open);
    if target.is_empty() {
        return source.to_vec();
    }
    target
}

/// Join sorted intervals whose ends touch or overlap.
fn join_spans(sorted: &[(Dbu, Dbu)]) -> Vec<(Dbu, Dbu)> {
    let mut runs: Vec<(Dbu, Dbu)> = Vec::with_capacity(sorted.len());
    for &(low, upp) in sorted {
        match runs.last_mut() {
            Some(last) if low <= last.1 => last.1 = last.1.max(upp),
            _ => runs.push((low, upp)),
        }
    }
    runs
}
