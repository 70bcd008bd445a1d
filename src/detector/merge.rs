//! Consolidation of raw staff hypotheses
//!
//! Two complementary passes: connectivity of the rendered hypotheses in pixel
//! space, then proximity of staff bounds in bounding-box space.

use std::collections::BTreeSet;

use super::connected_components::ComponentLabels;
use super::tolerance::Tolerances;
use crate::models::{Staff, StaffBounds};
use crate::utils::render::render_staffs;

/// Render every hypothesis, label the result and fold each component into the
/// staff line owning its top-left pixel
///
/// Staffs that own no component are dropped. The result is ordered by top bound.
pub fn merge_components(
    staffs: Vec<Staff>,
    tol: &Tolerances,
    width: usize,
    height: usize,
) -> Vec<Staff> {
    let hypotheses = render_staffs(&staffs, width, height, tol.line_thickness);
    let components = ComponentLabels::label(&hypotheses, true).components();
    let mut staffs = staffs;
    let mut matched = vec![false; staffs.len()];
    let mut orphans = 0usize;

    for points in components.values() {
        let Some(&probe) = points.first() else {
            continue;
        };
        let owner = staffs
            .iter()
            .enumerate()
            .find_map(|(si, staff)| staff.line_containing(probe, tol).map(|li| (si, li)));
        match owner {
            Some((si, li)) => {
                staffs[si].extend_line(li, points.iter().copied());
                matched[si] = true;
            }
            None => orphans += 1,
        }
    }

    let before = staffs.len();
    let mut kept: Vec<Staff> = staffs
        .into_iter()
        .zip(matched)
        .filter_map(|(staff, hit)| hit.then_some(staff))
        .collect();
    kept.sort_by(|a, b| a.cmp_top(b));

    log::debug!(
        "component merge: {} components ({} unowned), {} of {} staffs kept",
        components.len(),
        orphans,
        kept.len(),
        before
    );
    kept
}

/// Indices of staffs whose key lies in `[center - margin, center + margin]`
///
/// `order` must be sorted ascending by `key`.
fn query_band<F>(order: &[usize], key: F, center: i32, margin: i32) -> impl Iterator<Item = usize>
where
    F: Fn(usize) -> i32,
{
    let start = order.partition_point(|&j| key(j) < center - margin);
    order[start..]
        .iter()
        .copied()
        .take_while(move |&j| key(j) <= center + margin)
}

/// Merge hypotheses of the same physical staff that were detected apart
///
/// Staffs are grouped when their top bounds, or their bottom bounds, lie
/// within `tol.staff_margin` of an unchecked staff. A group survives only if
/// the summed coverage of its members reaches `min_width`. Every staff is a
/// query target at most once.
pub fn merge_separated(staffs: Vec<Staff>, tol: &Tolerances, min_width: i32) -> Vec<Staff> {
    let margin = tol.staff_margin;
    let bounds: Vec<StaffBounds> = staffs.iter().map(Staff::bounds).collect();

    let mut by_top: Vec<usize> = (0..staffs.len()).collect();
    by_top.sort_by(|&a, &b| staffs[a].cmp_top(&staffs[b]));
    let mut by_bottom: Vec<usize> = (0..staffs.len()).collect();
    by_bottom.sort_by(|&a, &b| staffs[a].cmp_bottom(&staffs[b]));

    let mut slots: Vec<Option<Staff>> = staffs.into_iter().map(Some).collect();
    let mut checked = vec![false; slots.len()];
    let mut accepted = Vec::new();
    let mut discarded = 0usize;

    for &i in &by_top {
        if checked[i] {
            continue;
        }
        let b = bounds[i];

        let mut group: BTreeSet<usize> = query_band(&by_top, |j| bounds[j].top, b.top, margin)
            .chain(query_band(&by_bottom, |j| bounds[j].bottom, b.bottom, margin))
            .filter(|&j| !checked[j])
            .collect();
        group.insert(i);

        let Some(mut seed) = slots[i].take() else {
            continue;
        };
        let mut coverage = 0;
        for &j in &group {
            checked[j] = true;
            coverage += bounds[j].horizontal_coverage;
            if j == i {
                continue;
            }
            if let Some(other) = slots[j].take() {
                seed.add_staff(&other);
            }
        }

        if coverage >= min_width {
            log::trace!(
                "staff top={} bottom={} from {} hypotheses, coverage {}",
                seed.top_bound(),
                seed.bottom_bound(),
                group.len(),
                coverage
            );
            accepted.push(seed);
        } else {
            discarded += 1;
        }
    }

    accepted.sort_by(|a, b| a.cmp_top(b));
    log::debug!(
        "separated merge: {} staffs accepted, {} groups below {} columns discarded",
        accepted.len(),
        discarded,
        min_width
    );
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::detector::metrics::StaffMetrics;
    use crate::models::{Point, StaffLine};

    fn tolerances() -> Tolerances {
        tolerances_for(2, 8)
    }

    fn tolerances_for(height: i32, distance: i32) -> Tolerances {
        let mut metrics = StaffMetrics::new();
        for _ in 0..10 {
            metrics.record_line_height(height);
            metrics.record_line_distance(distance);
        }
        Tolerances::from_metrics(&metrics, &ScanConfig::default()).unwrap()
    }

    fn thick_staff(x0: i32, x1: i32, top: i32, thickness: i32) -> Staff {
        Staff::new(std::array::from_fn(|i| {
            let y = top + (thickness + 8) * i as i32;
            StaffLine::from_points(
                (x0..x1).flat_map(|x| (y..y + thickness).map(move |row| Point::new(x, row))),
            )
        }))
    }

    fn staff(x0: i32, x1: i32, top: i32) -> Staff {
        Staff::new(std::array::from_fn(|i| {
            let y = top + 10 * i as i32;
            StaffLine::from_points((x0..x1).flat_map(|x| [Point::new(x, y), Point::new(x, y + 1)]))
        }))
    }

    #[test]
    fn test_component_merge_keeps_intact_staff() {
        let tol = tolerances();
        let merged = merge_components(vec![staff(0, 200, 10)], &tol, 200, 70);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0], staff(0, 200, 10));
    }

    #[test]
    fn test_component_merge_adds_no_rows_for_any_thickness() {
        for thickness in 1..=3 {
            let tol = tolerances_for(thickness, 8);
            let split = vec![
                thick_staff(0, 100, 10, thickness),
                thick_staff(100, 200, 10, thickness),
            ];
            let merged = merge_components(split, &tol, 200, 70);
            assert_eq!(merged.len(), 1, "thickness {}", thickness);
            assert_eq!(merged[0], thick_staff(0, 200, 10, thickness));
            assert_eq!(merged[0].top_bound(), 10);
            assert_eq!(merged[0].bottom_bound(), 10 + 4 * (thickness + 8) + thickness - 1);
        }
    }

    #[test]
    fn test_component_merge_drops_shadowed_duplicate() {
        let tol = tolerances();
        let merged = merge_components(vec![staff(0, 200, 10), staff(50, 150, 10)], &tol, 200, 70);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].horizontal_coverage(), 200);
    }

    #[test]
    fn test_component_merge_joins_fragment_touching_hypothesis() {
        let tol = tolerances();
        // Second hypothesis starts where the first ends, so the rendered
        // strokes touch and both become one component per line
        let merged = merge_components(vec![staff(0, 100, 10), staff(100, 160, 10)], &tol, 200, 70);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].horizontal_coverage(), 160);
        assert_eq!(merged[0].right_bound(), 159);
    }

    #[test]
    fn test_separated_merge_joins_split_staff() {
        let tol = tolerances();
        let merged = merge_separated(vec![staff(110, 200, 10), staff(0, 90, 10)], &tol, 100);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].horizontal_coverage(), 180);
        assert_eq!(merged[0].left_bound(), 0);
        assert_eq!(merged[0].right_bound(), 199);
    }

    #[test]
    fn test_separated_merge_respects_margin() {
        let tol = tolerances();
        assert_eq!(tol.staff_margin, 4);
        let merged = merge_separated(vec![staff(0, 200, 10), staff(0, 200, 15)], &tol, 100);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].top_bound(), 10);
        assert_eq!(merged[1].top_bound(), 15);

        let close = merge_separated(vec![staff(0, 200, 10), staff(0, 200, 14)], &tol, 100);
        assert_eq!(close.len(), 1);
    }

    #[test]
    fn test_separated_merge_discards_short_groups() {
        let tol = tolerances();
        let merged = merge_separated(
            vec![staff(0, 40, 10), staff(60, 100, 10), staff(0, 200, 100)],
            &tol,
            100,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].top_bound(), 100);
    }

    #[test]
    fn test_separated_merge_is_idempotent() {
        let tol = tolerances();
        let once = merge_separated(
            vec![staff(0, 90, 10), staff(110, 200, 10), staff(0, 200, 100)],
            &tol,
            100,
        );
        let twice = merge_separated(once.clone(), &tol, 100);
        assert_eq!(once, twice);
    }
}
