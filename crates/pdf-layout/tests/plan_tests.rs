use pdf_layout::PlanningError;
use pdf_layout::geometry::PdfRect;
use pdf_layout::plan::*;
use proptest::prelude::*;

fn ranges(plan: &SplitPlan) -> Vec<(usize, usize)> {
    plan.iter().map(|r| (r.start, r.end)).collect()
}

fn assert_partition(plan: &SplitPlan, page_count: usize) {
    let mut next = 0;
    for range in plan.iter() {
        assert_eq!(range.start, next, "ranges must be contiguous");
        assert!(!range.is_empty());
        next = range.end;
    }
    assert_eq!(next, page_count);
}

proptest! {
    #[test]
    fn prop_interval_split_partitions(page_count in 1usize..500, interval in 1usize..600) {
        let plan = plan_interval_split(page_count, interval).unwrap();
        assert_partition(&plan, page_count);
        prop_assert_eq!(plan.len(), page_count.div_ceil(interval));
        prop_assert!(plan.iter().all(|r| r.len() <= interval));
    }

    #[test]
    fn prop_predicate_split_partitions(
        (page_count, triggers) in (1usize..200).prop_flat_map(|n| {
            (Just(n), proptest::collection::vec(0..n, 0..20))
        })
    ) {
        let plan = plan_predicate_split(page_count, &triggers).unwrap();
        assert_partition(&plan, page_count);
        for &t in triggers.iter().filter(|&&t| t != 0) {
            prop_assert!(plan.iter().any(|r| r.start == t));
        }
    }
}

#[test]
fn test_ten_pages_every_three() {
    let plan = plan_interval_split(10, 3).unwrap();
    assert_eq!(ranges(&plan), vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
    assert_eq!(plan.len(), 4);
    assert_eq!(plan.ranges()[3].len(), 1);
}

#[test]
fn test_interval_covering_whole_document() {
    assert_eq!(ranges(&plan_interval_split(7, 7).unwrap()), vec![(0, 7)]);
    assert_eq!(ranges(&plan_interval_split(7, 100).unwrap()), vec![(0, 7)]);
}

#[test]
fn test_interval_split_errors() {
    assert_eq!(
        plan_interval_split(10, 0),
        Err(PlanningError::InvalidInterval(0))
    );
    assert_eq!(plan_interval_split(0, 3), Err(PlanningError::EmptyDocument));
}

#[test]
fn test_trigger_at_zero_is_ignored() {
    let plan = plan_predicate_split(5, &[0, 2, 4]).unwrap();
    assert_eq!(ranges(&plan), vec![(0, 2), (2, 4), (4, 5)]);
}

#[test]
fn test_triggers_are_sorted_and_deduplicated() {
    let plan = plan_predicate_split(6, &[4, 2, 2, 4]).unwrap();
    assert_eq!(ranges(&plan), vec![(0, 2), (2, 4), (4, 6)]);
    assert_eq!(ranges(&plan_predicate_split(3, &[]).unwrap()), vec![(0, 3)]);
}

#[test]
fn test_trigger_out_of_range() {
    assert_eq!(
        plan_predicate_split(5, &[2, 5]),
        Err(PlanningError::PageOutOfRange {
            index: 5,
            page_count: 5
        })
    );
}

#[test]
fn test_trigger_pages_where() {
    assert_eq!(trigger_pages_where(10, |i| i % 4 == 0), vec![0, 4, 8]);
}

#[test]
fn test_merge_rejects_missing_source() {
    let sources = [SourceDescriptor::new("a", 3), SourceDescriptor::new("b", 2)];
    let ordering = [MergePlanEntry::new(0, 0), MergePlanEntry::new(2, 0)];
    assert_eq!(
        build_merge_plan(&sources, &ordering),
        Err(PlanningError::SourceOutOfRange {
            index: 2,
            source_count: 2
        })
    );
}

#[test]
fn test_merge_rejects_missing_page() {
    let sources = [SourceDescriptor::new("a", 3), SourceDescriptor::new("b", 2)];
    let ordering = [MergePlanEntry::new(1, 2)];
    assert_eq!(
        build_merge_plan(&sources, &ordering),
        Err(PlanningError::SourcePageOutOfRange {
            source_index: 1,
            index: 2,
            page_count: 2
        })
    );
}

#[test]
fn test_merge_rejects_bad_rotation_and_empty_plan() {
    let sources = [SourceDescriptor::new("a", 1)];
    assert_eq!(
        build_merge_plan(&sources, &[MergePlanEntry::new(0, 0).rotated(45)]),
        Err(PlanningError::InvalidRotation(45))
    );
    assert_eq!(build_merge_plan(&sources, &[]), Err(PlanningError::EmptyPlan));
}

#[test]
fn test_merge_keeps_user_order_and_repeats() {
    let sources = [
        SourceDescriptor::with_rotations("a", vec![0, 90]),
        SourceDescriptor::new("b", 2),
    ];
    let ordering = [
        MergePlanEntry::new(1, 1),
        MergePlanEntry::new(0, 1).rotated(270),
        MergePlanEntry::new(0, 1).rotated(-90),
        MergePlanEntry::new(1, 1),
    ];
    let plan = build_merge_plan(&sources, &ordering).unwrap();
    assert_eq!(plan.entries(), &ordering);
    assert_eq!(plan.output_rotations(), &[0, 0, 0, 0]);
}

#[test]
fn test_initial_ordering_is_valid() {
    let sources = [SourceDescriptor::new("a", 2), SourceDescriptor::new("b", 3)];
    let ordering = initial_ordering(&sources);
    let plan = build_merge_plan(&sources, &ordering).unwrap();
    assert_eq!(plan.len(), 5);
    assert_eq!(plan.entries()[2], MergePlanEntry::new(1, 0));
}

#[test]
fn test_spread_makes_identical_copies() {
    let mut set = PlacementSet::new();
    let id = set.add(1, PdfRect::new(10.0, 20.0, 30.0, 40.0), 15.0);
    let copies = set.spread_to_all_pages(id, 4).unwrap();
    assert_eq!(copies.len(), 3);
    assert_eq!(set.len(), 4);

    let original = *set.get(id).unwrap();
    let pages: Vec<usize> = copies
        .iter()
        .map(|&copy| {
            let item = set.get(copy).unwrap();
            assert_eq!(item.rect(), original.rect());
            assert_eq!(item.rotation_deg, 15.0);
            item.page_index
        })
        .collect();
    assert_eq!(pages, vec![0, 2, 3]);

    // Every id is distinct
    let mut ids: Vec<_> = set.items().iter().map(|item| item.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_spread_pure_function() {
    let mut set = PlacementSet::new();
    let id = set.add(0, PdfRect::new(0.0, 0.0, 5.0, 5.0), 0.0);
    let item = *set.get(id).unwrap();

    let mut counter = 100;
    let copies = spread_to_all_pages(&item, 3, || {
        counter += 1;
        let mut scratch = PlacementSet::new();
        scratch.add(0, PdfRect::default(), 0.0)
    })
    .unwrap();
    assert_eq!(counter, 102);
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|c| c.rect() == item.rect()));

    assert_eq!(
        spread_to_all_pages(&item, 0, || id),
        Err(PlanningError::PageOutOfRange {
            index: 0,
            page_count: 0
        })
    );
}

#[test]
fn test_placement_edits() {
    let mut set = PlacementSet::new();
    let a = set.add(0, PdfRect::new(0.0, 0.0, 10.0, 10.0), 0.0);
    let b = set.add(1, PdfRect::new(0.0, 0.0, 10.0, 10.0), 0.0);
    set.move_to(a, 50.0, 60.0).unwrap();
    set.resize(a, 20.0, 25.0).unwrap();
    assert_eq!(set.get(a).unwrap().rect(), PdfRect::new(50.0, 60.0, 20.0, 25.0));
    assert_eq!(set.on_page(1).map(|i| i.id).collect::<Vec<_>>(), vec![b]);

    set.remove(b).unwrap();
    assert_eq!(set.move_to(b, 0.0, 0.0), Err(PlanningError::UnknownPlacement(b)));
}

#[test]
fn test_placement_edits_reject_bad_geometry() {
    let mut set = PlacementSet::new();
    let a = set.add(0, PdfRect::new(5.0, 5.0, 10.0, 10.0), 0.0);

    assert!(matches!(
        set.move_to(a, f64::NAN, 0.0),
        Err(PlanningError::InvalidPlacementGeometry { id, .. }) if id == a
    ));
    assert!(set.move_to(a, 0.0, f64::INFINITY).is_err());
    assert!(set.resize(a, -5.0, 10.0).is_err());
    assert!(set.resize(a, 10.0, 0.0).is_err());
    assert!(set.resize(a, f64::NAN, 10.0).is_err());

    // Rejected edits leave the item where it was
    assert_eq!(set.get(a).unwrap().rect(), PdfRect::new(5.0, 5.0, 10.0, 10.0));

    // Off-page positions are still finite and allowed
    set.move_to(a, -20.0, 900.0).unwrap();
    assert_eq!(set.get(a).unwrap().x_pt, -20.0);
}
