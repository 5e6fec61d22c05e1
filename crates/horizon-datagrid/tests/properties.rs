//! Algebraic properties of track sets, repeat geometry and sealed
//! dictionaries.

use horizon_datagrid::data::RowKey;
use horizon_datagrid::flow::{RepeatOrientation, RepeatPosition};
use horizon_datagrid::grid::{Axis, GridLength, GridTrack, TrackSet};
use horizon_datagrid::validation::{MessageGroup, ValidationDictionary, ValidationMessage};
use proptest::prelude::*;

fn arb_track_set() -> impl Strategy<Value = TrackSet> {
    prop::collection::vec((0usize..40, 1u8..50), 0..20).prop_map(|tracks| {
        TrackSet::new(
            Axis::Vertical,
            tracks
                .into_iter()
                .map(|(ordinal, len)| {
                    GridTrack::new(Axis::Vertical, ordinal, GridLength::Fixed(f32::from(len)))
                }),
        )
    })
}

fn arb_dictionary() -> impl Strategy<Value = ValidationDictionary> {
    prop::collection::btree_map(0u64..30, 1usize..4, 0..10).prop_map(|rows| {
        let mut dict = ValidationDictionary::new();
        for (row, count) in rows {
            let group: MessageGroup = (0..count)
                .map(|i| ValidationMessage::error(format!("m{i}"), format!("row {row}")))
                .collect();
            dict.insert_mut(RowKey(row), group);
        }
        dict.seal()
    })
}

proptest! {
    /// Merge keeps the same ordinals whichever side comes first.
    #[test]
    fn prop_merge_commutative_in_content(a in arb_track_set(), b in arb_track_set()) {
        let ab: Vec<usize> = TrackSet::merge(&a, &b).ordinals().collect();
        let ba: Vec<usize> = TrackSet::merge(&b, &a).ordinals().collect();
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn prop_merge_idempotent(a in arb_track_set()) {
        prop_assert_eq!(TrackSet::merge(&a, &a), a);
    }

    /// The merge is sorted, duplicate free, and covers both inputs.
    #[test]
    fn prop_merge_is_ordered_union(a in arb_track_set(), b in arb_track_set()) {
        let merged = TrackSet::merge(&a, &b);
        let ordinals: Vec<usize> = merged.ordinals().collect();
        prop_assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(a.ordinals().chain(b.ordinals()).all(|o| merged.contains(o)));
        prop_assert_eq!(merged.len(), ordinals.len());
    }

    /// Tracks present in both inputs come from the left one.
    #[test]
    fn prop_merge_left_biased(a in arb_track_set(), b in arb_track_set()) {
        let merged = TrackSet::merge(&a, &b);
        for track in a.iter() {
            let found = merged.iter().find(|t| t.ordinal() == track.ordinal());
            prop_assert_eq!(found, Some(track));
        }
    }

    /// Y and X visit every slot of the region exactly once.
    #[test]
    fn prop_positions_cover_region(x in 1usize..6, y in 1usize..6) {
        let dim = horizon_datagrid::flow::RepeatDimension::new(x, y);
        for orientation in [RepeatOrientation::Y, RepeatOrientation::X] {
            let mut seen: Vec<RepeatPosition> = (0..dim.area())
                .map(|n| orientation.position(n, dim))
                .collect();
            prop_assert!(seen.iter().all(|p| p.x < x && p.y < y));
            seen.sort_by_key(|p| (p.x, p.y));
            seen.dedup();
            prop_assert_eq!(seen.len(), dim.area());
        }
    }

    #[test]
    fn prop_z_always_origin(n in 0usize..1000, x in 1usize..6, y in 1usize..6) {
        let dim = horizon_datagrid::flow::RepeatDimension::new(x, y);
        prop_assert_eq!(RepeatOrientation::Z.position(n, dim), RepeatPosition::new(0, 0));
    }

    /// Adding then removing a fresh row restores the content and leaves the
    /// original instance untouched.
    #[test]
    fn prop_dictionary_add_remove_restores(dict in arb_dictionary(), row in 30u64..60) {
        let before = dict.clone();
        let group: MessageGroup =
            std::iter::once(ValidationMessage::error("new", "added")).collect();
        let added = dict.add(RowKey(row), group);
        prop_assert!(added.contains(RowKey(row)));
        prop_assert!(!dict.contains(RowKey(row)));
        let restored = added.remove(RowKey(row));
        prop_assert_eq!(&restored, &dict);
        prop_assert_eq!(&dict, &before);
        prop_assert!(restored.is_sealed() && added.is_sealed());
    }
}
