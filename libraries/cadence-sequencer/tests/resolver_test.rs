//! Sequence resolution integration tests
//!
//! Walks over playlists and history with files disappearing underneath,
//! checking what gets returned and what gets pruned.

mod common;

use cadence_sequencer::{
    Directive, History, HistoryPolicy, PlaybackMode, Playlist, PruneReason, SequenceResolver,
    TrackRef,
};
use common::{init_tracing, track, tracks, MemoryOracle};
use std::collections::HashSet;

// ===== Test Helpers =====

fn resolver(oracle: &std::sync::Arc<MemoryOracle>) -> SequenceResolver {
    init_tracing();
    SequenceResolver::new(oracle.clone())
}

fn playlist_at(paths: &[&str], cursor: usize) -> Playlist {
    let mut playlist = Playlist::new();
    playlist.bulk_add(paths.iter().copied());
    playlist.select(cursor).unwrap();
    playlist
}

fn history_of(paths: &[&str]) -> History {
    let mut history = History::new();
    for path in paths {
        history.push(track(path));
    }
    history
}

// ===== Forward Resolution =====

#[tokio::test]
async fn repeat_all_walks_in_order_and_wraps() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 0);

    let mut played = Vec::new();
    for _ in 0..3 {
        let resolution = resolver
            .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
            .await;
        played.push(resolution.track.unwrap());
    }

    assert_eq!(played, tracks(&["b", "c", "a"]));
    assert_eq!(playlist.cursor(), Some(0));
}

#[tokio::test]
async fn missing_entry_is_pruned_and_next_slides_in() {
    let oracle = MemoryOracle::with(&["a", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 0);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, Some(track("c")));
    assert_eq!(playlist.entries(), tracks(&["a", "c"]).as_slice());
    assert_eq!(playlist.cursor(), Some(1));
    assert_eq!(resolution.pruned.len(), 1);
    assert_eq!(resolution.pruned[0].track, track("b"));
    assert_eq!(resolution.pruned[0].reason, PruneReason::Missing);
    assert!(resolution.playlist_changed());
}

#[tokio::test]
async fn pruning_last_entry_wraps_to_first() {
    let oracle = MemoryOracle::with(&["a", "b"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 1);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, Some(track("a")));
    assert_eq!(playlist.entries(), tracks(&["a", "b"]).as_slice());
}

#[tokio::test]
async fn repeat_one_stays_on_current_track() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 1);

    for _ in 0..3 {
        let resolution = resolver
            .next_track(&mut playlist, PlaybackMode::RepeatOne, Directive::Advance)
            .await;
        assert_eq!(resolution.track, Some(track("b")));
    }
}

#[tokio::test]
async fn repeat_one_force_advance_skips() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 1);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatOne, Directive::ForceAdvance)
        .await;

    assert_eq!(resolution.track, Some(track("c")));
}

#[tokio::test]
async fn vanished_repeat_one_target_falls_back_to_next_entry() {
    let oracle = MemoryOracle::with(&["a", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 1);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatOne, Directive::Advance)
        .await;

    // b pruned, walk continues as repeat-all instead of re-probing the slot
    assert_eq!(resolution.track, Some(track("c")));
    assert_eq!(playlist.entries(), tracks(&["a", "c"]).as_slice());
    assert_eq!(resolution.pruned[0].track, track("b"));
}

#[tokio::test]
async fn repeat_one_force_advance_onto_missing_entry() {
    let oracle = MemoryOracle::with(&["a", "b", "d"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c", "d"], 1);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatOne, Directive::ForceAdvance)
        .await;

    assert_eq!(resolution.track, Some(track("d")));
    assert_eq!(playlist.entries(), tracks(&["a", "b", "d"]).as_slice());
}

#[tokio::test]
async fn shuffle_only_returns_existing_entries() {
    let oracle = MemoryOracle::with(&["b", "d"]);
    let resolver = resolver(&oracle);
    let mut playlist = Playlist::new();
    playlist.bulk_add(["a", "b", "c", "d", "e"]);

    for _ in 0..20 {
        let resolution = resolver
            .next_track(&mut playlist, PlaybackMode::Shuffle, Directive::Advance)
            .await;
        let chosen = resolution.track.unwrap();
        assert!(chosen == track("b") || chosen == track("d"));
    }

    // Repeated shuffling eventually probes, and prunes, the missing ones
    let remaining: HashSet<TrackRef> = playlist.entries().iter().cloned().collect();
    assert!(remaining.contains(&track("b")));
    assert!(remaining.contains(&track("d")));
}

#[tokio::test]
async fn all_missing_exhausts_and_empties_playlist() {
    let oracle = MemoryOracle::with(&[]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c", "d"], 2);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, None);
    assert!(playlist.is_empty());
    assert_eq!(playlist.cursor(), None);
    assert_eq!(resolution.pruned.len(), 4);
}

#[tokio::test]
async fn empty_playlist_resolves_to_none_without_probing() {
    let oracle = MemoryOracle::with(&["a"]);
    let resolver = resolver(&oracle);
    let mut playlist = Playlist::new();

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, None);
    assert_eq!(oracle.probe_count(), 0);
}

#[tokio::test]
async fn probe_errors_are_bounded() {
    let oracle = MemoryOracle::with(&["a", "b", "c", "d"]);
    for path in ["a", "b", "c", "d"] {
        oracle.fail(path);
    }
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c", "d"], 0);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, None);
    // Errors count up while the list shrinks: 4 -> 3 -> 2, stop at attempts == len
    assert_eq!(resolution.pruned.len(), 2);
    assert_eq!(playlist.len(), 2);
    assert!(resolution
        .pruned
        .iter()
        .all(|entry| entry.reason == PruneReason::ProbeFailed));
}

#[tokio::test]
async fn probe_error_then_existing_entry_resolves() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    oracle.fail("b");
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 0);

    let resolution = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;

    assert_eq!(resolution.track, Some(track("c")));
    assert_eq!(resolution.pruned[0].reason, PruneReason::ProbeFailed);
}

#[tokio::test]
async fn pruning_converges_to_existing_entries() {
    let oracle = MemoryOracle::with(&["b", "e"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c", "d", "e", "f"], 0);

    for _ in 0..12 {
        let resolution = resolver
            .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
            .await;
        let chosen = resolution.track.unwrap();
        assert!(chosen == track("b") || chosen == track("e"));
    }

    assert_eq!(playlist.entries(), tracks(&["b", "e"]).as_slice());
}

#[tokio::test]
async fn file_deleted_between_calls_is_pruned_later() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    let resolver = resolver(&oracle);
    let mut playlist = playlist_at(&["a", "b", "c"], 0);

    let first = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;
    assert_eq!(first.track, Some(track("b")));

    oracle.delete("c");
    let second = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;
    assert_eq!(second.track, Some(track("a")));
    assert_eq!(playlist.entries(), tracks(&["a", "b"]).as_slice());
}

// ===== Previous Track =====

#[tokio::test]
async fn previous_consumes_two_history_entries() {
    let oracle = MemoryOracle::with(&["x", "y", "z"]);
    let resolver = resolver(&oracle);
    let mut history = history_of(&["x", "y", "z"]);
    let mut playlist = Playlist::new();

    let resolution = resolver
        .previous_track(&mut history, &mut playlist, HistoryPolicy::AnyExisting)
        .await;

    assert_eq!(resolution.track, Some(track("y")));
    assert_eq!(history.entries(), tracks(&["x"]).as_slice());
}

#[tokio::test]
async fn previous_skips_missing_history() {
    let oracle = MemoryOracle::with(&["w", "z"]);
    let resolver = resolver(&oracle);
    let mut history = history_of(&["w", "x", "y", "z"]);
    let mut playlist = Playlist::new();

    let resolution = resolver
        .previous_track(&mut history, &mut playlist, HistoryPolicy::AnyExisting)
        .await;

    assert_eq!(resolution.track, Some(track("w")));
    assert!(history.is_empty());
    assert_eq!(resolution.pruned.len(), 2);
}

#[tokio::test]
async fn previous_with_membership_moves_cursor() {
    let oracle = MemoryOracle::with(&["a", "b", "c"]);
    let resolver = resolver(&oracle);
    let mut history = history_of(&["a", "c"]);
    let mut playlist = playlist_at(&["a", "b", "c"], 2);

    let resolution = resolver
        .previous_track(
            &mut history,
            &mut playlist,
            HistoryPolicy::RequirePlaylistMembership,
        )
        .await;

    assert_eq!(resolution.track, Some(track("a")));
    assert_eq!(playlist.cursor(), Some(0));

    // Forward again continues after the recalled track
    let next = resolver
        .next_track(&mut playlist, PlaybackMode::RepeatAll, Directive::Advance)
        .await;
    assert_eq!(next.track, Some(track("b")));
}

#[tokio::test]
async fn previous_with_single_entry_is_none() {
    let oracle = MemoryOracle::with(&["a"]);
    let resolver = resolver(&oracle);
    let mut history = history_of(&["a"]);
    let mut playlist = Playlist::new();

    let resolution = resolver
        .previous_track(&mut history, &mut playlist, HistoryPolicy::AnyExisting)
        .await;

    assert_eq!(resolution.track, None);
    assert!(history.is_empty());
}

#[tokio::test]
async fn previous_on_empty_history_is_none() {
    let oracle = MemoryOracle::with(&[]);
    let resolver = resolver(&oracle);
    let mut history = History::new();
    let mut playlist = Playlist::new();

    let resolution = resolver
        .previous_track(&mut history, &mut playlist, HistoryPolicy::AnyExisting)
        .await;

    assert_eq!(resolution.track, None);
    assert_eq!(oracle.probe_count(), 0);
}
