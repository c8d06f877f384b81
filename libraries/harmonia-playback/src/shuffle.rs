//! Shuffle algorithm for queue randomization
//!
//! The current track is pinned to the front; everything else gets an
//! unbiased Fisher-Yates permutation.

use harmonia_core::Track;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `tracks` keeping the track at `current` (if any) first
///
/// Returns the reassembled order `[current, ...shuffled_rest]`.
pub fn shuffle_around_current<R: Rng + ?Sized>(
    tracks: &[Track],
    current: Option<usize>,
    rng: &mut R,
) -> Vec<Track> {
    let pinned = current.and_then(|index| tracks.get(index).map(|track| (index, track)));

    let mut rest: Vec<Track> = tracks
        .iter()
        .enumerate()
        .filter(|(i, _)| pinned.map_or(true, |(index, _)| *i != index))
        .map(|(_, track)| track.clone())
        .collect();

    // SliceRandom::shuffle is Fisher-Yates over the inclusive range
    rest.shuffle(rng);

    match pinned {
        Some((_, track)) => {
            let mut result = Vec::with_capacity(tracks.len());
            result.push(track.clone());
            result.extend(rest);
            result
        }
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn create_test_tracks(count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| Track::new(i as i64, format!("/music/{}.mp3", i)))
            .collect()
    }

    fn paths(tracks: &[Track]) -> Vec<String> {
        tracks
            .iter()
            .map(|t| t.fingerprint().as_str().to_string())
            .collect()
    }

    #[test]
    fn current_track_moves_to_front() {
        let tracks = create_test_tracks(10);
        let mut rng = StdRng::seed_from_u64(7);

        let shuffled = shuffle_around_current(&tracks, Some(4), &mut rng);
        assert_eq!(shuffled.len(), 10);
        assert!(shuffled[0].same_identity(&tracks[4]));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let tracks = create_test_tracks(25);
        let mut rng = StdRng::seed_from_u64(99);

        let shuffled = shuffle_around_current(&tracks, None, &mut rng);
        let mut before = paths(&tracks);
        let mut after = paths(&shuffled);
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn out_of_range_current_is_ignored() {
        let tracks = create_test_tracks(3);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(shuffle_around_current(&tracks, Some(9), &mut rng).len(), 3);
    }

    #[test]
    fn every_track_can_land_first_without_a_current() {
        let tracks = create_test_tracks(4);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut first_counts: HashMap<String, usize> = HashMap::new();

        for _ in 0..4000 {
            let shuffled = shuffle_around_current(&tracks, None, &mut rng);
            *first_counts
                .entry(shuffled[0].fingerprint().as_str().to_string())
                .or_default() += 1;
        }

        // Uniform would be 1000 each; allow generous slack
        assert_eq!(first_counts.len(), 4);
        for count in first_counts.values() {
            assert!((800..1200).contains(count), "biased shuffle: {:?}", first_counts);
        }
    }
}
