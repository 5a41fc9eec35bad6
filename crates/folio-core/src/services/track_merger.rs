use serde::{Deserialize, Serialize};

use crate::domain::Track;

/// How an incoming track is matched against the tracks already in the list.
///
/// The two strategies are not equivalent: with `TitleOrPosition` a renamed
/// track sitting at a known position is treated as the same track, with
/// `TitleOnly` it falls through to the variant-title check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
  /// Exact title equality only.
  TitleOnly,
  /// Exact title equality, or exact position equality.
  #[default]
  TitleOrPosition,
}

impl MatchStrategy {
  fn matches(self, existing: &Track, incoming: &Track) -> bool {
    match self {
      MatchStrategy::TitleOnly => existing.title == incoming.title,
      MatchStrategy::TitleOrPosition => existing.title == incoming.title || existing.position == incoming.position,
    }
  }
}

/// Folds a version's tracklist into a base tracklist.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackMerger {
  strategy: MatchStrategy,
}

impl TrackMerger {
  pub fn new(strategy: MatchStrategy) -> Self {
    Self { strategy }
  }

  pub fn strategy(&self) -> MatchStrategy {
    self.strategy
  }

  /// Merges `incoming` into a copy of `original`.
  ///
  /// * Empty base: `incoming` is returned as is, without `extra_track` flags.
  /// * Empty incoming: `original` is returned as is.
  /// * Matched track: replaced in full only when the incoming one carries more
  ///   credits; ties keep the original.
  /// * Unmatched track: dropped when its title is a substring (or superstring)
  ///   of an original title, otherwise appended with `extra_track = true`.
  ///
  /// The result keeps the original order and is never shorter than `original`.
  pub fn merge(&self, original: &[Track], incoming: &[Track]) -> Vec<Track> {
    if original.is_empty() {
      return incoming.to_vec();
    }
    if incoming.is_empty() {
      return original.to_vec();
    }

    let mut merged = original.to_vec();

    for track in incoming {
      match merged.iter().position(|existing| self.strategy.matches(existing, track)) {
        Some(index) => {
          if track.credit_count() > merged[index].credit_count() {
            merged[index] = track.clone();
          }
        }
        None => {
          if !is_variant_title(original, &track.title) {
            let mut extra = track.clone();
            extra.extra_track = Some(true);
            merged.push(extra);
          }
        }
      }
    }

    merged
  }
}

// Case-sensitive, checked against the original list only.
fn is_variant_title(original: &[Track], title: &str) -> bool {
  original.iter().any(|t| t.title.contains(title) || title.contains(t.title.as_str()))
}

/// Shorthand for `TrackMerger::new(strategy).merge(original, incoming)`.
pub fn merge_tracks(original: &[Track], incoming: &[Track], strategy: MatchStrategy) -> Vec<Track> {
  TrackMerger::new(strategy).merge(original, incoming)
}
