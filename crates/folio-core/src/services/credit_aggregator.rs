use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{ArtistCredit, ArtistId, ExtraArtistCredit, MasterAggregate, Release, RoleDetail};

/// Merges release-level and track-level credits of many releases into one
/// deduplicated credit list keyed by artist id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditAggregator;

impl CreditAggregator {
  /// Returns the aggregate's credits with every credit of `releases` folded in,
  /// sorted by artist name. `base` is left untouched.
  pub fn aggregate(&self, base: &MasterAggregate, releases: &[Release]) -> Vec<ExtraArtistCredit> {
    aggregate_credits(&base.extraartists, releases)
  }
}

/// Same as [`CreditAggregator::aggregate`] but seeded from a bare credit list.
pub fn aggregate_credits(seed: &[ExtraArtistCredit], releases: &[Release]) -> Vec<ExtraArtistCredit> {
  let mut book = CreditBook::seeded(seed);

  for release in releases {
    for credit in release.extraartists.iter().filter(|c| c.id.is_set()) {
      book.add_or_update(credit, credit.tracks.as_deref());
    }

    for track in &release.tracklist {
      let Some(credits) = &track.extraartists else { continue };
      for credit in credits.iter().filter(|c| c.id.is_set()) {
        book.add_or_update(credit, Some(track.scope()));
      }
    }
  }

  book.into_sorted()
}

struct CreditBook {
  // BTreeMap so that artists sharing a name come out ordered by id.
  by_artist: BTreeMap<ArtistId, ExtraArtistCredit>,
}

impl CreditBook {
  fn seeded(seed: &[ExtraArtistCredit]) -> Self {
    let by_artist = seed.iter().filter(|c| c.id.is_set()).map(|c| (c.id, c.clone())).collect();
    Self { by_artist }
  }

  fn add_or_update(&mut self, credit: &ArtistCredit, scope: Option<&str>) {
    let Some(role) = credit.role.as_deref().filter(|r| !r.is_empty()) else {
      return;
    };
    let detail = RoleDetail::new(role, scope);

    match self.by_artist.get_mut(&credit.id) {
      Some(existing) => {
        if !existing.has_role(&detail) {
          existing.roles.push(detail);
        }
        if existing.name.is_empty() && !credit.name.is_empty() {
          existing.name = credit.name.clone();
        }
        backfill(&mut existing.anv, &credit.anv);
        backfill(&mut existing.resource_url, &credit.resource_url);
      }
      None => {
        self.by_artist.insert(
          credit.id,
          ExtraArtistCredit {
            id: credit.id,
            name: credit.name.clone(),
            anv: credit.anv.clone(),
            resource_url: credit.resource_url.clone(),
            roles: vec![detail],
          },
        );
      }
    }
  }

  fn into_sorted(self) -> Vec<ExtraArtistCredit> {
    let mut credits: Vec<ExtraArtistCredit> = self.by_artist.into_values().collect();

    credits.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    for credit in &mut credits {
      credit.roles.sort_by(|a, b| locale_cmp(&a.role, &b.role).then_with(|| locale_cmp(a.scope(), b.scope())));
    }

    credits
  }
}

/// Solo rellena huecos: con dos variantes distintas gana la primera release
/// que la trae, así que estos campos sí dependen del orden de entrada.
fn backfill(slot: &mut Option<String>, incoming: &Option<String>) {
  let missing = slot.as_deref().is_none_or(str::is_empty);
  if let Some(value) = incoming.as_deref().filter(|v| !v.is_empty())
    && missing
  {
    *slot = Some(value.to_owned());
  }
}

/// Collation close to a default-locale `localeCompare`: letters compare
/// without case or accents first, then unaccented before accented, then
/// lowercase before uppercase.
pub(crate) fn locale_cmp(a: &str, b: &str) -> Ordering {
  let fold = |s: &str| s.chars().flat_map(char::to_lowercase).map(base_letter).collect::<Vec<_>>();
  let lower = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
  let upper_marks = |s: &str| s.chars().map(char::is_uppercase).collect::<Vec<_>>();

  fold(a)
    .cmp(&fold(b))
    .then_with(|| lower(a).cmp(&lower(b)))
    .then_with(|| upper_marks(a).cmp(&upper_marks(b)))
    .then_with(|| a.cmp(b))
}

fn base_letter(c: char) -> char {
  match c {
    'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
    'ç' | 'ć' | 'č' => 'c',
    'ď' => 'd',
    'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
    'ğ' => 'g',
    'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
    'ł' => 'l',
    'ñ' | 'ń' | 'ň' => 'n',
    'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
    'ř' => 'r',
    'ś' | 'š' | 'ş' => 's',
    'ť' | 'ţ' => 't',
    'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => 'u',
    'ý' | 'ÿ' => 'y',
    'ź' | 'ż' | 'ž' => 'z',
    other => other,
  }
}
