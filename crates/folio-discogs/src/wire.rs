//! Documentos JSON tal como los devuelve la API de Discogs.
//!
//! Las pistas y los créditos ya tienen en el dominio la misma forma que en la
//! API, así que se decodifican directamente como tipos del núcleo.

use folio_core::domain::{
  ArtistCredit, ArtistId, ArtistRef, Master, MasterId, Release, ReleaseId, ReleaseVersionRef, Track,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct WireArtist {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub name: String,
}

impl From<WireArtist> for ArtistRef {
  fn from(a: WireArtist) -> Self {
    ArtistRef { id: ArtistId(a.id), name: a.name }
  }
}

#[derive(Debug, Deserialize)]
pub struct WireMaster {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub year: Option<i32>,
  #[serde(default)]
  pub data_quality: Option<String>,
  #[serde(default)]
  pub main_release: Option<u64>,
  #[serde(default)]
  pub artists: Vec<WireArtist>,
  #[serde(default)]
  pub genres: Vec<String>,
  #[serde(default)]
  pub styles: Vec<String>,
  #[serde(default)]
  pub tracklist: Vec<Track>,
  #[serde(default)]
  pub images: Value,
  #[serde(default)]
  pub videos: Value,
}

impl From<WireMaster> for Master {
  fn from(m: WireMaster) -> Self {
    Master {
      id: MasterId(m.id),
      title: m.title,
      // Discogs usa 0 para "año desconocido".
      year: m.year.filter(|y| *y > 0),
      data_quality: m.data_quality,
      artists: m.artists.into_iter().map(ArtistRef::from).collect(),
      genres: m.genres,
      styles: m.styles,
      tracklist: m.tracklist,
      main_release: m.main_release.filter(|id| *id != 0).map(ReleaseId),
      images: m.images,
      videos: m.videos,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct WireRelease {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub master_id: Option<u64>,
  #[serde(default)]
  pub artists: Vec<WireArtist>,
  #[serde(default)]
  pub extraartists: Vec<ArtistCredit>,
  #[serde(default)]
  pub tracklist: Vec<Track>,
  #[serde(default)]
  pub notes: Option<String>,
  #[serde(default)]
  pub companies: Value,
  #[serde(default)]
  pub formats: Value,
  #[serde(default)]
  pub identifiers: Value,
  #[serde(default)]
  pub series: Value,
  #[serde(default)]
  pub images: Value,
  #[serde(default)]
  pub videos: Value,
}

impl From<WireRelease> for Release {
  fn from(r: WireRelease) -> Self {
    Release {
      id: ReleaseId(r.id),
      title: r.title,
      master_id: r.master_id.filter(|id| *id != 0).map(MasterId),
      artists: r.artists.into_iter().map(ArtistRef::from).collect(),
      extraartists: r.extraartists,
      tracklist: r.tracklist,
      notes: r.notes,
      companies: r.companies,
      formats: r.formats,
      identifiers: r.identifiers,
      series: r.series,
      images: r.images,
      videos: r.videos,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct WireVersion {
  pub id: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub thumb: Option<String>,
  #[serde(default)]
  pub format: Option<String>,
  #[serde(default)]
  pub label: Option<String>,
  #[serde(default)]
  pub country: Option<String>,
  #[serde(default)]
  pub released: Option<String>,
}

impl From<WireVersion> for ReleaseVersionRef {
  fn from(v: WireVersion) -> Self {
    let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
    ReleaseVersionRef {
      id: ReleaseId(v.id),
      title: v.title,
      thumb: non_empty(v.thumb),
      format: non_empty(v.format),
      label: non_empty(v.label),
      country: non_empty(v.country),
      released: non_empty(v.released),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct WirePagination {
  #[serde(default)]
  pub page: u32,
  #[serde(default)]
  pub pages: u32,
  #[serde(default)]
  pub per_page: u32,
  #[serde(default)]
  pub items: u32,
}

#[derive(Debug, Deserialize)]
pub struct WireVersionsPage {
  #[serde(default)]
  pub pagination: WirePagination,
  #[serde(default)]
  pub versions: Vec<WireVersion>,
}

#[cfg(test)]
pub(crate) mod fixtures {
  pub const MASTER: &str = r#"{
    "id": 96559,
    "main_release": 1143457,
    "most_recent_release": 28571573,
    "resource_url": "https://api.discogs.com/masters/96559",
    "versions_url": "https://api.discogs.com/masters/96559/versions",
    "title": "Elis & Tom",
    "year": 1974,
    "data_quality": "Correct",
    "artists": [
      { "name": "Elis Regina", "anv": "Elis", "join": "&", "role": "", "tracks": "", "id": 30703,
        "resource_url": "https://api.discogs.com/artists/30703" },
      { "name": "Antonio Carlos Jobim", "anv": "Tom", "join": "", "role": "", "tracks": "", "id": 31617,
        "resource_url": "https://api.discogs.com/artists/31617" }
    ],
    "genres": ["Jazz", "Latin"],
    "styles": ["Bossa Nova"],
    "tracklist": [
      { "position": "A1", "type_": "track", "title": "Águas De Março", "duration": "3:32" },
      { "position": "A2", "type_": "track", "title": "Pois É", "duration": "2:48" }
    ],
    "images": [{ "type": "primary", "uri": "", "resource_url": "", "uri150": "", "width": 600, "height": 600 }],
    "videos": [{ "uri": "https://www.youtube.com/watch?v=x", "title": "Águas de Março", "duration": 212, "embed": true }],
    "num_for_sale": 120,
    "lowest_price": 4.5
  }"#;

  pub const VERSIONS: &str = r#"{
    "pagination": { "page": 1, "pages": 12, "per_page": 2, "items": 23, "urls": {} },
    "versions": [
      { "id": 1143457, "title": "Elis & Tom", "format": "LP, Album, Gatefold", "label": "Philips",
        "country": "Brazil", "released": "1974", "catno": "6349 112", "status": "Accepted",
        "major_formats": ["Vinyl"], "thumb": "", "resource_url": "https://api.discogs.com/releases/1143457",
        "stats": { "user": { "in_collection": 0, "in_wantlist": 0 } } },
      { "id": 2039114, "title": "Elis & Tom", "format": "CD, Album, Reissue", "label": "Verve",
        "country": "US", "released": "1990", "thumb": "https://i.discogs.com/x.jpg" }
    ]
  }"#;

  pub const RELEASE: &str = r#"{
    "id": 1143457,
    "status": "Accepted",
    "year": 1974,
    "title": "Elis & Tom",
    "master_id": 96559,
    "artists": [{ "name": "Elis Regina", "id": 30703 }],
    "companies": [{ "name": "Philips", "entity_type_name": "Record Company", "id": 4911 }],
    "formats": [{ "name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album"] }],
    "identifiers": [{ "type": "Matrix / Runout", "value": "6349 112 1" }],
    "series": [],
    "extraartists": [
      { "name": "Aloysio De Oliveira", "anv": "", "join": "", "role": "Producer", "tracks": "",
        "id": 257263, "resource_url": "https://api.discogs.com/artists/257263" },
      { "name": "César Camargo Mariano", "anv": "", "join": "", "role": "Arranged By", "tracks": "A1 to B7",
        "id": 255394, "resource_url": "https://api.discogs.com/artists/255394" }
    ],
    "tracklist": [
      { "position": "A1", "type_": "track", "title": "Águas De Março", "duration": "3:32",
        "extraartists": [{ "name": "Antonio Carlos Jobim", "anv": "", "join": "", "role": "Written-By",
          "tracks": "", "id": 31617, "resource_url": "https://api.discogs.com/artists/31617" }] },
      { "position": "", "type_": "heading", "title": "Bonus", "duration": "" }
    ],
    "notes": "Recorded in Los Angeles.",
    "images": []
  }"#;
}
