use folio_core::domain::{Master, MasterAggregate, MasterId, Owner, ReleaseId, Track};
use folio_core::ports::AggregateStore;
use folio_storage::SqliteAggregateStore;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
  // ajusta la ruta si quieres probar contra otra base
  let path = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("folio-smoke.db"));
  let store = SqliteAggregateStore::open_path(&path).expect("failed to open store");

  let owner = Owner::new("smoke", "smoke@example.com");
  let master = Master {
    id: MasterId(96559),
    title: "Elis & Tom".to_string(),
    year: Some(1974),
    tracklist: vec![Track::new("A1", "Águas De Março")],
    main_release: Some(ReleaseId(1143457)),
    ..Default::default()
  };
  let aggregate = MasterAggregate::skeleton(&master, &owner);

  println!("Saving aggregate with id = {}", aggregate.id);

  store.upsert(&owner, &aggregate).await.expect("failed to save aggregate");

  let loaded = store.find_by_master_id(&owner, master.id).await.expect("failed to load aggregate");

  println!("Loaded from DB: {loaded:?}");
}
