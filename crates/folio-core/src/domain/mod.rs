pub mod aggregate;
pub mod catalog;
pub mod credit;
pub mod ids;
pub mod track;

pub use aggregate::{MasterAggregate, Owner};
pub use catalog::{ArtistRef, Master, Release, ReleaseVersionRef};
pub use credit::{ArtistCredit, ExtraArtistCredit, RoleDetail};
pub use ids::{AggregateId, ArtistId, MasterId, ReleaseId};
pub use track::Track;
