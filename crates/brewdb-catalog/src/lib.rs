//! In-memory catalog: the snapshot store shared between the background
//! refresher and concurrent readers, and the query engine that filters,
//! distance-annotates, sorts, and paginates a snapshot per request.

mod distance;
mod query;
mod snapshot;

pub use distance::haversine_km;
pub use query::{
    autocomplete, get_by_id, query, BreweryDto, QueryError, QuerySpec, ResultPage, SortKey,
    Suggestion,
};
pub use snapshot::{Snapshot, SnapshotStore};
