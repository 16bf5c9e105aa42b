// Library root: data model and the pure derive pipeline for the team stats
// table. No I/O lives here; loading and rendering are in `courtside-app`.

pub mod dedup;
pub mod derive;
pub mod distribution;
pub mod filter;
pub mod query;
pub mod record;
pub mod stat;
