pub mod api;
pub mod cache;
pub mod provider;
pub mod snapshot;
pub mod source;
pub mod types;

pub use api::MarketApiClient;
pub use cache::UserCache;
pub use provider::DataProvider;
pub use snapshot::Snapshot;
pub use source::SnapshotSource;
