mod checks;
mod error;
mod history;
mod models;

pub use checks::NodeHealthProbe;
pub use error::ProbeError;
pub use history::{HistorySummary, ProbeHistory, ProbeSnapshot};
pub use models::{EndpointConfig, NodeStatusReport, ProbeQuery, QueryFailure, SyncInfo};
