pub mod config;
pub mod detectors;
pub mod error;
pub mod io;
pub mod metrics;
pub mod plot;
pub mod record;
pub mod session;
pub mod signal;

pub use detectors::*;
pub use error::{EcgError, EcgResult};
pub use metrics::*;
pub use record::{Record, RecordMetadata};
pub use session::{AppState, LeadView};
pub use signal::*;
