pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod paths;
pub mod policy;
pub mod progress;
pub mod service;

pub use config::AppConfig;
pub use engine::{BatchEngine, BatchResult, OperationOutcome};
pub use error::Error;
pub use filter::{build_candidate_list, FilterSpec};
pub use policy::{IoPolicy, OperationKind};
pub use progress::{Confirm, ProgressObserver, SilentReporter};
pub use service::{LocalMediaService, MediaFileService, ServiceError};
