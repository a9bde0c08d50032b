pub mod config;
pub mod errors;
pub mod types;

pub use config::GridConfig;
pub use errors::{CallGridError, ConfigError, IdentityError, PresentationError};
pub use types::*;
