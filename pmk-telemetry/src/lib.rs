//! # PMK Telemetry
//!
//! Structured logging for PMK using `tracing`.
//!
//! ## Usage
//!
//! ```rust
//! use pmk_telemetry::{init_telemetry, info, instrument};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("pmk-server")?;
//!
//!     #[instrument]
//!     async fn refine_idea() {
//!         info!("refining idea");
//!     }
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use spans::*;

pub use init::{LogFormat, init_json_telemetry, init_telemetry, init_with_format};
