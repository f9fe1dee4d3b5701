//! This file is the root of the `rawblock` Rust crate.
//!
//! The crate decodes the columnar "raw block" result format returned by a
//! time-series database client, and the change-stream envelope that wraps
//! such blocks. Its responsibilities here are strictly limited to:
//! 1.  Declaring the top-level modules (`raw_block`, `envelope`, `kernels`, etc.).
//! 2.  Re-exporting the small public surface most callers need.
//! 3.  Offering an opt-in logger for diagnostics.

use std::sync::Once;

use log::LevelFilter;

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod bridge;
pub mod config;
pub mod envelope;
pub mod error;
pub mod kernels;
pub mod null_handling;
pub mod raw_block;
pub mod traits;
pub mod types;
pub mod utils;

//==================================================================================
// 2. Public Re-exports
//==================================================================================
pub use config::{DecoderConfig, NcharPolicy};
pub use envelope::{parse_envelope, parse_envelope_with, BlockInfo};
pub use error::{RawBlockError, Result};
pub use raw_block::{decode_block, decode_block_with, decode_row, decode_row_with, RawBlock, RawBlockBuilder};
pub use traits::{ChronoConverter, RawTicks, TimestampConverter};
pub use types::{ColumnDescriptor, Precision, Row, SchemaColumn, TaosDataType, Timestamp, Value};

//==================================================================================
// 3. Logging
//==================================================================================
static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `level` for this process. Later calls are no-ops,
/// as is the first one if another logger is already installed.
pub fn enable_verbose_logging(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
        });
        let _ = builder.try_init();
    });
}
