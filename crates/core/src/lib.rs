// crates/core/src/lib.rs
pub mod charts;
pub mod csv;
pub mod error;
pub mod fixtures;
pub mod flatten;
pub mod parser;
pub mod types;

pub use charts::DashboardCharts;
pub use error::*;
pub use flatten::{active_thread, flatten_all, flatten_conversation, message_text, FlattenSummary};
pub use parser::*;
pub use types::*;
