//! Ranked, human-readable insights built from the detectors and models.
//!
//! # Example
//!
//! ```
//! use insight_forecast::core::Record;
//! use insight_forecast::insights::{InsightConfig, InsightGenerator};
//!
//! let rows: Vec<Record> = [("video", 30.0), ("video", 34.0), ("video", 32.0),
//!                          ("blog", 10.0), ("blog", 12.0), ("blog", 11.0)]
//!     .into_iter()
//!     .map(|(format, ctr)| Record::new().with("format", format).with("ctr", ctr))
//!     .collect();
//!
//! let generator = InsightGenerator::new(InsightConfig::default());
//! let gap = generator.compare_segments(&rows, "format", "ctr", "ctr").unwrap();
//! assert!(gap.title.starts_with("video"));
//! ```

mod generator;
mod types;

pub use generator::{InsightConfig, InsightGenerator};
pub use types::{Impact, Insight, InsightCategory};
