//! Record transformations applied before analysis.
//!
//! Each step is a pure function over `&[Record]`; [`apply_pipeline`] runs
//! them in a fixed order driven by a [`TransformConfig`].
//!
//! # Example
//!
//! ```
//! use insight_forecast::core::Record;
//! use insight_forecast::transform::{apply_pipeline, NormalizeMethod, TransformConfig};
//!
//! let rows = vec![
//!     Record::new().with("date", "2024-01-01").with("views", 10.0),
//!     Record::new().with("date", "2024-01-02").with("views", 30.0),
//! ];
//! let config = TransformConfig::new(&["views"]).with_normalize(NormalizeMethod::MinMax);
//! let out = apply_pipeline(&rows, &config);
//! assert_eq!(out[1].number("views"), Some(1.0));
//! ```

pub mod bucket;
pub mod formula;
pub mod pipeline;
pub mod scale;
pub mod window;

pub use bucket::{bucket_records, BucketMode};
pub use formula::{apply_formula, Formula, FormulaError};
pub use pipeline::{apply_pipeline, BandSpec, FormulaSpec, TransformConfig};
pub use scale::{min_max, normalize_records, z_score, NormalizeMethod, ScaleParams};
pub use window::{add_band_width, centered_moving_average, smooth_records};
