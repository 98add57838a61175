//! Measurement pipeline: input validation, then rim detection → food
//! segmentation → fill/volume estimation on one frame.
//!
//! A stage that comes back empty short-circuits the rest and the outcome is
//! recorded in [`FillStatus`]; only invalid input is an `Err`.

mod request;
mod result;
mod run;

pub use request::MeasureRequest;
pub use result::{FillReport, FillStatus};

pub(crate) use run::{measure, Stages};
