//! The order submission pipeline and its stages.
//!
//! Stage order is fixed: validate → normalize images → transform items →
//! persist → compose notification → dispatch. Persistence success is the
//! point of no return; everything after it can only degrade the response,
//! never reverse the acceptance.

pub mod order_submission;
pub mod payload;
pub mod transform;
pub mod validate;

pub use order_submission::{submit_order, StageOutcome, SubmissionReceipt};
pub use payload::OrderPayload;
