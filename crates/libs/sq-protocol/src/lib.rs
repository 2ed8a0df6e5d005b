//! Protocol adaptation for the TM publisher.
//!
//! Translates a build's flattened outcome sequence into one of two wire
//! shapes: the generic TM payload, or the TA-compatible payload that makes
//! an unmodified TM consumer believe it is talking to a TA server. Also
//! holds the six-field TA trigger signature and the known-test listing
//! document.

pub mod error;
pub mod job_info;
pub mod payload;
pub mod prelude;
pub mod ta_parameters;
pub mod test_list;

pub use job_info::SqJobInformation;
pub use payload::{SqPayload, SqTaPayload, SqTestStatistics, SqTmPayload, build_payload};
pub use ta_parameters::{SqTaParameters, TA_SIGNATURE};
pub use test_list::SqTestListReport;
