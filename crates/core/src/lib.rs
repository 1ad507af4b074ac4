//! Editorial domain model and revision workflow.
//!
//! Articles, comments, and revisions live here, along with the abstract
//! persistence seam, the opaque AI reviser seam, and the session state
//! machine that gates AI rewrites behind human approval.

pub mod events;
pub mod model;
pub mod reviser;
pub mod store;
pub mod training;
pub mod workflow;
