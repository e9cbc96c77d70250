//! HTTP handlers, grouped by resource.
//!
//! Resume handlers stream file bodies and delegate persistence to the
//! selected [`ResumeStore`](crate::services::resume_store::ResumeStore);
//! scholarship handlers serve the seeded catalog and the saved-id set.

pub mod health_handlers;
pub mod resume_handlers;
pub mod scholarship_handlers;
