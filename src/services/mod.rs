pub mod catalog;
pub mod cloud_store;
pub mod local_store;
pub mod resume_store;
