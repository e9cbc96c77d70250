//! Route table construction.

pub mod routes;
