//! Application routes.
//!
//! `home` and `auth` are the illustrative business surface; `faults` holds
//! the routes that fail on purpose so alerting can be exercised end to end.

pub mod auth;
pub mod faults;
pub mod home;
