//! Admission control
//!
//! Bounds how many operations of each traffic class touch storage at once.
//! Upload and download share the transfer budget; listing has its own.

pub mod budget;
pub mod controller;

pub use budget::{AdmissionBudget, AdmissionPermit};
pub use controller::{AdmissionController, TrafficClass};
