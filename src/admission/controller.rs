//! Module `controller`
//!
//! Owns the two independent admission budgets and routes each operation to
//! the budget of its traffic class. Constructed once per process and shared
//! by reference with every request handler.

use std::fmt;
use std::future::Future;

use crate::admission::{AdmissionBudget, AdmissionPermit};
use crate::config::LimitsConfig;
use crate::error::AdmissionError;

/// Traffic classes with separate budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficClass {
    /// Upload and download: cost scales with file size
    Transfer,
    /// Directory enumeration
    Listing,
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficClass::Transfer => write!(f, "transfer"),
            TrafficClass::Listing => write!(f, "list"),
        }
    }
}

pub struct AdmissionController {
    transfer: AdmissionBudget,
    listing: AdmissionBudget,
}

impl AdmissionController {
    pub fn new(transfer_capacity: usize, list_capacity: usize) -> Self {
        Self {
            transfer: AdmissionBudget::new(TrafficClass::Transfer, transfer_capacity),
            listing: AdmissionBudget::new(TrafficClass::Listing, list_capacity),
        }
    }

    pub fn from_limits(limits: &LimitsConfig) -> Self {
        Self::new(limits.max_transfer_ops, limits.max_list_ops)
    }

    pub fn budget(&self, class: TrafficClass) -> &AdmissionBudget {
        match class {
            TrafficClass::Transfer => &self.transfer,
            TrafficClass::Listing => &self.listing,
        }
    }

    /// Waits for a slot of `class` until `cancel` completes.
    pub async fn acquire<C>(
        &self,
        class: TrafficClass,
        cancel: C,
    ) -> Result<AdmissionPermit, AdmissionError>
    where
        C: Future,
    {
        self.budget(class).acquire(cancel).await
    }

    pub fn in_use(&self, class: TrafficClass) -> usize {
        self.budget(class).in_use()
    }
}
