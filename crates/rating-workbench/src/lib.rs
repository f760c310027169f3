//! Carrier policy mapping and persistence.
//!
//! Carrier-specific policy models are translated into a single
//! [`policy::PolicyTransaction`] storage shape by a [`policy::PolicyMapper`],
//! persisted through a [`policy::PolicyRepository`], and read back through the
//! same mapper. [`policy::PolicyTransactionService`] sequences the two.

pub mod config;
pub mod error;
pub mod policy;
pub mod telemetry;
