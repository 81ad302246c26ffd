//! Application layer: group-level balance and settlement queries.
//!
//! [`service::BalanceService`] reads a group's records through the repository
//! ports, runs the balance calculator and the debt simplifier, and returns
//! report-ready views.

pub mod service;
