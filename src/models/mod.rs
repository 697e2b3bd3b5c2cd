// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod metrics;

pub use activity::Activity;
pub use credential::AthleteCredential;
pub use metrics::{AthleteProfile, DerivedMetric};
