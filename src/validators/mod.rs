// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token safety checks and the risk score built on them.

pub mod admin_controls;
pub mod risk;

pub use admin_controls::{add_scanner_controls, detect_admin_controls, fetch_audit_info};
pub use risk::{assess, RiskAssessment, RiskInputs, RiskLevel};
