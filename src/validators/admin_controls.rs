// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Privileged-function detection in verified contract source.

use crate::sources::SecurityReport;

const RISKY_CALLS: [&str; 11] = [
    "mint(",
    "pause(",
    "unpause(",
    "upgradeTo(",
    "setOwner(",
    "renounceOwnership(",
    "transferOwnership(",
    "blacklist(",
    "whitelist(",
    "setMaxTxAmount(",
    "burn(",
];

/// Names of risky admin functions present in `source_code` (case-insensitive).
pub fn detect_admin_controls(source_code: &str) -> Vec<String> {
    let src = source_code.to_lowercase();
    RISKY_CALLS
        .iter()
        .filter(|call| src.contains(&call.to_lowercase()))
        .map(|call| call.trim_end_matches('(').to_string())
        .collect()
}

/// Append the capabilities the security scanner flagged.
pub fn add_scanner_controls(controls: &mut Vec<String>, report: &SecurityReport) {
    let flagged = [
        (report.is_mintable, "mintable"),
        (report.transfer_pausable, "pausable"),
        (report.has_blacklist, "blacklist"),
        (report.has_whitelist, "whitelist"),
        (report.is_anti_whale, "anti-whale"),
    ];
    controls.extend(
        flagged
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| name.to_string()),
    );
}

/// Audit lookup. No audit registry is wired in, so every token reports unaudited.
#[derive(Debug, Clone, Default)]
pub struct AuditInfo {
    pub audited: bool,
    pub audit_url: Option<String>,
    pub notes: String,
}

pub fn fetch_audit_info(_addr: &str) -> AuditInfo {
    AuditInfo {
        audited: false,
        audit_url: None,
        notes: "No audit info found.".to_string(),
    }
}
