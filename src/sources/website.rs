// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Pulls a fallback description out of a project's homepage.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use tracing::warn;

const MIN_PARAGRAPH_CHARS: usize = 50;
const MAX_DESCRIPTION_CHARS: usize = 2000;

lazy_static! {
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

#[derive(Clone)]
pub struct WebsiteScraper {
    client: Client,
}

impl WebsiteScraper {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn description(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Website description fetch error for {}: {}", url, e);
                return None;
            }
        };
        if response.status().as_u16() != 200 {
            return None;
        }
        match response.text().await {
            Ok(html) => extract_description(&html),
            Err(e) => {
                warn!("Website description fetch error for {}: {}", url, e);
                None
            }
        }
    }
}

/// Join every substantial `<p>` block, capped at 2000 characters.
pub fn extract_description(html: &str) -> Option<String> {
    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| TAG.replace_all(m.as_str(), "").trim().to_string())
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect();

    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.join(" ").chars().take(MAX_DESCRIPTION_CHARS).collect())
}
