// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Social link merging across DexScreener, CoinGecko and Solana metadata.

use super::{CoinGeckoInfo, DexSnapshot};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

lazy_static! {
    static ref VALID_URL: Regex =
        Regex::new(r"^https?://(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}(/.*)?$").unwrap();
}

/// Social entry as providers send it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSocial {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub url: String,
}

impl RawSocial {
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
        }
    }
}

/// A validated link shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub kind: String,
    pub url: String,
}

/// Drop the query string and trailing slashes.
fn clean_url(url: &str) -> String {
    url.split('?')
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string()
}

/// Normalized `(kind, url)` pair; `None` when either side is empty.
fn normalize(social: &RawSocial) -> Option<(String, String)> {
    let url = clean_url(&social.url);
    let mut kind = social.kind.to_lowercase();
    if url.is_empty() || kind.is_empty() {
        return None;
    }
    if kind == "x" {
        kind = "twitter".to_string();
    }
    if url.contains("tiktok.com") {
        kind = "tiktok".to_string();
    } else if url.contains("discord.com") || url.contains("discord.gg") {
        kind = "discord".to_string();
    } else if url.contains("reddit.com") {
        kind = "reddit".to_string();
    }
    Some((kind, url))
}

/// Ordered kind → url map.
#[derive(Default)]
struct LinkSet {
    entries: Vec<(String, String)>,
}

impl LinkSet {
    fn has(&self, kind: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == kind)
    }

    /// Overwrite in place, keeping the first position.
    fn set(&mut self, kind: String, url: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = url,
            None => self.entries.push((kind, url)),
        }
    }

    fn set_if_absent(&mut self, kind: &str, url: String) {
        if !url.is_empty() && !self.has(kind) {
            self.entries.push((kind.to_string(), url));
        }
    }
}

/// Merge every known link source into a validated list.
pub fn merge(
    dex: Option<&DexSnapshot>,
    coingecko: Option<&CoinGeckoInfo>,
    solana: &[RawSocial],
) -> Vec<SocialLink> {
    let mut links = LinkSet::default();

    if let Some(dex) = dex {
        for social in &dex.socials {
            if let Some((kind, url)) = normalize(social) {
                links.set(kind, url);
            }
        }
        for website in &dex.websites {
            links.set_if_absent("website", clean_url(website));
        }
    }

    if let Some(cg) = coingecko {
        let l = &cg.links;
        if let Some(home) = l.homepage.first() {
            links.set_if_absent("website", clean_url(home));
        }
        if let Some(handle) = l.twitter_screen_name.as_deref().filter(|h| !h.is_empty()) {
            links.set_if_absent("twitter", format!("https://twitter.com/{}", handle));
        }
        if let Some(channel) = l
            .telegram_channel_identifier
            .as_deref()
            .filter(|c| !c.is_empty())
        {
            links.set_if_absent("telegram", format!("https://t.me/{}", channel));
        }
        if let Some(chat) = l
            .chat_url
            .first()
            .filter(|c| c.to_lowercase().contains("discord"))
        {
            links.set_if_absent("discord", clean_url(chat));
        }
        if let Some(reddit) = l.subreddit_url.as_deref() {
            links.set_if_absent("reddit", clean_url(reddit));
        }
    }

    for social in solana {
        if let Some((kind, url)) = normalize(social) {
            links.set_if_absent(&kind, url);
        }
    }

    links
        .entries
        .into_iter()
        .filter_map(|(kind, url)| {
            if VALID_URL.is_match(&url) {
                Some(SocialLink { kind, url })
            } else {
                warn!("Invalid or malformed URL skipped: {} = {}", kind, url);
                None
            }
        })
        .collect()
}
