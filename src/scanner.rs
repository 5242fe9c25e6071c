// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token scanner: gathers provider data for an address, merges it and scores it.

use crate::chain::Chain;
use crate::format::meme_context;
use crate::sources::socials::{self, RawSocial};
use crate::sources::{
    CoinGeckoInfo, DexSnapshot, HolderShare, SecurityReport, SocialLink, Sources, TokenAge,
};
use crate::validators::{
    add_scanner_controls, assess, detect_admin_controls, fetch_audit_info, RiskAssessment,
    RiskInputs,
};
use tracing::{debug, info};

/// Descriptions shorter than this get topped up from the project website.
const SHORT_DESCRIPTION_CHARS: usize = 100;
const TOP_HOLDERS: usize = 5;

/// Explorer-side view of a token, from Etherscan-family APIs or Helius.
#[derive(Debug, Clone)]
struct OnChain {
    name: String,
    symbol: String,
    verified: bool,
    source_code: String,
    description: Option<String>,
    socials: Vec<RawSocial>,
    total_supply: String,
    image: Option<String>,
    mint_authority: Option<String>,
    freeze_authority: Option<String>,
    holders: Vec<HolderShare>,
}

impl Default for OnChain {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            symbol: "N/A".to_string(),
            verified: false,
            source_code: String::new(),
            description: None,
            socials: Vec::new(),
            total_supply: "0".to_string(),
            image: None,
            mint_authority: None,
            freeze_authority: None,
            holders: Vec::new(),
        }
    }
}

/// Everything needed to render a scan reply.
#[derive(Debug, Clone)]
pub struct TokenReport {
    pub addr: String,
    pub chain: Chain,
    pub name: String,
    pub symbol: String,
    pub price_usd: String,
    pub volume_24h: f64,
    pub assessment: RiskAssessment,
    pub chart_url: Option<String>,
    pub image: Option<String>,
    pub has_description: bool,
    pub has_holders: bool,
    pub socials: Vec<SocialLink>,
}

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Report(Box<TokenReport>),
    /// Neither the explorer nor market data know the address.
    NotFound,
}

/// Long-form description for the "Token Description" action.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDescription {
    pub name: String,
    pub symbol: String,
    pub text: String,
    pub is_meme: bool,
    /// False when only the generic placeholder sentence is available.
    pub meaningful: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HolderSummary {
    /// Largest holders, percent of supply, largest first.
    List(Vec<HolderShare>),
    /// Share of supply held by the top ten (Solana scanner data), in percent.
    TopTenRate(f64),
    Unavailable,
}

/// Placeholder used when no provider has a description.
pub fn placeholder_description(name: &str, symbol: &str, chain: Chain) -> String {
    format!(
        "This is {} ({}), a token on the {} blockchain. No detailed description available.",
        name, symbol, chain
    )
}

/// Human launch line for the age check.
pub fn launch_text(launch_date: Option<&str>, age: Option<TokenAge>) -> String {
    match (launch_date, age) {
        (_, Some(TokenAge { days: 0, hours: Some(h) })) => {
            format!("Launched approximately {} hours ago", h)
        }
        (Some(date), Some(age)) => format!("Launched: {} ({} days ago)", date, age.days),
        (None, Some(age)) => format!("Launched approximately {} days ago", age.days),
        (_, None) => "Launch date unknown".to_string(),
    }
}

#[derive(Clone)]
pub struct TokenScanner {
    sources: Sources,
}

impl TokenScanner {
    pub fn new(sources: Sources) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    async fn on_chain(&self, addr: &str, chain: Chain) -> Option<OnChain> {
        if chain.is_evm() {
            let contract = self.sources.explorer.contract(addr, chain).await?;
            Some(OnChain {
                name: contract.name,
                verified: contract.verified,
                source_code: contract.source_code,
                ..Default::default()
            })
        } else {
            let asset = self.sources.helius.asset(addr).await?;
            Some(OnChain {
                name: asset.name,
                symbol: asset.symbol,
                verified: asset.verified,
                source_code: String::new(),
                description: asset.description,
                socials: asset.socials,
                total_supply: asset.total_supply,
                image: asset.image,
                mint_authority: asset.mint_authority,
                freeze_authority: asset.freeze_authority,
                holders: asset.holders,
            })
        }
    }

    async fn coingecko(&self, addr: &str, chain: Chain) -> Option<CoinGeckoInfo> {
        if chain == Chain::Sol {
            return None;
        }
        self.sources.coingecko.coin(addr, chain).await
    }

    /// Merged social links. Fetches its own provider data.
    pub async fn socials(&self, addr: &str, chain: Chain) -> Vec<SocialLink> {
        let dex = self.sources.dexscreener.search(addr).await;
        let cg = self.coingecko(addr, chain).await;
        let solana_socials = if chain == Chain::Sol {
            self.sources
                .helius
                .asset(addr)
                .await
                .map(|a| a.socials)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        socials::merge(dex.as_ref(), cg.as_ref(), &solana_socials)
    }

    /// Provider description, falling back to meme context and then the
    /// placeholder; short texts are extended from the project website.
    async fn build_description(
        &self,
        name: &str,
        symbol: &str,
        chain: Chain,
        cg: Option<&CoinGeckoInfo>,
        on_chain_description: Option<&str>,
        links: &[SocialLink],
    ) -> (String, bool) {
        let placeholder = placeholder_description(name, symbol, chain);
        let mut description = cg
            .map(|c| c.description.as_str())
            .filter(|d| !d.is_empty())
            .or(on_chain_description.filter(|d| !d.is_empty()))
            .or_else(|| meme_context(name))
            .map(str::to_string)
            .unwrap_or_else(|| placeholder.clone());

        if description.chars().count() < SHORT_DESCRIPTION_CHARS {
            if let Some(website) = links.iter().find(|l| l.kind == "website") {
                if let Some(extra) = self.sources.website.description(&website.url).await {
                    description.push_str("\n\nAdditional details from official site: ");
                    description.push_str(&extra);
                }
            }
        }

        let meaningful = !description.starts_with(&placeholder);
        (description, meaningful)
    }

    /// Full analysis of one address.
    pub async fn scan(&self, addr: &str) -> ScanOutcome {
        let dex = self.sources.dexscreener.search(addr).await;
        let chain = Chain::resolve(dex.as_ref().map(|d| d.chain_id.as_str()), addr);
        info!("🔍 Scanning {} on {}", addr, chain);

        let on_chain = self.on_chain(addr, chain).await;
        let security = self.sources.goplus.token_security(addr, chain).await;
        let cg = self.coingecko(addr, chain).await;

        let Some(on_chain) = known_on_chain(on_chain, dex.as_ref()) else {
            info!("❓ No data for {}", addr);
            return ScanOutcome::NotFound;
        };

        let (name, symbol) = merge_identity(&on_chain, dex.as_ref(), cg.as_ref());
        let market_cap = merge_market_cap(cg.as_ref(), dex.as_ref());

        let solana_socials = if chain == Chain::Sol {
            on_chain.socials.clone()
        } else {
            Vec::new()
        };
        let links = socials::merge(dex.as_ref(), cg.as_ref(), &solana_socials);

        let on_chain_description = if chain == Chain::Sol {
            on_chain.description.as_deref()
        } else {
            None
        };
        let (_, has_description) = self
            .build_description(&name, &symbol, chain, cg.as_ref(), on_chain_description, &links)
            .await;

        let launch = self.sources.explorer.launch_info(addr, chain).await;
        let age = launch
            .as_ref()
            .map(|l| l.age)
            .or_else(|| dex.as_ref().and_then(|d| d.age));
        let launch_line = launch_text(launch.as_ref().map(|l| l.date.as_str()), age);

        let inputs = risk_inputs(
            chain,
            &on_chain,
            security.as_ref(),
            dex.as_ref(),
            market_cap,
            age,
            launch_line,
            addr,
        );
        let assessment = assess(&inputs);
        debug!("Risk inputs for {}: {:?}", addr, inputs);
        info!(
            "📊 {} ({}) scored {}/100 with {} red flags",
            name,
            symbol,
            assessment.score,
            assessment.red_flags.len()
        );

        let has_holders = match &security {
            Some(s) => {
                (chain == Chain::Sol && s.top_10_holder_rate.is_some()) || !s.holders.is_empty()
            }
            None => false,
        } || (chain == Chain::Sol && !on_chain.holders.is_empty());

        let image = cg
            .as_ref()
            .and_then(|c| c.image.clone())
            .or_else(|| dex.as_ref().and_then(|d| d.image.clone()))
            .or_else(|| on_chain.image.clone());

        ScanOutcome::Report(Box::new(TokenReport {
            addr: addr.to_string(),
            chain,
            name,
            symbol,
            price_usd: dex
                .as_ref()
                .map(|d| d.price_usd.clone())
                .unwrap_or_else(|| "0".to_string()),
            volume_24h: dex.as_ref().map(|d| d.volume_24h).unwrap_or(0.0),
            assessment,
            chart_url: dex.as_ref().and_then(|d| d.chart_url.clone()),
            image,
            has_description,
            has_holders,
            socials: links,
        }))
    }

    /// Name as shown in alert prompts.
    pub async fn token_name(&self, addr: &str, chain: Chain) -> String {
        let mut name = self
            .on_chain(addr, chain)
            .await
            .map(|o| o.name)
            .unwrap_or_else(|| "Unknown".to_string());
        if let Some(cg_name) = self.coingecko(addr, chain).await.and_then(|c| c.name) {
            name = cg_name;
        }
        name
    }

    pub async fn describe(&self, addr: &str, chain: Chain) -> TokenDescription {
        let on_chain = self.on_chain(addr, chain).await.unwrap_or_default();
        let cg = self.coingecko(addr, chain).await;

        let mut name = on_chain.name.clone();
        let mut symbol = on_chain.symbol.clone();
        if let Some(c) = &cg {
            name = c.name.clone().unwrap_or(name);
            symbol = c.symbol.clone().unwrap_or(symbol);
        }

        let links = self.socials(addr, chain).await;
        let (text, meaningful) = self
            .build_description(
                &name,
                &symbol,
                chain,
                cg.as_ref(),
                on_chain.description.as_deref(),
                &links,
            )
            .await;

        let is_meme = match &cg {
            Some(c) if !c.tags.is_empty() => c.is_meme(),
            _ => meme_context(&name).is_some() || text.to_lowercase().contains("meme"),
        };

        TokenDescription {
            name,
            symbol,
            text,
            is_meme,
            meaningful,
        }
    }

    pub async fn top_holders(&self, addr: &str, chain: Chain) -> HolderSummary {
        if chain == Chain::Sol {
            if let Some(asset) = self.sources.helius.asset(addr).await {
                if !asset.holders.is_empty() {
                    return HolderSummary::List(asset.holders);
                }
            }
            return match self
                .sources
                .goplus
                .token_security(addr, chain)
                .await
                .and_then(|s| s.top_10_holder_rate)
            {
                Some(rate) => HolderSummary::TopTenRate(rate * 100.0),
                None => HolderSummary::Unavailable,
            };
        }

        match self.sources.goplus.token_security(addr, chain).await {
            Some(report) if !report.holders.is_empty() => {
                HolderSummary::List(largest_holders(report.holders))
            }
            _ => HolderSummary::Unavailable,
        }
    }
}

/// Explorer view to score with; `None` when neither side knows the address.
fn known_on_chain(on_chain: Option<OnChain>, dex: Option<&DexSnapshot>) -> Option<OnChain> {
    match (on_chain, dex) {
        (None, None) => None,
        (on_chain, _) => Some(on_chain.unwrap_or_default()),
    }
}

/// Name and symbol: explorer first, then the DEX pair when the explorer has
/// no name, with CoinGecko overriding both.
fn merge_identity(
    on_chain: &OnChain,
    dex: Option<&DexSnapshot>,
    cg: Option<&CoinGeckoInfo>,
) -> (String, String) {
    let (mut name, mut symbol) = (on_chain.name.clone(), on_chain.symbol.clone());
    if name == "Unknown" {
        if let Some(d) = dex {
            name = d.base_name.clone().unwrap_or_else(|| "Unknown".to_string());
            symbol = d.base_symbol.clone().unwrap_or_else(|| "N/A".to_string());
        }
    }
    if let Some(c) = cg {
        if let Some(n) = &c.name {
            name = n.clone();
        }
        if let Some(s) = &c.symbol {
            symbol = s.clone();
        }
    }
    (name, symbol)
}

/// CoinGecko market cap, else pair FDV, else pair liquidity.
fn merge_market_cap(cg: Option<&CoinGeckoInfo>, dex: Option<&DexSnapshot>) -> f64 {
    cg.map(|c| c.market_cap)
        .filter(|m| *m != 0.0)
        .or_else(|| dex.map(|d| d.fdv).filter(|f| *f != 0.0))
        .or_else(|| dex.map(|d| d.liquidity_usd))
        .unwrap_or(0.0)
}

fn largest_holders(mut holders: Vec<HolderShare>) -> Vec<HolderShare> {
    holders.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    holders.truncate(TOP_HOLDERS);
    holders
}

#[allow(clippy::too_many_arguments)]
fn risk_inputs(
    chain: Chain,
    on_chain: &OnChain,
    security: Option<&SecurityReport>,
    dex: Option<&DexSnapshot>,
    market_cap: f64,
    age: Option<TokenAge>,
    launch_line: String,
    addr: &str,
) -> RiskInputs {
    let audit = fetch_audit_info(addr);

    let mut admin_controls = if on_chain.verified && chain.is_evm() {
        detect_admin_controls(&on_chain.source_code)
    } else {
        Vec::new()
    };
    if let Some(report) = security {
        add_scanner_controls(&mut admin_controls, report);
    }

    let sol_authorities_revoked =
        on_chain.mint_authority.is_none() && on_chain.freeze_authority.is_none();

    RiskInputs {
        verified: on_chain.verified,
        liquidity_usd: dex.map(|d| d.liquidity_usd).unwrap_or(0.0),
        age_days: age.map(|a| a.days),
        launch_text: launch_line,
        whale_pct: security.map(|s| s.max_holder_percent).unwrap_or(0.0),
        owner_can_change_balance: security.map(|s| s.owner_change_balance).unwrap_or(false),
        market_cap_usd: market_cap,
        audited: audit.audited,
        admin_controls,
        is_honeypot: security.map(|s| s.is_honeypot).unwrap_or(false),
        buy_tax: security.map(|s| s.buy_tax).unwrap_or(0.0),
        sell_tax: security.map(|s| s.sell_tax).unwrap_or(0.0),
        is_proxy: security.map(|s| s.is_proxy).unwrap_or(false),
        has_scanner_data: security.is_some(),
        liquidity_locked: security.map(|s| s.liquidity_locked).unwrap_or(false),
        locked_pct: security.map(|s| s.locked_percentage).unwrap_or(0.0),
        lp_holder_count: security.map(|s| s.lp_holder_count).unwrap_or(0),
        is_solana: chain == Chain::Sol,
        ownership_renounced: match security {
            Some(s) => s.ownership_renounced,
            None => chain == Chain::Sol && sol_authorities_revoked,
        },
        holder_count: security.map(|s| s.holder_count),
        is_mintable: match security {
            Some(s) => s.is_mintable,
            None => chain == Chain::Sol && on_chain.mint_authority.is_some(),
        },
        total_supply: security
            .map(|s| s.total_supply.clone())
            .unwrap_or_else(|| on_chain.total_supply.clone()),
        transfer_pausable: security.map(|s| s.transfer_pausable).unwrap_or(false),
        has_blacklist: security.map(|s| s.has_blacklist).unwrap_or(false),
        is_anti_whale: security.map(|s| s.is_anti_whale).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_text_variants() {
        assert_eq!(
            launch_text(Some("May 01, 2024"), Some(TokenAge { days: 0, hours: Some(3) })),
            "Launched approximately 3 hours ago"
        );
        assert_eq!(
            launch_text(Some("May 01, 2024"), Some(TokenAge { days: 12, hours: None })),
            "Launched: May 01, 2024 (12 days ago)"
        );
        assert_eq!(
            launch_text(None, Some(TokenAge { days: 2, hours: None })),
            "Launched approximately 2 days ago"
        );
        assert_eq!(launch_text(None, None), "Launch date unknown");
    }

    #[test]
    fn holders_sorted_and_truncated() {
        let holders = (1..=7)
            .map(|i| HolderShare {
                address: format!("0x{}", i),
                percent: i as f64,
            })
            .collect();
        let top = largest_holders(holders);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].percent, 7.0);
        assert_eq!(top[4].percent, 3.0);
    }

    #[test]
    fn solana_without_scanner_uses_authorities() {
        let on_chain = OnChain {
            verified: true,
            mint_authority: Some("Auth".to_string()),
            ..Default::default()
        };
        let inputs = risk_inputs(
            Chain::Sol,
            &on_chain,
            None,
            None,
            0.0,
            None,
            "Launch date unknown".to_string(),
            "So11111111111111111111111111111111111111112",
        );
        assert!(inputs.is_mintable);
        assert!(!inputs.ownership_renounced);
        assert!(!inputs.has_scanner_data);
        assert_eq!(inputs.holder_count, None);
    }

    #[test]
    fn evm_admin_controls_need_verified_source() {
        let on_chain = OnChain {
            verified: true,
            source_code: "function pause() external {}".to_string(),
            ..Default::default()
        };
        let security = SecurityReport {
            has_blacklist: true,
            ..Default::default()
        };
        let inputs = risk_inputs(
            Chain::Eth,
            &on_chain,
            Some(&security),
            None,
            0.0,
            None,
            String::new(),
            "0x0",
        );
        assert_eq!(inputs.admin_controls, vec!["pause", "blacklist"]);

        let unverified = OnChain {
            verified: false,
            ..on_chain
        };
        let inputs = risk_inputs(
            Chain::Eth,
            &unverified,
            None,
            None,
            0.0,
            None,
            String::new(),
            "0x0",
        );
        assert!(inputs.admin_controls.is_empty());
    }

    fn pair(name: Option<&str>, fdv: f64, liquidity: f64) -> DexSnapshot {
        DexSnapshot {
            base_name: name.map(str::to_string),
            base_symbol: name.map(|n| n.to_uppercase()),
            fdv,
            liquidity_usd: liquidity,
            ..Default::default()
        }
    }

    #[test]
    fn unknown_address_is_not_found() {
        assert!(known_on_chain(None, None).is_none());

        let dex = pair(Some("Bonk"), 0.0, 0.0);
        let fallback = known_on_chain(None, Some(&dex)).unwrap();
        assert_eq!(fallback.name, "Unknown");
        assert_eq!(fallback.total_supply, "0");

        let explorer = OnChain {
            name: "Pepe".to_string(),
            ..Default::default()
        };
        assert_eq!(known_on_chain(Some(explorer), None).unwrap().name, "Pepe");
    }

    #[test]
    fn identity_prefers_explorer_then_pair_then_coingecko() {
        let named = OnChain {
            name: "Pepe".to_string(),
            symbol: "PEPE".to_string(),
            ..Default::default()
        };
        let dex = pair(Some("Pepe Pair"), 0.0, 0.0);
        assert_eq!(
            merge_identity(&named, Some(&dex), None),
            ("Pepe".to_string(), "PEPE".to_string())
        );

        let unnamed = OnChain::default();
        assert_eq!(
            merge_identity(&unnamed, Some(&dex), None),
            ("Pepe Pair".to_string(), "PEPE PAIR".to_string())
        );
        assert_eq!(
            merge_identity(&unnamed, Some(&pair(None, 0.0, 0.0)), None),
            ("Unknown".to_string(), "N/A".to_string())
        );

        let cg = CoinGeckoInfo {
            name: Some("Pepe Coin".to_string()),
            symbol: None,
            ..Default::default()
        };
        assert_eq!(
            merge_identity(&named, Some(&dex), Some(&cg)),
            ("Pepe Coin".to_string(), "PEPE".to_string())
        );
    }

    #[test]
    fn market_cap_falls_back_to_fdv_then_liquidity() {
        let cg = CoinGeckoInfo {
            market_cap: 5_000_000.0,
            ..Default::default()
        };
        let dex = pair(None, 2_000_000.0, 40_000.0);
        assert_eq!(merge_market_cap(Some(&cg), Some(&dex)), 5_000_000.0);
        assert_eq!(merge_market_cap(Some(&CoinGeckoInfo::default()), Some(&dex)), 2_000_000.0);
        assert_eq!(merge_market_cap(None, Some(&pair(None, 0.0, 40_000.0))), 40_000.0);
        assert_eq!(merge_market_cap(None, None), 0.0);
    }

    #[test]
    fn placeholder_mentions_chain() {
        assert_eq!(
            placeholder_description("Foo", "FOO", Chain::Base),
            "This is Foo (FOO), a token on the BASE blockchain. No detailed description available."
        );
    }
}
