// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Number and text formatting for chat replies.

use crate::validators::RiskAssessment;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

/// Telegram text message limit.
pub const TEXT_LIMIT: usize = 4096;
/// Telegram photo caption limit.
pub const CAPTION_LIMIT: usize = 1024;

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

fn subscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|c| c.to_digit(10).map(|d| SUBSCRIPT_DIGITS[d as usize]).unwrap_or(c))
        .collect()
}

/// Format a USD price string. Tiny prices collapse their leading zeros into a
/// subscript count, e.g. `0.00001234` becomes `$0.0₄1234`.
pub fn format_price(price: &str) -> String {
    if price == "0" {
        return "$0".to_string();
    }

    let price = price.trim();
    let p = match Decimal::from_str(price).or_else(|_| Decimal::from_scientific(price)) {
        Ok(p) => p,
        Err(e) => {
            warn!("Price format error for {}: {}", price, e);
            return format!("${}", price);
        }
    };

    if p >= Decimal::new(1, 3) || p <= Decimal::ZERO {
        return format!("${:.4}", p);
    }

    let pf = p.to_f64().unwrap_or(0.0);
    let order = pf.log10().floor() as i32;
    let zeros = -order;
    let mantissa = pf / 10f64.powi(order);
    let mantissa_str: String = format!("{:.4}", mantissa)
        .chars()
        .take(5)
        .filter(|c| *c != '.')
        .collect();

    format!("$0.0{}{}", subscript(zeros - 1), mantissa_str)
}

/// Human-readable supply, e.g. `1.5 billion`.
pub fn format_large_number(num: &str) -> String {
    if num == "0" || num == "Unknown" {
        return "Unknown".to_string();
    }
    match num.trim().parse::<f64>() {
        Ok(n) if n >= 1e12 => format!("{:.1} trillion", n / 1e12),
        Ok(n) if n >= 1e9 => format!("{:.1} billion", n / 1e9),
        Ok(n) if n >= 1e6 => format!("{:.1} million", n / 1e6),
        Ok(n) if n >= 1e3 => format!("{:.1} thousand", n / 1e3),
        Ok(n) => format!("{}", n as i64),
        Err(e) => {
            warn!("Supply format error for {}: {}", num, e);
            num.to_string()
        }
    }
}

/// Whole number with thousands separators.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

/// `$1,234,567` style dollar amount.
pub fn format_usd(value: f64) -> String {
    format!("${}", group_thousands(value))
}

/// Same as [`format_usd`] for a decimal string such as a stored liquidity value.
pub fn format_usd_str(value: &str) -> String {
    format_usd(value.trim().parse::<f64>().unwrap_or(0.0))
}

/// Split `text` into chunks no longer than `limit` bytes, preferring to break
/// at the last newline before the limit.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = text;

    while current.len() > limit {
        let mut boundary = limit;
        while !current.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let split_at = match current[..boundary].rfind('\n') {
            Some(idx) if idx > 0 => idx,
            _ => boundary,
        };
        parts.push(current[..split_at].to_string());
        current = &current[split_at..];
    }
    parts.push(current.to_string());
    parts
}

/// Background blurb for well-known meme themes.
pub fn meme_context(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    if name.contains("pepe") {
        return Some(
            "Pepe is a meme frog that originated on 4chan and became a symbol in crypto culture.",
        );
    }
    if name.contains("doge") || name.contains("shib") {
        return Some("Doge and Shiba Inu are dog-based memes and icons of meme coins.");
    }
    if name.contains("elon") {
        return Some("This token may reference Elon Musk, who often influences meme coins.");
    }
    None
}

fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = paragraph.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some((next_idx, next)) = chars.peek().copied() {
                if next.is_whitespace() {
                    sentences.push(&paragraph[start..=idx]);
                    start = next_idx + next.len_utf8();
                    chars.next();
                }
            }
        }
    }
    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences.into_iter().filter(|s| !s.trim().is_empty()).collect()
}

/// Trim a long description to roughly `budget` characters, cutting at
/// sentence boundaries and keeping the paragraph breaks.
pub fn trim_description(description: &str, budget: usize) -> String {
    let mut out = String::new();
    let mut used = 0;

    'paragraphs: for para in description.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        let mut para_text = String::new();
        for sentence in split_sentences(para) {
            if used + sentence.len() + para_text.len() > budget {
                if !para_text.is_empty() {
                    out.push_str(para_text.trim_end());
                    out.push_str("\n\n");
                }
                continue 'paragraphs;
            }
            para_text.push_str(sentence);
            para_text.push(' ');
        }
        out.push_str(para_text.trim_end());
        out.push_str("\n\n");
        used += para_text.len();
    }

    out.trim_end().to_string()
}

/// Shortened address for holder lists: `0x1234...abcd`.
pub fn short_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Minimal escaping for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Scan report body: headline numbers, flags, score and verdict.
pub fn render_report(
    name: &str,
    symbol: &str,
    price_usd: &str,
    volume_24h: f64,
    assessment: &RiskAssessment,
) -> String {
    let mut msg = format!(
        "{} ({}):\n\nCurrent Price: {}\n24h Volume: {}\n",
        name,
        symbol,
        format_price(price_usd),
        format_usd(volume_24h)
    );
    if let Some(tax) = &assessment.tax_info {
        msg.push_str(tax);
        msg.push('\n');
    }
    msg.push_str("\nHere's what I found:\n");

    if assessment.green_flags.is_empty() {
        msg.push_str("\nNo green flags to highlight.\n");
    } else {
        msg.push_str("\nGreen Flags: \n");
        for flag in &assessment.green_flags {
            msg.push_str(&format!("- {}\n", flag));
        }
    }

    if assessment.red_flags.is_empty() {
        msg.push_str("\nNo red flags found.\n");
    } else {
        msg.push_str("\nRed Flags: \n");
        for flag in &assessment.red_flags {
            msg.push_str(&format!("- {}\n", flag));
        }
    }

    msg.push_str(&format!(
        "\nRisk Score: {}/100 - {}\n\nWhat does this mean?\n\n{}",
        assessment.score,
        assessment.level.label(),
        assessment.level.verdict()
    ));
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_prices_use_four_decimals() {
        assert_eq!(format_price("0"), "$0");
        assert_eq!(format_price("1.5"), "$1.5000");
        assert_eq!(format_price("0.001"), "$0.0010");
    }

    #[test]
    fn tiny_prices_use_subscript_zero_count() {
        assert_eq!(format_price("0.00001234"), "$0.0₄1234");
        assert_eq!(format_price("0.0005"), "$0.0₃5000");
    }

    #[test]
    fn scientific_prices_match_decimal_form() {
        assert_eq!(format_price("1.2e-5"), format_price("0.000012"));
        assert_eq!(format_price("1.5e0"), "$1.5000");
    }

    #[test]
    fn unparseable_price_is_echoed() {
        assert_eq!(format_price("n/a"), "$n/a");
    }

    #[test]
    fn large_numbers_get_words() {
        assert_eq!(format_large_number("1000000000"), "1.0 billion");
        assert_eq!(format_large_number("2500000"), "2.5 million");
        assert_eq!(format_large_number("420"), "420");
        assert_eq!(format_large_number("0"), "Unknown");
    }

    #[test]
    fn usd_grouping() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(999.4), "$999");
        assert_eq!(format_usd(1234567.8), "$1,234,568");
        assert_eq!(format_usd_str("25000.5"), "$25,001");
    }

    #[test]
    fn split_prefers_newlines() {
        let text = format!("{}\n{}", "a".repeat(30), "b".repeat(30));
        let parts = split_message(&text, 40);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "a".repeat(30));
        assert!(parts[1].starts_with('\n'));
        assert!(parts.iter().all(|p| p.len() <= 40));
    }

    #[test]
    fn split_hard_cuts_without_newline() {
        let text = "x".repeat(100);
        let parts = split_message(&text, 40);
        assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![40, 40, 20]);
    }

    #[test]
    fn description_is_trimmed_at_sentences() {
        let text = "First sentence here. Second one follows! Third? Yes.";
        assert_eq!(trim_description(text, 30), "First sentence here.");
        assert_eq!(trim_description(text, 800), text);
    }

    #[test]
    fn overflowing_paragraph_does_not_hide_later_ones() {
        let text = format!("{}.\n\nShort tail.", "x".repeat(40));
        assert_eq!(trim_description(&text, 30), "Short tail.");
    }

    #[test]
    fn meme_context_matches_names() {
        assert!(meme_context("Pepe Coin").is_some());
        assert!(meme_context("Shiba Inu").is_some());
        assert!(meme_context("Chainlink").is_none());
    }

    #[test]
    fn short_address_keeps_ends() {
        assert_eq!(
            short_address("0x6982508145454Ce325dDbE47a25d4ec3d2311933"),
            "0x6982...1933"
        );
    }

    #[test]
    fn report_lists_flags_and_score() {
        use crate::validators::RiskLevel;
        let assessment = RiskAssessment {
            score: 45,
            level: RiskLevel::from_score(45),
            green_flags: vec!["Contract verified".to_string()],
            red_flags: vec![],
            negatives: vec![],
            tax_info: Some("Taxes: Buy 1.0%, Sell 2.0%.".to_string()),
        };
        let report = render_report("Pepe", "PEPE", "0.00001234", 1500.0, &assessment);
        assert!(report.starts_with("Pepe (PEPE):\n\nCurrent Price: $0.0₄1234\n24h Volume: $1,500\n"));
        assert!(report.contains("Taxes: Buy 1.0%, Sell 2.0%.\n"));
        assert!(report.contains("Green Flags: \n- Contract verified\n"));
        assert!(report.contains("No red flags found."));

        let bare = RiskAssessment {
            green_flags: vec![],
            ..assessment.clone()
        };
        assert!(render_report("Pepe", "PEPE", "0", 0.0, &bare).contains("\nNo green flags to highlight.\n"));
        assert!(report.contains(&format!("Risk Score: 45/100 - {}", assessment.level.label())));
        assert!(report.ends_with(assessment.level.verdict()));
    }
}
