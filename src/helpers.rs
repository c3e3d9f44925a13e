// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Small async and string helpers shared by the lookup paths.

use std::future::Future;
use std::time::Duration;

/// Number-group suffixes used by [`format_number_short`].
const GROUP_SUFFIXES: [&str; 8] = ["K", "M", "B", "T", "Qa", "Qi", "Si", "Se"];

/// Race `request` against a timer, resolving to `fallback` if the timer
/// wins.
///
/// The request runs on its own task and is not cancelled when the timer
/// fires; a late result is discarded.
pub async fn with_timeout<T, F>(request: F, fallback: T, timeout: Duration) -> T
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(request);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Lookup task failed");
            fallback
        }
        Err(_) => {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Lookup timed out, using fallback");
            fallback
        }
    }
}

/// Strip NUL padding from on-chain byte strings.
pub fn trim_byte_string(value: &str) -> String {
    value.replace('\0', "")
}

/// Shorten an address to `XXXXXX...XXXXXX`, keeping `radius` characters on
/// each side. Values too short to shorten are returned unchanged.
pub fn truncate_account_string(account: &str, radius: usize) -> String {
    let chars: Vec<char> = account.chars().collect();
    if chars.len() <= radius * 2 {
        return account.to_string();
    }
    let start: String = chars[..radius].iter().collect();
    let end: String = chars[chars.len() - radius..].iter().collect();
    format!("{start}...{end}")
}

/// Suffix for a value with `groups` thousands groups (`1` → `K`).
pub fn abbrev_number(groups: usize) -> &'static str {
    match groups {
        0 => "",
        n if n <= GROUP_SUFFIXES.len() => GROUP_SUFFIXES[n - 1],
        _ => "!",
    }
}

/// Abbreviate a decimal string by thousands groups, truncating to `places`
/// fractional digits (`1550000` → `1.55M`). Anything other than a plain
/// decimal integer part is returned unchanged.
pub fn format_number_short(value: &str, places: usize) -> String {
    let value = value.trim();
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value),
    };
    let integer = unsigned.split('.').next().unwrap_or_default();
    let integer = integer.trim_start_matches('0');
    if !integer.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }

    let groups = integer.len().saturating_sub(1) / 3;
    if groups == 0 {
        return value.to_string();
    }

    let split = integer.len() - groups * 3;
    let (head, tail) = integer.split_at(split);
    let fraction = tail[..places.min(tail.len())].trim_end_matches('0');

    if fraction.is_empty() {
        format!("{sign}{head}{}", abbrev_number(groups))
    } else {
        format!("{sign}{head}.{fraction}{}", abbrev_number(groups))
    }
}
