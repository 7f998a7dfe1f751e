/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Lenient value parsers used by the per-module field setters.
//!
//! Integer fields are lenient: a bad value silently becomes `0` (or the
//! prefix that did parse).  Address fields are strict: they either parse
//! completely or are rejected.

use std::net::Ipv4Addr;

/// Parses an unsigned integer, detecting the base from its prefix.
///
/// * Leading whitespace and one optional `+`/`-` sign are accepted.
/// * `0x`/`0X` selects hexadecimal, a leading `0` octal, otherwise decimal.
/// * Parsing stops at the first character that is not a digit of the base.
/// * No digits at all yields `0`.
/// * Overflow saturates at `u32::MAX`; a `-` sign negates modulo 2³².
pub fn parse_ulong(value: &[u8]) -> u32 {
    let start = value
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(value.len());
    let s = &value[start..];
    let (negative, s) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if s.len() >= 3
        && s[0] == b'0'
        && (s[1] == b'x' || s[1] == b'X')
        && s[2].is_ascii_hexdigit()
    {
        (16, &s[2..])
    } else if s.first() == Some(&b'0') {
        (8, s)
    } else {
        (10, s)
    };

    let mut acc: u32 = 0;
    let mut overflow = false;
    for &c in digits {
        let Some(d) = char::from(c).to_digit(radix) else { break };
        match acc.checked_mul(radix).and_then(|v| v.checked_add(d)) {
            Some(v) => acc = v,
            None => overflow = true,
        }
    }

    if overflow {
        u32::MAX
    } else if negative {
        acc.wrapping_neg()
    } else {
        acc
    }
}

/// Parses six `:`-separated hexadecimal octets (`"de:ad:be:ef:00:01"`).
pub fn parse_mac(value: &[u8]) -> Option<[u8; 6]> {
    let value = std::str::from_utf8(value).ok()?;
    let mut mac = [0u8; 6];
    let mut parts = value.split(':');
    for octet in mac.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 2 {
            return None;
        }
        *octet = u8::from_str_radix(part, 16).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(mac)
}

/// Parses a dotted-quad IPv4 address with each octet in `0..=255`.
pub fn parse_ipv4(value: &[u8]) -> Option<Ipv4Addr> {
    let value = std::str::from_utf8(value).ok()?;
    let mut octets = [0u8; 4];
    let mut parts = value.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// Formats a MAC address as lowercase colon-separated hex.
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
