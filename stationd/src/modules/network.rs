/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Network identity module: MAC address, static addresses and flags.
//!
//! The values here are what the board asks for at bring-up.  The addresses
//! actually in use (which may come from DHCP) are reported separately by
//! [`NetworkBackend`](crate::net::NetworkBackend).

use std::net::Ipv4Addr;

use tracing::debug;

use super::parse::{format_mac, parse_ipv4, parse_mac, parse_ulong};
use super::{FieldContext, Module};
use crate::store::layout;
use crate::store::{Record, Region};

/// Bit 0 of `flags`: try DHCP before falling back to the static addresses.
pub const FLAG_USE_DHCP: u8 = 1 << 0;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkRecord {
    pub flags: u8,
    pub mac: [u8; 6],
    pub ip: Ipv4Addr,
    pub dns: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl Default for NetworkRecord {
    fn default() -> Self {
        Self {
            flags: 0x00,
            mac: [0x72, 0x65, 0x64, 0x64, 0x69, 0x74],
            ip: Ipv4Addr::new(192, 168, 23, 100),
            dns: Ipv4Addr::new(192, 168, 24, 84),
            gateway: Ipv4Addr::new(192, 168, 23, 1),
            subnet: Ipv4Addr::new(255, 255, 255, 0),
        }
    }
}

impl Record for NetworkRecord {
    const REGION: Region = layout::NETWORK;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::REGION.len);
        out.push(self.flags);
        out.extend_from_slice(&self.mac);
        for addr in [self.ip, self.dns, self.gateway, self.subnet] {
            out.extend_from_slice(&addr.octets());
        }
        out
    }

    fn decode(bytes: &[u8]) -> Self {
        let addr = |at: usize| Ipv4Addr::new(bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]);
        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[1..7]);
        Self {
            flags: bytes[0],
            mac,
            ip: addr(7),
            dns: addr(11),
            gateway: addr(15),
            subnet: addr(19),
        }
    }
}

// ── Live state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub flags: u8,
    pub mac: [u8; 6],
    pub ip: Ipv4Addr,
    pub dns: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl NetworkIdentity {
    pub fn new() -> Self {
        Self {
            flags: 0,
            mac: [0; 6],
            ip: Ipv4Addr::UNSPECIFIED,
            dns: Ipv4Addr::UNSPECIFIED,
            gateway: Ipv4Addr::UNSPECIFIED,
            subnet: Ipv4Addr::UNSPECIFIED,
        }
    }

    pub fn use_dhcp(&self) -> bool {
        self.flags & FLAG_USE_DHCP != 0
    }
}

impl Default for NetworkIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `value` into `field`; on failure restores the field from `old`.
fn set_address(field: &mut Ipv4Addr, old: Ipv4Addr, key: &[u8], value: &[u8]) {
    match parse_ipv4(value) {
        Some(addr) => *field = addr,
        None => {
            debug!(
                key = %String::from_utf8_lossy(key),
                value = %String::from_utf8_lossy(value),
                "malformed address, keeping old value"
            );
            *field = old;
        }
    }
}

impl Module for NetworkIdentity {
    type Record = NetworkRecord;

    fn serialize(&self) -> NetworkRecord {
        NetworkRecord {
            flags: self.flags,
            mac: self.mac,
            ip: self.ip,
            dns: self.dns,
            gateway: self.gateway,
            subnet: self.subnet,
        }
    }

    fn configure(&mut self, record: &NetworkRecord) {
        self.flags = record.flags;
        self.mac = record.mac;
        self.ip = record.ip;
        self.dns = record.dns;
        self.gateway = record.gateway;
        self.subnet = record.subnet;
    }

    fn apply_field(
        working: &mut NetworkRecord,
        old: &NetworkRecord,
        key: &[u8],
        value: &[u8],
        _ctx: &FieldContext,
    ) {
        match key.to_ascii_lowercase().as_slice() {
            b"flags" => working.flags = parse_ulong(value) as u8,
            b"mac" => match parse_mac(value) {
                Some(mac) => working.mac = mac,
                None => {
                    debug!(value = %String::from_utf8_lossy(value), "malformed MAC, keeping old value");
                    working.mac = old.mac;
                }
            },
            b"ip" => set_address(&mut working.ip, old.ip, key, value),
            b"dns" => set_address(&mut working.dns, old.dns, key, value),
            b"gateway" => set_address(&mut working.gateway, old.gateway, key, value),
            b"subnet" => set_address(&mut working.subnet, old.subnet, key, value),
            _ => {}
        }
    }

    fn describe(&self, record: &NetworkRecord) -> Vec<String> {
        vec![
            format_mac(&record.mac),
            record.ip.to_string(),
            record.dns.to_string(),
            record.gateway.to_string(),
            record.subnet.to_string(),
            record.flags.to_string(),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_all(old: &NetworkRecord, pairs: &[(&str, &str)]) -> NetworkRecord {
        let mut working = *old;
        for (k, v) in pairs {
            NetworkIdentity::apply_field(
                &mut working,
                old,
                k.as_bytes(),
                v.as_bytes(),
                &FieldContext::default(),
            );
        }
        working
    }

    #[test]
    fn malformed_mac_is_rejected_while_flags_are_accepted() {
        let old = NetworkRecord::default();
        let new = apply_all(&old, &[("mac", "zz:zz:zz:zz:zz:zz"), ("flags", "1")]);
        assert_eq!(new.mac, old.mac);
        assert_eq!(new.flags, 1);
    }

    #[test]
    fn valid_mac_and_addresses_are_accepted() {
        let old = NetworkRecord::default();
        let new = apply_all(
            &old,
            &[
                ("mac", "de:ad:be:ef:00:01"),
                ("ip", "10.0.0.2"),
                ("DNS", "10.0.0.53"),
                ("gateway", "10.0.0.1"),
                ("subnet", "255.255.0.0"),
            ],
        );
        assert_eq!(new.mac, [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]);
        assert_eq!(new.ip, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(new.dns, Ipv4Addr::new(10, 0, 0, 53));
        assert_eq!(new.gateway, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(new.subnet, Ipv4Addr::new(255, 255, 0, 0));
    }

    #[test]
    fn malformed_address_keeps_old_value() {
        let old = NetworkRecord::default();
        let new = apply_all(&old, &[("ip", "10.0.0.2"), ("ip", "10.0.0.999")]);
        assert_eq!(new.ip, old.ip);
    }

    #[test]
    fn record_layout_is_flags_mac_then_addresses() {
        let bytes = NetworkRecord::default().encode();
        assert_eq!(bytes.len(), layout::NETWORK.len);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..7], &[0x72, 0x65, 0x64, 0x64, 0x69, 0x74]);
        assert_eq!(&bytes[7..11], &[192, 168, 23, 100]);
        assert_eq!(&bytes[19..23], &[255, 255, 255, 0]);
        assert_eq!(NetworkRecord::decode(&bytes), NetworkRecord::default());
    }

    #[test]
    fn configure_serialize_is_idempotent() {
        let mut net = NetworkIdentity::new();
        net.configure(&NetworkRecord::default());
        let before = net.clone();
        net.configure(&net.serialize());
        assert_eq!(net, before);
        assert!(!net.use_dhcp());
    }

    #[test]
    fn describe_formats_mac_and_addresses() {
        let net = NetworkIdentity::new();
        let rec = NetworkRecord {
            flags: 1,
            ..NetworkRecord::default()
        };
        assert_eq!(
            net.describe(&rec),
            vec![
                "72:65:64:64:69:74",
                "192.168.23.100",
                "192.168.24.84",
                "192.168.23.1",
                "255.255.255.0",
                "1"
            ]
        );
    }
}
