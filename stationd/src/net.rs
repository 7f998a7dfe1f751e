/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Address acquisition at bring-up: DHCP if requested, static otherwise or
//! when DHCP fails.

use std::net::Ipv4Addr;

use tracing::{info, warn};

use crate::display::DisplaySink;
use crate::modules::network::NetworkIdentity;
use crate::modules::parse::format_mac;

/// Addresses in effect after bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSet {
    pub ip: Ipv4Addr,
    pub dns: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

impl AddressSet {
    pub fn from_identity(identity: &NetworkIdentity) -> Self {
        Self {
            ip: identity.ip,
            dns: identity.dns,
            gateway: identity.gateway,
            subnet: identity.subnet,
        }
    }
}

pub trait NetworkBackend {
    /// Requests a lease.  `None` if no lease was obtained.
    fn acquire_dhcp(&mut self, mac: [u8; 6]) -> Option<AddressSet>;

    /// Applies fixed addresses and returns what is in effect.
    fn configure_static(&mut self, mac: [u8; 6], addresses: AddressSet) -> AddressSet;
}

/// Backend for a hosted build, where the operating system owns the
/// interface.  Leases are never obtained; static addresses are reported back
/// as given.
#[derive(Debug, Default)]
pub struct HostNetwork;

impl NetworkBackend for HostNetwork {
    fn acquire_dhcp(&mut self, mac: [u8; 6]) -> Option<AddressSet> {
        warn!(mac = %format_mac(&mac), "DHCP not available on this host");
        None
    }

    fn configure_static(&mut self, mac: [u8; 6], addresses: AddressSet) -> AddressSet {
        info!(mac = %format_mac(&mac), ip = %addresses.ip, "static addressing");
        addresses
    }
}

/// Brings the interface up according to `identity`, narrating on `sink`.
pub fn bring_up<B: NetworkBackend + ?Sized>(
    backend: &mut B,
    identity: &NetworkIdentity,
    sink: &mut dyn DisplaySink,
) -> AddressSet {
    sink.status(&format!("MAC: {}", format_mac(&identity.mac)));

    let leased = if identity.use_dhcp() {
        sink.status("DHCP...");
        backend.acquire_dhcp(identity.mac)
    } else {
        None
    };

    let addresses = match leased {
        Some(addresses) => addresses,
        None => {
            if identity.use_dhcp() {
                warn!("DHCP failed, falling back to static addresses");
            }
            sink.status("Using static IP.");
            backend.configure_static(identity.mac, AddressSet::from_identity(identity))
        }
    };

    for (label, addr) in [
        ("IP", addresses.ip),
        ("DNS", addresses.dns),
        ("Gateway", addresses.gateway),
        ("Subnet", addresses.subnet),
    ] {
        sink.status(&format!("{label}: {addr}"));
    }
    info!(
        ip = %addresses.ip,
        dns = %addresses.dns,
        gateway = %addresses.gateway,
        subnet = %addresses.subnet,
        "network up"
    );
    addresses
}

// ── Tests ─────────────────────────────────────────────────────────────────────
