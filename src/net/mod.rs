//! IPv4 and TCP header construction.
//!
//! A segment is built in a fixed order:
//!
//! 1. fill in an [`IpHeader`] and a [`TcpHeader`] through their setters,
//! 2. [`IpHeader::compute_checksum`],
//! 3. [`TcpHeader::compute_checksum`] with the IP header for the pseudo-header,
//! 4. [`to_network_order`] on both,
//! 5. hand `wire_bytes()` of each to whatever assembles and sends the packet.
//!
//! [`finalize`] runs steps 2 to 4.

pub mod byte_order;
pub mod checksum;
pub mod ip;
pub mod tcp;

pub use byte_order::{to_host_order, to_network_order, NetworkOrder};
pub use checksum::{ones_complement_add, ones_complement_sum};
pub use ip::{IpHeader, IP_HEADER_LEN};
pub use tcp::{TcpHeader, TCP_HEADER_LEN};

use crate::error::{require, HeaderKind, Result};
use tracing::debug;

/// Checksums both headers and converts them to network order.
///
/// The TCP checksum reads the IP header before either is converted. Call once
/// per header pair; afterwards both are ready for the wire and must not be
/// modified.
pub fn finalize(ip: &mut IpHeader, tcp: &mut TcpHeader) {
    ip.compute_checksum();
    tcp.compute_checksum(ip);
    debug!(
        "headers finalized, ip checksum 0x{:04x}, tcp checksum 0x{:04x}",
        ip.checksum(),
        tcp.checksum()
    );
    to_network_order(ip);
    to_network_order(tcp);
}

/// [`finalize`] for callers holding optional headers.
///
/// Nothing is modified unless both headers are present.
pub fn finalize_checked(ip: Option<&mut IpHeader>, tcp: Option<&mut TcpHeader>) -> Result<()> {
    let ip = require(ip, HeaderKind::Ip)?;
    let tcp = require(tcp, HeaderKind::Tcp)?;
    finalize(ip, tcp);
    Ok(())
}
