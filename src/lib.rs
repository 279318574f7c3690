//! Hand-crafted IPv4 and TCP headers for raw sockets.
//!
//! [`net::IpHeader`] and [`net::TcpHeader`] are `#[repr(C)]` 20-byte models of
//! the option-less headers. Fields are set in host order, checksums are
//! computed with ones' complement arithmetic (RFC 1071), and the headers are
//! finally swapped to network order in place, at which point their
//! `wire_bytes()` are ready to be written after `IP_HDRINCL`.
//!
//! ```
//! use pktcraft::net::{self, ip::protocol, tcp::control, IpHeader, TcpHeader};
//!
//! let mut ip = IpHeader::new();
//! ip.set_version(4);
//! ip.set_ihl(5);
//! ip.set_total_length(40);
//! ip.set_time_to_live(64);
//! ip.set_protocol(protocol::TCP);
//! ip.set_src_address(u32::from(std::net::Ipv4Addr::new(10, 0, 0, 1)));
//! ip.set_dst_address(u32::from(std::net::Ipv4Addr::new(10, 0, 0, 2)));
//!
//! let mut tcp = TcpHeader::new();
//! tcp.set_src_port(40000);
//! tcp.set_dst_port(80);
//! tcp.set_offset(5);
//! tcp.set_control_bits(control::SYN);
//! tcp.set_window(64240);
//!
//! net::finalize(&mut ip, &mut tcp);
//!
//! let mut packet = Vec::with_capacity(40);
//! packet.extend_from_slice(&ip.wire_bytes());
//! packet.extend_from_slice(&tcp.wire_bytes());
//! assert_eq!(packet[0], 0x45);
//! assert_eq!(&packet[16..20], &[10, 0, 0, 2]);
//! ```

pub mod error;
pub mod hextools;
pub mod net;

pub use error::{HeaderError, HeaderKind, OrAbort, Result};
pub use net::{finalize, finalize_checked, IpHeader, NetworkOrder, TcpHeader};
