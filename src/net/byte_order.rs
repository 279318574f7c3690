//! Host to network byte order conversion of finished headers.
//!
//! Conversion is the last step before a header is handed to the sender. It
//! swaps the multi-byte fields in place and must happen exactly once, after
//! the checksum has been computed over the host-order values. Neither
//! ordering mistake is detected: converting twice swaps the fields back, and
//! converting before the checksum produces a checksum over swapped words.

use super::ip::IpHeader;
use super::tcp::TcpHeader;

/// In-place swap of a header's multi-byte fields between host and network
/// (big-endian) order. Single-byte fields are left alone.
pub trait NetworkOrder {
    fn to_network_order(&mut self);

    /// Inverse of [`to_network_order`](NetworkOrder::to_network_order).
    fn to_host_order(&mut self);
}

impl NetworkOrder for IpHeader {
    fn to_network_order(&mut self) {
        self.total_length = self.total_length.to_be();
        self.id = self.id.to_be();
        self.flags_n_offset = self.flags_n_offset.to_be();
        self.checksum = self.checksum.to_be();
        self.src_address = self.src_address.to_be();
        self.dst_address = self.dst_address.to_be();
    }

    fn to_host_order(&mut self) {
        self.total_length = u16::from_be(self.total_length);
        self.id = u16::from_be(self.id);
        self.flags_n_offset = u16::from_be(self.flags_n_offset);
        self.checksum = u16::from_be(self.checksum);
        self.src_address = u32::from_be(self.src_address);
        self.dst_address = u32::from_be(self.dst_address);
    }
}

impl NetworkOrder for TcpHeader {
    fn to_network_order(&mut self) {
        self.src_port = self.src_port.to_be();
        self.dst_port = self.dst_port.to_be();
        self.sequence_num = self.sequence_num.to_be();
        self.ack_num = self.ack_num.to_be();
        self.window = self.window.to_be();
        self.checksum = self.checksum.to_be();
        self.urgent_ptr = self.urgent_ptr.to_be();
    }

    fn to_host_order(&mut self) {
        self.src_port = u16::from_be(self.src_port);
        self.dst_port = u16::from_be(self.dst_port);
        self.sequence_num = u32::from_be(self.sequence_num);
        self.ack_num = u32::from_be(self.ack_num);
        self.window = u16::from_be(self.window);
        self.checksum = u16::from_be(self.checksum);
        self.urgent_ptr = u16::from_be(self.urgent_ptr);
    }
}

/// Converts a checksummed header to network order in place.
pub fn to_network_order<H: NetworkOrder>(header: &mut H) {
    header.to_network_order();
}

/// Converts a network-order header back to host order in place.
pub fn to_host_order<H: NetworkOrder>(header: &mut H) {
    header.to_host_order();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ip::protocol;
    use crate::net::tcp::control;

    fn ip_header() -> IpHeader {
        let mut ip = IpHeader::new();
        ip.set_version(4);
        ip.set_ihl(5);
        ip.set_type_of_service(0x10);
        ip.set_total_length(0x0128);
        ip.set_id(0xbe01);
        ip.set_flags(0b010);
        ip.set_offset(0x0a3);
        ip.set_time_to_live(0x40);
        ip.set_protocol(protocol::TCP);
        ip.set_src_address(0xc0a8_0107);
        ip.set_dst_address(0x0a00_02f3);
        ip
    }

    fn tcp_header() -> TcpHeader {
        let mut tcp = TcpHeader::new();
        tcp.set_src_port(0xcf4a);
        tcp.set_dst_port(0x0135);
        tcp.set_sequence_num(0x0c08_a8b5);
        tcp.set_ack_num(0x7e01_33d2);
        tcp.set_offset(5);
        tcp.set_control_bits(control::SYN | control::ACK);
        tcp.set_window(0xfa01);
        tcp.set_urgent_ptr(0x0203);
        tcp
    }

    #[test]
    fn ip_wire_bytes_are_big_endian() {
        let mut ip = ip_header();
        ip.compute_checksum();
        let checksum = ip.checksum();
        to_network_order(&mut ip);

        let bytes = ip.wire_bytes();
        assert_eq!(&bytes[..10], &[0x45, 0x10, 0x01, 0x28, 0xbe, 0x01, 0x40, 0xa3, 0x40, 0x06]);
        assert_eq!(&bytes[10..12], &checksum.to_be_bytes());
        assert_eq!(&bytes[12..], &[0xc0, 0xa8, 0x01, 0x07, 0x0a, 0x00, 0x02, 0xf3]);
    }

    #[test]
    fn tcp_wire_bytes_are_big_endian() {
        let mut ip = ip_header();
        let mut tcp = tcp_header();
        tcp.compute_checksum(&ip);
        let checksum = tcp.checksum();
        to_network_order(&mut ip);
        to_network_order(&mut tcp);

        let bytes = tcp.wire_bytes();
        assert_eq!(
            &bytes[..16],
            &[
                0xcf, 0x4a, 0x01, 0x35, 0x0c, 0x08, 0xa8, 0xb5, 0x7e, 0x01, 0x33, 0xd2, 0x50, 0x12,
                0xfa, 0x01
            ]
        );
        assert_eq!(&bytes[16..18], &checksum.to_be_bytes());
        assert_eq!(&bytes[18..], &[0x02, 0x03]);
    }

    #[test]
    fn host_order_restores_every_converted_field() {
        let mut ip = ip_header();
        let mut tcp = tcp_header();
        ip.compute_checksum();
        tcp.compute_checksum(&ip);
        let (ip_before, tcp_before) = (ip, tcp);

        to_network_order(&mut ip);
        to_network_order(&mut tcp);
        to_host_order(&mut ip);
        to_host_order(&mut tcp);

        assert_eq!(ip, ip_before);
        assert_eq!(tcp, tcp_before);
        assert!(ip.verify_checksum());
        assert!(tcp.verify_checksum(&ip));
    }

    #[test]
    fn single_byte_fields_are_untouched() {
        let mut ip = ip_header();
        let mut tcp = tcp_header();
        to_network_order(&mut ip);
        to_network_order(&mut tcp);

        assert_eq!(ip.version(), 4);
        assert_eq!(ip.ihl(), 5);
        assert_eq!(ip.type_of_service(), 0x10);
        assert_eq!(ip.time_to_live(), 0x40);
        assert_eq!(ip.protocol(), protocol::TCP);
        assert_eq!(tcp.offset(), 5);
        assert_eq!(tcp.control_bits(), control::SYN | control::ACK);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn converting_twice_swaps_back() {
        let mut ip = ip_header();
        let before = ip;
        to_network_order(&mut ip);
        assert_ne!(ip, before);
        to_network_order(&mut ip);
        assert_eq!(ip, before);
    }
}
