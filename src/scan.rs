use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};

use pktcraft::hextools::{format_hexdump, HEADER_ROW, PACKET_ROW};
use pktcraft::net::{self, ip::protocol, tcp::control, IpHeader, TcpHeader};
use pktcraft::net::{IP_HEADER_LEN, TCP_HEADER_LEN};
use pnet_packet::ip::IpNextHeaderProtocols;
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::tcp::TcpPacket;
use pnet_packet::Packet;
use rand::Rng;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, info, warn};

const LOWEST_EPHEMERAL_PORT: u16 = 1024;
const DEFAULT_TTL: u8 = 64;
const DEFAULT_WINDOW: u16 = 64240;
const DONT_FRAGMENT: u8 = 0b010;
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(1500);
const RECV_BUFFER_LEN: usize = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

/// Addressing and initial sequence number of one SYN probe.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub source_ip: Ipv4Addr,
    pub destination_ip: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub sequence_num: u32,
}

impl Probe {
    /// A probe from a random ephemeral port with a random sequence number.
    pub fn new(source_ip: Ipv4Addr, destination_ip: Ipv4Addr, destination_port: u16) -> Self {
        let mut rng = rand::thread_rng();
        Probe {
            source_ip,
            destination_ip,
            source_port: rng.gen_range(LOWEST_EPHEMERAL_PORT..u16::MAX),
            destination_port,
            sequence_num: rng.gen(),
        }
    }

    /// Builds the 40-byte IP + TCP SYN packet, checksummed and in network order.
    pub fn build_packet(&self) -> Vec<u8> {
        let mut ip = IpHeader::new();
        ip.set_version(4);
        ip.set_ihl(5);
        ip.set_type_of_service(0);
        ip.set_total_length((IP_HEADER_LEN + TCP_HEADER_LEN) as u16);
        ip.set_id(rand::thread_rng().gen());
        ip.set_flags(DONT_FRAGMENT);
        ip.set_offset(0);
        ip.set_time_to_live(DEFAULT_TTL);
        ip.set_protocol(protocol::TCP);
        ip.set_src_address(u32::from(self.source_ip));
        ip.set_dst_address(u32::from(self.destination_ip));

        let mut tcp = TcpHeader::new();
        tcp.set_src_port(self.source_port);
        tcp.set_dst_port(self.destination_port);
        tcp.set_sequence_num(self.sequence_num);
        tcp.set_ack_num(0);
        tcp.set_offset(5);
        tcp.set_reserved(0);
        tcp.set_control_bits(control::SYN);
        tcp.set_window(DEFAULT_WINDOW);
        tcp.set_urgent_ptr(0);

        net::finalize(&mut ip, &mut tcp);

        debug!("ip header:\n{}", format_hexdump(&ip.wire_bytes(), HEADER_ROW));
        debug!("tcp header:\n{}", format_hexdump(&tcp.wire_bytes(), HEADER_ROW));

        let mut packet = Vec::with_capacity(IP_HEADER_LEN + TCP_HEADER_LEN);
        packet.extend_from_slice(&ip.wire_bytes());
        packet.extend_from_slice(&tcp.wire_bytes());
        packet
    }

    /// Classifies a received IP datagram.
    ///
    /// Returns `None` for anything that is not the target's TCP answer to this
    /// probe, including our own SYN echoed back on loopback.
    pub fn classify_response(&self, datagram: &[u8]) -> Option<PortState> {
        let ip = Ipv4Packet::new(datagram)?;
        if ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp
            || ip.get_source() != self.destination_ip
        {
            return None;
        }

        let tcp = TcpPacket::new(ip.payload())?;
        if tcp.get_source() != self.destination_port || tcp.get_destination() != self.source_port
        {
            return None;
        }

        // raw control octet, byte 13 of the segment
        let flags = tcp.packet()[13];
        debug!("tcp flags received: 0x{:02x}", flags);

        let syn_ack = control::SYN | control::ACK;
        Some(if flags & syn_ack == syn_ack {
            PortState::Open
        } else if flags & control::RST != 0 {
            PortState::Closed
        } else {
            PortState::Filtered
        })
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Sends one SYN and waits for the target's answer.
pub fn tcp_syn_probe(probe: &Probe) -> io::Result<PortState> {
    info!(
        "probing {}:{} from {}:{}",
        probe.destination_ip, probe.destination_port, probe.source_ip, probe.source_port
    );

    // SAFETY: geteuid has no preconditions and cannot fail.
    if unsafe { libc::geteuid() } != 0 {
        warn!("not running as root, opening a raw socket will probably fail");
    }

    let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::TCP))?;
    socket.set_header_included_v4(true)?;
    socket.set_read_timeout(Some(RESPONSE_TIMEOUT))?;

    let packet = probe.build_packet();
    debug!("sending:\n{}", format_hexdump(&packet, PACKET_ROW));

    let destination = SockAddr::from(SocketAddrV4::new(probe.destination_ip, probe.destination_port));
    let sent = socket.send_to(&packet, &destination)?;
    info!("sent {} bytes", sent);

    let deadline = Instant::now() + RESPONSE_TIMEOUT;
    let mut buffer = [0u8; RECV_BUFFER_LEN];
    let mut reader = &socket;

    while Instant::now() < deadline {
        let received = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(err) if is_timeout(&err) => break,
            Err(err) => return Err(err),
        };
        debug!("received {} bytes", received);

        if let Some(state) = probe.classify_response(&buffer[..received]) {
            return Ok(state);
        }
    }

    info!("no answer within {:?}", RESPONSE_TIMEOUT);
    Ok(PortState::Filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> Probe {
        Probe {
            source_ip: Ipv4Addr::new(192, 168, 1, 10),
            destination_ip: Ipv4Addr::new(192, 168, 1, 20),
            source_port: 53066,
            destination_port: 443,
            sequence_num: 0x0c08_a8b4,
        }
    }

    /// Builds the target's reply by reusing the probe builder with the
    /// addressing reversed, then patching the control octet.
    fn reply(probe: &Probe, flags: u8) -> Vec<u8> {
        let reversed = Probe {
            source_ip: probe.destination_ip,
            destination_ip: probe.source_ip,
            source_port: probe.destination_port,
            destination_port: probe.source_port,
            sequence_num: 1,
        };
        let mut packet = reversed.build_packet();
        packet[IP_HEADER_LEN + 13] = flags;
        packet
    }

    #[test]
    fn syn_packet_is_valid_on_the_wire() {
        let probe = probe();
        let packet = probe.build_packet();
        assert_eq!(packet.len(), 40);

        let ip = Ipv4Packet::new(&packet).unwrap();
        assert_eq!(ip.get_version(), 4);
        assert_eq!(ip.get_header_length(), 5);
        assert_eq!(ip.get_total_length(), 40);
        assert_eq!(ip.get_ttl(), DEFAULT_TTL);
        assert_eq!(ip.get_source(), probe.source_ip);
        assert_eq!(ip.get_destination(), probe.destination_ip);
        assert_eq!(ip.get_checksum(), pnet_packet::ipv4::checksum(&ip));

        let tcp = TcpPacket::new(ip.payload()).unwrap();
        assert_eq!(tcp.get_source(), probe.source_port);
        assert_eq!(tcp.get_destination(), probe.destination_port);
        assert_eq!(tcp.get_sequence(), probe.sequence_num);
        assert_eq!(tcp.get_data_offset(), 5);
        assert_eq!(tcp.packet()[13], control::SYN);
        assert_eq!(
            tcp.get_checksum(),
            pnet_packet::tcp::ipv4_checksum(&tcp, &probe.source_ip, &probe.destination_ip)
        );
    }

    #[test]
    fn syn_ack_means_open() {
        let probe = probe();
        let answer = reply(&probe, control::SYN | control::ACK);
        assert_eq!(probe.classify_response(&answer), Some(PortState::Open));
    }

    #[test]
    fn rst_means_closed() {
        let probe = probe();
        let answer = reply(&probe, control::RST | control::ACK);
        assert_eq!(probe.classify_response(&answer), Some(PortState::Closed));
    }

    #[test]
    fn other_flags_mean_filtered() {
        let probe = probe();
        let answer = reply(&probe, control::ACK);
        assert_eq!(probe.classify_response(&answer), Some(PortState::Filtered));
    }

    #[test]
    fn own_syn_is_ignored() {
        let probe = probe();
        assert_eq!(probe.classify_response(&probe.build_packet()), None);
    }

    #[test]
    fn truncated_datagram_is_ignored() {
        let probe = probe();
        let answer = reply(&probe, control::SYN | control::ACK);
        assert_eq!(probe.classify_response(&answer[..12]), None);
    }
}
