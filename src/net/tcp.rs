use super::checksum::{ones_complement_add, ones_complement_sum};
use super::ip::{high_half, low_half, IpHeader};
use tracing::debug;

/// Length in bytes of a TCP header without options.
pub const TCP_HEADER_LEN: usize = 20;

/// Segment length folded into the pseudo-header.
///
/// Fixed at a bare header: no options and no payload. Segments carrying
/// either need a checksum over their real length and cannot use
/// [`TcpHeader::compute_checksum`].
const PSEUDO_HEADER_TCP_LEN: u16 = TCP_HEADER_LEN as u16;

/// Raw values for the control bits octet. Combine with `|`.
pub mod control {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
    pub const ECE: u8 = 0x40;
    pub const CWR: u8 = 0x80;
}

/// Represents the 20-byte TCP header (RFC 793), options not supported.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpHeader {
    pub(crate) src_port: u16,
    pub(crate) dst_port: u16,
    pub(crate) sequence_num: u32,
    pub(crate) ack_num: u32,
    /// Data offset (high nibble) + reserved (low nibble)
    pub(crate) offset_n_reserved: u8,
    pub(crate) control_bits: u8,
    pub(crate) window: u16,
    pub(crate) checksum: u16,
    pub(crate) urgent_ptr: u16,
}

impl TcpHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_src_port(&mut self, src_port: u16) {
        self.src_port = src_port;
    }

    pub fn set_dst_port(&mut self, dst_port: u16) {
        self.dst_port = dst_port;
    }

    pub fn set_sequence_num(&mut self, sequence_num: u32) {
        self.sequence_num = sequence_num;
    }

    pub fn set_ack_num(&mut self, ack_num: u32) {
        self.ack_num = ack_num;
    }

    /// ORs the 4-bit data offset into the high nibble.
    ///
    /// The nibble is not cleared first, so a second call accumulates bits
    /// with the first: `set_offset(5)` then `set_offset(2)` leaves 7. Call it
    /// once on a fresh header.
    pub fn set_offset(&mut self, offset: u8) {
        self.offset_n_reserved |= (offset & 0x0F) << 4;
    }

    /// Replaces the low nibble with `reserved`.
    ///
    /// The input is not masked. Any bit above bit 3 is ORed into the data
    /// offset nibble, so `set_offset(5)` followed by `set_reserved(0xF0)`
    /// leaves `0xF0` in the byte. Pass values below 16.
    pub fn set_reserved(&mut self, reserved: u8) {
        self.offset_n_reserved = (self.offset_n_reserved & 0xF0) | reserved;
    }

    /// Sets the whole flag octet, see [`control`].
    pub fn set_control_bits(&mut self, control_bits: u8) {
        self.control_bits = control_bits;
    }

    pub fn set_window(&mut self, window: u16) {
        self.window = window;
    }

    pub fn set_checksum(&mut self, checksum: u16) {
        self.checksum = checksum;
    }

    pub fn set_urgent_ptr(&mut self, urgent_ptr: u16) {
        self.urgent_ptr = urgent_ptr;
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn dst_port(&self) -> u16 {
        self.dst_port
    }

    pub fn sequence_num(&self) -> u32 {
        self.sequence_num
    }

    pub fn ack_num(&self) -> u32 {
        self.ack_num
    }

    /// Data offset in 32-bit words.
    pub fn offset(&self) -> u8 {
        self.offset_n_reserved >> 4
    }

    pub fn reserved(&self) -> u8 {
        self.offset_n_reserved & 0x0F
    }

    /// Byte 12 as stored.
    pub fn offset_n_reserved(&self) -> u8 {
        self.offset_n_reserved
    }

    pub fn control_bits(&self) -> u8 {
        self.control_bits
    }

    pub fn window(&self) -> u16 {
        self.window
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn urgent_ptr(&self) -> u16 {
        self.urgent_ptr
    }

    /// Pseudo-header and segment words covered by the checksum, in
    /// summation order. The checksum field is excluded.
    ///
    /// Protocol and addresses come from `ip`, which must still be in host
    /// order.
    pub fn checksum_words(&self, ip: &IpHeader) -> [u16; 15] {
        [
            // pseudo-header
            ip.protocol as u16,
            low_half(ip.src_address),
            high_half(ip.src_address),
            low_half(ip.dst_address),
            high_half(ip.dst_address),
            PSEUDO_HEADER_TCP_LEN,
            // segment
            self.src_port,
            self.dst_port,
            low_half(self.sequence_num),
            high_half(self.sequence_num),
            low_half(self.ack_num),
            high_half(self.ack_num),
            u16::from_be_bytes([self.offset_n_reserved, self.control_bits]),
            self.window,
            self.urgent_ptr,
        ]
    }

    /// Computes the checksum over the pseudo-header drawn from `ip` and this
    /// header, and stores it.
    ///
    /// Assumes a bare 20-byte segment, see [`TCP_HEADER_LEN`]. Both headers
    /// must be in host order; convert them only after this returns.
    pub fn compute_checksum(&mut self, ip: &IpHeader) {
        let sum = ones_complement_sum(self.checksum_words(ip));
        self.checksum = !sum;
        debug!(
            src_port = self.src_port,
            dst_port = self.dst_port,
            "tcp header checksum computed: 0x{:04x}",
            self.checksum
        );
    }

    /// Returns `true` if the covered words plus the stored checksum sum to
    /// all ones. Host order only.
    pub fn verify_checksum(&self, ip: &IpHeader) -> bool {
        let sum = ones_complement_sum(self.checksum_words(ip));
        ones_complement_add(sum, self.checksum) == 0xFFFF
    }

    /// The struct's memory, field by field. Wire bytes once converted to
    /// network order.
    pub fn wire_bytes(&self) -> [u8; TCP_HEADER_LEN] {
        let mut bytes = [0u8; TCP_HEADER_LEN];
        bytes[0..2].copy_from_slice(&self.src_port.to_ne_bytes());
        bytes[2..4].copy_from_slice(&self.dst_port.to_ne_bytes());
        bytes[4..8].copy_from_slice(&self.sequence_num.to_ne_bytes());
        bytes[8..12].copy_from_slice(&self.ack_num.to_ne_bytes());
        bytes[12] = self.offset_n_reserved;
        bytes[13] = self.control_bits;
        bytes[14..16].copy_from_slice(&self.window.to_ne_bytes());
        bytes[16..18].copy_from_slice(&self.checksum.to_ne_bytes());
        bytes[18..20].copy_from_slice(&self.urgent_ptr.to_ne_bytes());
        bytes
    }
}
