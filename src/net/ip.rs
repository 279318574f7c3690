use super::checksum::{ones_complement_add, ones_complement_sum};
use tracing::debug;

/// Length in bytes of an IPv4 header without options.
pub const IP_HEADER_LEN: usize = 20;

/// Assigned protocol numbers for the `protocol` field.
pub mod protocol {
    pub const ICMP: u8 = 1;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
}

const NIBBLE: u8 = 0x0F;
const FLAGS_MASK: u16 = 0x0007;
const OFFSET_MASK: u16 = 0x1FFF;

/// IPv4 header without options (RFC 791).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |Version|  IHL  |Type of Service|          Total Length         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |         Identification        |Flags|      Fragment Offset    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Time to Live |    Protocol   |         Header Checksum       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Source Address                          |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Destination Address                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Fields are kept in host order while the header is being filled in and the
/// checksum computed. [`to_network_order`](super::byte_order::to_network_order)
/// then swaps the multi-byte fields in place, after which the struct's memory
/// is the wire layout and no setter may be called again.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpHeader {
    // version: high nibble, IHL: low nibble
    pub(crate) version_n_ihl: u8,
    pub(crate) type_of_service: u8,
    pub(crate) total_length: u16,
    pub(crate) id: u16,
    // flags: top 3 bits, fragment offset: low 13 bits
    pub(crate) flags_n_offset: u16,
    pub(crate) time_to_live: u8,
    pub(crate) protocol: u8,
    pub(crate) checksum: u16,
    pub(crate) src_address: u32,
    pub(crate) dst_address: u32,
}

impl IpHeader {
    /// An all-zero header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the 4-bit version, leaving IHL untouched.
    pub fn set_version(&mut self, version: u8) {
        let ihl = self.version_n_ihl & NIBBLE;
        self.version_n_ihl = ((version & NIBBLE) << 4) | ihl;
    }

    /// Sets the 4-bit header length in 32-bit words, leaving version untouched.
    ///
    /// A header without options has an IHL of 5; this is not enforced.
    pub fn set_ihl(&mut self, ihl: u8) {
        let version = self.version_n_ihl & !NIBBLE;
        self.version_n_ihl = version | (ihl & NIBBLE);
    }

    pub fn set_type_of_service(&mut self, type_of_service: u8) {
        self.type_of_service = type_of_service;
    }

    pub fn set_total_length(&mut self, total_length: u16) {
        self.total_length = total_length;
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    /// Sets the 3 flag bits (reserved, DF, MF) at the top of the flags/offset
    /// word, leaving the fragment offset untouched.
    pub fn set_flags(&mut self, flags: u8) {
        let offset = self.flags_n_offset & OFFSET_MASK;
        self.flags_n_offset = (((flags as u16) & FLAGS_MASK) << 13) | offset;
    }

    /// Sets the 13-bit fragment offset, leaving the flags untouched.
    pub fn set_offset(&mut self, offset: u16) {
        let flags = self.flags_n_offset & !OFFSET_MASK;
        self.flags_n_offset = flags | (offset & OFFSET_MASK);
    }

    pub fn set_time_to_live(&mut self, time_to_live: u8) {
        self.time_to_live = time_to_live;
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.protocol = protocol;
    }

    /// Writes the checksum field directly. Normally left to
    /// [`compute_checksum`](Self::compute_checksum).
    pub fn set_checksum(&mut self, checksum: u16) {
        self.checksum = checksum;
    }

    pub fn set_src_address(&mut self, src_address: u32) {
        self.src_address = src_address;
    }

    pub fn set_dst_address(&mut self, dst_address: u32) {
        self.dst_address = dst_address;
    }

    pub fn version(&self) -> u8 {
        self.version_n_ihl >> 4
    }

    pub fn ihl(&self) -> u8 {
        self.version_n_ihl & NIBBLE
    }

    pub fn type_of_service(&self) -> u8 {
        self.type_of_service
    }

    pub fn total_length(&self) -> u16 {
        self.total_length
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    /// The combined flags/offset word as stored.
    pub fn flags_n_offset(&self) -> u16 {
        self.flags_n_offset
    }

    /// Only meaningful while the header is in host order.
    pub fn flags(&self) -> u8 {
        (self.flags_n_offset >> 13) as u8
    }

    /// Only meaningful while the header is in host order.
    pub fn fragment_offset(&self) -> u16 {
        self.flags_n_offset & OFFSET_MASK
    }

    pub fn time_to_live(&self) -> u8 {
        self.time_to_live
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    pub fn src_address(&self) -> u32 {
        self.src_address
    }

    pub fn dst_address(&self) -> u32 {
        self.dst_address
    }

    /// The header words covered by the checksum, in summation order.
    ///
    /// The checksum field itself is excluded. Addresses contribute their low
    /// half before their high half.
    pub fn checksum_words(&self) -> [u16; 9] {
        [
            u16::from_be_bytes([self.version_n_ihl, self.type_of_service]),
            self.total_length,
            self.id,
            self.flags_n_offset,
            u16::from_be_bytes([self.time_to_live, self.protocol]),
            low_half(self.src_address),
            high_half(self.src_address),
            low_half(self.dst_address),
            high_half(self.dst_address),
        ]
    }

    /// Computes the header checksum over the host-order fields and stores it.
    ///
    /// Whatever the checksum field held before is overwritten, never summed.
    /// Must run before the header is converted to network order.
    pub fn compute_checksum(&mut self) {
        let sum = ones_complement_sum(self.checksum_words());
        self.checksum = !sum;
        debug!("ip header checksum computed: 0x{:04x}", self.checksum);
    }

    /// Returns `true` if summing the covered words together with the stored
    /// checksum yields all ones. Host order only.
    pub fn verify_checksum(&self) -> bool {
        let sum = ones_complement_sum(self.checksum_words());
        ones_complement_add(sum, self.checksum) == 0xFFFF
    }

    /// The struct's memory, field by field.
    ///
    /// After conversion to network order this is exactly what goes on the
    /// wire. Before conversion the multi-byte fields come out in host order.
    pub fn wire_bytes(&self) -> [u8; IP_HEADER_LEN] {
        let mut bytes = [0u8; IP_HEADER_LEN];
        bytes[0] = self.version_n_ihl;
        bytes[1] = self.type_of_service;
        bytes[2..4].copy_from_slice(&self.total_length.to_ne_bytes());
        bytes[4..6].copy_from_slice(&self.id.to_ne_bytes());
        bytes[6..8].copy_from_slice(&self.flags_n_offset.to_ne_bytes());
        bytes[8] = self.time_to_live;
        bytes[9] = self.protocol;
        bytes[10..12].copy_from_slice(&self.checksum.to_ne_bytes());
        bytes[12..16].copy_from_slice(&self.src_address.to_ne_bytes());
        bytes[16..20].copy_from_slice(&self.dst_address.to_ne_bytes());
        bytes
    }
}

pub(crate) fn low_half(value: u32) -> u16 {
    (value & 0xFFFF) as u16
}

pub(crate) fn high_half(value: u32) -> u16 {
    (value >> 16) as u16
}
