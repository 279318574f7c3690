use std::fmt::Write;

/// Bytes per row when dumping a header, one 32-bit word as in the RFC diagrams.
pub const HEADER_ROW: usize = 4;

/// Bytes per row when dumping a whole packet.
pub const PACKET_ROW: usize = 16;

/// Renders `data` as rows of `row_len` hex bytes, each prefixed with its
/// offset. Rows of 16 get an extra gap after the eighth byte.
pub fn format_hexdump(data: &[u8], row_len: usize) -> String {
    let row_len = row_len.max(1);
    let mut out = String::with_capacity(data.len() * 3 + data.len() / row_len * 8);

    for (row, chunk) in data.chunks(row_len).enumerate() {
        // writing to a String cannot fail
        let _ = write!(out, "0x{:04x}: ", row * row_len);
        for (i, byte) in chunk.iter().enumerate() {
            if i == 8 && row_len == PACKET_ROW {
                out.push(' ');
            }
            let _ = write!(out, " {byte:02x}");
        }
        out.push('\n');
    }

    out
}
