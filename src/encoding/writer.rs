//! Bit-level writer for encoding descriptor payloads.

use crate::context::Charset;

/// Largest payload of a descriptor in the `[tag][length][payload]` framing.
pub const MAX_DESCRIPTOR_PAYLOAD: usize = 255;

/// Pending length field opened by
/// [`BitWriter::push_write_sequence_with_leading_length`].
#[derive(Debug, Clone, Copy)]
struct LengthField {
    /// Bit position of the length field itself.
    position: usize,
    bits: usize,
}

/// A writer that can write individual bits into a bounded byte buffer.
///
/// This is the encoding counterpart to `BitReader`, handling the complexity
/// of writing arbitrary bit-width values across byte boundaries. The buffer
/// never grows past its capacity: a write that does not fit sets the sticky
/// error flag, writes nothing and moves the cursor to the end.
#[derive(Debug)]
pub struct BitWriter {
    /// The output buffer, holding every byte touched so far.
    buffer: Vec<u8>,
    /// Maximum number of bytes.
    capacity: usize,
    /// Current position, in bits.
    bit_position: usize,
    error: bool,
    states: Vec<usize>,
    length_fields: Vec<LengthField>,
}

impl BitWriter {
    /// Creates a new `BitWriter` which accepts at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            bit_position: 0,
            error: false,
            states: Vec::new(),
            length_fields: Vec::new(),
        }
    }

    /// Returns true once any write did not fit.
    pub fn error(&self) -> bool {
        self.error
    }

    /// Marks the content as invalid, for values which cannot be represented.
    pub fn set_user_error(&mut self) {
        self.error = true;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current bit position.
    pub fn bit_position(&self) -> usize {
        self.bit_position
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.bit_position % 8 == 0
    }

    /// Number of whole bytes which can still be written.
    pub fn remaining_bytes(&self) -> usize {
        (self.capacity * 8 - self.bit_position) / 8
    }

    /// Returns the current size of the buffer in bytes.
    ///
    /// Note: This includes any partially written byte.
    pub fn len(&self) -> usize {
        self.bit_position.div_ceil(8)
    }

    /// Returns true if no bits have been written yet.
    pub fn is_empty(&self) -> bool {
        self.bit_position == 0
    }

    fn overflow(&mut self) {
        self.error = true;
        self.bit_position = self.capacity * 8;
    }

    fn fits(&mut self, bits: usize) -> bool {
        if self.error || self.bit_position + bits > self.capacity * 8 {
            self.overflow();
            false
        } else {
            true
        }
    }

    /// Stores `bits` bits of `value` at an arbitrary position, without moving
    /// the cursor. The target range must already be inside the buffer.
    fn store_bits(&mut self, position: usize, value: u64, bits: usize) {
        let needed = (position + bits).div_ceil(8);
        if self.buffer.len() < needed {
            self.buffer.resize(needed, 0);
        }

        let mut remaining_bits = bits;
        let mut cursor = position;

        while remaining_bits > 0 {
            let bit_in_byte = cursor % 8;
            let bits_available_in_current_byte = 8 - bit_in_byte;
            let bits_to_write = remaining_bits.min(bits_available_in_current_byte);

            let shift_amount = remaining_bits - bits_to_write;
            let bits_value = (value >> shift_amount) as u8;
            let mask = ((1u16 << bits_to_write) - 1) as u8;
            let shift = bits_available_in_current_byte - bits_to_write;

            let byte = &mut self.buffer[cursor / 8];
            *byte = (*byte & !(mask << shift)) | ((bits_value & mask) << shift);

            cursor += bits_to_write;
            remaining_bits -= bits_to_write;
        }
    }

    /// Writes a value using the specified number of bits, MSB first.
    ///
    /// Only the low `bits` bits of `value` are used. More than 64 bits is a
    /// structure error.
    pub fn put_bits(&mut self, value: u64, bits: usize) {
        if bits > 64 {
            self.overflow();
            return;
        }
        if bits == 0 || !self.fits(bits) {
            return;
        }
        let masked_value = if bits == 64 {
            value
        } else {
            value & ((1u64 << bits) - 1)
        };
        self.store_bits(self.bit_position, masked_value, bits);
        self.bit_position += bits;
    }

    pub fn put_bool(&mut self, bit: bool) {
        self.put_bits(bit as u64, 1);
    }

    /// Writes reserved bits, all set to '1'.
    pub fn put_reserved(&mut self, bits: usize) {
        self.put_bits(u64::MAX, bits);
    }

    pub fn put_uint8(&mut self, value: u8) {
        self.put_bits(value as u64, 8);
    }

    pub fn put_uint16(&mut self, value: u16) {
        self.put_bits(value as u64, 16);
    }

    pub fn put_uint24(&mut self, value: u32) {
        self.put_bits(value as u64, 24);
    }

    pub fn put_uint32(&mut self, value: u32) {
        self.put_bits(value as u64, 32);
    }

    pub fn put_uint40(&mut self, value: u64) {
        self.put_bits(value, 40);
    }

    pub fn put_uint48(&mut self, value: u64) {
        self.put_bits(value, 48);
    }

    pub fn put_uint64(&mut self, value: u64) {
        self.put_bits(value, 64);
    }

    /// Writes a 13-bit PID.
    ///
    /// On a byte boundary, 3 reserved '1' bits are written first. When the
    /// cursor is already 3 bits into a byte, only the PID bits are written.
    pub fn put_pid(&mut self, pid: u16) {
        match self.bit_position % 8 {
            0 => {
                self.put_reserved(3);
                self.put_bits(pid as u64, 13);
            }
            3 => self.put_bits(pid as u64, 13),
            _ => self.overflow(),
        }
    }

    /// Writes a complete byte array. Nothing is written if it does not fit.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        if !self.fits(bytes.len() * 8) {
            return;
        }
        for &byte in bytes {
            self.put_bits(byte as u64, 8);
        }
    }

    /// Writes a 3-character language code, padded with spaces.
    pub fn put_language_code(&mut self, code: &str) {
        let mut bytes = [b' '; 3];
        for (slot, c) in bytes.iter_mut().zip(code.chars()) {
            *slot = if (c as u32) < 0x100 { c as u8 } else { b'?' };
        }
        self.put_bytes(&bytes);
    }

    /// Writes a string with no length prefix.
    pub fn put_string(&mut self, charset: Charset, text: &str) {
        self.put_bytes(&charset.encode(text));
    }

    /// Writes a string preceded by an 8-bit byte length.
    pub fn put_string_with_byte_length(&mut self, charset: Charset, text: &str) {
        let bytes = charset.encode(text);
        if bytes.len() > 255 {
            self.overflow();
            return;
        }
        if !self.fits((bytes.len() + 1) * 8) {
            return;
        }
        self.put_uint8(bytes.len() as u8);
        self.put_bytes(&bytes);
    }

    /// Aligns to the next byte boundary with reserved '1' bits.
    pub fn align_to_byte(&mut self) {
        if !self.is_byte_aligned() {
            let padding_bits = 8 - self.bit_position % 8;
            self.put_reserved(padding_bits);
        }
    }

    /// Saves the cursor so that a tentative write can be rolled back.
    pub fn push_state(&mut self) {
        self.states.push(self.bit_position);
    }

    /// Rolls back everything written since the last
    /// [`push_state`](Self::push_state). The error flag is left untouched.
    pub fn pop_state(&mut self) -> bool {
        match self.states.pop() {
            Some(position) => {
                self.bit_position = position;
                self.buffer.truncate(position.div_ceil(8));
                if position % 8 != 0 {
                    if let Some(last) = self.buffer.last_mut() {
                        *last &= 0xFF << (8 - position % 8);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Forgets the last saved cursor, keeping what was written.
    pub fn drop_state(&mut self) -> bool {
        self.states.pop().is_some()
    }

    /// Writes a placeholder length field of `bits` bits and starts a
    /// sequence whose byte size is stored there by
    /// [`pop_write_sequence`](Self::pop_write_sequence).
    ///
    /// The sequence must start on a byte boundary once the field is written.
    pub fn push_write_sequence_with_leading_length(&mut self, bits: usize) {
        let position = self.bit_position;
        self.put_bits(0, bits);
        if !self.is_byte_aligned() {
            self.error = true;
        }
        self.length_fields.push(LengthField { position, bits });
    }

    /// Closes the innermost length-prefixed sequence and updates its length.
    pub fn pop_write_sequence(&mut self) -> bool {
        let Some(field) = self.length_fields.pop() else {
            return false;
        };
        if self.error {
            return true;
        }
        let start = field.position + field.bits;
        let length = (self.bit_position - start).div_ceil(8) as u64;
        if field.bits < 64 && length >= 1u64 << field.bits {
            self.error = true;
        } else {
            self.store_bits(field.position, length, field.bits);
        }
        true
    }

    /// Returns the bytes written so far, padding a trailing partial byte with zeros.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len().min(self.buffer.len())]
    }

    /// Finishes writing and returns the complete buffer.
    ///
    /// This will pad the last byte with zeros if necessary.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.len();
        self.buffer.resize(len, 0);
        self.buffer
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new(MAX_DESCRIPTOR_PAYLOAD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_single_byte() {
        let mut writer = BitWriter::default();
        writer.put_uint8(0xAB);
        assert_eq!(writer.finish(), vec![0xAB]);
    }

    #[test]
    fn test_write_bits_across_bytes() {
        let mut writer = BitWriter::default();
        writer.put_bits(0b101, 3);
        writer.put_bits(0b11001, 5);
        writer.put_bits(0b0110, 4);
        writer.put_bits(0b1111, 4);
        // Should produce: 10111001 01101111
        assert_eq!(writer.finish(), vec![0b10111001, 0b01101111]);
    }

    #[test]
    fn test_integer_widths() {
        let mut writer = BitWriter::default();
        writer.put_uint16(0x1234);
        writer.put_uint24(0x56789A);
        writer.put_uint40(0x0102030405);
        writer.put_uint48(0x060708090A0B);
        writer.put_uint64(0x0C0D0E0F10111213);
        assert!(!writer.error());
        assert_eq!(
            writer.finish(),
            vec![
                0x12, 0x34, 0x56, 0x78, 0x9A, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
                0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10, 0x11, 0x12, 0x13
            ]
        );
    }

    #[test]
    fn test_value_masking() {
        let mut writer = BitWriter::default();
        writer.put_bits(0xFF, 4);
        assert_eq!(writer.finish(), vec![0b11110000]);
    }

    #[test]
    fn test_overflow_is_sticky() {
        let mut writer = BitWriter::new(3);
        writer.put_uint16(0x1234);
        assert!(!writer.error());
        writer.put_uint16(0x5678);
        assert!(writer.error());
        assert_eq!(writer.remaining_bytes(), 0);

        // Further writes change nothing.
        writer.put_uint8(0x99);
        assert_eq!(writer.as_bytes(), &[0x12, 0x34]);
    }

    #[test]
    fn test_oversized_field_moves_to_end() {
        let mut writer = BitWriter::new(4);
        writer.put_uint8(0x47);
        writer.put_bits(0, 65);
        assert!(writer.error());
        assert_eq!(writer.bit_position(), 32);
        assert_eq!(writer.remaining_bytes(), 0);

        writer.put_uint8(0x11);
        assert_eq!(writer.as_bytes(), &[0x47]);
    }

    #[test]
    fn test_put_bytes_all_or_nothing() {
        let mut writer = BitWriter::new(4);
        writer.put_uint8(1);
        writer.put_bytes(&[2, 3, 4, 5]);
        assert!(writer.error());
        assert_eq!(writer.as_bytes(), &[1]);
    }

    #[test]
    fn test_put_pid() {
        let mut writer = BitWriter::default();
        writer.put_pid(0x0100);
        assert_eq!(writer.finish(), vec![0xE1, 0x00]);

        let mut writer = BitWriter::default();
        writer.put_bits(0b010, 3);
        writer.put_pid(0x1FFF);
        assert_eq!(writer.finish(), vec![0b0101_1111, 0xFF]);

        let mut writer = BitWriter::default();
        writer.put_bool(true);
        writer.put_pid(0x0010);
        assert!(writer.error());
    }

    #[test]
    fn test_push_pop_state_rolls_back() {
        let mut writer = BitWriter::default();
        writer.put_bits(0b101, 3);
        writer.push_state();
        writer.put_bits(0b11111, 5);
        writer.put_uint8(0xFF);
        assert!(writer.pop_state());
        assert_eq!(writer.bit_position(), 3);
        writer.put_bits(0, 5);
        assert_eq!(writer.finish(), vec![0b1010_0000]);
    }

    #[test]
    fn test_leading_length_sequence() {
        let mut writer = BitWriter::default();
        writer.put_uint8(0xAA);
        writer.push_write_sequence_with_leading_length(8);
        writer.put_uint16(0x0102);
        writer.put_uint8(0x03);
        assert!(writer.pop_write_sequence());
        writer.put_uint8(0xBB);
        assert_eq!(writer.finish(), vec![0xAA, 0x03, 0x01, 0x02, 0x03, 0xBB]);
    }

    #[test]
    fn test_leading_length_with_reserved_prefix() {
        let mut writer = BitWriter::default();
        writer.put_reserved(4);
        writer.push_write_sequence_with_leading_length(12);
        writer.put_uint8(0x42);
        writer.pop_write_sequence();
        assert_eq!(writer.finish(), vec![0xF0, 0x01, 0x42]);
    }

    #[test]
    fn test_align_to_byte() {
        let mut writer = BitWriter::default();
        writer.put_bits(0b101, 3);
        writer.align_to_byte();
        writer.put_uint8(0x00);
        assert_eq!(writer.finish(), vec![0b1011_1111, 0x00]);
    }

    #[test]
    fn test_partial_byte_finish() {
        let mut writer = BitWriter::default();
        writer.put_bits(0b10110, 5);
        assert_eq!(writer.finish(), vec![0b10110000]);
    }

    #[test]
    fn test_language_code_padding() {
        let mut writer = BitWriter::default();
        writer.put_language_code("en");
        assert_eq!(writer.finish(), b"en ".to_vec());
    }
}
