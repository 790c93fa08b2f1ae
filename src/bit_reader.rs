//! Bit-level reading utilities for descriptor payloads.
//!
//! This module provides the `BitReader` struct which reads arbitrary numbers
//! of bits, MSB first, from a bounded byte region. Unlike a `Result`-per-call
//! reader, it carries a sticky error flag: a read past the end sets the flag,
//! returns a neutral value and clamps the cursor to the end. Callers run a
//! whole sequence of reads and inspect [`BitReader::error`] once.

use crate::context::Charset;

/// Saved cursor for speculative reads.
#[derive(Debug, Clone, Copy)]
struct ReadState {
    offset: usize,
    end: usize,
}

/// A reader that can extract values at the bit level from a byte buffer.
///
/// Fields in transport stream structures are not always byte-aligned, so the
/// reader keeps a bit offset. All integer accessors read MSB first.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    /// Current position, in bits.
    offset: usize,
    /// Read limit, in bits. Always a multiple of 8.
    end: usize,
    error: bool,
    user_error: bool,
    states: Vec<ReadState>,
    limits: Vec<usize>,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` for the given buffer.
    ///
    /// The reader starts at bit offset 0 and may read the whole buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        BitReader {
            buffer,
            offset: 0,
            end: buffer.len() * 8,
            error: false,
            user_error: false,
            states: Vec::new(),
            limits: Vec::new(),
        }
    }

    /// Returns true once any read went past the available data, or the
    /// content was flagged invalid with [`set_user_error`](Self::set_user_error).
    pub fn error(&self) -> bool {
        self.error || self.user_error
    }

    /// Returns true only when the content was flagged invalid.
    pub fn user_error(&self) -> bool {
        self.user_error
    }

    /// Marks the content as invalid.
    ///
    /// Deserializers use this when the bytes are readable but do not match
    /// the expected structure (a wrong fixed identifier for instance).
    pub fn set_user_error(&mut self) {
        self.user_error = true;
    }

    /// Gets the current bit offset in the buffer.
    pub fn get_offset(&self) -> usize {
        self.offset
    }

    pub fn is_byte_aligned(&self) -> bool {
        self.offset % 8 == 0
    }

    /// True when there is at least one bit left and no error occurred.
    pub fn can_read(&self) -> bool {
        !self.error() && self.offset < self.end
    }

    pub fn can_read_bits(&self, num_bits: usize) -> bool {
        !self.error() && self.end - self.offset >= num_bits
    }

    /// True when `num_bytes` full bytes can be read from the current position.
    pub fn can_read_bytes(&self, num_bytes: usize) -> bool {
        self.can_read_bits(num_bytes * 8)
    }

    /// Number of whole bytes left before the current read limit.
    pub fn remaining_bytes(&self) -> usize {
        (self.end - self.offset) / 8
    }

    pub fn remaining_bits(&self) -> usize {
        self.end - self.offset
    }

    /// True when the cursor sits exactly on the read limit.
    pub fn end_of_read(&self) -> bool {
        self.offset == self.end
    }

    fn underflow(&mut self) {
        self.error = true;
        self.offset = self.end;
    }

    /// Reads a specified number of bits from the buffer.
    ///
    /// Returns the bits as a `u64`, with the read bits right-aligned.
    /// Reading more than 64 bits, or past the read limit, sets the error flag
    /// and returns 0.
    pub fn read_bits(&mut self, num_bits: usize) -> u64 {
        if self.error() || num_bits > 64 || self.end - self.offset < num_bits {
            self.underflow();
            return 0;
        }

        let mut value: u64 = 0;
        let mut bits_read = 0;

        while bits_read < num_bits {
            let byte = self.buffer[self.offset / 8];
            let bit_offset = self.offset % 8;
            let bits_to_read = std::cmp::min(num_bits - bits_read, 8 - bit_offset);
            let mask = if bits_to_read >= 8 {
                0xFF
            } else {
                (1u8 << bits_to_read) - 1
            };
            let bits_value = (byte >> (8 - bit_offset - bits_to_read)) & mask;

            value = (value << bits_to_read) | (bits_value as u64);
            self.offset += bits_to_read;
            bits_read += bits_to_read;
        }

        value
    }

    pub fn get_bool(&mut self) -> bool {
        self.read_bits(1) != 0
    }

    pub fn get_uint8(&mut self) -> u8 {
        self.read_bits(8) as u8
    }

    pub fn get_uint16(&mut self) -> u16 {
        self.read_bits(16) as u16
    }

    pub fn get_uint24(&mut self) -> u32 {
        self.read_bits(24) as u32
    }

    pub fn get_uint32(&mut self) -> u32 {
        self.read_bits(32) as u32
    }

    pub fn get_uint40(&mut self) -> u64 {
        self.read_bits(40)
    }

    pub fn get_uint48(&mut self) -> u64 {
        self.read_bits(48)
    }

    pub fn get_uint64(&mut self) -> u64 {
        self.read_bits(64)
    }

    /// Reads a 13-bit PID.
    ///
    /// On a byte boundary the 3 leading reserved bits are skipped first. When
    /// the cursor is already 3 bits into a byte, only the 13 PID bits are
    /// read. Any other alignment is a structure error.
    pub fn get_pid(&mut self) -> u16 {
        match self.offset % 8 {
            0 => {
                self.skip_bits(3);
                self.read_bits(13) as u16
            }
            3 => self.read_bits(13) as u16,
            _ => {
                self.underflow();
                0
            }
        }
    }

    /// Skips a specified number of bits in the buffer.
    pub fn skip_bits(&mut self, num_bits: usize) {
        if self.error() || self.end - self.offset < num_bits {
            self.underflow();
        } else {
            self.offset += num_bits;
        }
    }

    pub fn skip_bytes(&mut self, num_bytes: usize) {
        self.skip_bits(num_bytes * 8);
    }

    /// Reads `num_bytes` raw bytes. The cursor must be byte-aligned.
    ///
    /// Returns an empty vector and sets the error flag when fewer bytes are
    /// available.
    pub fn get_bytes(&mut self, num_bytes: usize) -> Vec<u8> {
        if self.error() || !self.is_byte_aligned() || self.remaining_bytes() < num_bytes {
            self.underflow();
            return Vec::new();
        }
        let start = self.offset / 8;
        self.offset += num_bytes * 8;
        self.buffer[start..start + num_bytes].to_vec()
    }

    /// Reads all bytes up to the current read limit.
    pub fn get_remaining_bytes(&mut self) -> Vec<u8> {
        let count = self.remaining_bytes();
        self.get_bytes(count)
    }

    /// Reads a 3-character ISO-639 language code.
    pub fn get_language_code(&mut self) -> String {
        let bytes = self.get_bytes(3);
        bytes.iter().map(|&b| b as char).collect()
    }

    /// Reads a string up to the current read limit.
    pub fn get_string(&mut self, charset: Charset) -> String {
        let bytes = self.get_remaining_bytes();
        charset.decode(&bytes)
    }

    /// Reads a string preceded by an 8-bit byte length.
    pub fn get_string_with_byte_length(&mut self, charset: Charset) -> String {
        let length = self.get_uint8() as usize;
        let bytes = self.get_bytes(length);
        charset.decode(&bytes)
    }

    /// Saves the cursor for a speculative read.
    pub fn push_state(&mut self) {
        self.states.push(ReadState {
            offset: self.offset,
            end: self.end,
        });
    }

    /// Restores the cursor saved by the last [`push_state`](Self::push_state).
    ///
    /// The error flag is left untouched. Returns false when no state was saved.
    pub fn pop_state(&mut self) -> bool {
        match self.states.pop() {
            Some(state) => {
                self.offset = state.offset;
                self.end = state.end;
                true
            }
            None => false,
        }
    }

    /// Forgets the last saved cursor, keeping the current position.
    pub fn drop_state(&mut self) -> bool {
        self.states.pop().is_some()
    }

    /// Restricts reading to the next `num_bytes` bytes.
    ///
    /// The restriction is clamped to the current limit; asking for more than
    /// is available sets the error flag.
    pub fn push_read_size(&mut self, num_bytes: usize) {
        self.limits.push(self.end);
        let wanted = self.offset + num_bytes * 8;
        if wanted > self.end {
            self.error = true;
        } else {
            self.end = wanted;
        }
    }

    /// Reads a length field of `num_bits` bits, then restricts reading to
    /// that many bytes. Used for internally length-prefixed loops.
    pub fn push_read_size_from_length(&mut self, num_bits: usize) {
        let length = self.read_bits(num_bits) as usize;
        self.push_read_size(length);
    }

    /// Ends a sequence started with [`push_read_size`](Self::push_read_size).
    ///
    /// Unread bytes of the sequence are skipped and the outer limit is
    /// restored.
    pub fn pop_read_size(&mut self) -> bool {
        match self.limits.pop() {
            Some(outer) => {
                self.offset = self.end;
                self.end = outer;
                true
            }
            None => false,
        }
    }
}
