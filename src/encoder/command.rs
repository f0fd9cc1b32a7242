//! The encoder's unit of output: a literal insertion followed by an LZ77
//! back-reference copy, plus the bookkeeping needed to turn a sequence of
//! these into command-prefix/distance-code symbols for histogram building
//! and Huffman-tree construction.

use crate::tables::command;

#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub insert_len: u32,
    pub copy_len: u32,
    /// `0` means "reuse the last coded distance" (no explicit code).
    pub distance: u32,
    pub reuses_last_distance: bool,
}

impl Command {
    pub fn insert_only(insert_len: u32) -> Self {
        Command {
            insert_len,
            copy_len: 0,
            distance: 0,
            reuses_last_distance: false,
        }
    }

    /// Command-prefix symbol (`cmdPrefix in [0,703]`) for this command's
    /// insert/copy lengths.
    pub fn cmd_prefix(&self) -> u16 {
        let insert_code = command::insert_length_code(self.insert_len);
        let copy_code = command::copy_length_code(self.copy_len.max(2));
        command::combine_length_codes(insert_code, copy_code, self.reuses_last_distance)
    }

    pub fn insert_extra(&self) -> (u32, u32) {
        let code = command::insert_length_code(self.insert_len);
        let (extra_bits, base) = command::INSERT_LENGTH_CODE[code];
        (extra_bits, self.insert_len - base)
    }

    pub fn copy_extra(&self) -> (u32, u32) {
        let code = command::copy_length_code(self.copy_len.max(2));
        let (extra_bits, base) = command::COPY_LENGTH_CODE[code];
        (extra_bits, self.copy_len.max(2) - base)
    }

    pub fn distance_context(&self) -> u8 {
        command::lookup(self.cmd_prefix()).distance_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_only_has_zero_copy_length() {
        let c = Command::insert_only(5);
        assert_eq!(c.copy_len, 0);
        assert_eq!(c.distance, 0);
    }

    #[test]
    fn cmd_prefix_round_trips_through_lookup() {
        let c = Command {
            insert_len: 3,
            copy_len: 10,
            distance: 50,
            reuses_last_distance: false,
        };
        let prefix = c.cmd_prefix();
        let looked_up = command::lookup(prefix);
        let (insert_extra_bits, insert_value) = c.insert_extra();
        let (copy_extra_bits, copy_value) = c.copy_extra();
        assert_eq!(looked_up.insert_extra_bits, insert_extra_bits);
        assert_eq!(looked_up.copy_extra_bits, copy_extra_bits);
        assert_eq!(looked_up.insert_base + insert_value, c.insert_len);
        assert_eq!(looked_up.copy_base + copy_value, c.copy_len);
    }
}
