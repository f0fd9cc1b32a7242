//! Greedy backward-reference builder: walks the input left to right, asking
//! the hasher for a match at each position and emitting a literal run plus
//! a copy whenever one is found. Used directly below quality 10; quality
//! 10-11 instead run the Zopfli DP in `zopfli.rs` and only fall back here
//! when Zopfli finds nothing worth taking.

use crate::encoder::command::Command;
use crate::encoder::hashers::{Hasher, MIN_MATCH_LENGTH};

/// Greedily parses `data` into commands using `hasher` for match lookups.
/// `hasher` is populated as parsing proceeds (lazy store-as-you-go), which
/// keeps this usable with any of the three hasher tiers.
pub fn parse<H: Hasher>(data: &[u8], hasher: &mut H) -> Vec<Command> {
    let mut commands = Vec::new();
    let mut pos = 0usize;
    let mut literal_start = 0usize;
    let n = data.len();

    while pos < n {
        if pos + MIN_MATCH_LENGTH > n {
            hasher.store(data, pos);
            pos += 1;
            continue;
        }
        hasher.store(data, pos);
        match hasher.find_longest_match(data, pos) {
            Some(m) if m.length as usize >= MIN_MATCH_LENGTH => {
                let insert_len = (pos - literal_start) as u32;
                commands.push(Command {
                    insert_len,
                    copy_len: m.length,
                    distance: m.distance,
                    reuses_last_distance: false,
                });
                let match_end = pos + m.length as usize;
                let mut store_pos = pos + 1;
                while store_pos < match_end && store_pos + 5 <= n {
                    hasher.store(data, store_pos);
                    store_pos += 1;
                }
                pos = match_end;
                literal_start = pos;
            }
            _ => {
                pos += 1;
            }
        }
    }

    if literal_start < n || commands.is_empty() {
        commands.push(Command::insert_only((n - literal_start) as u32));
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::hashers::SimpleHasher;

    #[test]
    fn pure_literal_input_is_one_insert_only_command() {
        let data = b"abcdef";
        let mut h = SimpleHasher::new(10);
        let commands = parse(data, &mut h);
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].insert_len, 6);
        assert_eq!(commands[0].copy_len, 0);
    }

    #[test]
    fn repeated_text_produces_a_copy_command() {
        let data = b"the quick fox the quick fox";
        let mut h = SimpleHasher::new(12);
        let commands = parse(data, &mut h);
        assert!(commands.iter().any(|c| c.copy_len > 0));
    }

    #[test]
    fn commands_cover_the_whole_input() {
        let data = b"mississippi river mississippi delta";
        let mut h = SimpleHasher::new(12);
        let commands = parse(data, &mut h);
        let total: u32 = commands.iter().map(|c| c.insert_len + c.copy_len).sum();
        assert_eq!(total as usize, data.len());
    }
}
