//! The fused command loop: for each command, decode insert length, emit that
//! many literals, then decode a distance and copy bytes from the ring
//! buffer, the compound dictionary, or the static dictionary.
//!
//! A metablock's last command can close out a purely literal tail with no
//! copy at all: every command's insert and copy lengths sum to exactly
//! `mlen` across the metablock, so if a command's literals alone bring the
//! running total up to `mlen`, there is nothing left to copy and no copy
//! length or distance is present in the stream for it. This is detected
//! implicitly (the same `total_written < target` check that drives the
//! loop), not via an extra flag bit.

use crate::bitio::BitReader;
use crate::decoder::metablock::{decode_symbol, MetablockHeader};
use crate::dictionary::compound::CompoundDictionary;
use crate::dictionary::static_dict;
use crate::error::DecodeError;
use crate::ringbuffer::RingBuffer;
use crate::tables::command::{self, CommandLookup};
use crate::tables::distance::{
    DistanceParams, DISTANCE_SHORT_CODE_INDEX_OFFSET, DISTANCE_SHORT_CODE_VALUE_OFFSET,
};

/// Recent-distance cache, seeded with the values the reference decoder
/// starts every stream with.
pub struct DistanceCache {
    pub slots: [u32; 4],
}

impl Default for DistanceCache {
    fn default() -> Self {
        DistanceCache {
            slots: [16, 15, 11, 4],
        }
    }
}

impl DistanceCache {
    fn push(&mut self, distance: u32) {
        if distance != self.slots[0] {
            self.slots = [distance, self.slots[0], self.slots[1], self.slots[2]];
        }
    }
}

pub struct CommandLoopContext<'a> {
    pub ring: &'a mut RingBuffer,
    pub compound: &'a CompoundDictionary<'a>,
    pub window_size: u64,
    pub dist_cache: &'a mut DistanceCache,
}

/// Runs the command loop for one already-parsed compressed metablock,
/// writing `header.mlen` decoded bytes into `ctx.ring`.
pub fn run(
    reader: &mut BitReader,
    header: &mut MetablockHeader,
    ctx: &mut CommandLoopContext,
) -> Result<(), DecodeError> {
    let start = ctx.ring.total_written();
    let target = start + header.mlen as u64;
    let distance_params = DistanceParams::new(header.npostfix, header.ndirect);

    while ctx.ring.total_written() < target {
        header.insert_copy_tracker.advance(reader)?;
        let ic_type = header.insert_copy_tracker.current_type();
        let tree = &header.insert_copy_trees[ic_type as usize];
        let cmd_prefix = decode_symbol(reader, tree)? as u16;
        if cmd_prefix >= 704 {
            return Err(DecodeError::MalformedMetablock("command prefix out of range"));
        }
        let lookup: CommandLookup = command::lookup(cmd_prefix);

        let insert_extra = reader.read_bits(lookup.insert_extra_bits)?;
        let insert_length = lookup.insert_base + insert_extra;

        for _ in 0..insert_length {
            if ctx.ring.total_written() >= target {
                return Err(DecodeError::MalformedMetablock(
                    "insert length overruns metablock size",
                ));
            }
            header.literal_tracker.advance(reader)?;
            let lit_type = header.literal_tracker.current_type();
            let mode = header.literal_context_modes[lit_type as usize];
            let (p1, p2) = ctx.ring.last_two_bytes();
            let context = mode.context(p1, p2) as usize;
            let map_index = lit_type as usize * 64 + context;
            let cluster = *header
                .literal_context_map
                .get(map_index)
                .ok_or(DecodeError::MalformedContextMap("literal context map index out of range"))?;
            let tree = header
                .literal_trees
                .get(cluster as usize)
                .ok_or(DecodeError::MalformedHuffman("literal cluster index out of range"))?;
            let byte = decode_symbol(reader, tree)? as u8;
            ctx.ring.push_literal(byte);
        }

        if ctx.ring.total_written() >= target {
            break;
        }

        let copy_extra = reader.read_bits(lookup.copy_extra_bits)?;
        let copy_length = lookup.copy_base + copy_extra;

        let distance = if CommandLookup::reuses_last_distance(cmd_prefix) {
            ctx.dist_cache.slots[0]
        } else {
            header.distance_tracker.advance(reader)?;
            let dist_type = header.distance_tracker.current_type();
            let map_index = dist_type as usize * 4 + lookup.distance_context as usize;
            let cluster = *header
                .distance_context_map
                .get(map_index)
                .ok_or(DecodeError::MalformedContextMap("distance context map index out of range"))?;
            let tree = header
                .distance_trees
                .get(cluster as usize)
                .ok_or(DecodeError::MalformedHuffman("distance cluster index out of range"))?;
            let distance_code = decode_symbol(reader, tree)?;
            let resolved = if distance_code < 16 {
                let idx = DISTANCE_SHORT_CODE_INDEX_OFFSET[distance_code as usize] as usize;
                let value_offset = DISTANCE_SHORT_CODE_VALUE_OFFSET[distance_code as usize];
                (ctx.dist_cache.slots[idx] as i64 + value_offset as i64).max(1) as u32
            } else {
                let extra = distance_params.extra_bits(distance_code);
                let base = distance_params.offset(distance_code);
                let extra_value = reader.read_bits(extra.min(24))?;
                base + extra_value
            };
            ctx.dist_cache.push(resolved);
            resolved
        };

        if distance == 0 {
            return Err(DecodeError::InvalidDistance { distance: 0, max: 0 });
        }

        let max_distance = ctx.ring.total_written().min(ctx.window_size);
        if (distance as u64) <= max_distance {
            ctx.ring.copy_backward(distance as usize, copy_length as usize);
        } else {
            if copy_length > 31 {
                return Err(DecodeError::InvalidCopyLength {
                    length: copy_length,
                    remaining: 31,
                });
            }
            let beyond = (distance as u64) - max_distance - 1;
            let mut bytes = Vec::with_capacity(copy_length as usize);
            if beyond < ctx.compound.total_size() as u64 {
                ctx.compound.copy(beyond as usize, copy_length as usize, &mut bytes)?;
            } else {
                let addr = (beyond - ctx.compound.total_size() as u64) as u32;
                static_dict::copy(copy_length as usize, addr, &mut bytes)?;
            }
            ctx.ring.push_slice(&bytes);
        }

        if ctx.ring.total_written() > target {
            return Err(DecodeError::MalformedMetablock(
                "copy length overruns metablock size",
            ));
        }
    }

    Ok(())
}
