//! Container byte-order transforms
//!
//! Two interleaved layouts are supported:
//!
//! ```text
//! Interleaved halves (whole file):
//!   raw    = [even-address bytes ...][odd-address bytes ...]
//!   linear[2i]     = raw[i]
//!   linear[2i + 1] = raw[N/2 + i]
//!
//! SMD blocks (optional 512-byte copier header, then 16 KiB blocks):
//!   block  = [odd-address bytes (8 KiB)][even-address bytes (8 KiB)]
//!   linear[b + 2i + 1] = raw[b + i]
//!   linear[b + 2i]     = raw[b + 8192 + i]
//! ```
//!
//! Every transform here has an exact inverse, so `interleave(deinterleave(x)) == x`.

use crate::bounds::checked_slice;
use crate::error::FormatError;

/// SMD interleave block size
pub const SMD_BLOCK_SIZE: usize = 16 * 1024;
/// SMD copier header size
pub const SMD_HEADER_SIZE: usize = 512;

const SMD_HALF_BLOCK: usize = SMD_BLOCK_SIZE / 2;

/// Merge the two halves of an interleaved buffer into linear order
pub fn deinterleave_halves(raw: &[u8]) -> Result<Vec<u8>, FormatError> {
    if raw.len() % 2 != 0 {
        return Err(FormatError::OddLength(raw.len()));
    }

    let (even, odd) = raw.split_at(raw.len() / 2);
    let mut linear = Vec::with_capacity(raw.len());
    for (&e, &o) in even.iter().zip(odd) {
        linear.push(e);
        linear.push(o);
    }

    Ok(linear)
}

/// Split a linear buffer into even-address and odd-address halves
pub fn interleave_halves(linear: &[u8]) -> Result<Vec<u8>, FormatError> {
    if linear.len() % 2 != 0 {
        return Err(FormatError::OddLength(linear.len()));
    }

    let mut raw = Vec::with_capacity(linear.len());
    raw.extend(linear.iter().step_by(2));
    raw.extend(linear.iter().skip(1).step_by(2));
    Ok(raw)
}

/// Check whether an SMD dump starts with a copier header
///
/// Only a dump one header longer than a whole number of blocks carries one.
/// In a block-aligned dump the copier ID bytes are ordinary game data.
pub fn has_copier_header(raw: &[u8]) -> bool {
    raw.len() % SMD_BLOCK_SIZE == SMD_HEADER_SIZE
}

/// Whether the dump starts with a known copier ID
///
/// Either `AA BB` at bytes 8..10, or `03 00` followed by 14 zero bytes.
pub fn has_copier_signature(raw: &[u8]) -> bool {
    let signature = checked_slice(raw, 8, 2).is_ok_and(|id| id == [0xAA, 0xBB]);
    let legacy = checked_slice(raw, 0, 16).is_ok_and(|head| {
        matches!(head.split_first_chunk::<2>(), Some(([0x03, 0x00], rest)) if rest.iter().all(|&b| b == 0))
    });
    signature || legacy
}

/// Split an SMD dump into its copier header (if any) and block payload
pub fn split_copier_header(raw: &[u8]) -> (Option<&[u8]>, &[u8]) {
    if has_copier_header(raw) {
        let (header, payload) = raw.split_at(SMD_HEADER_SIZE);
        (Some(header), payload)
    } else {
        (None, raw)
    }
}

/// De-interleave an SMD block payload (copier header already removed)
pub fn deinterleave_smd(payload: &[u8]) -> Result<Vec<u8>, FormatError> {
    check_smd_blocks(payload.len())?;

    let mut linear = vec![0u8; payload.len()];
    for (raw_block, out_block) in payload
        .chunks_exact(SMD_BLOCK_SIZE)
        .zip(linear.chunks_exact_mut(SMD_BLOCK_SIZE))
    {
        let (odd, even) = raw_block.split_at(SMD_HALF_BLOCK);
        for ((pair, &e), &o) in out_block.chunks_exact_mut(2).zip(even).zip(odd) {
            pair[0] = e;
            pair[1] = o;
        }
    }

    Ok(linear)
}

/// Re-interleave a linear buffer into SMD blocks (no copier header)
pub fn interleave_smd(linear: &[u8]) -> Result<Vec<u8>, FormatError> {
    check_smd_blocks(linear.len())?;

    let mut raw = vec![0u8; linear.len()];
    for (lin_block, out_block) in linear
        .chunks_exact(SMD_BLOCK_SIZE)
        .zip(raw.chunks_exact_mut(SMD_BLOCK_SIZE))
    {
        let (odd, even) = out_block.split_at_mut(SMD_HALF_BLOCK);
        for ((pair, e), o) in lin_block.chunks_exact(2).zip(even).zip(odd) {
            *e = pair[0];
            *o = pair[1];
        }
    }

    Ok(raw)
}

fn check_smd_blocks(len: usize) -> Result<(), FormatError> {
    if len == 0 || len % SMD_BLOCK_SIZE != 0 {
        return Err(FormatError::MisalignedBlocks {
            len,
            block_size: SMD_BLOCK_SIZE,
        });
    }
    Ok(())
}
