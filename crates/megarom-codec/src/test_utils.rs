//! Synthetic ROM fixtures for unit tests

#![allow(clippy::unwrap_used)]

use crate::header::{CHECKSUM_OFFSET, compute_checksum};
use crate::rom::RomImage;

/// ROM of `size` bytes with a valid header and a zeroed body
pub fn build_rom(size: usize) -> RomImage {
    build_rom_with_body(size, |_| 0)
}

/// ROM of `size` bytes with a valid header, body byte `i` set to `fill(i)`
///
/// The stored checksum matches the body.
pub fn build_rom_with_body(size: usize, fill: impl Fn(usize) -> u8) -> RomImage {
    let mut data = vec![0u8; size];

    put(&mut data, 0x100, b"SEGA MEGA DRIVE ");
    put(&mut data, 0x110, b"(C)TEST 2024.JAN");
    put(&mut data, 0x120, &padded(b"TEST CART", 48));
    put(&mut data, 0x150, &padded(b"TEST CART", 48));
    put(&mut data, 0x180, b"GM 00000000-00");
    put(&mut data, 0x190, &padded(b"J", 16));
    put(&mut data, 0x1A0, &0u32.to_be_bytes());
    put(&mut data, 0x1A4, &(size as u32 - 1).to_be_bytes());
    put(&mut data, 0x1A8, &0x00FF_0000u32.to_be_bytes());
    put(&mut data, 0x1AC, &0x00FF_FFFFu32.to_be_bytes());
    put(&mut data, 0x1B0, &padded(b"", 12));
    put(&mut data, 0x1BC, &padded(b"", 12));
    put(&mut data, 0x1C8, &padded(b"", 40));
    put(&mut data, 0x1F0, &padded(b"JUE", 16));

    for (i, byte) in data.iter_mut().enumerate().skip(0x200) {
        *byte = fill(i);
    }

    let rom = RomImage::from_linear(data).unwrap();
    let checksum = compute_checksum(&rom);
    rom.with_bytes_at(CHECKSUM_OFFSET, &checksum.to_be_bytes())
        .unwrap()
}

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn padded(text: &[u8], width: usize) -> Vec<u8> {
    let mut out = text.to_vec();
    out.resize(width, b' ');
    out
}
