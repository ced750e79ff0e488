use std::collections::BTreeSet;
use std::io::{self, Read};

pub const BLOCK_SIZE: usize = 512;

pub const MAGIC_START0: u32 = 0x0A324655;
pub const MAGIC_START1: u32 = 0x9E5D5157;
pub const MAGIC_END: u32 = 0x0AB16F30;

const FAMILY_ID_PRESENT_FLAG: u32 = 0x00002000;

pub const RP2040_FAMILY_ID: u32 = 0xe48bff56;
pub const ABSOLUTE_FAMILY_ID: u32 = 0xe48bff57;
pub const RP2350_ARM_S_FAMILY_ID: u32 = 0xe48bff59;
pub const RP2350_RISCV_FAMILY_ID: u32 = 0xe48bff5a;
pub const RP2350_ARM_NS_FAMILY_ID: u32 = 0xe48bff5b;

/// Header of a single UF2 block.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Uf2Block {
    pub flags: u32,
    pub target_addr: u32,
    pub payload_size: u32,
    pub block_no: u32,
    pub num_blocks: u32,
    file_size: u32, // or familyID
}

fn le_u32(data: &[u8; BLOCK_SIZE], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

impl Uf2Block {
    /// Parse a block, returns `None` if the magic numbers do not match.
    pub fn parse(data: &[u8; BLOCK_SIZE]) -> Option<Self> {
        if le_u32(data, 0) != MAGIC_START0
            || le_u32(data, 4) != MAGIC_START1
            || le_u32(data, BLOCK_SIZE - 4) != MAGIC_END
        {
            return None;
        }

        Some(Uf2Block {
            flags: le_u32(data, 8),
            target_addr: le_u32(data, 12),
            payload_size: le_u32(data, 16),
            block_no: le_u32(data, 20),
            num_blocks: le_u32(data, 24),
            file_size: le_u32(data, 28),
        })
    }

    pub fn family_id(&self) -> Option<u32> {
        if self.flags & FAMILY_ID_PRESENT_FLAG != 0 {
            Some(self.file_size)
        } else {
            None
        }
    }
}

/// Iterator over the valid blocks of a UF2 stream.
///
/// Blocks with bad magic are skipped.
pub struct Uf2Blocks<R> {
    read: R,
}

impl<R: Read> Uf2Blocks<R> {
    pub fn new(read: R) -> Self {
        Uf2Blocks { read }
    }

    /// Fill `buffer` completely. Returns `false` on a clean end of stream.
    fn read_block(&mut self, buffer: &mut [u8; BLOCK_SIZE]) -> io::Result<bool> {
        let mut filled = 0;
        while filled < BLOCK_SIZE {
            match self.read.read(&mut buffer[filled..]) {
                Ok(0) if filled == 0 => return Ok(false),
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("Truncated UF2 block: {filled} of {BLOCK_SIZE} bytes"),
                    ))
                }
                Ok(len) => filled += len,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(true)
    }
}

impl<R: Read> Iterator for Uf2Blocks<R> {
    type Item = io::Result<Uf2Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buffer = [0; BLOCK_SIZE];
        loop {
            match self.read_block(&mut buffer) {
                Ok(false) => return None,
                Ok(true) => {
                    if let Some(block) = Uf2Block::parse(&buffer) {
                        return Some(Ok(block));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Block count and target families of a UF2 image.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Uf2Summary {
    pub blocks: usize,
    pub family_ids: BTreeSet<u32>,
}

impl Uf2Summary {
    pub fn read<R: Read>(read: R) -> io::Result<Self> {
        let mut summary = Uf2Summary::default();
        for block in Uf2Blocks::new(read) {
            let block = block?;
            summary.blocks += 1;
            if let Some(family_id) = block.family_id() {
                summary.family_ids.insert(family_id);
            }
        }
        Ok(summary)
    }
}

/// Name of a well-known family ID.
pub fn family_name(family_id: u32) -> Option<&'static str> {
    match family_id {
        RP2040_FAMILY_ID => Some("RP2040"),
        ABSOLUTE_FAMILY_ID => Some("absolute"),
        RP2350_ARM_S_FAMILY_ID => Some("RP2350 ARM-S"),
        RP2350_RISCV_FAMILY_ID => Some("RP2350 RISC-V"),
        RP2350_ARM_NS_FAMILY_ID => Some("RP2350 ARM-NS"),
        _ => None,
    }
}
