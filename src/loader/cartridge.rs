//! iNES cartridge module.
//!
//! Splits an iNES image into its PRG-ROM and CHR-ROM banks and keeps the
//! most recently loaded cartridge.

use super::RomConsumer;
use crate::core::ByteBuffer;
use crate::error::{LoadError, Result};
use serde::Serialize;
use std::sync::RwLock;

const INES_MAGIC: &[u8; 4] = b"NES\x1a";
const INES_HEADER_SIZE: usize = 0x10;
const TRAINER_SIZE: usize = 512;
const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 8 * 1024;

/// Nametable mirroring selected by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mirroring {
    /// Horizontal arrangement (flag 6 bit 0 clear).
    Horizontal,
    /// Vertical arrangement (flag 6 bit 0 set).
    Vertical,
}

/// A decoded cartridge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    /// Program ROM.
    pub prg_rom: Vec<u8>,
    /// Character ROM.
    pub chr_rom: Vec<u8>,
    /// Nametable mirroring.
    pub mirroring: Mirroring,
}

impl Cartridge {
    /// Decodes an iNES image.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidHeader`] if the magic number is missing
    /// and [`LoadError::Truncated`] if the image is shorter than its header
    /// declares.
    pub fn from_bytes(rom: &[u8]) -> std::result::Result<Self, LoadError> {
        if rom.len() < INES_HEADER_SIZE {
            return Err(LoadError::Truncated {
                expected: INES_HEADER_SIZE,
                actual: rom.len(),
            });
        }
        if &rom[..4] != INES_MAGIC {
            return Err(LoadError::InvalidHeader {
                reason: "missing NES magic number".to_string(),
            });
        }

        let prg_size = usize::from(rom[4]) * PRG_BANK_SIZE;
        let chr_size = usize::from(rom[5]) * CHR_BANK_SIZE;
        let flags6 = rom[6];
        let mirroring = if flags6 & 0x01 == 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
        let trainer = if flags6 & 0x04 == 0 { 0 } else { TRAINER_SIZE };

        let prg_start = INES_HEADER_SIZE + trainer;
        let chr_start = prg_start + prg_size;
        let end = chr_start + chr_size;
        if rom.len() < end {
            return Err(LoadError::Truncated {
                expected: end,
                actual: rom.len(),
            });
        }

        Ok(Self {
            prg_rom: rom[prg_start..chr_start].to_vec(),
            chr_rom: rom[chr_start..end].to_vec(),
            mirroring,
        })
    }

    /// Returns the short size report for this cartridge.
    #[must_use]
    pub fn report(&self) -> String {
        format!(
            "prg_rom {}bytes\nchr_rom {}bytes\n",
            self.prg_rom.len(),
            self.chr_rom.len()
        )
    }
}

/// The bundled processing module: decodes iNES images.
#[derive(Debug, Default)]
pub struct CartridgeConsumer {
    loaded: RwLock<Option<Cartridge>>,
}

impl CartridgeConsumer {
    /// Creates a module with no cartridge inserted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently loaded cartridge.
    #[must_use]
    pub fn loaded(&self) -> Option<Cartridge> {
        match self.loaded.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RomConsumer for CartridgeConsumer {
    fn accept(&self, rom: ByteBuffer) -> Result<String> {
        let cartridge = Cartridge::from_bytes(&rom)?;
        let report = cartridge.report();
        tracing::info!(
            prg_rom = cartridge.prg_rom.len(),
            chr_rom = cartridge.chr_rom.len(),
            mirroring = ?cartridge.mirroring,
            "cartridge inserted"
        );

        match self.loaded.write() {
            Ok(mut slot) => *slot = Some(cartridge),
            Err(poisoned) => *poisoned.into_inner() = Some(cartridge),
        }
        Ok(report)
    }
}
