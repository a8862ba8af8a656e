//! RAM-backed FAT12 disk for embedded USB Mass Storage devices
//!
//! Backs a fixed-size logical disk with borrowed volatile memory, builds
//! a minimal FAT12 image into it once at startup so host operating
//! systems auto-mount the device, then serves sector-addressed transfers
//! through the mass storage callback contract. The USB protocol engine
//! itself is an external collaborator: it decodes host commands and
//! drives a [`MassStorage`] implementation from a single processing
//! context, one command at a time.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "defmt")]
use defmt::debug;

#[cfg(not(feature = "defmt"))]
use log::debug;

use usbd_scsi::{BlockDevice, BlockDeviceError};

mod boot;

mod config;
pub use config::{Config, Identity};

mod dir;

mod file;
pub use file::{Attrs, File, FileError};

mod image;

mod media;
pub use media::{Media, MediaState};

mod store;
pub use store::SectorStore;

pub(crate) const ASCII_SPACE: u8 = 0x20;

/// Construction-time failures
///
/// All of these reject the device before it is published to the host;
/// runtime transfer violations are reported through zero transfer
/// counts instead.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature="defmt", derive(defmt::Format))]
pub enum DiskError {
    /// Sector count cannot hold the boot sector, FATs and root directory
    GeometryTooSmall,
    /// More data clusters than 12-bit FAT entries can index
    TooManyClusters,
    /// Sector count does not fit the 16-bit total-sector field
    TotalSectorsOverflow,
    /// Backing storage length differs from the configured sector count
    StorageSize,
    /// Volume label and file entries exceed the root directory capacity
    RootDirectoryFull,
}

/// Mass storage callback contract consumed by the transport
///
/// The transport invokes these synchronously with exactly one command in
/// flight, so implementations never need internal locking. Transfer
/// operations return the byte count moved; a rejected request returns 0
/// and the transport surfaces a failed command while the device stays
/// attached.
pub trait MassStorage {
    /// Disk capacity as announced to the host: (sector count, sector size)
    fn capacity(&self) -> (u32, u32);

    /// Identity strings surfaced by host enumeration
    fn identity(&self) -> Identity;

    /// Media capability flag, advertised once at startup
    fn media_present(&self) -> bool;

    /// Host read of `buf.len()` bytes at a sector/offset address
    fn on_read(&self, lba: u32, offset: u32, buf: &mut [u8]) -> usize;

    /// Host write of `data` at a sector/offset address
    fn on_write(&mut self, lba: u32, offset: u32, data: &[u8]) -> usize;

    /// Host cache flush request
    fn on_flush(&mut self) {}

    /// Host start-stop-unit request; returns the acknowledgment
    fn on_start_stop(&mut self, power_condition: u8, start: bool, load_eject: bool) -> bool;
}

/// RAM-backed emulated disk
///
/// Owns the sector store for its lifetime; constructed once at startup
/// with the backing storage, the files to bundle into the image, and the
/// geometry/branding configuration.
pub struct RamDisk<'a, const SECTOR_SIZE: usize = 512> {
    config: Config<SECTOR_SIZE>,
    store: SectorStore<'a, SECTOR_SIZE>,
    media: Media,
}

impl <'a, const SECTOR_SIZE: usize> RamDisk<'a, SECTOR_SIZE> {
    /// Zero-fill the backing storage, build the filesystem image and
    /// wrap it as an attached device
    ///
    /// Fails fast if the configured geometry cannot hold the on-disk
    /// structures; an inconsistent image is never published.
    pub fn new(
        backing: &'a mut [[u8; SECTOR_SIZE]],
        files: &[File<'_>],
        config: Config<SECTOR_SIZE>,
    ) -> Result<Self, DiskError> {
        let mut store = SectorStore::new(backing);

        image::build(&mut store, &config, files)?;

        Ok(Self {
            config,
            store,
            media: Media::new(),
        })
    }

    /// Device configuration
    pub fn config(&self) -> &Config<SECTOR_SIZE> {
        &self.config
    }

    /// Media presence state, for status reporting
    pub fn media(&self) -> &Media {
        &self.media
    }
}

impl <'a, const SECTOR_SIZE: usize> MassStorage for RamDisk<'a, SECTOR_SIZE> {
    fn capacity(&self) -> (u32, u32) {
        (self.config.num_sectors, SECTOR_SIZE as u32)
    }

    fn identity(&self) -> Identity {
        self.config.identity()
    }

    /// Always-ready device: the backing memory needs no spin-up
    fn media_present(&self) -> bool {
        true
    }

    fn on_read(&self, lba: u32, offset: u32, buf: &mut [u8]) -> usize {
        self.store.read(lba, offset as usize, buf)
    }

    fn on_write(&mut self, lba: u32, offset: u32, data: &[u8]) -> usize {
        self.store.write(lba, offset as usize, data)
    }

    /// Writes land in the store before the command completes, so there
    /// is nothing to flush
    fn on_flush(&mut self) {
        debug!("flush acknowledged");
    }

    fn on_start_stop(&mut self, power_condition: u8, start: bool, load_eject: bool) -> bool {
        self.media.start_stop(power_condition, start, load_eject)
    }
}

/// [`BlockDevice`] implementation for mounting behind a [`usbd_scsi`]
/// transport
impl <'a, const SECTOR_SIZE: usize> BlockDevice for RamDisk<'a, SECTOR_SIZE> {
    const BLOCK_BYTES: usize = SECTOR_SIZE;

    fn read_block(&self, lba: u32, block: &mut [u8]) -> Result<(), BlockDeviceError> {
        if self.store.read(lba, 0, block) != block.len() {
            return Err(BlockDeviceError::InvalidAddress);
        }
        Ok(())
    }

    fn write_block(&mut self, lba: u32, block: &[u8]) -> Result<(), BlockDeviceError> {
        if self.store.write(lba, 0, block) != block.len() {
            return Err(BlockDeviceError::InvalidAddress);
        }
        Ok(())
    }

    fn max_lba(&self) -> u32 {
        self.config.num_sectors - 1
    }
}

#[cfg(test)]
mod tests {
    use usbd_scsi::BlockDevice;

    use super::*;

    const README: &[u8] = b"RAM disk emulated over USB mass storage\r\n";

    #[test]
    fn boot_sector_visible_to_host() {
        let mut backing = [[0u8; 512]; 64];
        let files = [File::new("README.TXT", README).unwrap()];
        let disk = RamDisk::new(&mut backing, &files, Config::default()).unwrap();

        let mut jump = [0u8; 3];
        assert_eq!(disk.on_read(0, 0, &mut jump), 3);
        assert_eq!(jump, [0xEB, 0x3C, 0x90]);

        // Total sector count, little endian at offset 19
        let mut total = [0u8; 2];
        assert_eq!(disk.on_read(0, 19, &mut total), 2);
        assert_eq!(u16::from_le_bytes(total), 64);

        let mut sig = [0u8; 2];
        assert_eq!(disk.on_read(0, 510, &mut sig), 2);
        assert_eq!(sig, [0x55, 0xAA]);
    }

    #[test]
    fn write_visible_to_next_read() {
        let mut backing = [[0u8; 512]; 64];
        let mut disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        let data = [0xFFu8; 512];
        assert_eq!(disk.on_write(10, 0, &data), 512);

        let mut out = [0u8; 512];
        assert_eq!(disk.on_read(10, 0, &mut out), 512);
        assert_eq!(out[..], data[..]);
    }

    #[test]
    fn out_of_range_transfers_rejected() {
        let mut backing = [[0u8; 512]; 64];
        let mut disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(disk.on_read(64, 0, &mut buf), 0);
        assert_eq!(disk.on_write(64, 0, &buf), 0);

        // Offset and length must stay within one sector
        assert_eq!(disk.on_read(0, 510, &mut buf), 0);
        assert_eq!(disk.on_write(0, 510, &buf), 0);
    }

    #[test]
    fn too_small_geometry_rejected() {
        let mut backing = [[0u8; 512]; 1];
        let mut config = Config::default();
        config.num_sectors = 1;

        let result = RamDisk::new(&mut backing, &[], config);
        assert_eq!(result.err(), Some(DiskError::GeometryTooSmall));
    }

    #[test]
    fn eject_and_reload_sequence() {
        let mut backing = [[0u8; 512]; 64];
        let mut disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        assert_eq!(disk.media().state(), MediaState::Present);

        assert!(disk.on_start_stop(0, false, true));
        assert_eq!(disk.media().state(), MediaState::Ejected);

        assert!(disk.on_start_stop(0, true, true));
        assert_eq!(disk.media().state(), MediaState::Present);

        // Pure power condition notification
        assert!(disk.on_start_stop(0, false, false));
        assert_eq!(disk.media().state(), MediaState::Present);

        // The startup capability flag is independent of eject state
        disk.on_start_stop(0, false, true);
        assert!(disk.media_present());
    }

    #[test]
    fn flush_is_a_noop_acknowledgment() {
        let mut backing = [[0u8; 512]; 64];
        let mut disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        let data = [0x42u8; 512];
        disk.on_write(5, 0, &data);
        disk.on_flush();

        let mut out = [0u8; 512];
        disk.on_read(5, 0, &mut out);
        assert_eq!(out[..], data[..]);
    }

    #[test]
    fn capacity_and_identity() {
        let mut backing = [[0u8; 512]; 64];
        let disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        assert_eq!(disk.capacity(), (64, 512));
        assert_eq!(&disk.identity().vendor, b"RAMFAT  ");
        assert_eq!(&disk.identity().product, b"RAM Disk        ");
        assert_eq!(&disk.identity().revision, b"1.0 ");
    }

    #[test]
    fn scsi_block_device_interface() {
        let mut backing = [[0u8; 512]; 64];
        let mut disk = RamDisk::new(&mut backing, &[], Config::default()).unwrap();

        assert_eq!(disk.max_lba(), 63);

        let mut block = [0u8; 512];
        disk.read_block(0, &mut block).unwrap();
        assert_eq!(block[510..], [0x55, 0xAA]);

        let data = [0xA5u8; 512];
        disk.write_block(5, &data).unwrap();
        disk.read_block(5, &mut block).unwrap();
        assert_eq!(block[..], data[..]);

        assert!(disk.read_block(64, &mut block).is_err());
        assert!(disk.write_block(64, &data).is_err());
    }
}
