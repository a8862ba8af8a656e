//! One-shot FAT12 image construction over a zero-filled sector store

#[cfg(feature = "defmt")]
use defmt::{debug, warn};

#[cfg(not(feature = "defmt"))]
use log::{debug, warn};

use packing::{Packed, PackedSize};

use crate::boot::{BootSector, MEDIA_DESCRIPTOR};
use crate::config::Config;
use crate::dir::DirectoryEntry;
use crate::file::File;
use crate::store::SectorStore;
use crate::DiskError;

/// Terminal FAT12 chain marker
const END_OF_CHAIN: u16 = 0xFFF;

/// Build the on-disk structures into the store
///
/// Runs exactly once, before the device is published to the host: boot
/// sector, FAT copies, root directory, then file payloads, each region
/// overwriting the zero-filled store. Geometry that cannot hold the
/// required structures is rejected outright rather than emitting an
/// inconsistent image.
pub(crate) fn build<const SECTOR_SIZE: usize>(
    store: &mut SectorStore<'_, SECTOR_SIZE>,
    config: &Config<SECTOR_SIZE>,
    files: &[File<'_>],
) -> Result<(), DiskError> {
    config.validate()?;

    if store.sector_count() != config.num_sectors {
        return Err(DiskError::StorageSize);
    }

    let label_entries = if config.volume_label.is_empty() { 0 } else { 1 };
    if label_entries + files.len() as u32 > config.root_dir_entries() {
        return Err(DiskError::RootDirectoryFull);
    }

    debug!(
        "building FAT12 image: {} sectors of {} bytes, {} files",
        config.num_sectors,
        SECTOR_SIZE,
        files.len()
    );

    write_boot_sector(store, config);
    write_fats(store, config, files);
    write_root_dir(store, config, files);
    write_payloads(store, config, files);

    Ok(())
}

fn write_boot_sector<const SECTOR_SIZE: usize>(
    store: &mut SectorStore<'_, SECTOR_SIZE>,
    config: &Config<SECTOR_SIZE>,
) {
    let boot = BootSector::new(config);
    let image = store.bytes_mut();

    boot.pack(&mut image[..BootSector::BYTES]).unwrap();

    image[SECTOR_SIZE - 2] = 0x55;
    image[SECTOR_SIZE - 1] = 0xAA;
}

fn write_fats<const SECTOR_SIZE: usize>(
    store: &mut SectorStore<'_, SECTOR_SIZE>,
    config: &Config<SECTOR_SIZE>,
    files: &[File<'_>],
) {
    let fat_len = config.sectors_per_fat() as usize * SECTOR_SIZE;
    let fat0 = config.start_fat(0) as usize * SECTOR_SIZE;

    let image = store.bytes_mut();

    {
        let fat = &mut image[fat0..fat0 + fat_len];

        // Reserved entries: media descriptor and end-of-chain
        set_entry(fat, 0, 0xF00 | MEDIA_DESCRIPTOR as u16);
        set_entry(fat, 1, END_OF_CHAIN);

        // Chain each file through its sequential clusters
        for (_, extent) in layout(config, files) {
            for i in 0..extent.sectors {
                let cluster = extent.start_cluster as u32 + i;
                let value = if i == extent.sectors - 1 {
                    END_OF_CHAIN
                } else {
                    (cluster + 1) as u16
                };
                set_entry(fat, cluster as usize, value);
            }
        }
    }

    // Replicate into the remaining FAT copies
    for copy in 1..config.fat_copies {
        let dst = config.start_fat(copy) as usize * SECTOR_SIZE;
        image.copy_within(fat0..fat0 + fat_len, dst);
    }
}

fn write_root_dir<const SECTOR_SIZE: usize>(
    store: &mut SectorStore<'_, SECTOR_SIZE>,
    config: &Config<SECTOR_SIZE>,
    files: &[File<'_>],
) {
    let start = config.start_rootdir() as usize * SECTOR_SIZE;
    let len = config.root_dir_sectors as usize * SECTOR_SIZE;
    let region = &mut store.bytes_mut()[start..start + len];

    let mut index = 0;

    if !config.volume_label.is_empty() {
        let label = DirectoryEntry::volume_label(crate::config::pad_ascii(config.volume_label));
        label.pack(&mut region[..DirectoryEntry::BYTES]).unwrap();
        index += 1;
    }

    for (f, extent) in layout(config, files) {
        let entry = DirectoryEntry::file(
            f.short_name().unwrap(),
            extent.start_cluster,
            extent.bytes as u32,
        );

        let at = index * DirectoryEntry::BYTES;
        entry.pack(&mut region[at..at + DirectoryEntry::BYTES]).unwrap();

        index += 1;
    }
}

fn write_payloads<const SECTOR_SIZE: usize>(
    store: &mut SectorStore<'_, SECTOR_SIZE>,
    config: &Config<SECTOR_SIZE>,
    files: &[File<'_>],
) {
    for (f, extent) in layout(config, files) {
        if extent.bytes < f.len() {
            warn!("file {} truncated to {} bytes", f.name(), extent.bytes);
        }
        if extent.bytes == 0 {
            continue;
        }

        let sector = config.start_clusters() + extent.start_cluster as u32 - 2;
        let at = sector as usize * SECTOR_SIZE;

        // Trailing partial sector stays zero padded
        store.bytes_mut()[at..at + extent.bytes].copy_from_slice(&f.data()[..extent.bytes]);
    }
}

/// Cluster allocation for one file
#[derive(Clone, Copy, Debug, PartialEq)]
struct Extent {
    /// First cluster, 0 for an empty file
    start_cluster: u16,
    /// Clusters allocated, one sector each
    sectors: u32,
    /// Payload bytes stored, clamped to the allocated clusters
    bytes: usize,
}

/// Walk files in order, assigning sequential clusters from cluster 2
///
/// Allocation is clamped to the data region: a file that does not fit
/// keeps its leading clusters and drops the tail.
fn layout<'a, const SECTOR_SIZE: usize>(
    config: &'a Config<SECTOR_SIZE>,
    files: &'a [File<'a>],
) -> impl Iterator<Item = (&'a File<'a>, Extent)> + 'a {
    let mut next_cluster = 2u32;

    files.iter().map(move |f| {
        let needed = ((f.len() + SECTOR_SIZE - 1) / SECTOR_SIZE) as u32;
        let available = config.cluster_count().saturating_sub(next_cluster - 2);

        let sectors = needed.min(available);
        let extent = Extent {
            start_cluster: if sectors == 0 { 0 } else { next_cluster as u16 },
            sectors,
            bytes: usize::min(f.len(), sectors as usize * SECTOR_SIZE),
        };

        next_cluster += sectors;

        (f, extent)
    })
}

/// Write a 12-bit FAT entry, two entries packed per three bytes
fn set_entry(fat: &mut [u8], cluster: usize, value: u16) {
    let index = cluster + cluster / 2;

    if cluster % 2 == 0 {
        fat[index] = value as u8;
        fat[index + 1] = (fat[index + 1] & 0xF0) | ((value >> 8) as u8 & 0x0F);
    } else {
        fat[index] = (fat[index] & 0x0F) | ((value as u8) << 4);
        fat[index + 1] = (value >> 4) as u8;
    }
}
