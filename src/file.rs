
use crate::ASCII_SPACE;

/// File bundled into the disk image at build time
///
/// Holds a borrowed payload; the builder copies it into the data region,
/// after which the sector store is the only copy the host sees.
pub struct File<'a> {
    pub(crate) name: &'a str,
    pub(crate) data: &'a [u8],
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature="defmt", derive(defmt::Format))]
pub enum FileError {
    InvalidName,
}

bitflags::bitflags! {
    pub struct Attrs: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_LABEL = 0x08;
        const SUBDIR = 0x10;
        const ARCHIVE = 0x20;
        const DEVICE = 0x40;
    }
}

impl <'a> File<'a> {
    /// Create a file entry, checking the name converts to 8.3 form
    pub fn new(name: &'a str, data: &'a [u8]) -> Result<Self, FileError> {
        let f = Self { name, data };

        // Reject names the root directory cannot represent
        f.short_name()?;

        Ok(f)
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Convert the name to the fixed-width 8.3 directory form,
    /// space padded and upper cased
    pub fn short_name(&self) -> Result<[u8; 11], FileError> {
        if !self.name.is_ascii() {
            return Err(FileError::InvalidName);
        }

        let mut parts = self.name.split('.');
        let prefix = parts.next().unwrap_or("");
        let ext = parts.next().unwrap_or("");

        // A second dot cannot be represented
        if parts.next().is_some() {
            return Err(FileError::InvalidName);
        }

        if prefix.is_empty() || prefix.len() > 8 || ext.len() > 3 {
            return Err(FileError::InvalidName);
        }

        if prefix.contains(' ') || ext.contains(' ') {
            return Err(FileError::InvalidName);
        }

        let mut name = [ASCII_SPACE; 11];
        for (i, b) in prefix.bytes().enumerate() {
            name[i] = b.to_ascii_uppercase();
        }
        for (i, b) in ext.bytes().enumerate() {
            name[8 + i] = b.to_ascii_uppercase();
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_conversion() {
        let f = File::new("README.TXT", b"hi").unwrap();
        assert_eq!(&f.short_name().unwrap(), b"README  TXT");

        let f = File::new("A.B", b"").unwrap();
        assert_eq!(&f.short_name().unwrap(), b"A       B  ");
    }

    #[test]
    fn short_name_upper_cases() {
        let f = File::new("boot.bin", b"").unwrap();
        assert_eq!(&f.short_name().unwrap(), b"BOOT    BIN");
    }

    #[test]
    fn name_without_extension() {
        let f = File::new("KERNEL", b"").unwrap();
        assert_eq!(&f.short_name().unwrap(), b"KERNEL     ");
    }

    #[test]
    fn invalid_names_rejected() {
        assert_eq!(File::new("", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new(".TXT", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new("TOOLONGNAME.TXT", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new("FILE.TEXT", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new("A.B.C", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new("BAD NAME.TXT", b"").err(), Some(FileError::InvalidName));
        assert_eq!(File::new("ÜMLAUT.TXT", b"").err(), Some(FileError::InvalidName));
    }
}
