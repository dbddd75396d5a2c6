/// Launcher image container and on-disk encoding
///
/// An image starts with a 4-byte magic and a little-endian format version,
/// followed by the bincode-encoded `LauncherImage` payload.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};
use crate::instr::Instr;

pub const MAGIC: [u8; 4] = *b"SFLI";
pub const FORMAT_VERSION: u16 = 1;

/// Subsystem the launcher runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subsystem {
    Console,
    Windowed,
}

/// Target machine identifier recorded in the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Machine {
    X86,
    X64,
    Arm64,
}

/// Target platform identifier recorded in the image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    AnyCpu,
    X86,
    X64,
}

/// Threading model the entry point is marked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Apartment {
    SingleThreaded,
    MultiThreaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataKind {
    FileVersion,
    ProductName,
    ProductVersion,
    Copyright,
}

/// One version/product descriptor attached to the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub kind: MetadataKind,
    pub value: String,
}

/// A named byte payload in the image's resource table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// The complete launcher image.
///
/// `static_init` runs before any entry logic; `resolver` is the on-demand
/// module-resolution routine and is empty unless the image was built in
/// standalone mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LauncherImage {
    pub subsystem: Subsystem,
    pub machine: Machine,
    pub platform: Platform,
    pub apartment: Option<Apartment>,
    pub metadata: Vec<MetadataRecord>,
    pub icon: Option<Vec<u8>>,
    pub resources: Vec<ResourceEntry>,
    pub static_init: Vec<Instr>,
    pub entry: Vec<Instr>,
    pub resolver: Vec<Instr>,
}

impl LauncherImage {
    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Encode the image to its on-disk byte representation.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serde::encode_to_vec(self, bincode::config::standard())?;
        let mut bytes = Vec::with_capacity(payload.len() + 6);
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode an image from its on-disk byte representation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 6 || bytes[..4] != MAGIC {
            return Err(ImageError::BadMagic);
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(ImageError::UnsupportedVersion(version));
        }
        let (image, _) =
            bincode::serde::decode_from_slice(&bytes[6..], bincode::config::standard())?;
        Ok(image)
    }

    /// Serialize the image to `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Read an image back from `path`.
    pub fn read_from_file(path: &Path) -> Result<Self> {
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> LauncherImage {
        LauncherImage {
            subsystem: Subsystem::Console,
            machine: Machine::X64,
            platform: Platform::AnyCpu,
            apartment: None,
            metadata: vec![MetadataRecord {
                kind: MetadataKind::FileVersion,
                value: "1.0.0".into(),
            }],
            icon: None,
            resources: vec![ResourceEntry {
                name: "Mod.hello".into(),
                data: vec![1, 2, 3],
            }],
            static_init: Vec::new(),
            entry: vec![Instr::ReturnExitCode],
            resolver: Vec::new(),
        }
    }

    #[test]
    fn roundtrip_through_bytes() {
        let image = sample_image();
        let bytes = image.to_bytes().expect("encode failed");
        let decoded = LauncherImage::from_bytes(&bytes).expect("decode failed");
        assert_eq!(decoded, image);
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("sample.exe");
        let image = sample_image();
        image.write_to_file(&path).expect("write failed");
        let decoded = LauncherImage::read_from_file(&path).expect("read failed");
        assert_eq!(decoded, image);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = LauncherImage::from_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, ImageError::BadMagic));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = sample_image().to_bytes().expect("encode failed");
        bytes[4] = 0xff;
        bytes[5] = 0xff;
        let err = LauncherImage::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedVersion(_)));
    }

    #[test]
    fn resource_lookup_by_name() {
        let image = sample_image();
        assert_eq!(image.resource("Mod.hello").map(|r| r.data.as_slice()), Some(&[1u8, 2, 3][..]));
        assert!(image.resource("Dll.missing").is_none());
    }
}
