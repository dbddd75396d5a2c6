/// Launcher image format
///
/// Defines the container the stubforge emitter serializes: an instruction
/// stream for the launcher entry point, optional static-initializer and
/// module-resolver routines, metadata records, and a resource table. The
/// generator only ever writes images; the reader exists for launcher hosts
/// and for tests.

pub mod error;
pub mod image;
pub mod instr;

pub use error::{ImageError, Result};
pub use image::{
    Apartment, LauncherImage, Machine, MetadataKind, MetadataRecord, Platform, ResourceEntry,
    Subsystem,
};
pub use instr::{render_message, DialogButton, DialogIcon, Instr, OptionValue};
