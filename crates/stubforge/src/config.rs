/// Launch configuration
///
/// One `LaunchConfig` describes one synthesis request. It is created from
/// user input, validated once, and never mutated afterwards.

use std::path::PathBuf;

use stubforge_image::{Machine, Platform};

pub use stubforge_image::OptionValue;

use crate::error::{BuildError, Result};

/// Suffix forced onto the emitted launcher file name.
pub const EXE_SUFFIX: &str = ".exe";
/// Suffix of the compiled script module the launcher starts.
pub const MODULE_SUFFIX: &str = ".dll";
/// Default main-module name passed to the runtime startup call.
pub const DEFAULT_MAIN_MODULE: &str = "__main__";
/// Default failure-message template; `{0}` is the failure description.
pub const DEFAULT_ERROR_FORMAT: &str = "Error occurred: {0}";

/// What kind of output the launcher targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Console application: failures go to standard output.
    Console,
    /// Windowed application: failures go to a modal dialog.
    Windowed,
    /// Library only: the compiled module is the final output, no launcher.
    Library,
}

/// Apartment-style threading hint for the launcher entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingModel {
    SingleThreaded,
    MultiThreaded,
}

/// Ordered runtime-option map.
///
/// Keys are unique and iteration order matches insertion order; setting an
/// existing key overwrites its value in place, so the last write wins without
/// reordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionMap {
    entries: Vec<(String, OptionValue)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: OptionValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(String, OptionValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable configuration for one launcher build.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Output name; may already carry the executable suffix.
    pub output: String,
    /// Directory the module lives in and the launcher is written to.
    pub output_dir: PathBuf,
    pub target: TargetKind,
    /// Embed the compiled module into the launcher instead of loading a
    /// sibling file. Forced on by `standalone`.
    pub embed: bool,
    /// Bundle the runtime's own support libraries so the launcher runs
    /// without a separately installed runtime.
    pub standalone: bool,
    pub threading: Option<ThreadingModel>,
    pub options: OptionMap,
    pub file_version: String,
    pub product_name: String,
    pub product_version: String,
    pub copyright: String,
    pub icon: Option<Vec<u8>>,
    pub error_format: String,
    /// Extra dependency files bundled in standalone mode.
    pub dlls: Vec<PathBuf>,
    pub machine: Machine,
    pub platform: Platform,
    pub main_module: String,
}

impl LaunchConfig {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            output_dir: PathBuf::from("."),
            target: TargetKind::Console,
            embed: false,
            standalone: false,
            threading: None,
            options: OptionMap::new(),
            file_version: String::new(),
            product_name: String::new(),
            product_version: String::new(),
            copyright: String::new(),
            icon: None,
            error_format: DEFAULT_ERROR_FORMAT.to_string(),
            dlls: Vec::new(),
            machine: Machine::X64,
            platform: Platform::AnyCpu,
            main_module: DEFAULT_MAIN_MODULE.to_string(),
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    pub fn embed(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }

    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn threading(mut self, threading: ThreadingModel) -> Self {
        self.threading = Some(threading);
        self
    }

    /// Output name without the executable suffix.
    pub fn output_stem(&self) -> &str {
        self.output
            .strip_suffix(EXE_SUFFIX)
            .unwrap_or(&self.output)
    }

    /// File name of the compiled module next to the launcher.
    pub fn module_file_name(&self) -> String {
        format!("{}{}", self.output_stem(), MODULE_SUFFIX)
    }

    /// On-disk path of the compiled module produced by the module compiler.
    pub fn module_path(&self) -> PathBuf {
        self.output_dir.join(self.module_file_name())
    }

    /// File name of the emitted launcher; the executable suffix is appended
    /// unless the output name already carries it.
    pub fn exe_file_name(&self) -> String {
        if self.output.ends_with(EXE_SUFFIX) {
            self.output.clone()
        } else {
            format!("{}{}", self.output, EXE_SUFFIX)
        }
    }

    /// On-disk path of the emitted launcher.
    pub fn exe_path(&self) -> PathBuf {
        self.output_dir.join(self.exe_file_name())
    }

    /// Whether the compiled module ends up embedded in the launcher.
    pub fn effective_embed(&self) -> bool {
        self.embed || self.standalone
    }

    /// Check the configuration invariants once, before synthesis starts.
    pub fn validate(&self) -> Result<()> {
        if self.output_stem().is_empty() {
            return Err(BuildError::config("output name must not be empty"));
        }
        // Windowed targets may request either apartment model; console
        // targets may only request the single-threaded one.
        if self.target == TargetKind::Console
            && self.threading == Some(ThreadingModel::MultiThreaded)
        {
            return Err(BuildError::config(
                "console targets cannot use the multi-threaded apartment model",
            ));
        }
        if !self.error_format.contains("{0}") {
            return Err(BuildError::config(
                "error-message template must contain the {0} placeholder",
            ));
        }
        Ok(())
    }
}
