/// Resource packaging
///
/// Decides how the compiled module and its dependencies reach the launcher:
/// embedded in the image's resource table, or loaded from a sibling file at
/// run time.

use std::fs;

use tracing::info;

use crate::config::LaunchConfig;
use crate::error::{BuildError, Result};
use crate::host::RuntimeHost;

/// Resource-name prefix for bundled runtime and dependency libraries; the
/// resolver routine looks dependencies up under this prefix.
pub const DLL_RESOURCE_PREFIX: &str = "Dll.";
/// Resource-name prefix for the embedded compiled module itself. Kept
/// distinct from `DLL_RESOURCE_PREFIX` so the resolver never serves the main
/// module as a dependency.
pub const MODULE_RESOURCE_PREFIX: &str = "Mod.";

/// A named byte payload destined for the image's resource table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    pub name: String,
    pub data: Vec<u8>,
}

/// How the emitted program acquires the compiled module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    /// Resolve the named resource from the running binary and load it in
    /// memory.
    Embedded { resource: String },
    /// Load the module from a sibling file next to the running binary.
    Sibling { file_name: String },
}

/// Result of packaging: the module acquisition strategy plus every resource
/// the launcher image must carry.
#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub module: ModuleSource,
    pub resources: Vec<EmbeddedResource>,
}

impl PackageOutput {
    pub fn is_embedded(&self) -> bool {
        matches!(self.module, ModuleSource::Embedded { .. })
    }
}

/// Package the compiled module and, in standalone mode, every runtime
/// dependency. The on-disk module file is deleted only after its bytes are
/// safely in memory and all other packaging steps have succeeded, so a
/// failed run always leaves the intermediate file intact.
pub fn package(config: &LaunchConfig, host: &dyn RuntimeHost) -> Result<PackageOutput> {
    let mut resources = Vec::new();

    if config.standalone {
        info!("generating standalone launcher");
        let prefixes = host.library_prefixes();
        for library in host.loaded_libraries() {
            if library.is_dynamic || library.has_entry_point {
                continue;
            }
            if !prefixes.iter().any(|p| library.name.starts_with(p.as_str())) {
                continue;
            }
            let data = fs::read(&library.path)
                .map_err(|e| BuildError::package(&library.path, e.to_string()))?;
            info!(library = %library.name, bytes = data.len(), "embedded runtime library");
            push_resource(
                &mut resources,
                format!("{DLL_RESOURCE_PREFIX}{}", library.name),
                data,
            )?;
        }

        for dll in &config.dlls {
            let name = dll
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| BuildError::package(dll, "dependency has no file name"))?;
            let data = fs::read(dll).map_err(|e| BuildError::package(dll, e.to_string()))?;
            info!(library = %name, bytes = data.len(), "embedded dependency");
            push_resource(&mut resources, format!("{DLL_RESOURCE_PREFIX}{name}"), data)?;
        }
    }

    let module = if config.effective_embed() {
        let module_path = config.module_path();
        let data = fs::read(&module_path)
            .map_err(|e| BuildError::package(&module_path, e.to_string()))?;
        let resource = format!("{MODULE_RESOURCE_PREFIX}{}", config.output_stem());
        info!(module = %module_path.display(), bytes = data.len(), "embedded compiled module");
        push_resource(&mut resources, resource.clone(), data)?;

        // The module now lives in the resource table; the on-disk copy is
        // redundant.
        fs::remove_file(&module_path)
            .map_err(|e| BuildError::package(&module_path, e.to_string()))?;

        ModuleSource::Embedded { resource }
    } else {
        ModuleSource::Sibling {
            file_name: config.module_file_name(),
        }
    };

    Ok(PackageOutput { module, resources })
}

fn push_resource(
    resources: &mut Vec<EmbeddedResource>,
    name: String,
    data: Vec<u8>,
) -> Result<()> {
    if resources.iter().any(|r| r.name == name) {
        return Err(BuildError::DuplicateResource(name));
    }
    resources.push(EmbeddedResource { name, data });
    Ok(())
}
