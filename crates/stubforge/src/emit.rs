/// Binary emission
///
/// Lowers a synthesized program to the launcher instruction set, attaches
/// metadata and resources, and serializes the finished image to disk. The
/// lowering step is a plain function over op sequences so it can be tested
/// without touching the file system.

use std::path::PathBuf;

use tracing::info;

use stubforge_image::{
    Apartment, DialogButton, DialogIcon, Instr, LauncherImage, MetadataKind, MetadataRecord,
    ResourceEntry, Subsystem,
};

use crate::config::{LaunchConfig, TargetKind, ThreadingModel};
use crate::error::{BuildError, Result};
use crate::package::EmbeddedResource;
use crate::synth::{Op, SynthesizedProgram, FAILURE_EXIT_CODE};

/// Lower a synthesized op sequence to the flat image instruction stream.
pub fn lower(ops: &[Op]) -> Vec<Instr> {
    let mut out = Vec::new();
    for op in ops {
        lower_op(op, &mut out);
    }
    out
}

fn lower_op(op: &Op, out: &mut Vec<Instr>) {
    match op {
        Op::BuildOptions(entries) => out.push(Instr::PushOptions {
            entries: entries.clone(),
        }),
        Op::Protected { body, handler } => {
            out.push(Instr::EnterProtected);
            for op in body {
                lower_op(op, out);
            }
            out.push(Instr::CatchAll);
            for op in handler {
                lower_op(op, out);
            }
            out.push(Instr::LeaveProtected);
        }
        Op::AcquireEmbedded { resource } => out.push(Instr::LoadModuleFromResource {
            name: resource.clone(),
        }),
        Op::AcquireSibling { file_name } => {
            // The working directory is restored before the load call so any
            // relative-path side effects during loading see the original
            // directory.
            out.push(Instr::SaveWorkingDir);
            out.push(Instr::ResolveSiblingPath {
                file_name: file_name.clone(),
            });
            out.push(Instr::RestoreWorkingDir);
            out.push(Instr::LoadModuleFromPath);
        }
        Op::StartRuntime {
            main_module,
            honor_environment,
            with_options,
        } => out.push(Instr::InvokeRuntime {
            main_module: main_module.clone(),
            honor_environment: *honor_environment,
            with_options: *with_options,
        }),
        Op::ReportConsole { template } => out.push(Instr::WriteConsole {
            template: template.clone(),
        }),
        Op::ReportDialog { template, title } => out.push(Instr::ShowDialog {
            template: template.clone(),
            title: title.clone(),
            button: DialogButton::Ok,
            icon: DialogIcon::Error,
        }),
        Op::FailExit => out.push(Instr::SetExitCode {
            code: FAILURE_EXIT_CODE,
        }),
        Op::ReturnExit => out.push(Instr::ReturnExitCode),
        Op::ResolveFromResources { prefix } => {
            out.push(Instr::LoadEntryImage);
            out.push(Instr::ResourceNameFromRequest {
                prefix: prefix.clone(),
            });
            out.push(Instr::OpenResourceStream);
            out.push(Instr::ReadStreamExact);
            out.push(Instr::LoadModuleFromBuffer);
            out.push(Instr::ReturnModule);
        }
        Op::RegisterResolver => out.push(Instr::RegisterResolver),
    }
}

fn subsystem_for(target: TargetKind) -> Result<Subsystem> {
    match target {
        TargetKind::Console => Ok(Subsystem::Console),
        TargetKind::Windowed => Ok(Subsystem::Windowed),
        TargetKind::Library => Err(BuildError::Emit(
            "library targets have no launcher to emit".into(),
        )),
    }
}

fn apartment_for(target: TargetKind, threading: Option<ThreadingModel>) -> Option<Apartment> {
    match (target, threading) {
        (TargetKind::Windowed, Some(ThreadingModel::MultiThreaded)) => {
            Some(Apartment::MultiThreaded)
        }
        (TargetKind::Windowed, _) => Some(Apartment::SingleThreaded),
        (TargetKind::Console, Some(ThreadingModel::SingleThreaded)) => {
            Some(Apartment::SingleThreaded)
        }
        _ => None,
    }
}

fn metadata_records(config: &LaunchConfig) -> Vec<MetadataRecord> {
    let mut records = Vec::new();
    // All four records hang off the file-version check; with an empty file
    // version nothing is attached, even when the other strings are set.
    // Carried over from the original generator; see DESIGN.md.
    if !config.file_version.is_empty() {
        let candidates = [
            (MetadataKind::FileVersion, &config.file_version),
            (MetadataKind::ProductName, &config.product_name),
            (MetadataKind::ProductVersion, &config.product_version),
            (MetadataKind::Copyright, &config.copyright),
        ];
        for (kind, value) in candidates {
            if !value.is_empty() {
                records.push(MetadataRecord {
                    kind,
                    value: value.clone(),
                });
            }
        }
    }
    records
}

/// Serialize the synthesized program plus metadata into the launcher file.
/// Returns the path written. Emission failures abort without cleaning up a
/// partial output file.
pub fn emit(
    config: &LaunchConfig,
    program: &SynthesizedProgram,
    resources: Vec<EmbeddedResource>,
) -> Result<PathBuf> {
    let image = LauncherImage {
        subsystem: subsystem_for(config.target)?,
        machine: config.machine,
        platform: config.platform,
        apartment: apartment_for(config.target, config.threading),
        metadata: metadata_records(config),
        icon: config.icon.clone(),
        resources: resources
            .into_iter()
            .map(|r| ResourceEntry {
                name: r.name,
                data: r.data,
            })
            .collect(),
        static_init: program
            .static_init
            .as_deref()
            .map(lower)
            .unwrap_or_default(),
        entry: lower(&program.entry),
        resolver: program.resolver.as_deref().map(lower).unwrap_or_default(),
    };

    let path = config.exe_path();
    image.write_to_file(&path)?;
    info!(output = %path.display(), "saved launcher");
    Ok(path)
}
