/// Program synthesis
///
/// Builds the launcher's executable logic as typed operation sequences,
/// parameterized entirely by the launch configuration and the packaging
/// outcome. Purely computational: no I/O happens here.

use crate::config::{LaunchConfig, OptionValue, TargetKind};
use crate::package::{ModuleSource, PackageOutput, DLL_RESOURCE_PREFIX};

/// Exit code the generated program reports for any caught failure.
pub const FAILURE_EXIT_CODE: i32 = -1;
/// Title of the failure dialog shown by windowed launchers.
pub const DIALOG_TITLE: &str = "Error";

/// One logical operation of the synthesized program. Lowering to the image
/// instruction set happens in the emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Build the runtime-option container literal, preserving entry order.
    BuildOptions(Vec<(String, OptionValue)>),
    /// Protected region: run `body`; on any failure, run `handler` instead.
    Protected { body: Vec<Op>, handler: Vec<Op> },
    /// Acquire the compiled module from the named in-binary resource.
    AcquireEmbedded { resource: String },
    /// Acquire the compiled module from a sibling file: capture the working
    /// directory, resolve the absolute path, restore the directory, then
    /// load. The restore happens strictly before the load.
    AcquireSibling { file_name: String },
    /// Start the scripting runtime against the acquired module and capture
    /// its return value as the exit code.
    StartRuntime {
        main_module: String,
        honor_environment: bool,
        with_options: bool,
    },
    /// Report the caught failure on standard output.
    ReportConsole { template: String },
    /// Report the caught failure in a modal dialog.
    ReportDialog { template: String, title: String },
    /// Force the captured exit code to the failure sentinel.
    FailExit,
    /// Return the captured exit code from the entry point.
    ReturnExit,
    /// Resolver routine body: satisfy a module-resolution request from the
    /// running binary's resources under `prefix`.
    ResolveFromResources { prefix: String },
    /// Static initializer body: register the resolver routine before any
    /// entry logic runs.
    RegisterResolver,
}

/// The synthesized launcher logic: the entry routine, plus the resolver and
/// its registering static initializer when the build is standalone.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedProgram {
    pub entry: Vec<Op>,
    pub resolver: Option<Vec<Op>>,
    pub static_init: Option<Vec<Op>>,
    /// Names of the embedded resources the program references. A non-owning
    /// lookup relation: the payloads stay with the packager output.
    pub resource_names: Vec<String>,
}

/// Build the launcher program for `config` against the packaging outcome.
pub fn synthesize(config: &LaunchConfig, package: &PackageOutput) -> SynthesizedProgram {
    let with_options = !config.options.is_empty();
    let mut entry = Vec::new();

    if with_options {
        entry.push(Op::BuildOptions(config.options.entries().to_vec()));
    }

    let acquire = match &package.module {
        ModuleSource::Embedded { resource } => Op::AcquireEmbedded {
            resource: resource.clone(),
        },
        ModuleSource::Sibling { file_name } => Op::AcquireSibling {
            file_name: file_name.clone(),
        },
    };

    let body = vec![
        acquire,
        Op::StartRuntime {
            main_module: config.main_module.clone(),
            honor_environment: true,
            with_options,
        },
    ];

    let report = match config.target {
        TargetKind::Windowed => Op::ReportDialog {
            template: config.error_format.clone(),
            title: DIALOG_TITLE.to_string(),
        },
        _ => Op::ReportConsole {
            template: config.error_format.clone(),
        },
    };
    let handler = vec![report, Op::FailExit];

    entry.push(Op::Protected { body, handler });
    entry.push(Op::ReturnExit);

    let (resolver, static_init) = if config.standalone {
        let resolver = vec![Op::ResolveFromResources {
            prefix: DLL_RESOURCE_PREFIX.to_string(),
        }];
        let static_init = vec![Op::RegisterResolver];
        (Some(resolver), Some(static_init))
    } else {
        (None, None)
    };

    SynthesizedProgram {
        entry,
        resolver,
        static_init,
        resource_names: package.resources.iter().map(|r| r.name.clone()).collect(),
    }
}
