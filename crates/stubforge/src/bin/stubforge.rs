/// Stubforge CLI
///
/// Thin glue around the build pipeline: parses options into a launch
/// configuration and runs the builder against a file-list-backed runtime
/// host. Script compilation itself is the scripting runtime's job; the CLI
/// expects the already-compiled module as input.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use stubforge::{Builder, LaunchConfig, OptionMap, OptionValue, StaticHost, TargetKind, ThreadingModel};
use stubforge_image::{Machine, Platform};

#[derive(Parser, Debug)]
#[command(name = "stubforge")]
#[command(about = "Generates a native launcher stub for a precompiled script module")]
#[command(version)]
struct Args {
    /// Compiled script module (.dll) to build a launcher for
    #[arg(value_name = "MODULE")]
    module: PathBuf,

    /// Output name; defaults to the module's file stem
    #[arg(short, long)]
    output: Option<String>,

    /// Launcher target kind
    #[arg(long, value_enum, default_value = "console")]
    target: TargetArg,

    /// Embed the compiled module into the launcher
    #[arg(long)]
    embed: bool,

    /// Bundle runtime support libraries so no installed runtime is needed
    #[arg(long)]
    standalone: bool,

    /// Mark the entry point single-threaded apartment
    #[arg(long, conflicts_with = "mta")]
    sta: bool,

    /// Mark the entry point multi-threaded apartment (windowed targets only)
    #[arg(long)]
    mta: bool,

    /// Main module name passed to the runtime startup call
    #[arg(long, default_value = "__main__")]
    main: String,

    /// Runtime option, NAME=VALUE where VALUE is an integer or true/false
    #[arg(long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,

    #[arg(long, default_value = "")]
    file_version: String,

    #[arg(long, default_value = "")]
    product_name: String,

    #[arg(long, default_value = "")]
    product_version: String,

    #[arg(long, default_value = "")]
    copyright: String,

    /// Icon file embedded into the launcher
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Failure-message template; {0} is the failure description
    #[arg(long, default_value = "Error occurred: {0}")]
    error_format: String,

    /// Extra dependency file to bundle (repeatable, standalone only)
    #[arg(long = "dll", value_name = "FILE")]
    dlls: Vec<PathBuf>,

    /// Runtime support library to bundle in standalone mode (repeatable)
    #[arg(long = "runtime-lib", value_name = "FILE")]
    runtime_libs: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "x64")]
    machine: MachineArg,

    #[arg(long, value_enum, default_value = "any-cpu")]
    platform: PlatformArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TargetArg {
    Console,
    Window,
    Library,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MachineArg {
    X86,
    X64,
    Arm64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlatformArg {
    AnyCpu,
    X86,
    X64,
}

fn parse_option(raw: &str) -> anyhow::Result<(String, OptionValue)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("option '{raw}' is not NAME=VALUE"))?;
    let value = match value {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        other => OptionValue::Int(
            other
                .parse()
                .with_context(|| format!("option '{name}' value must be an integer or true/false"))?,
        ),
    };
    Ok((name.to_string(), value))
}

fn config_from_args(args: &Args) -> anyhow::Result<LaunchConfig> {
    let output = match &args.output {
        Some(output) => output.clone(),
        None => args
            .module
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("module path has no file name")?,
    };
    let output_dir = args
        .module
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = OptionMap::new();
    for raw in &args.options {
        let (name, value) = parse_option(raw)?;
        options.set(name, value);
    }

    let icon = match &args.icon {
        Some(path) => Some(
            std::fs::read(path).with_context(|| format!("cannot read icon {}", path.display()))?,
        ),
        None => None,
    };

    let mut config = LaunchConfig::new(output).output_dir(output_dir);
    config.target = match args.target {
        TargetArg::Console => TargetKind::Console,
        TargetArg::Window => TargetKind::Windowed,
        TargetArg::Library => TargetKind::Library,
    };
    config.embed = args.embed;
    config.standalone = args.standalone;
    config.threading = if args.mta {
        Some(ThreadingModel::MultiThreaded)
    } else if args.sta {
        Some(ThreadingModel::SingleThreaded)
    } else {
        None
    };
    config.options = options;
    config.file_version = args.file_version.clone();
    config.product_name = args.product_name.clone();
    config.product_version = args.product_version.clone();
    config.copyright = args.copyright.clone();
    config.icon = icon;
    config.error_format = args.error_format.clone();
    config.dlls = args.dlls.clone();
    config.machine = match args.machine {
        MachineArg::X86 => Machine::X86,
        MachineArg::X64 => Machine::X64,
        MachineArg::Arm64 => Machine::Arm64,
    };
    config.platform = match args.platform {
        PlatformArg::AnyCpu => Platform::AnyCpu,
        PlatformArg::X86 => Platform::X86,
        PlatformArg::X64 => Platform::X64,
    };
    config.main_module = args.main.clone();

    Ok(config)
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = config_from_args(&args)?;
    let host = StaticHost::from_paths(&args.runtime_libs);
    let builder = Builder::new(config)?;
    let output = builder.build(&host)?;

    match &output.launcher_path {
        Some(path) => println!("Saved to {}", path.display()),
        None => println!("Saved to {}", output.module_path.display()),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("stubforge failed: {e:#}");
        process::exit(1);
    }
}
