/// Stubforge
///
/// Generates a minimal native launcher for a precompiled script module: the
/// launcher locates or extracts the module, starts the scripting runtime
/// against it, and maps any uncaught failure to a process exit code (or an
/// error dialog for windowed targets).

pub mod config;
pub mod driver;
pub mod emit;
pub mod error;
pub mod host;
pub mod package;
pub mod synth;

pub use config::{LaunchConfig, OptionMap, OptionValue, TargetKind, ThreadingModel};
pub use driver::{BuildOutput, Builder};
pub use emit::{emit, lower};
pub use error::{BuildError, Result};
pub use host::{
    CompileMetadata, LoadedLibrary, ModuleCompiler, RuntimeHost, ScriptEngineInfo, StaticHost,
};
pub use package::{package, EmbeddedResource, ModuleSource, PackageOutput};
pub use synth::{synthesize, Op, SynthesizedProgram};
