/// Launcher instruction set
///
/// The lowered form of the synthesized launcher logic. Each routine in an
/// image is a flat sequence of these instructions; a launcher host executes
/// them in order. Protected regions are delimited by `EnterProtected` /
/// `CatchAll` / `LeaveProtected` markers rather than nested structure.

use serde::{Deserialize, Serialize};

/// A runtime-option value passed through to the scripting runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    Int(i32),
    Bool(bool),
}

/// Button set for a failure dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogButton {
    Ok,
}

/// Icon for a failure dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogIcon {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    /// Build the runtime-option table, preserving entry order.
    PushOptions { entries: Vec<(String, OptionValue)> },

    /// Begin the protected region around module load and runtime startup.
    EnterProtected,
    /// Begin the handler; runs only when the protected body failed.
    CatchAll,
    /// End the protected region.
    LeaveProtected,

    /// Remember the current working directory.
    SaveWorkingDir,
    /// Compute the absolute path of `file_name` next to the running binary.
    ResolveSiblingPath { file_name: String },
    /// Restore the working directory saved by `SaveWorkingDir`.
    RestoreWorkingDir,
    /// Load the module from the previously resolved absolute path.
    LoadModuleFromPath,
    /// Load the module from the named resource of the running binary.
    LoadModuleFromResource { name: String },

    /// Start the scripting runtime against the loaded module and capture its
    /// return value as the exit code.
    InvokeRuntime {
        main_module: String,
        honor_environment: bool,
        with_options: bool,
    },

    /// Write the rendered failure message to standard output.
    WriteConsole { template: String },
    /// Show the rendered failure message in a modal dialog; the result is
    /// discarded.
    ShowDialog {
        template: String,
        title: String,
        button: DialogButton,
        icon: DialogIcon,
    },
    /// Overwrite the captured exit code.
    SetExitCode { code: i32 },
    /// Return the captured exit code from the entry point.
    ReturnExitCode,

    /// Resolver routine: reference the running binary's image.
    LoadEntryImage,
    /// Resolver routine: build `prefix` + the simple name of the requested
    /// module identifier.
    ResourceNameFromRequest { prefix: String },
    /// Resolver routine: open the resource stream under the built name.
    OpenResourceStream,
    /// Resolver routine: read the whole stream into a buffer sized to the
    /// stream length, looping until every byte has been read.
    ReadStreamExact,
    /// Resolver routine: load the module from the in-memory buffer.
    LoadModuleFromBuffer,
    /// Resolver routine: return the loaded module to the host runtime.
    ReturnModule,

    /// Static initializer: register the resolver routine with the host
    /// runtime's module-resolution event.
    RegisterResolver,
}

/// Render a failure message the way the launcher does at run time: the
/// `{0}` placeholder in the template is replaced by the failure description.
pub fn render_message(template: &str, detail: &str) -> String {
    template.replace("{0}", detail)
}
