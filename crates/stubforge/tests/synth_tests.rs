/// Tests for program synthesis and lowering

use stubforge::{
    lower, synthesize, EmbeddedResource, LaunchConfig, ModuleSource, Op, OptionValue,
    PackageOutput, TargetKind,
};
use stubforge_image::{DialogButton, DialogIcon, Instr};

fn sibling_package(file_name: &str) -> PackageOutput {
    PackageOutput {
        module: ModuleSource::Sibling {
            file_name: file_name.to_string(),
        },
        resources: Vec::new(),
    }
}

fn embedded_package(resource: &str) -> PackageOutput {
    PackageOutput {
        module: ModuleSource::Embedded {
            resource: resource.to_string(),
        },
        resources: vec![EmbeddedResource {
            name: resource.to_string(),
            data: vec![0xAB],
        }],
    }
}

fn position(instrs: &[Instr], pred: impl Fn(&Instr) -> bool) -> usize {
    instrs
        .iter()
        .position(pred)
        .expect("instruction not found in lowered stream")
}

#[test]
fn empty_option_map_emits_no_options_literal() {
    let config = LaunchConfig::new("hello");
    let program = synthesize(&config, &sibling_package("hello.dll"));

    assert!(!matches!(program.entry[0], Op::BuildOptions(_)));
    let lowered = lower(&program.entry);
    assert!(!lowered
        .iter()
        .any(|i| matches!(i, Instr::PushOptions { .. })));
    assert!(lowered.iter().any(|i| matches!(
        i,
        Instr::InvokeRuntime {
            with_options: false,
            ..
        }
    )));
}

#[test]
fn options_literal_preserves_configured_order() {
    let mut config = LaunchConfig::new("hello");
    config.options.set("Frames", OptionValue::Bool(true));
    config.options.set("Recursion", OptionValue::Int(1000));
    config.options.set("Debug", OptionValue::Bool(false));

    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    let entries = lowered
        .iter()
        .find_map(|i| match i {
            Instr::PushOptions { entries } => Some(entries.clone()),
            _ => None,
        })
        .expect("options literal missing");
    let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["Frames", "Recursion", "Debug"]);

    assert!(lowered.iter().any(|i| matches!(
        i,
        Instr::InvokeRuntime {
            with_options: true,
            ..
        }
    )));
}

#[test]
fn options_literal_comes_before_protected_region() {
    let mut config = LaunchConfig::new("hello");
    config.options.set("Frames", OptionValue::Bool(true));

    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    let options_at = position(&lowered, |i| matches!(i, Instr::PushOptions { .. }));
    let enter_at = position(&lowered, |i| matches!(i, Instr::EnterProtected));
    assert!(options_at < enter_at);
}

#[test]
fn embedded_mode_loads_module_from_resource() {
    let config = LaunchConfig::new("hello").embed(true);
    let program = synthesize(&config, &embedded_package("Mod.hello"));
    let lowered = lower(&program.entry);

    assert!(lowered
        .iter()
        .any(|i| matches!(i, Instr::LoadModuleFromResource { name } if name == "Mod.hello")));
    assert!(!lowered
        .iter()
        .any(|i| matches!(i, Instr::LoadModuleFromPath)));
    assert_eq!(program.resource_names, vec!["Mod.hello".to_string()]);
}

#[test]
fn sibling_mode_restores_directory_before_load() {
    let config = LaunchConfig::new("hello");
    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    let save_at = position(&lowered, |i| matches!(i, Instr::SaveWorkingDir));
    let resolve_at = position(&lowered, |i| matches!(i, Instr::ResolveSiblingPath { .. }));
    let restore_at = position(&lowered, |i| matches!(i, Instr::RestoreWorkingDir));
    let load_at = position(&lowered, |i| matches!(i, Instr::LoadModuleFromPath));

    assert!(save_at < resolve_at);
    assert!(resolve_at < restore_at);
    assert!(restore_at < load_at);
}

#[test]
fn sibling_mode_handles_output_names_with_separators() {
    let config = LaunchConfig::new("bin/hello");
    let program = synthesize(&config, &sibling_package("bin/hello.dll"));
    let lowered = lower(&program.entry);

    let restore_at = position(&lowered, |i| matches!(i, Instr::RestoreWorkingDir));
    let load_at = position(&lowered, |i| matches!(i, Instr::LoadModuleFromPath));
    assert!(restore_at < load_at);
    assert!(lowered
        .iter()
        .any(|i| matches!(i, Instr::ResolveSiblingPath { file_name } if file_name == "bin/hello.dll")));
}

#[test]
fn runtime_invocation_uses_fixed_main_module_and_environment() {
    let config = LaunchConfig::new("hello");
    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    assert!(lowered.iter().any(|i| matches!(
        i,
        Instr::InvokeRuntime {
            main_module,
            honor_environment: true,
            ..
        } if main_module == "__main__"
    )));
}

#[test]
fn console_failure_writes_formatted_message_and_fails_exit() {
    let mut config = LaunchConfig::new("hello").target(TargetKind::Console);
    config.error_format = "Something broke: {0}".into();

    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    let catch_at = position(&lowered, |i| matches!(i, Instr::CatchAll));
    let write_at = position(
        &lowered,
        |i| matches!(i, Instr::WriteConsole { template } if template == "Something broke: {0}"),
    );
    let fail_at = position(&lowered, |i| matches!(i, Instr::SetExitCode { code: -1 }));
    let leave_at = position(&lowered, |i| matches!(i, Instr::LeaveProtected));

    assert!(catch_at < write_at);
    assert!(write_at < fail_at);
    assert!(fail_at < leave_at);
    assert!(!lowered.iter().any(|i| matches!(i, Instr::ShowDialog { .. })));
}

#[test]
fn windowed_failure_requests_error_dialog() {
    let config = LaunchConfig::new("hello").target(TargetKind::Windowed);
    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    let dialog = lowered
        .iter()
        .find_map(|i| match i {
            Instr::ShowDialog {
                template,
                title,
                button,
                icon,
            } => Some((template.clone(), title.clone(), *button, *icon)),
            _ => None,
        })
        .expect("dialog instruction missing");

    assert_eq!(dialog.0, "Error occurred: {0}");
    assert_eq!(dialog.1, "Error");
    assert_eq!(dialog.2, DialogButton::Ok);
    assert_eq!(dialog.3, DialogIcon::Error);
    assert!(lowered
        .iter()
        .any(|i| matches!(i, Instr::SetExitCode { code: -1 })));
    assert!(!lowered
        .iter()
        .any(|i| matches!(i, Instr::WriteConsole { .. })));
}

#[test]
fn entry_returns_captured_exit_code_last() {
    let config = LaunchConfig::new("hello");
    let program = synthesize(&config, &sibling_package("hello.dll"));
    let lowered = lower(&program.entry);

    assert_eq!(lowered.last(), Some(&Instr::ReturnExitCode));
    let leave_at = position(&lowered, |i| matches!(i, Instr::LeaveProtected));
    assert_eq!(leave_at, lowered.len() - 2);
}

#[test]
fn non_standalone_has_no_resolver_or_initializer() {
    let config = LaunchConfig::new("hello");
    let program = synthesize(&config, &sibling_package("hello.dll"));

    assert!(program.resolver.is_none());
    assert!(program.static_init.is_none());
}

#[test]
fn standalone_synthesizes_resolver_and_registering_initializer() {
    let config = LaunchConfig::new("hello").standalone(true);
    let program = synthesize(&config, &embedded_package("Mod.hello"));

    let resolver = program.resolver.as_deref().expect("resolver missing");
    let lowered = lower(resolver);
    assert_eq!(
        lowered,
        vec![
            Instr::LoadEntryImage,
            Instr::ResourceNameFromRequest {
                prefix: "Dll.".into()
            },
            Instr::OpenResourceStream,
            Instr::ReadStreamExact,
            Instr::LoadModuleFromBuffer,
            Instr::ReturnModule,
        ]
    );

    let init = program.static_init.as_deref().expect("initializer missing");
    assert_eq!(lower(init), vec![Instr::RegisterResolver]);
}

#[test]
fn protected_region_wraps_acquisition_and_startup() {
    let config = LaunchConfig::new("hello").embed(true);
    let program = synthesize(&config, &embedded_package("Mod.hello"));
    let lowered = lower(&program.entry);

    let enter_at = position(&lowered, |i| matches!(i, Instr::EnterProtected));
    let load_at = position(&lowered, |i| {
        matches!(i, Instr::LoadModuleFromResource { .. })
    });
    let invoke_at = position(&lowered, |i| matches!(i, Instr::InvokeRuntime { .. }));
    let catch_at = position(&lowered, |i| matches!(i, Instr::CatchAll));

    assert!(enter_at < load_at);
    assert!(load_at < invoke_at);
    assert!(invoke_at < catch_at);
}
