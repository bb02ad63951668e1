//! End-to-end export runs against a catalog-backed host.
//!
//! Each test loads a host from TOML (standing hooks installed, cleanup run),
//! then drives `Exporter::run` and checks the final phase and progress lines.

use std::fs;

use serde_json::{Value, json};
use tdesc_export::core::types::RunPhase;
use tdesc_export::export::{ExportRun, Exporter};
use tdesc_export::host::HostRuntime;
use tdesc_export::io::catalog::parse_catalog;
use tdesc_export::io::config::{ExporterConfig, NestedNamespaces};
use tdesc_export::io::export_root::ExportRootLocator;
use tdesc_export::io::tdesc::{Serializer, TdescWriter};
use tdesc_export::test_support::{GameInstall, ScriptedSerializer};

const CATALOG: &str = r#"
[[modules]]
name = "mods.buffs"

[[modules.members]]
kind = "tuned_class"
name = "MoodBuff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members.tunables]]
field = "duration"
type = "int"
default = 5
deprecated = true
display_name = "Duration"
name = "buff_duration"

[[modules.members.tunables]]
field = "icon"
type = "resource"

[[modules.members]]
kind = "tuned_class"
name = "SadBuff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members]]
kind = "other"
name = "Helper"

[[modules.members]]
kind = "tuned_class"
name = "VanillaBuff"
manager_path = "Tuning/Buff"
type_tag = "buff"
defined_in = "buffs.buff"

[[modules]]
name = "mods.empty"

[[modules.members]]
kind = "other"
name = "helper"

[[modules.members]]
kind = "tuned_class"
name = "Borrowed"
manager_path = "Tuning/Snippet"
type_tag = "snippet"
defined_in = "snippets"
"#;

fn host() -> HostRuntime {
    let catalog = parse_catalog(CATALOG).expect("catalog");
    HostRuntime::from_catalog(&catalog).expect("host")
}

fn run<S: Serializer>(
    host: &HostRuntime,
    serializer: &S,
    install: &GameInstall,
    module: &str,
    class: &str,
) -> (ExportRun, Vec<String>) {
    let locator = ExportRootLocator::new(&install.tool_dir, &ExporterConfig::default());
    let exporter = Exporter::new(host, serializer, &locator, NestedNamespaces::Descend);
    let mut lines = Vec::new();
    let run = exporter.run(module, class, &mut lines);
    (run, lines)
}

#[test]
fn module_without_tunables_fails() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer = ScriptedSerializer::always(true);

    let (run, lines) = run(&host, &serializer, &install, "mods.empty", "");

    assert_eq!(run.phase, RunPhase::Failed);
    assert_eq!(
        lines,
        vec!["Exporting TDESC for mods.empty....", "No tunables found in mods.empty"]
    );
    assert!(serializer.calls().is_empty());
}

#[test]
fn single_tunable_class_exports_and_reports_destination() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let writer = TdescWriter::new(&host, "tdesc");

    let (run, lines) = run(&host, &writer, &install, "mods.buffs", "moodbuff");

    assert!(run.succeeded());
    assert_eq!(run.phase, RunPhase::Done);
    assert_eq!(
        lines.last().expect("line"),
        &format!(
            "Done. Files have been saved to {}.",
            install.descriptions_dir().display()
        )
    );

    let raw = fs::read_to_string(install.descriptions_dir().join("Buff/MoodBuff.tdesc"))
        .expect("read tdesc");
    let doc: Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(doc["class"], json!("MoodBuff"));
    assert_eq!(doc["tunables"][0]["attributes"]["_deprecated"], json!(true));
    assert_eq!(
        doc["tunables"][0]["attributes"]["_display_name"],
        json!("Duration")
    );
    assert_eq!(
        doc["tunables"][0]["attributes"]["name"],
        json!("buff_duration")
    );
    assert!(doc["tunables"][1].get("attributes").is_none());
}

#[test]
fn class_name_of_untagged_member_is_not_found() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer = ScriptedSerializer::always(true);

    let (run, lines) = run(&host, &serializer, &install, "mods.buffs", "helper");

    assert_eq!(run.phase, RunPhase::Failed);
    assert_eq!(lines.last().expect("line"), "Could not find class in module.");
    assert!(serializer.calls().is_empty());
}

#[test]
fn serializer_error_on_second_target_fails_whole_run() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer =
        ScriptedSerializer::new(vec![Ok(true), Err("disk quota exceeded".to_string())]);

    let (run, lines) = run(&host, &serializer, &install, "mods.buffs", "");

    assert_eq!(run.phase, RunPhase::Failed);
    assert!(!run.succeeded());
    assert_eq!(run.exported, vec!["mods.buffs.MoodBuff"]);
    assert_eq!(lines.last().expect("line"), "Error: disk quota exceeded");
    assert!(!lines.iter().any(|line| line.starts_with("Done.")));
}

#[test]
fn serializer_error_on_first_target_stops_traversal() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer = ScriptedSerializer::new(vec![Err("boom".to_string()), Ok(true)]);

    let (run, lines) = run(&host, &serializer, &install, "mods.buffs", "");

    assert_eq!(run.phase, RunPhase::Failed);
    assert!(run.exported.is_empty());
    assert_eq!(serializer.calls().len(), 1);
    assert_eq!(lines.last().expect("line"), "Error: boom");
}

#[test]
fn traversal_exports_local_classes_only() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer = ScriptedSerializer::always(true);

    let (run, _) = run(&host, &serializer, &install, "mods.buffs", "");

    assert!(run.succeeded());
    assert_eq!(run.exported, vec!["mods.buffs.MoodBuff", "mods.buffs.SadBuff"]);
}

#[test]
fn empty_module_name_never_touches_host() {
    let install = GameInstall::new().expect("install");
    let host = host();
    let serializer = ScriptedSerializer::always(true);

    let (run, lines) = run(&host, &serializer, &install, "", "");

    assert_eq!(run.phase, RunPhase::Idle);
    assert_eq!(lines[0], "Usage:");
    assert!(run.export_root.is_none());
}

#[test]
fn hooks_keep_bookkeeping_through_cleanup() {
    let host = host();
    assert!(host.hooks_installed());
    assert_eq!(host.cleanup_op().wrap_count(), 1);

    let members = tdesc_export::core::namespace::Namespaces::members(&host, "mods.buffs");
    let mood = members
        .iter()
        .find_map(|member| member.as_tuned_class())
        .expect("tuned class");
    let tunables = host.tunables_of(mood).expect("bookkeeping kept");
    assert_eq!(tunables.len(), 2);
}

const NESTED_CATALOG: &str = r#"
[[modules]]
name = "mods"

[[modules.members]]
kind = "module"
name = "a"
target = "mods.a"

[[modules.members]]
kind = "module"
name = "b"
target = "mods.b"

[[modules]]
name = "mods.a"

[[modules.members]]
kind = "tuned_class"
name = "Buff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members.tunables]]
field = "origin"
type = "str"
default = "from_a"

[[modules]]
name = "mods.b"

[[modules.members]]
kind = "tuned_class"
name = "Buff"
manager_path = "Tuning/Buff"
type_tag = "buff"

[[modules.members.tunables]]
field = "origin"
type = "str"
default = "from_b"
"#;

#[test]
fn nested_classes_sharing_a_file_name_fail_without_overwriting() {
    let install = GameInstall::new().expect("install");
    let catalog = parse_catalog(NESTED_CATALOG).expect("catalog");
    let host = HostRuntime::from_catalog(&catalog).expect("host");
    let writer = TdescWriter::new(&host, "tdesc");

    let (run, lines) = run(&host, &writer, &install, "mods", "");

    assert_eq!(run.phase, RunPhase::Failed);
    assert_eq!(run.exported, vec!["mods.a.Buff"]);
    assert!(!lines.iter().any(|line| line.starts_with("Done.")));
    assert!(
        lines
            .last()
            .expect("line")
            .starts_with("Error: mods.b.Buff would overwrite the description of mods.a.Buff")
    );

    let buff_dir = install.descriptions_dir().join("Buff");
    let files: Vec<_> = fs::read_dir(&buff_dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(files, vec!["Buff.tdesc"]);
    let doc: Value =
        serde_json::from_str(&fs::read_to_string(buff_dir.join("Buff.tdesc")).expect("read"))
            .expect("json");
    assert_eq!(doc["module"], json!("mods.a"));
    assert_eq!(doc["tunables"][0]["default"], json!("from_a"));
}
