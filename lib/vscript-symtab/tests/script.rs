mod common;

use std::io::Write;

use common::{messages, run};
use tempfile::NamedTempFile;
use vscript_symtab::location::{Location, MAX_GLOBAL_VAR};
use vscript_symtab::script::{Driver, Script, ScriptError};

const PROGRAM: &str = r#"
# runtime entry points
extern fn print($)
extern fn join(@, $) -> $

fn max($, $) -> $
var @items
label start

{
    var $total
    ref $total
    ref @items
    call join(@, $)
    temp
    temp
    release 2
    temp
}

call max($, $)
call print($)
slot
"#;

fn script_file(src: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(src.as_bytes()).unwrap();
    file
}

#[test]
fn loads_and_runs_a_script_from_disk() {
    let file = script_file(PROGRAM);
    let mut script = Script::load(file.path()).unwrap();
    let report = Driver::new().run(&mut script).unwrap();

    assert!(report.is_clean(), "{:?}", messages(&script, &report));
    assert_eq!(report.context.extension_library().len(), 2);
    assert_eq!(report.context.depth(), 1);

    let slots: Vec<_> = report.allocations.iter().map(|a| a.location).collect();
    assert_eq!(
        slots,
        vec![Location(1), Location(2), Location(2), Location(MAX_GLOBAL_VAR - 1)]
    );
}

#[test]
fn collects_every_diagnostic() {
    let (script, report) = run("call f()\nvar $x\nvar $x\nref @x\nfn x()\n");
    assert_eq!(
        messages(&script, &report),
        vec![
            "Calling function f that is not defined".to_string(),
            "Can't define variable x, it is already defined as a variable. First definition at row 2 column 1".to_string(),
            "Variable x is used as array reference but has been defined as scalar".to_string(),
            "Can't define function x, a variable of the same name is already defined. First definition at row 2 column 1".to_string(),
        ]
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Script::load(dir.path().join("absent.vs")).unwrap_err();
    assert!(matches!(err, ScriptError::Io(_)));
    assert!(err.report().is_none());
}

#[test]
fn unbalanced_block_is_a_parse_error() {
    let file = script_file("{\n  var $x\n");
    let err = Script::load(file.path()).unwrap_err();
    let ScriptError::Parse { message, .. } = &err else {
        panic!("expected a parse error, got {err:?}");
    };
    assert!(message.contains("end of input"), "{message}");
    assert!(err.report().is_some());
}

#[test]
fn diagnostics_render_as_reports() {
    let (script, report) = run("var $x\nvar $x\n");
    let reports = report.diagnostics.reports(&script.ast.symbols);
    assert_eq!(reports.len(), 1);

    let mut out = Vec::new();
    reports[0]
        .write((0usize, ariadne::Source::from(script.source.as_str())), &mut out)
        .unwrap();
    let rendered = String::from_utf8_lossy(&out);
    assert!(rendered.contains("first defined here"), "{rendered}");
}
