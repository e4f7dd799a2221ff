#![allow(dead_code)]

use vscript_symtab::Context;
use vscript_symtab::ast::Loc;
use vscript_symtab::script::{Driver, RunReport, Script};

/// Parse and run a script, expecting neither step to fail outright.
pub fn run(src: &str) -> (Script, RunReport) {
    let mut script = Script::parse(src, 0).expect("script should parse");
    let report = Driver::new()
        .run(&mut script)
        .expect("script should run to completion");
    (script, report)
}

/// Rendered diagnostics of a run, in the order they were reported.
pub fn messages(script: &Script, report: &RunReport) -> Vec<String> {
    report
        .diagnostics
        .iter()
        .map(|err| err.message(&script.ast.symbols))
        .collect()
}

/// A context with its global scope already open.
pub fn global() -> Context {
    let mut cx = Context::new();
    cx.push().expect("global scope");
    cx
}

pub fn line(n: u32) -> Loc {
    Loc::at(n, 1)
}
