mod common;

use common::{global, line, messages, run};
use vscript_symtab::ast::{Ast, DeclKind, DeclTag, FunctionCall, FunctionDecl, ValueKind};
use vscript_symtab::resolve::{Resolution, SignatureMatcher};
use vscript_symtab::script::Stmt;
use vscript_symtab::{Context, ExtensionLibrary, SemanticErrorKind, SemanticErrors, SymtabError};

use ValueKind::{Array, Hash, Scalar};

#[test]
fn overloads_with_distinct_parameters_coexist() {
    let (script, report) = run("fn f($)\nfn f(@)\nfn f($, %)\n");
    assert!(report.is_clean(), "{:?}", messages(&script, &report));
    assert_eq!(report.context.bindings().count(), 3);
}

#[test]
fn repeated_signature_is_rejected() {
    let (script, report) = run("fn f($, @)\nfn f($, @) -> $\n");
    assert_eq!(
        messages(&script, &report),
        vec!["Function f is defined twice with the same name and parameters. First definition at row 1 column 1"]
    );
    assert_eq!(report.context.bindings().count(), 1);
}

#[test]
fn call_records_the_matching_overload() {
    let (script, report) = run("fn f($)\nfn f(@)\ncall f(@)\n");
    assert!(report.is_clean());

    let (Stmt::Define(second), Stmt::Check(call)) = (&script.stmts[1], &script.stmts[2]) else {
        panic!("unexpected statements {:?}", script.stmts);
    };
    let DeclKind::FunctionCall(call) = &script.ast.get(*call).kind else {
        panic!("expected a call");
    };
    assert_eq!(call.func_decl, Some(*second));
}

#[test]
fn call_with_unknown_signature() {
    let (script, report) = run("fn f($)\ncall f(%)\n");
    let f = script.ast.symbols.get("f").unwrap();
    assert_eq!(
        report.diagnostics.kinds(),
        vec![&SemanticErrorKind::SignatureMismatch { name: f }]
    );
    let error = report.diagnostics.iter().next().unwrap();
    assert_eq!(error.conflict.as_ref().map(|loc| loc.line), Some(1));
}

#[test]
fn call_to_undeclared_function() {
    let (script, report) = run("call g()\n");
    assert_eq!(
        messages(&script, &report),
        vec!["Calling function g that is not defined"]
    );
}

#[test]
fn call_to_a_variable_name() {
    let (script, report) = run("var $f\ncall f($)\n");
    let f = script.ast.symbols.get("f").unwrap();
    assert_eq!(
        report.diagnostics.kinds(),
        vec![&SemanticErrorKind::NameConflict {
            name: f,
            usage: DeclTag::FunctionCall,
            existing: DeclTag::VariableDef,
        }]
    );
}

#[test]
fn function_cannot_reuse_a_global_variable_name() {
    let (script, report) = run("var @f\nfn f()\n");
    assert_eq!(
        messages(&script, &report),
        vec!["Can't define function f, a variable of the same name is already defined. First definition at row 1 column 1"]
    );
    assert_eq!(report.context.bindings().count(), 1);
}

#[test]
fn functions_bind_globally_from_nested_scopes() {
    let (script, report) = run("{\n  fn helper($)\n}\ncall helper($)\n");
    assert!(report.is_clean(), "{:?}", messages(&script, &report));
}

#[test]
fn calls_resolve_against_the_extension_library() {
    let (script, report) = run("extern fn print($)\ncall print($)\n");
    assert!(report.is_clean());
    assert_eq!(report.context.extension_library().len(), 1);
    // Extern declarations never enter a scope.
    assert_eq!(report.context.bindings().count(), 0);

    let Stmt::Check(call) = &script.stmts[1] else {
        panic!("expected a check");
    };
    let DeclKind::FunctionCall(call) = &script.ast.get(*call).kind else {
        panic!("expected a call");
    };
    let Stmt::Extern(print) = &script.stmts[0] else {
        panic!("expected an extern");
    };
    assert_eq!(call.func_decl, Some(*print));
}

#[test]
fn library_exact_match_beats_global_near_miss() {
    let (script, report) = run("extern fn f(@)\nfn f($)\ncall f(@)\n");
    assert!(report.is_clean(), "{:?}", messages(&script, &report));
}

#[test]
fn global_near_miss_is_kept_over_library_near_miss() {
    let mut ast = Ast::default();
    let mut errors = SemanticErrors::new();

    let ext = ast.function("f", &[Hash], line(1));
    let mut library = ExtensionLibrary::new();
    library.define(ast.symbols.intern("f"), ext).unwrap();

    let mut cx = Context::new().with_extension_library(library);
    cx.push().unwrap();
    let own = ast.function("f", &[Scalar], line(2));
    cx.define(&mut ast, own, &mut errors).unwrap();

    let call = ast.call("f", &[Array], line(3));
    let DeclKind::FunctionCall(probe) = ast.get(call).kind.clone() else {
        unreachable!();
    };
    let found = cx.find_function_call(&ast, &probe).unwrap();
    assert_eq!(found.resolution, Resolution::DiffSignature);
    assert_eq!(found.conflict, Some(own));
}

#[test]
fn redeclaring_a_library_signature_is_a_duplicate() {
    let (script, report) = run("extern fn print($)\nfn print($)\n");
    let print = script.ast.symbols.get("print").unwrap();
    assert_eq!(
        report.diagnostics.kinds(),
        vec![&SemanticErrorKind::DuplicateDefinition {
            name: print,
            usage: DeclTag::FunctionDecl,
            existing: DeclTag::FunctionDecl,
        }]
    );
}

#[test]
fn return_kind_does_not_overload() {
    let (_, report) = run("fn f($) -> $\nfn f($) -> @\n");
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn extension_library_is_sealed_once_a_scope_opens() {
    let mut ast = Ast::default();
    let mut cx = Context::new();
    let print = ast.function("print", &[Scalar], line(1));
    let name = ast.symbols.intern("print");
    cx.extension_library_mut().unwrap().define(name, print).unwrap();

    cx.push().unwrap();
    assert!(matches!(
        cx.extension_library_mut(),
        Err(SymtabError::InvalidState(_))
    ));
    assert_eq!(cx.extension_library().len(), 1);
}

/// Accepts any call whose arity matches.
#[derive(Debug)]
struct ArityMatcher;

impl SignatureMatcher for ArityMatcher {
    fn match_call(&self, call: &FunctionCall, decl: &FunctionDecl) -> bool {
        call.args.len() == decl.params.len()
    }

    fn match_signatures(&self, a: &FunctionDecl, b: &FunctionDecl) -> bool {
        a.params.len() == b.params.len()
    }
}

#[test]
fn matcher_is_pluggable() {
    let mut ast = Ast::default();
    let mut errors = SemanticErrors::new();
    let mut cx = Context::new().with_matcher(ArityMatcher);
    cx.push().unwrap();

    let f = ast.function("f", &[Scalar, Scalar], line(1));
    assert!(cx.define(&mut ast, f, &mut errors).unwrap());

    let call = ast.call("f", &[Array, Hash], line(2));
    let outcome = cx.is_defined(&mut ast, call, &mut errors).unwrap();
    assert!(outcome.accepted);
    assert_eq!(outcome.resolved, Some(f));

    let clash = ast.function("f", &[Hash, Hash], line(3));
    assert!(!cx.define(&mut ast, clash, &mut errors).unwrap());
    assert_eq!(errors.len(), 1);
}

#[test]
fn resolution_needs_a_global_scope() {
    let mut ast = Ast::default();
    let cx = global();
    let call = ast.call("f", &[], line(1));
    let DeclKind::FunctionCall(probe) = ast.get(call).kind.clone() else {
        unreachable!();
    };
    let found = cx.find_function_call(&ast, &probe).unwrap();
    assert_eq!(found.resolution, Resolution::NothingDecl);
    assert_eq!(found.resolved, None);
    assert_eq!(found.conflict, None);
    assert!(Context::new().find_function_call(&ast, &probe).is_err());
}
