//! Member access, calls and indexing against the test host

mod utils;

use octo_formula::ast::ExpressionKind;
use octo_formula::registry::OperatorForm;
use octo_formula::{Value, parse};
use rstest::rstest;
use utils::TestContext;

#[rstest]
#[case("a.x", Value::string("x"))]
#[case("a.y", Value::string("y"))]
#[case("a.x + a.y", Value::string("xy"))]
#[case("(a).x", Value::string("x"))]
#[case("a.z", Value::Unknown)]
#[case("x.y", Value::Unknown)]
#[case("a.x.y", Value::Unknown)]
#[case("F0()", Value::string("F0"))]
#[case("F1(x)", Value::string("F1"))]
#[case("F2(1, 2)", Value::string("F2"))]
#[case("F1(1, 2)", Value::Unknown)]
#[case("F(x)", Value::Unknown)]
#[case("F1(a.x)", Value::string("F1"))]
#[case("a.M0()", Value::string("M0"))]
#[case("a.M2(x, y)", Value::string("M2"))]
#[case("a.M1()", Value::Unknown)]
#[case("x.M0()", Value::Unknown)]
#[case("a[1]", Value::string("[]"))]
#[case("a[1, 2]", Value::string("[,]"))]
#[case("a[1, 2, 3]", Value::string("[,,]"))]
#[case("x[1]", Value::Unknown)]
#[case("a[1] + F1(2)", Value::string("[]F1"))]
fn test_structural_form(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(utils::evaluate(text, false), expected, "tree walking '{text}'");
    assert_eq!(utils::evaluate(text, true), expected, "compiled '{text}'");
}

#[test]
fn test_navigation_keeps_object_handles() {
    let ctx = TestContext::new();
    let tree = parse("a", true).unwrap();
    match tree.calc(&ctx, false) {
        Value::Object(handle) => assert!(handle.ptr_eq(ctx.probe())),
        other => panic!("expected the probe object, got {other:?}"),
    }
}

#[test]
fn test_as_value_controls_resolution() {
    let ctx = TestContext::new();
    for compiled in [false, true] {
        let tree = parse("stat", compiled).unwrap();
        assert!(matches!(tree.calc(&ctx, false), Value::Object(_)));
        assert_eq!(tree.calc(&ctx, true), Value::Int(12));
    }
}

#[test]
fn test_call_layout() {
    let tree = parse("a.M2(x, 1)", false).unwrap();
    assert_eq!(tree.form(), Some(OperatorForm::MethodCall));
    let operands = tree.operands();
    assert_eq!(operands.len(), 4);
    assert_eq!(operands[0].variable_name(), Some("a"));
    assert_eq!(operands[1].variable_name(), Some("M2"));
    assert_eq!(operands[2].variable_name(), Some("x"));
    assert_eq!(operands[3].as_constant(), Some(&Value::Int(1)));

    let tree = parse("F1(x)", false).unwrap();
    assert_eq!(tree.form(), Some(OperatorForm::FunctionCall));
    assert!(tree.native().is_none());
    assert!(matches!(tree.operands()[0].kind(), ExpressionKind::Variable(name) if name == "F1"));
}

#[test]
fn test_native_functions_shadow_host_functions() {
    let tree = parse("max(1, 2)", false).unwrap();
    assert!(tree.native().is_some());
    assert_eq!(tree.calc(&TestContext::new(), true), Value::Int(2));
}

#[test]
fn test_results_are_recorded_per_node() {
    let tree = parse("a.x + F1(1)", false).unwrap();
    assert_eq!(tree.calc(&TestContext::new(), true), Value::string("xF1"));
    assert_eq!(tree.last_result(), Value::string("xF1"));
    assert_eq!(tree.operands()[0].last_result(), Value::string("x"));
    assert_eq!(tree.operands()[1].last_result(), Value::string("F1"));
}
