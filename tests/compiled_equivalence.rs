//! Compiled closures against the tree walker

mod utils;

use std::sync::Arc;
use std::thread;

use octo_formula::{CompilerConfig, FormulaEngine, Value, parse};
use utils::TestContext;

const FORMULAS: &[&str] = &[
    "2 + 3 * 4 - 1",
    "(hp + 10) / max_hp",
    "hp / max_hp < 0.5 && name || 'fallback'",
    "a.x + a.y + F1(a.x) + a.M2(1, 2) + a[1, 2]",
    "stat * speed",
    "clamp(hp * 3, 0, 100) + round(speed)",
    "iif(missing, 1, 2) ^ 2",
    "!a.z && !F(1)",
    "(((((1 + 2) * 3) - 4) / 5) % 2)",
    "-stat + -(hp)",
    "#pi * 2 > 6",
];

#[test]
fn test_compiled_matches_tree_walking() {
    let ctx = TestContext::new();
    for text in FORMULAS {
        let walked = parse(text, false).unwrap();
        let compiled = parse(text, true).unwrap();
        assert!(!walked.is_compiled());
        assert!(compiled.is_compiled(), "'{text}' should compile");
        assert_eq!(compiled.calc(&ctx, true), walked.calc(&ctx, true), "'{text}'");
        assert_eq!(compiled.calc(&ctx, false), walked.calc(&ctx, false), "'{text}' by reference");
    }
}

#[test]
fn test_compiled_evaluation_leaves_the_same_trace() {
    let ctx = TestContext::new();
    for text in FORMULAS {
        let walked = parse(text, false).unwrap();
        let compiled = parse(text, true).unwrap();
        walked.calc(&ctx, true);
        compiled.calc(&ctx, true);
        assert_eq!(compiled.dump("  ", "\n"), walked.dump("  ", "\n"), "'{text}'");
    }

    let tree = parse("2 * 3 + 1", true).unwrap();
    tree.calc(&ctx, true);
    assert_eq!(tree.dump(" ", "/"), "+ => 7/ * => 6/  2 => 2/  3 => 3/ 1 => 1/");
}

#[test]
fn test_compilation_reaches_every_evaluated_node() {
    let tree = parse("a.M2(x, F1(1)) + a[2] * -hp", true).unwrap();
    let [call, product] = tree.operands() else {
        panic!("expected a binary tree, got {tree:?}");
    };
    assert!(call.is_compiled());
    assert!(call.operands()[0].is_compiled());
    assert!(call.operands()[2..].iter().all(|arg| arg.is_compiled()));
    assert!(product.operands().iter().all(|operand| operand.is_compiled()));
}

#[test]
fn test_depth_limit_falls_back_to_walking() {
    let text = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    let tree = parse(&text, false).unwrap();
    assert!(!tree.compile_with(&CompilerConfig::default().with_max_depth(10)));
    assert!(!tree.is_compiled());
    assert_eq!(tree.calc(&TestContext::new(), true), Value::Int(1));

    let shallow = parse("(1)", false).unwrap();
    assert!(shallow.compile_with(&CompilerConfig::default().with_max_depth(10)));
}

#[test]
fn test_compiled_trees_are_shared_between_threads() {
    let tree = Arc::new(parse("hp * 2 + a[1, 2, 3]", true).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let ctx = TestContext::new();
                (0..100).map(|_| tree.calc(&ctx, true)).collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().unwrap();
        assert!(results.iter().all(|value| *value == Value::string("80[,,]")));
    }
}

#[test]
fn test_engine_cache_returns_compiled_trees() {
    let engine = FormulaEngine::new();
    let ctx = TestContext::new();
    let first = engine.parse_cached("a.x + 1").unwrap();
    assert!(first.is_compiled());
    assert_eq!(engine.calc(&first, &ctx).unwrap(), Value::string("x1"));
    assert!(Arc::ptr_eq(&first, &engine.parse_cached("a.x + 1").unwrap()));
}
