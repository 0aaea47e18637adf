//! Formula oracle table
//!
//! Every case is evaluated twice, once by walking the tree and once through
//! the compiled closures, and both results must match the expected value.

mod utils;

use octo_formula::Value;
use rstest::rstest;

fn s(text: &str) -> Value {
    Value::string(text)
}

#[rstest]
// literals
#[case("1", Value::Int(1))]
#[case("2.5", Value::Float(2.5))]
#[case("-4", Value::Int(-4))]
#[case("'it'", s("it"))]
#[case("\"it's\"", s("it's"))]
#[case("true", Value::Bool(true))]
#[case("null", Value::Null)]
#[case("unknown", Value::Unknown)]
// arithmetic and precedence
#[case("2 + 3", Value::Int(5))]
#[case("2 + 3 * 4", Value::Int(14))]
#[case("(2 + 3) * 4", Value::Int(20))]
#[case("10 - 4 - 3", Value::Int(3))]
#[case("2 ^ 3 ^ 2", Value::Float(512.0))]
#[case("2 * 3 ^ 2", Value::Float(18.0))]
#[case("-(2 + 3)", Value::Int(-5))]
#[case("-2+3", Value::Int(1))]
#[case("7 / 2", Value::Float(3.5))]
#[case("6 / 3", Value::Float(2.0))]
#[case("7 % 3", Value::Int(1))]
#[case("7 % 0", Value::Unknown)]
#[case("1.5 + 1", Value::Float(2.5))]
#[case("true + 1", Value::Unknown)]
// string concatenation
#[case("'a' + 1", s("a1"))]
#[case("1 + 'b'", s("1b"))]
#[case("'a' + 2.5", s("a2.5"))]
#[case("'a' - 1", Value::Unknown)]
// logic keeps the deciding operand
#[case("!0", Value::Bool(true))]
#[case("!1", Value::Bool(false))]
#[case("!!2", Value::Bool(true))]
#[case("2 || 3", Value::Int(2))]
#[case("0 || 3", Value::Int(3))]
#[case("0 || ''", s(""))]
#[case("null || 'x'", s("x"))]
#[case("0 && 2.5", Value::Int(0))]
#[case("1 && 2.5", Value::Float(2.5))]
#[case("unknown && 1", Value::Unknown)]
// comparison and equality
#[case("1 < 2", Value::Bool(true))]
#[case("2 <= 2", Value::Bool(true))]
#[case("3 > 4", Value::Bool(false))]
#[case("2.5 >= 2", Value::Bool(true))]
#[case("'b' > 'a'", Value::Bool(true))]
#[case("'a' < 1", Value::Unknown)]
#[case("null < 1", Value::Unknown)]
#[case("1 == 1.0", Value::Bool(true))]
#[case("1 == '1'", Value::Bool(false))]
#[case("null == null", Value::Bool(true))]
#[case("1 != 2", Value::Bool(true))]
#[case("1 < 2 == true", Value::Bool(true))]
#[case("1 + 2 < 4 && 'x'", s("x"))]
// math library
#[case("max(1, 7, 3)", Value::Int(7))]
#[case("min(2, 1.5)", Value::Float(1.5))]
#[case("max()", Value::Unknown)]
#[case("abs(-3)", Value::Int(3))]
#[case("floor(2.7)", Value::Int(2))]
#[case("ceil(2.1)", Value::Int(3))]
#[case("round(2.5)", Value::Int(3))]
#[case("sqrt(16)", Value::Float(4.0))]
#[case("clamp(150, 0, 100)", Value::Int(100))]
#[case("clamp(-5, 0, 100)", Value::Int(0))]
#[case("clamp(1, 0.0 / 0.0, 2)", Value::Unknown)]
#[case("clamp(5, 9223372036854775807, 9223372036854775806)", Value::Unknown)]
#[case("iif(0, 'a', 'b')", s("b"))]
#[case("#pi > 3", Value::Bool(true))]
#[case("#e < 3", Value::Bool(true))]
// host variables
#[case("hp", Value::Int(40))]
#[case("hp / max_hp < 0.5", Value::Bool(true))]
#[case("speed * 2", Value::Float(3.0))]
#[case("name + '!'", s("knight!"))]
#[case("nothing", Value::Null)]
#[case("missing", Value::Unknown)]
#[case("missing + 1", Value::Unknown)]
#[case("stat", Value::Int(12))]
#[case("stat + 1", Value::Int(13))]
fn test_oracle(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(utils::evaluate(text, false), expected, "tree walking '{text}'");
    assert_eq!(utils::evaluate(text, true), expected, "compiled '{text}'");
}
