//! Fuzz-style robustness tests: arbitrary input may be rejected with an
//! error but must never panic the pipeline, and simple valid programs
//! evaluate deterministically.

use hostscript::runtime::Value;
use hostscript::{Evaluator, Parser, Scanner};
use proptest::prelude::*;

proptest! {
    #[test]
    fn scanner_never_panics(input in ".*") {
        let _ = Scanner::new(&input).scan_tokens();
    }

    #[test]
    fn parser_never_panics(input in ".*") {
        if let Ok(tokens) = Scanner::new(&input).scan_tokens() {
            let _ = Parser::new(tokens).parse();
        }
    }

    #[test]
    fn pipeline_never_panics_on_token_soup(
        input in r"[a-z0-9\+\-\*/\(\)\{\}\[\];=<>!&\|\., ]{0,60}"
    ) {
        let _ = Evaluator::new().run(&input);
    }

    #[test]
    fn integer_addition_is_deterministic(a in -1000i64..1000, b in -1000i64..1000) {
        let source = format!("({}) + ({});", a, b);
        let result = Evaluator::new().run(&source).unwrap();
        prop_assert_eq!(result, Value::Int(a + b));
    }

    #[test]
    fn variables_round_trip(n in -1_000_000i64..1_000_000) {
        let source = format!("var x = 0; x = x + ({}); x;", n);
        let result = Evaluator::new().run(&source).unwrap();
        prop_assert_eq!(result, Value::Int(n));
    }

    #[test]
    fn string_literals_round_trip(s in "[a-zA-Z0-9 ]{0,30}") {
        let source = format!("\"{}\";", s);
        let result = Evaluator::new().run(&source).unwrap();
        prop_assert_eq!(result, Value::String(s));
    }

    #[test]
    // i64::MIN is excluded: its literal has no in-range positive spelling.
    fn division_never_panics(a in (i64::MIN + 1)..i64::MAX, b in (i64::MIN + 1)..i64::MAX) {
        let source = format!("({}) / ({});", a, b);
        let result = Evaluator::new().run(&source);
        if b == 0 {
            prop_assert!(result.is_err());
        } else {
            prop_assert_eq!(result.unwrap(), Value::Int(a.wrapping_div(b)));
        }
    }
}
