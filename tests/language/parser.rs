//! Integration tests for the parser

use spewer_foundation::{ErrorKind, Value};
use spewer_language::{BinaryOp, Expr, StmtKind, UnaryOp, parse_module};

fn parse_error(source: &str) -> (String, u32) {
    match parse_module(source).unwrap_err().kind {
        ErrorKind::Parse { message, line, .. } => (message, line),
        other => panic!("expected parse error, got {other:?}"),
    }
}

// =============================================================================
// Module Structure
// =============================================================================

#[test]
fn parse_functions_and_top_level() {
    let module = parse_module(
        "# demo\nfn add(a, b)\n    x = a + b\n    return x\nend\n\ntotal = add(5, b=3)\n",
    )
    .unwrap();

    assert_eq!(module.line_count, 7);
    assert_eq!(module.functions.len(), 1);
    let add = &module.functions[0];
    assert_eq!(add.name, "add");
    assert_eq!(add.params, vec!["a", "b"]);
    assert_eq!((add.line, add.end_line), (2, 5));
    let lines: Vec<u32> = add.body.iter().map(|stmt| stmt.line).collect();
    assert_eq!(lines, vec![3, 4]);

    assert_eq!(module.body.len(), 1);
    assert_eq!(module.body[0].line, 7);
}

#[test]
fn parse_empty_module() {
    let module = parse_module("").unwrap();
    assert!(module.functions.is_empty());
    assert!(module.body.is_empty());
}

#[test]
fn parse_nested_blocks_keep_lines() {
    let module = parse_module(
        "fn f(n)\n    while n > 0\n        if n % 2 == 0\n            n = n - 1\n        else\n            n = n - 2\n        end\n    end\nend\n",
    )
    .unwrap();
    let StmtKind::While { body, .. } = &module.functions[0].body[0].kind else {
        panic!("expected while");
    };
    let StmtKind::If {
        then_body,
        else_body,
        ..
    } = &body[0].kind
    else {
        panic!("expected if");
    };
    assert_eq!(body[0].line, 3);
    assert_eq!(then_body[0].line, 4);
    assert_eq!(else_body[0].line, 6);
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn parse_call_with_keywords() {
    let module = parse_module("f(1, b=2, c=3)\n").unwrap();
    let StmtKind::Expr(Expr::Call { args, kwargs, .. }) = &module.body[0].kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
    let names: Vec<&str> = kwargs.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["b", "c"]);
}

#[test]
fn parse_qualified_name() {
    let module = parse_module("x = beta.helper\n").unwrap();
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected assign");
    };
    assert!(matches!(
        value,
        Expr::Qualified { module, name } if module == "beta" && name == "helper"
    ));
}

#[test]
fn parse_unary_and_comparison() {
    let module = parse_module("x = not -a < b\n").unwrap();
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected assign");
    };
    let Expr::Unary {
        op: UnaryOp::Not,
        operand,
    } = value
    else {
        panic!("expected not");
    };
    assert!(matches!(
        operand.as_ref(),
        Expr::Binary {
            op: BinaryOp::Lt,
            ..
        }
    ));
}

#[test]
fn parse_parentheses_override_precedence() {
    let module = parse_module("x = (1 + 2) * 3\n").unwrap();
    let StmtKind::Assign { value, .. } = &module.body[0].kind else {
        panic!("expected assign");
    };
    let Expr::Binary { op, lhs, .. } = value else {
        panic!("expected binary");
    };
    assert_eq!(*op, BinaryOp::Mul);
    assert!(matches!(
        lhs.as_ref(),
        Expr::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn parse_literals() {
    let module = parse_module("x = [nil, true, 1, 2.5, \"s\"]\n").unwrap();
    let StmtKind::Assign {
        value: Expr::List(items),
        ..
    } = &module.body[0].kind
    else {
        panic!("expected list");
    };
    assert!(matches!(items[0], Expr::Literal(Value::Nil)));
    assert!(matches!(items[1], Expr::Literal(Value::Bool(true))));
    assert!(matches!(items[2], Expr::Literal(Value::Int(1))));
    assert_eq!(items.len(), 5);
}

#[test]
fn parse_bare_raise_and_return() {
    let module = parse_module("fn f()\n    return\nend\nraise Stop\n").unwrap();
    assert!(matches!(module.functions[0].body[0].kind, StmtKind::Return(None)));
    assert!(matches!(
        &module.body[0].kind,
        StmtKind::Raise { kind, value: None } if kind == "Stop"
    ));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn parse_error_missing_end() {
    let (message, line) = parse_error("fn f()\n    x = 1\n");
    assert!(message.contains("missing 'end'"));
    assert_eq!(line, 2);
}

#[test]
fn parse_error_nested_function() {
    let (message, _) = parse_error("fn f()\n    fn g()\n    end\nend\n");
    assert!(message.contains("top level"));
}

#[test]
fn parse_error_stray_else() {
    let (message, line) = parse_error("x = 1\nelse\n");
    assert!(message.contains("else"));
    assert_eq!(line, 2);
}

#[test]
fn parse_error_trailing_tokens() {
    let (_, line) = parse_error("x = 1\ny = 2 3\n");
    assert_eq!(line, 2);
}

#[test]
fn parse_error_repeated_keyword() {
    let (message, _) = parse_error("f(a=1, a=2)\n");
    assert!(message.contains("repeated"));
}
