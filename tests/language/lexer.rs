//! Integration tests for the lexer

use spewer_language::{Lexer, TokenKind};

fn kinds(line: &str) -> Vec<TokenKind> {
    Lexer::tokenize_line(line)
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn lex_assignment() {
    assert_eq!(
        kinds("total = a + 1"),
        vec![
            TokenKind::Ident("total".into()),
            TokenKind::Assign,
            TokenKind::Ident("a".into()),
            TokenKind::Plus,
            TokenKind::Int(1),
            TokenKind::Eol,
        ]
    );
}

#[test]
fn lex_function_header() {
    assert_eq!(
        kinds("fn add(a, b)"),
        vec![
            TokenKind::Fn,
            TokenKind::Ident("add".into()),
            TokenKind::LParen,
            TokenKind::Ident("a".into()),
            TokenKind::Comma,
            TokenKind::Ident("b".into()),
            TokenKind::RParen,
            TokenKind::Eol,
        ]
    );
}

#[test]
fn lex_keywords() {
    assert_eq!(
        kinds("if not done else end while return raise nil true false"),
        vec![
            TokenKind::If,
            TokenKind::Not,
            TokenKind::Ident("done".into()),
            TokenKind::Else,
            TokenKind::End,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Raise,
            TokenKind::Nil,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Eol,
        ]
    );
}

// =============================================================================
// Literals and Operators
// =============================================================================

#[test]
fn lex_numbers_and_strings() {
    assert_eq!(
        kinds("42 2.5 \"hi there\""),
        vec![
            TokenKind::Int(42),
            TokenKind::Float(2.5),
            TokenKind::String("hi there".into()),
            TokenKind::Eol,
        ]
    );
}

#[test]
fn lex_comparison_operators() {
    assert_eq!(
        kinds("== != < <= > >="),
        vec![
            TokenKind::EqEq,
            TokenKind::NotEq,
            TokenKind::Lt,
            TokenKind::Le,
            TokenKind::Gt,
            TokenKind::Ge,
            TokenKind::Eol,
        ]
    );
}

#[test]
fn lex_qualified_index_and_list() {
    assert_eq!(
        kinds("beta.items[0]"),
        vec![
            TokenKind::Ident("beta".into()),
            TokenKind::Dot,
            TokenKind::Ident("items".into()),
            TokenKind::LBracket,
            TokenKind::Int(0),
            TokenKind::RBracket,
            TokenKind::Eol,
        ]
    );
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn lex_comment_ends_line() {
    assert_eq!(
        kinds("x = 1  # the answer"),
        vec![
            TokenKind::Ident("x".into()),
            TokenKind::Assign,
            TokenKind::Int(1),
            TokenKind::Eol,
        ]
    );
}

#[test]
fn lex_blank_line_is_just_eol() {
    assert_eq!(kinds("   "), vec![TokenKind::Eol]);
    assert_eq!(kinds(""), vec![TokenKind::Eol]);
}

#[test]
fn lex_tracks_columns() {
    let tokens = Lexer::tokenize_line("    x = 10");
    let columns: Vec<u32> = tokens.iter().map(|token| token.column).collect();
    assert_eq!(columns[..3], [5, 7, 9]);
}

#[test]
fn lex_reports_bad_characters() {
    let tokens = kinds("x = @");
    assert!(matches!(tokens[2], TokenKind::Error(_)));
}
