use untext_core::PdfError;
use untext_core::codec;
use untext_core::filter::{CommandFilter, RemovalRules};
use untext_core::model::{Operand, Token};

fn op(name: &str) -> Token {
    Token::operator(name)
}

fn s(text: &str) -> Token {
    Token::from(Operand::string(text))
}

fn n(value: i64) -> Token {
    Token::from(Operand::Int(value))
}

fn filter(tokens: Vec<Token>) -> Vec<Token> {
    CommandFilter::default().filter(tokens).expect("filter")
}

#[test]
fn test_filter_removes_operands_and_operator() {
    assert_eq!(filter(vec![s("a"), s("b"), op("Tj")]), vec![]);
}

#[test]
fn test_filter_keeps_later_operands() {
    assert_eq!(
        filter(vec![s("a"), op("Tj"), s("b"), op("unknownOp")]),
        vec![s("b"), op("unknownOp")]
    );
}

#[test]
fn test_filter_non_text_passthrough() {
    let tokens = codec::lex(b"q 1 0 0 1 10 10 cm 0 0 m 100 100 l S 0 0 50 50 re f Q").unwrap();
    assert_eq!(filter(tokens.clone()), tokens);
}

#[test]
fn test_filter_missing_operand_is_structural_error() {
    let err = CommandFilter::default().filter(vec![op("Tj")]).unwrap_err();
    match err {
        PdfError::StructuralRemoval {
            operator,
            arity,
            available,
        } => {
            assert_eq!(operator.as_str(), "Tj");
            assert_eq!(arity, 1);
            assert_eq!(available, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_filter_does_not_take_operands_across_operators() {
    // `Tj` right after another operator has no operand of its own.
    let err = CommandFilter::default()
        .filter(vec![s("a"), op("Tf"), op("Tj")])
        .unwrap_err();
    assert!(matches!(err, PdfError::StructuralRemoval { available: 0, .. }));
}

#[test]
fn test_filter_is_idempotent() {
    let tokens = codec::lex(
        b"BT /F1 12 Tf 72 700 Td (Hello) Tj [(W) 120 (orld)] TJ T* (next) ' 1 2 (spaced) \" ET",
    )
    .unwrap();
    let once = filter(tokens);
    let twice = filter(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_filter_preserves_order_of_kept_tokens() {
    let tokens = codec::lex(b"BT /F1 12 Tf 72 700 Td (Hello) Tj 0 -14 Td [(x)] TJ T* ET").unwrap();
    let kept = filter(tokens);
    assert_eq!(
        kept,
        codec::lex(b"BT /F1 12 Tf 72 700 Td 0 -14 Td T* ET").unwrap()
    );
}

#[test]
fn test_filter_all_text_operators() {
    let tokens = codec::lex(b"BT (a) Tj [(b)] TJ (c) ' 1 2 (d) \" ET").unwrap();
    assert_eq!(filter(tokens), vec![op("BT"), op("ET")]);
}

#[test]
fn test_filter_double_quote_needs_three_operands() {
    let err = CommandFilter::default()
        .filter(vec![n(1), s("x"), op("\"")])
        .unwrap_err();
    assert!(matches!(
        err,
        PdfError::StructuralRemoval {
            arity: 3,
            available: 2,
            ..
        }
    ));
}

#[test]
fn test_legacy_quote_arity() {
    let filter = CommandFilter::new(RemovalRules::legacy());

    // Accepted with a single operand under the legacy table.
    assert_eq!(filter.filter(vec![s("x"), op("\"")]).unwrap(), vec![]);

    // A well-formed three-operand `"` still loses all three operands; none
    // of them end up attached to the next operator.
    let out = filter
        .filter(vec![n(1), n(2), s("x"), op("\""), op("ET")])
        .unwrap();
    assert_eq!(out, vec![op("ET")]);
}

#[test]
fn test_filter_compound_operands_are_opaque() {
    let tokens = codec::lex(b"<< /MCID 0 >> [(a) [(b)]] TJ /P << /K [1 2] >> BDC EMC").unwrap();
    assert_eq!(
        filter(tokens),
        codec::lex(b"/P << /K [1 2] >> BDC EMC").unwrap()
    );
}

#[test]
fn test_filter_inline_image_kept() {
    let tokens = codec::lex(b"BI /W 1 /H 1 ID \x00 EI (t) Tj").unwrap();
    let kept = filter(tokens.clone());
    assert_eq!(kept, tokens[..2].to_vec());
}

#[test]
fn test_custom_rules() {
    let rules = RemovalRules::empty().with("Do", 1);
    let filter = CommandFilter::new(rules);
    let tokens = codec::lex(b"q /Im0 Do Q (kept) Tj").unwrap();
    let (out, removed) = filter.filter_counted(tokens).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(out, codec::lex(b"q Q (kept) Tj").unwrap());
}

#[test]
fn test_rules_without_operator() {
    let filter = CommandFilter::new(RemovalRules::text_showing().without("TJ"));
    let tokens = codec::lex(b"[(a)] TJ (b) Tj").unwrap();
    assert_eq!(
        filter.filter(tokens).unwrap(),
        codec::lex(b"[(a)] TJ").unwrap()
    );
}

#[test]
fn test_filter_counts_removed_operators() {
    let tokens = codec::lex(b"BT (a) Tj (b) Tj [(c)] TJ ET").unwrap();
    let (_, removed) = CommandFilter::default().filter_counted(tokens).unwrap();
    assert_eq!(removed, 3);
}
