//! Whole programs of the reverse-Polish language run through the built-in grammar.
use rpn_ll1::parsing::rpn::{self, RpnTerminal::*};
use rpn_ll1::parsing::{DerivationStep, SyntaxError, TextPoint};
use rpn_ll1::{check, Error};

fn accepts(program: &str) {
    let tokens = rpn::tokenize(program).unwrap();
    let result = rpn::parse(&tokens);
    assert!(
        result.is_success(),
        "{:?} rejected: {}",
        program,
        result.error.unwrap()
    );
}

fn rejects(program: &str) -> SyntaxError {
    let tokens = rpn::tokenize(program).unwrap();
    match rpn::parse(&tokens).error {
        Some(error) => error,
        None => panic!("{:?} accepted", program),
    }
}

#[test]
fn store_a_number() {
    let tokens = rpn::tokenize("(5 A)").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        kinds,
        vec![OpenParen, Number, Identifier, CloseParen, EndOfInput]
    );
    let lexemes: Vec<_> = tokens.iter().map(|token| token.lexeme.as_str()).collect();
    assert_eq!(lexemes, vec!["(", "5", "A", ")", ""]);
    accepts("(5 A)");
}

#[test]
fn nested_assignment() {
    accepts("((A B +) C)");
}

#[test]
fn real_and_integer_division_are_distinct() {
    let tokens = rpn::tokenize("(15.0 3.0 |)").unwrap();
    assert_eq!(tokens[3].kind, RealDivide);
    accepts("(15.0 3.0 |)");

    let tokens = rpn::tokenize("(15 3 /)").unwrap();
    assert_eq!(tokens[3].kind, IntegerDivide);
    accepts("(15 3 /)");
}

#[test]
fn missing_closing_parenthesis() {
    let error = rejects("((A B + C)");
    assert!(matches!(
        &error,
        SyntaxError::NoRule {
            nonterminal,
            found: "END_OF_INPUT",
            ..
        } if nonterminal == "AfterGroup"
    ));
    assert_eq!(
        error.position(),
        TextPoint {
            line: 1,
            column: 11,
            index: 10
        }
    );
}

#[test]
fn missing_operand() {
    // the operator shows up where a second operand is required
    let error = rejects("(A + )");
    match error {
        SyntaxError::NoRule {
            nonterminal,
            found,
            position,
            expected,
            ..
        } => {
            assert_eq!(nonterminal, "AfterIdentifier");
            assert_eq!(found, "PLUS");
            assert_eq!(position.column, 4);
            assert_eq!(expected, vec!["OPEN_PAREN", "CLOSE_PAREN", "NUMBER", "IDENTIFIER"]);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn basic_patterns() {
    for program in [
        "(5 A)",
        "(3 B)",
        "((A B +) C)",
        "((A B *) D)",
        "((B A /) F)",
    ] {
        accepts(program);
    }
}

#[test]
fn division_patterns() {
    for program in [
        "(15.0 3.0 |)",
        "(42.5 6.5 | REAL_RESULT)",
        "(15 3 /)",
        "(20 4 / INT_RESULT)",
        "(((A B |) (C D /) +) MIXED_RESULT)",
    ] {
        accepts(program);
    }
}

#[test]
fn deep_nesting() {
    for program in [
        "(((A B +)(C D *) +) H)",
        "(((X 2 ^)(Y 3 *) +) K)",
        "(((((A B +) C *) D -) E |) F /)",
        "((((((X 2.0 |) Y +) Z *) W -) V +) U)",
    ] {
        accepts(program);
    }
}

#[test]
fn control_structures() {
    for program in [
        "(IFELSE ((A B >) (C D <=) &&)(1)(0))",
        "(IFELSE ((A 10 <) (B 0 >) ||)(G)(H))",
        "(WHILE (X 5 <)(((X 1 +) X)((X 2 *) Y)))",
        "(FOR (1)(10)(2)(((P 1 +) P)((P 2 *) Q)))",
        "(FOR 1 10 I (I 2 ^))",
    ] {
        accepts(program);
    }
}

#[test]
fn arithmetic_with_storage() {
    for program in [
        "(5.5 2.5 + ARITH_STORE)",
        "(10.0 3.0 - SUB_STORE)",
        "(4.0 6.0 * MUL_STORE)",
        "(((X Y +) (A B *) |) COMPLEX_STORE)",
        "(7 2 % REST)",
    ] {
        accepts(program);
    }
}

#[test]
fn negation() {
    for program in [
        "(((A B >) !) NOT_SIMPLE)",
        "(((X 5.0 ==) !) NOT_EQUAL)",
        "((((A B >) (C D <) &&) !) COMPLEX_NOT)",
        "(((A B >) NOT) C)",
        "((A B AND) (C D OR) OR)",
    ] {
        accepts(program);
    }
}

#[test]
fn result_recall_and_several_lines() {
    accepts("(1 RES)");
    accepts("(5 3 +)\n(2 RES)\n((1 RES) 2 *)");
}

#[test]
fn invalid_programs() {
    for program in [
        "( ( A B + C )",
        "( ( A + B ) C )",
        "( ( ) C )",
        "( A B C + )",
        "( A + )",
        "()",
        "",
        "(5 A) )",
        "(A RES)",
        "(IFELSE (A B >)(1))",
    ] {
        rejects(program);
    }
}

#[test]
fn empty_input_expects_a_line() {
    let error = rejects("");
    assert_eq!(error.found(), "END_OF_INPUT");
    assert_eq!(error.position(), TextPoint::START);
}

#[test]
fn trace_ends_with_the_end_marker() {
    let steps = check("(15 3 /)").unwrap();
    let matched: Vec<_> = steps
        .iter()
        .filter_map(|step| match step {
            DerivationStep::Match { terminal, .. } => Some(*terminal),
            DerivationStep::Expand { .. } => None,
        })
        .collect();
    assert_eq!(
        matched,
        vec![OpenParen, Number, Number, IntegerDivide, CloseParen, EndOfInput]
    );

    let grammar = rpn::default_table().grammar();
    assert_eq!(steps[0].describe(grammar), "Program -> Line MoreLines");
    assert_eq!(
        steps.last().unwrap().describe(grammar),
        "match END_OF_INPUT \"\""
    );
}

#[test]
fn errors_by_stage() {
    assert!(matches!(check("(5 a)"), Err(Error::Lexical(_))));
    assert!(matches!(check("(A + )"), Err(Error::Syntax(_))));
    assert_eq!(
        check("(5 3 + a)").unwrap_err().to_string(),
        "lexical error: unrecognized character 'a' at 1:8"
    );
}
