//! Operator parsing
//!
//! One function per precedence level, lowest first. Binary levels parse a
//! first operand and fold `(operator, operand)` pairs left-associatively.

use nom::{
    branch::alt,
    combinator::{map, opt},
    multi::many0,
    IResult, Parser,
};

use crate::ast::{BinaryOperator, Expr, LogicalOperator, UnaryOperator, UpdateOperator};

use super::expressions::parse_postfix_chain;
use super::utils::{keyword, operator, STACK_RED_ZONE, STACK_SEGMENT};

fn fold_binary(first: Expr, rest: Vec<(BinaryOperator, Expr)>) -> Expr {
    rest.into_iter().fold(first, |left, (op, right)| Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

fn fold_logical(first: Expr, op: LogicalOperator, rest: Vec<Expr>) -> Expr {
    rest.into_iter().fold(first, |left, right| Expr::Logical {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

/// Parse `||` chains
pub(crate) fn parse_logical_or(input: &str) -> IResult<&str, Expr> {
    map(
        (
            parse_logical_and,
            many0(nom::sequence::preceded(operator("||", ""), parse_logical_and)),
        ),
        |(first, rest)| fold_logical(first, LogicalOperator::Or, rest),
    )
    .parse(input)
}

/// Parse `&&` chains
fn parse_logical_and(input: &str) -> IResult<&str, Expr> {
    map(
        (
            parse_equality,
            many0(nom::sequence::preceded(operator("&&", ""), parse_equality)),
        ),
        |(first, rest)| fold_logical(first, LogicalOperator::And, rest),
    )
    .parse(input)
}

/// Parse `== != === !==`
fn parse_equality(input: &str) -> IResult<&str, Expr> {
    let op = alt((
        map(operator("===", ""), |_| BinaryOperator::StrictEq),
        map(operator("!==", ""), |_| BinaryOperator::StrictNe),
        map(operator("==", ""), |_| BinaryOperator::Eq),
        map(operator("!=", ""), |_| BinaryOperator::Ne),
    ));
    map((parse_relational, many0((op, parse_relational))), |(first, rest)| {
        fold_binary(first, rest)
    })
    .parse(input)
}

/// Parse `< <= > >=`
fn parse_relational(input: &str) -> IResult<&str, Expr> {
    let op = alt((
        map(operator("<=", ""), |_| BinaryOperator::Le),
        map(operator(">=", ""), |_| BinaryOperator::Ge),
        map(operator("<", ""), |_| BinaryOperator::Lt),
        map(operator(">", ""), |_| BinaryOperator::Gt),
    ));
    map((parse_additive, many0((op, parse_additive))), |(first, rest)| {
        fold_binary(first, rest)
    })
    .parse(input)
}

/// Parse `+ -`
fn parse_additive(input: &str) -> IResult<&str, Expr> {
    let op = alt((
        map(operator("+", "+="), |_| BinaryOperator::Add),
        map(operator("-", "-="), |_| BinaryOperator::Sub),
    ));
    map(
        (parse_multiplicative, many0((op, parse_multiplicative))),
        |(first, rest)| fold_binary(first, rest),
    )
    .parse(input)
}

/// Parse `* / %`
fn parse_multiplicative(input: &str) -> IResult<&str, Expr> {
    let op = alt((
        map(operator("*", "="), |_| BinaryOperator::Mul),
        map(operator("/", "=/*"), |_| BinaryOperator::Div),
        map(operator("%", "="), |_| BinaryOperator::Mod),
    ));
    map((parse_unary, many0((op, parse_unary))), |(first, rest)| {
        fold_binary(first, rest)
    })
    .parse(input)
}

/// Parse prefix operators: `! - + typeof ++ --`
pub(crate) fn parse_unary(input: &str) -> IResult<&str, Expr> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || unary(input))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(
            (
                alt((
                    map(operator("++", ""), |_| UpdateOperator::Increment),
                    map(operator("--", ""), |_| UpdateOperator::Decrement),
                )),
                parse_unary,
            ),
            |(op, target)| Expr::Update {
                op,
                prefix: true,
                target: Box::new(target),
            },
        ),
        map(
            (
                alt((
                    map(operator("!", "="), |_| UnaryOperator::Not),
                    map(operator("-", "-="), |_| UnaryOperator::Neg),
                    map(operator("+", "+="), |_| UnaryOperator::Plus),
                    map(keyword("typeof"), |_| UnaryOperator::TypeOf),
                )),
                parse_unary,
            ),
            |(op, operand)| Expr::Unary {
                op,
                operand: Box::new(operand),
            },
        ),
        parse_postfix,
    ))
    .parse(input)
}

/// Parse postfix `++` / `--`
fn parse_postfix(input: &str) -> IResult<&str, Expr> {
    map(
        (
            parse_postfix_chain,
            opt(alt((
                map(operator("++", ""), |_| UpdateOperator::Increment),
                map(operator("--", ""), |_| UpdateOperator::Decrement),
            ))),
        ),
        |(expr, update)| match update {
            Some(op) => Expr::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            None => expr,
        },
    )
    .parse(input)
}
