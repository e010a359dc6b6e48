//! Expression parsing
//!
//! Assignment, arrow functions and the conditional operator sit above the
//! binary ladder in `operators`; member/index/call chains and primaries
//! sit below it.

use std::rc::Rc;

use nom::{
    branch::alt,
    combinator::{cut, map, opt},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::ast::{AssignmentOperator, Expr, FunctionBody, FunctionDef, Stmt};

use super::identifiers::{parse_identifier, parse_identifier_name};
use super::literals::{parse_literal, parse_property_key};
use super::operators::parse_logical_or;
use super::statements::parse_statement;
use super::utils::{keyword, operator, punct, ws, STACK_RED_ZONE, STACK_SEGMENT};

/// Parse a full expression
pub(crate) fn parse_expression(input: &str) -> IResult<&str, Expr> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || parse_assignment(input))
}

/// Parse an assignment-level expression (arrow, assignment or conditional)
pub(crate) fn parse_assignment(input: &str) -> IResult<&str, Expr> {
    alt((parse_arrow, parse_assign_or_conditional)).parse(input)
}

fn assignment_operator(input: &str) -> IResult<&str, AssignmentOperator> {
    alt((
        map(operator("=", "=>"), |_| AssignmentOperator::Assign),
        map(operator("+=", ""), |_| AssignmentOperator::AddAssign),
        map(operator("-=", ""), |_| AssignmentOperator::SubAssign),
        map(operator("*=", ""), |_| AssignmentOperator::MulAssign),
        map(operator("/=", ""), |_| AssignmentOperator::DivAssign),
        map(operator("%=", ""), |_| AssignmentOperator::ModAssign),
    ))
    .parse(input)
}

fn parse_assign_or_conditional(input: &str) -> IResult<&str, Expr> {
    let (rest, target) = parse_conditional(input)?;
    match assignment_operator(rest) {
        Ok((after, op)) => {
            if !target.is_assignable() {
                let (op_start, ()) = ws(rest)?;
                return Err(nom::Err::Failure(nom::error::Error::new(
                    op_start,
                    nom::error::ErrorKind::Verify,
                )));
            }
            let (after, value) = parse_assignment(after)?;
            Ok((
                after,
                Expr::Assignment {
                    op,
                    target: Box::new(target),
                    value: Box::new(value),
                },
            ))
        }
        Err(nom::Err::Error(_)) => Ok((rest, target)),
        Err(e) => Err(e),
    }
}

/// Parse `condition ? consequent : alternate`
fn parse_conditional(input: &str) -> IResult<&str, Expr> {
    map(
        (
            parse_logical_or,
            opt((
                preceded(punct("?"), parse_assignment),
                preceded(punct(":"), parse_assignment),
            )),
        ),
        |(condition, branches)| match branches {
            Some((consequent, alternate)) => Expr::Conditional {
                condition: Box::new(condition),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            None => condition,
        },
    )
    .parse(input)
}

/// Parse `x => body` and `(a, b) => body`
fn parse_arrow(input: &str) -> IResult<&str, Expr> {
    let (rest, params) = alt((map(parse_identifier, |p| vec![p]), parse_params)).parse(input)?;
    let (rest, _) = operator("=>", "")(rest)?;
    let (rest, body) = cut(alt((
        map(parse_block, FunctionBody::Block),
        map(parse_assignment, |e| FunctionBody::Expr(Box::new(e))),
    )))
    .parse(rest)?;
    Ok((
        rest,
        Expr::Function(Rc::new(FunctionDef {
            name: None,
            params,
            body,
            is_arrow: true,
        })),
    ))
}

/// Parse a parenthesized parameter list
pub(crate) fn parse_params(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        punct("("),
        terminated(
            separated_list0(punct(","), parse_identifier),
            opt(punct(",")),
        ),
        punct(")"),
    )
    .parse(input)
}

/// Parse `{ statements }`; once the brace is seen the block is committed
pub(crate) fn parse_block(input: &str) -> IResult<&str, Vec<Stmt>> {
    preceded(
        punct("{"),
        cut(terminated(many0(parse_statement), punct("}"))),
    )
    .parse(input)
}

/// Parse `function [name](params) { body }` in expression position
fn parse_function_expr(input: &str) -> IResult<&str, Expr> {
    map(
        preceded(
            keyword("function"),
            cut((opt(parse_identifier), parse_params, parse_block)),
        ),
        |(name, params, body)| {
            Expr::Function(Rc::new(FunctionDef {
                name,
                params,
                body: FunctionBody::Block(body),
                is_arrow: false,
            }))
        },
    )
    .parse(input)
}

enum Suffix {
    Member(String),
    Index(Expr),
    Call(Vec<Expr>),
}

/// Parse call arguments inside parentheses
fn parse_arguments(input: &str) -> IResult<&str, Vec<Expr>> {
    delimited(
        punct("("),
        terminated(
            separated_list0(punct(","), parse_assignment),
            opt(punct(",")),
        ),
        punct(")"),
    )
    .parse(input)
}

/// Parse a primary followed by any `.name`, `[expr]` and `(args)` suffixes
pub(crate) fn parse_postfix_chain(input: &str) -> IResult<&str, Expr> {
    let suffix = alt((
        map(
            preceded(operator(".", ""), parse_identifier_name),
            Suffix::Member,
        ),
        map(
            delimited(punct("["), parse_expression, punct("]")),
            Suffix::Index,
        ),
        map(parse_arguments, Suffix::Call),
    ));

    map((parse_primary, many0(suffix)), |(first, suffixes)| {
        suffixes
            .into_iter()
            .fold(first, |expr, suffix| match suffix {
                Suffix::Member(property) => Expr::Member {
                    object: Box::new(expr),
                    property,
                },
                Suffix::Index(index) => Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                },
                Suffix::Call(args) => Expr::Call {
                    callee: Box::new(expr),
                    args,
                },
            })
    })
    .parse(input)
}

/// Parse primary expressions
fn parse_primary(input: &str) -> IResult<&str, Expr> {
    alt((
        parse_literal,
        parse_function_expr,
        parse_new,
        map(keyword("this"), |_| Expr::This),
        parse_array_literal,
        parse_object_literal,
        delimited(punct("("), parse_expression, punct(")")),
        map(parse_identifier, Expr::Identifier),
    ))
    .parse(input)
}

/// Parse `new Callee(args)`; construction is an ordinary call
fn parse_new(input: &str) -> IResult<&str, Expr> {
    map(
        preceded(keyword("new"), cut((parse_primary, opt(parse_arguments)))),
        |(callee, args)| Expr::Call {
            callee: Box::new(callee),
            args: args.unwrap_or_default(),
        },
    )
    .parse(input)
}

/// Parse `[a, b, c]`
fn parse_array_literal(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            punct("["),
            terminated(
                separated_list0(punct(","), parse_assignment),
                opt(punct(",")),
            ),
            punct("]"),
        ),
        Expr::Array,
    )
    .parse(input)
}

/// Parse one object literal entry: `key: value`, `name() { }` or `name`
fn parse_object_entry(input: &str) -> IResult<&str, (String, Expr)> {
    alt((
        (parse_property_key, preceded(punct(":"), parse_assignment)),
        map(
            (parse_property_key, parse_params, parse_block),
            |(key, params, body)| {
                let function = Expr::Function(Rc::new(FunctionDef {
                    name: Some(key.clone()),
                    params,
                    body: FunctionBody::Block(body),
                    is_arrow: false,
                }));
                (key, function)
            },
        ),
        map(parse_identifier, |name| (name.clone(), Expr::Identifier(name))),
    ))
    .parse(input)
}

/// Parse `{a: 1, 'b': 2, c}`
fn parse_object_literal(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            punct("{"),
            terminated(
                separated_list0(punct(","), parse_object_entry),
                opt(punct(",")),
            ),
            punct("}"),
        ),
        Expr::Object,
    )
    .parse(input)
}
