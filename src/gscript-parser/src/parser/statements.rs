//! Statement parsing
//!
//! Semicolons are optional terminators: every statement form accepts but
//! does not require a trailing `;`.

use std::rc::Rc;

use nom::{
    branch::alt,
    combinator::{cut, map, opt},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use crate::ast::{DeclKind, Declarator, FunctionBody, FunctionDef, Stmt};

use super::expressions::{parse_assignment, parse_block, parse_expression, parse_params};
use super::identifiers::parse_identifier;
use super::utils::{keyword, operator, punct, STACK_RED_ZONE, STACK_SEGMENT};

fn opt_semi(input: &str) -> IResult<&str, Option<&str>> {
    opt(punct(";")).parse(input)
}

/// Parse a single statement
pub(crate) fn parse_statement(input: &str) -> IResult<&str, Stmt> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || statement(input))
}

fn statement(input: &str) -> IResult<&str, Stmt> {
    alt((
        map(parse_block, Stmt::Block),
        terminated(parse_var_decl, opt_semi),
        parse_function_decl,
        parse_if,
        parse_while,
        parse_for,
        parse_return,
        map(terminated(keyword("break"), opt_semi), |_| Stmt::Break),
        map(terminated(keyword("continue"), opt_semi), |_| Stmt::Continue),
        map(
            delimited(keyword("throw"), cut(parse_expression), opt_semi),
            Stmt::Throw,
        ),
        parse_try,
        map(punct(";"), |_| Stmt::Empty),
        map(terminated(parse_expression, opt_semi), Stmt::Expr),
    ))
    .parse(input)
}

fn parse_decl_kind(input: &str) -> IResult<&str, DeclKind> {
    alt((
        map(keyword("var"), |_| DeclKind::Var),
        map(keyword("let"), |_| DeclKind::Let),
        map(keyword("const"), |_| DeclKind::Const),
    ))
    .parse(input)
}

/// Parse `var a = 1, b` without the terminator
fn parse_var_decl(input: &str) -> IResult<&str, Stmt> {
    let declarator = map(
        (
            parse_identifier,
            opt(preceded(operator("=", "=>"), parse_assignment)),
        ),
        |(name, init)| Declarator { name, init },
    );
    map(
        (parse_decl_kind, cut(separated_list1(punct(","), declarator))),
        |(kind, decls)| Stmt::Var { kind, decls },
    )
    .parse(input)
}

/// Parse `function name(params) { body }`
fn parse_function_decl(input: &str) -> IResult<&str, Stmt> {
    map(
        (
            keyword("function"),
            parse_identifier,
            cut((parse_params, parse_block)),
        ),
        |(_, name, (params, body))| {
            Stmt::Function(Rc::new(FunctionDef {
                name: Some(name),
                params,
                body: FunctionBody::Block(body),
                is_arrow: false,
            }))
        },
    )
    .parse(input)
}

fn parse_condition(input: &str) -> IResult<&str, crate::ast::Expr> {
    delimited(punct("("), parse_expression, punct(")")).parse(input)
}

fn parse_if(input: &str) -> IResult<&str, Stmt> {
    map(
        preceded(
            keyword("if"),
            cut((
                parse_condition,
                parse_statement,
                opt(preceded(keyword("else"), parse_statement)),
            )),
        ),
        |(condition, then_branch, else_branch)| Stmt::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        },
    )
    .parse(input)
}

fn parse_while(input: &str) -> IResult<&str, Stmt> {
    map(
        preceded(keyword("while"), cut((parse_condition, parse_statement))),
        |(condition, body)| Stmt::While {
            condition,
            body: Box::new(body),
        },
    )
    .parse(input)
}

fn parse_for(input: &str) -> IResult<&str, Stmt> {
    let for_of = map(
        (
            opt(parse_decl_kind),
            parse_identifier,
            keyword("of"),
            cut((parse_expression, punct(")"), parse_statement)),
        ),
        |(kind, binding, _, (iterable, _, body))| Stmt::ForOf {
            kind,
            binding,
            iterable,
            body: Box::new(body),
        },
    );

    let c_style = map(
        (
            opt(alt((parse_var_decl, map(parse_expression, Stmt::Expr)))),
            punct(";"),
            opt(parse_expression),
            punct(";"),
            opt(parse_expression),
            punct(")"),
            cut(parse_statement),
        ),
        |(init, _, condition, _, update, _, body)| Stmt::For {
            init: init.map(Box::new),
            condition,
            update,
            body: Box::new(body),
        },
    );

    preceded(
        (keyword("for"), cut(punct("("))),
        cut(alt((for_of, c_style))),
    )
    .parse(input)
}

fn parse_return(input: &str) -> IResult<&str, Stmt> {
    map(
        delimited(keyword("return"), opt(parse_expression), opt_semi),
        Stmt::Return,
    )
    .parse(input)
}

fn parse_try(input: &str) -> IResult<&str, Stmt> {
    let (rest, _) = keyword("try")(input)?;
    let (rest, block) = cut(parse_block).parse(rest)?;
    let (rest, catch) = opt(preceded(
        keyword("catch"),
        cut((
            opt(delimited(punct("("), parse_identifier, punct(")"))),
            parse_block,
        )),
    ))
    .parse(rest)?;
    let (rest, finalizer) = opt(preceded(keyword("finally"), cut(parse_block))).parse(rest)?;

    if catch.is_none() && finalizer.is_none() {
        return Err(nom::Err::Failure(nom::error::Error::new(
            rest,
            nom::error::ErrorKind::Alt,
        )));
    }

    let (catch_param, handler) = match catch {
        Some((param, handler)) => (param, Some(handler)),
        None => (None, None),
    };
    Ok((
        rest,
        Stmt::Try {
            block,
            catch_param,
            handler,
            finalizer,
        },
    ))
}
