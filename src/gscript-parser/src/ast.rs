//! Abstract Syntax Tree (AST) definitions for graphscript
//!
//! This module defines the AST nodes produced by the parser and walked by
//! the interpreter. Function definitions are reference counted so closures
//! can hold on to their body without copying it.

use std::fmt;
use std::rc::Rc;

/// A complete script: a sequence of top-level statements
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Program {
    /// Top-level statements in source order
    pub body: Vec<Stmt>,
}

/// Declaration keyword of a variable statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DeclKind {
    /// `var`, function scoped
    Var,
    /// `let`, block scoped
    Let,
    /// `const`, block scoped and not reassignable
    Const,
}

/// One `name = init` entry of a variable statement
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Declarator {
    /// Bound name
    pub name: String,
    /// Initializer, if any
    pub init: Option<Expr>,
}

/// A function literal, declaration or arrow function
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FunctionDef {
    /// Function name (declarations and named function expressions)
    pub name: Option<String>,
    /// Parameter names
    pub params: Vec<String>,
    /// Function body
    pub body: FunctionBody,
    /// Arrow functions do not bind `this` or `arguments`
    pub is_arrow: bool,
}

/// Body of a function
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum FunctionBody {
    /// Statement block
    Block(Vec<Stmt>),
    /// Concise arrow body, returned implicitly
    Expr(Box<Expr>),
}

/// Statements
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Stmt {
    /// `var`/`let`/`const` declarations
    Var {
        /// Declaration keyword
        kind: DeclKind,
        /// Declared names
        decls: Vec<Declarator>,
    },

    /// Function declaration (hoisted)
    Function(Rc<FunctionDef>),

    /// Expression statement
    Expr(Expr),

    /// Block statement
    Block(Vec<Stmt>),

    /// `if (condition) then_branch else else_branch`
    If {
        /// Condition
        condition: Expr,
        /// Statement run when the condition is truthy
        then_branch: Box<Stmt>,
        /// Optional `else` statement
        else_branch: Option<Box<Stmt>>,
    },

    /// `while (condition) body`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Box<Stmt>,
    },

    /// C-style `for (init; condition; update) body`
    For {
        /// Initializer statement
        init: Option<Box<Stmt>>,
        /// Loop condition; absent means forever
        condition: Option<Expr>,
        /// Update expression run after each iteration
        update: Option<Expr>,
        /// Loop body
        body: Box<Stmt>,
    },

    /// `for (binding of iterable) body`
    ForOf {
        /// Declaration keyword, if the binding is declared in the loop head
        kind: Option<DeclKind>,
        /// Loop variable
        binding: String,
        /// Iterated expression
        iterable: Expr,
        /// Loop body
        body: Box<Stmt>,
    },

    /// `return expr`
    Return(Option<Expr>),

    /// `break`
    Break,

    /// `continue`
    Continue,

    /// `throw expr`
    Throw(Expr),

    /// `try { } catch (param) { } finally { }`
    Try {
        /// Protected block
        block: Vec<Stmt>,
        /// Catch binding name
        catch_param: Option<String>,
        /// Catch block
        handler: Option<Vec<Stmt>>,
        /// Finally block
        finalizer: Option<Vec<Stmt>>,
    },

    /// Lone `;`
    Empty,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Expr {
    /// Literal value
    Literal(Literal),

    /// Variable reference
    Identifier(String),

    /// `this`
    This,

    /// Array literal
    Array(Vec<Expr>),

    /// Object literal, keys in source order
    Object(Vec<(String, Expr)>),

    /// Function expression or arrow function
    Function(Rc<FunctionDef>),

    /// Unary operation (op operand)
    Unary {
        /// Operator
        op: UnaryOperator,
        /// Operand
        operand: Box<Expr>,
    },

    /// `++`/`--`, prefix or postfix
    Update {
        /// Increment or decrement
        op: UpdateOperator,
        /// Whether the operator precedes the target
        prefix: bool,
        /// Assigned target
        target: Box<Expr>,
    },

    /// Binary operation (left op right)
    Binary {
        /// Left operand
        left: Box<Expr>,
        /// Operator
        op: BinaryOperator,
        /// Right operand
        right: Box<Expr>,
    },

    /// Short-circuiting `&&` / `||`
    Logical {
        /// Left operand
        left: Box<Expr>,
        /// Operator
        op: LogicalOperator,
        /// Right operand, evaluated only when needed
        right: Box<Expr>,
    },

    /// `condition ? consequent : alternate`
    Conditional {
        /// Condition
        condition: Box<Expr>,
        /// Value when truthy
        consequent: Box<Expr>,
        /// Value when falsy
        alternate: Box<Expr>,
    },

    /// Assignment (target op value)
    Assignment {
        /// Assignment operator
        op: AssignmentOperator,
        /// Identifier, member or index target
        target: Box<Expr>,
        /// Assigned value
        value: Box<Expr>,
    },

    /// `object.property`
    Member {
        /// Receiver
        object: Box<Expr>,
        /// Property name
        property: String,
    },

    /// `object[index]`
    Index {
        /// Receiver
        object: Box<Expr>,
        /// Computed key
        index: Box<Expr>,
    },

    /// `callee(args...)`
    Call {
        /// Called expression
        callee: Box<Expr>,
        /// Arguments
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Whether the expression may appear on the left of an assignment
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expr::Identifier(_) | Expr::Member { .. } | Expr::Index { .. }
        )
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Literal {
    /// `null` or `undefined`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Literal with a fraction or exponent, or too large for an integer
    Float(f64),
    /// String literal
    String(String),
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
    /// `typeof`
    TypeOf,
}

/// Increment / decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum UpdateOperator {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNe,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// Short-circuit operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LogicalOperator {
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
}

impl AssignmentOperator {
    /// Binary operator applied by a compound assignment
    #[must_use]
    pub fn binary(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignmentOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignmentOperator::DivAssign => Some(BinaryOperator::Div),
            AssignmentOperator::ModAssign => Some(BinaryOperator::Mod),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::StrictEq => "===",
            BinaryOperator::StrictNe => "!==",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        };
        write!(f, "{}", op)
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Neg => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::TypeOf => "typeof",
        };
        write!(f, "{}", op)
    }
}
