//! Abstract syntax tree for the spewer language.
//!
//! Every statement remembers its source line; the interpreter reports a step
//! event for each statement it is about to execute.

use spewer_foundation::Value;

/// A parsed module: function definitions plus top-level statements.
#[derive(Clone, Debug, Default)]
pub struct ModuleAst {
    /// Function definitions, in source order.
    pub functions: Vec<FunctionDef>,
    /// Top-level statements, in source order.
    pub body: Vec<Stmt>,
    /// Number of lines in the source.
    pub line_count: u32,
}

/// A function definition.
#[derive(Clone, Debug)]
pub struct FunctionDef {
    /// Function name.
    pub name: String,
    /// Parameter names.
    pub params: Vec<String>,
    /// Function body.
    pub body: Vec<Stmt>,
    /// Line of the `fn` header.
    pub line: u32,
    /// Line of the closing `end`.
    pub end_line: u32,
}

/// A statement with its source line.
#[derive(Clone, Debug)]
pub struct Stmt {
    /// 1-based source line.
    pub line: u32,
    /// What the statement does.
    pub kind: StmtKind,
}

/// Statement forms.
#[derive(Clone, Debug)]
pub enum StmtKind {
    /// `name = expr`
    Assign {
        /// Target name.
        name: String,
        /// Assigned value.
        value: Expr,
    },
    /// `return [expr]`
    Return(Option<Expr>),
    /// `raise Kind(expr)`
    Raise {
        /// Exception kind name.
        kind: String,
        /// Exception payload.
        value: Option<Expr>,
    },
    /// `if cond` ... [`else` ...] `end`
    If {
        /// Condition.
        cond: Expr,
        /// Statements run when the condition is truthy.
        then_body: Vec<Stmt>,
        /// Statements run otherwise.
        else_body: Vec<Stmt>,
    },
    /// `while cond` ... `end`
    While {
        /// Loop condition.
        cond: Expr,
        /// Loop body.
        body: Vec<Stmt>,
    },
    /// A bare expression, usually a call.
    Expr(Expr),
}

/// Expression forms.
#[derive(Clone, Debug)]
pub enum Expr {
    /// A literal value.
    Literal(Value),
    /// A name reference.
    Name(String),
    /// `module.name`
    Qualified {
        /// Module name.
        module: String,
        /// Global name within the module.
        name: String,
    },
    /// `[a, b, c]`
    List(Vec<Expr>),
    /// `callee(args, key=value)`
    Call {
        /// The function expression.
        callee: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Keyword arguments, in source order.
        kwargs: Vec<(String, Expr)>,
    },
    /// `target[index]`
    Index {
        /// The indexed list or string.
        target: Box<Expr>,
        /// The index expression.
        index: Box<Expr>,
    },
    /// `lhs op rhs`
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// `op operand`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `not`
    Not,
}
