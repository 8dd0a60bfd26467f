// AST (Abstract Syntax Tree) definitions for Fux source files

use std::fmt;

/// Source region covered by a token or node (1-based lines and columns, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub first_line: usize,
    pub last_line: usize,
    pub first_col: usize,
    pub last_col: usize,
}

impl Position {
    pub fn new(first_line: usize, last_line: usize, first_col: usize, last_col: usize) -> Self {
        Position {
            first_line,
            last_line,
            first_col,
            last_col,
        }
    }

    /// A region on a single line.
    pub fn line(line: usize, first_col: usize, last_col: usize) -> Self {
        Position::new(line, line, first_col, last_col)
    }

    /// Smallest region covering both `self` and `other`.
    pub fn to(self, other: Position) -> Position {
        let (first_line, first_col) =
            (self.first_line, self.first_col).min((other.first_line, other.first_col));
        let (last_line, last_col) =
            (self.last_line, self.last_col).max((other.last_line, other.last_col));
        Position::new(first_line, last_line, first_col, last_col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first_line, self.first_col)
    }
}

/// Kinds of data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Custom, // user defined, named by `FuxType::name`
    Void,
    Bool,
    I8,
    U8,
    C8,
    I16,
    U16,
    C16,
    I32,
    U32,
    F32,
    I64,
    U64,
    F64,
    Str,
    Var,
    Auto,   // no type written, inferred later
    NoType, // sentinel for "no type could be parsed"
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Custom => "custom",
            TypeKind::Void => "void",
            TypeKind::Bool => "bool",
            TypeKind::I8 => "i8",
            TypeKind::U8 => "u8",
            TypeKind::C8 => "c8",
            TypeKind::I16 => "i16",
            TypeKind::U16 => "u16",
            TypeKind::C16 => "c16",
            TypeKind::I32 => "i32",
            TypeKind::U32 => "u32",
            TypeKind::F32 => "f32",
            TypeKind::I64 => "i64",
            TypeKind::U64 => "u64",
            TypeKind::F64 => "f64",
            TypeKind::Str => "str",
            TypeKind::Var => "var",
            TypeKind::Auto => "auto",
            TypeKind::NoType => "no_type",
        }
    }
}

/// Access modifiers of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Fixed,    // does not modify the enclosing object
    Final,    // constant after initialisation
    Constant, // never changes
    Safe,     // read-only from outside
    Intern,   // invisible from outside
    Public,
}

impl Access {
    pub fn name(self) -> &'static str {
        match self {
            Access::Fixed => "fixed",
            Access::Final => "final",
            Access::Constant => "constant",
            Access::Safe => "safe",
            Access::Intern => "intern",
            Access::Public => "public",
        }
    }
}

/// Pointer depth marking a reference type (`x -> i32`).
pub const REFERENCE_DEPTH: i64 = -1;

/// Type of a declaration, cast or function return value.
#[derive(Debug, Clone, PartialEq)]
pub struct FuxType {
    pub kind: TypeKind,
    /// `0` value, `n > 0` pointer depth, [`REFERENCE_DEPTH`] reference.
    pub pointer_depth: i64,
    /// Ordered, duplicate free.
    pub access: Vec<Access>,
    pub name: String,
    pub is_array: bool,
    pub array_size: Option<Box<Expr>>,
}

impl FuxType {
    pub fn new(kind: TypeKind, pointer_depth: i64) -> Self {
        FuxType {
            kind,
            pointer_depth,
            access: vec![Access::Public],
            name: String::new(),
            is_array: false,
            array_size: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_access(mut self, access: Vec<Access>) -> Self {
        self.access = Vec::new();
        for a in access {
            self.push_access(a);
        }
        self
    }

    /// Sized (`[n]`) or unsized (`[]`) array of this type.
    pub fn with_array(mut self, size: Option<Expr>) -> Self {
        self.is_array = true;
        self.array_size = size.map(Box::new);
        self
    }

    /// Add a modifier unless it is already present.
    pub fn push_access(&mut self, access: Access) {
        if !self.access.contains(&access) {
            self.access.push(access);
        }
    }

    pub fn is_reference(&self) -> bool {
        self.pointer_depth == REFERENCE_DEPTH
    }
}

impl Default for FuxType {
    fn default() -> Self {
        FuxType::new(TypeKind::NoType, 0)
    }
}

impl fmt::Display for FuxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reference() {
            f.write_str("&")?;
        }
        for _ in 0..self.pointer_depth.max(0) {
            f.write_str("*")?;
        }

        if self.kind == TypeKind::Custom {
            write!(f, "'{}'", self.name)?;
        } else {
            f.write_str(self.kind.name())?;
        }
        if self.is_array {
            f.write_str(if self.array_size.is_some() { "[n]" } else { "[]" })?;
        }

        let access: Vec<&str> = self.access.iter().map(|a| a.name()).collect();
        write!(f, " ({})", access.join(", "))
    }
}

/// Width of an integer literal, chosen by the bits its value needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F64(f64),
}

impl NumberValue {
    /// Narrowest unsigned width holding `value`; zero counts as one bit.
    pub fn from_integer(value: u64) -> Self {
        if let Ok(v) = u8::try_from(value) {
            NumberValue::U8(v)
        } else if let Ok(v) = u16::try_from(value) {
            NumberValue::U16(v)
        } else if let Ok(v) = u32::try_from(value) {
            NumberValue::U32(v)
        } else {
            NumberValue::U64(value)
        }
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::U8(v) => write!(f, "{}u8", v),
            NumberValue::U16(v) => write!(f, "{}u16", v),
            NumberValue::U32(v) => write!(f, "{}u32", v),
            NumberValue::U64(v) => write!(f, "{}u64", v),
            NumberValue::F64(v) => write!(f, "{}f64", v),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Assignment
    Assign,      // =
    ConstAssign, // ===
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowAssign,
    OrAssign,
    AndAssign,
    ShlAssign, // <|=
    ShrAssign, // |>=
    Swap,      // <>
    // Pipes
    PipeLeft,  // <<
    PipeRight, // >>
    // Logical
    LogicalOr,
    LogicalAnd,
    // Bitwise
    BitOr,
    BitXor, // ><
    BitAnd,
    BitShl, // <|
    BitShr, // |>
    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Subscript, `a[i]` or `a[]`
    Index,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Assign => "=",
            BinOp::ConstAssign => "===",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
            BinOp::ModAssign => "%=",
            BinOp::PowAssign => "^=",
            BinOp::OrAssign => "|=",
            BinOp::AndAssign => "&=",
            BinOp::ShlAssign => "<|=",
            BinOp::ShrAssign => "|>=",
            BinOp::Swap => "<>",
            BinOp::PipeLeft => "<<",
            BinOp::PipeRight => ">>",
            BinOp::LogicalOr => "||",
            BinOp::LogicalAnd => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "><",
            BinOp::BitAnd => "&",
            BinOp::BitShl => "<|",
            BinOp::BitShr => "|>",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Index => "[]",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    LogicalNot, // !x
    BitNot,     // ~x
    Exists,     // ?x
    Plus,       // +x
    Minus,      // -x
    PreInc,     // ++x
    PreDec,     // --x
    PostInc,    // x++
    PostDec,    // x--
    Addr,       // &x
    Deref,      // *x
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::LogicalNot => "!",
            UnOp::BitNot => "~",
            UnOp::Exists => "?",
            UnOp::Plus => "+",
            UnOp::Minus => "-",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
            UnOp::Addr => "&",
            UnOp::Deref => "*",
        }
    }
}

/// Built-in statements that take a comma separated argument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbuilt {
    Return,
    Exit,
    Break,
    Continue,
    Delete,
    Puts,
    Putch,
    Read,
    Readln,
    Throw,
}

impl Inbuilt {
    pub fn name(self) -> &'static str {
        match self {
            Inbuilt::Return => "return",
            Inbuilt::Exit => "exit",
            Inbuilt::Break => "break",
            Inbuilt::Continue => "continue",
            Inbuilt::Delete => "delete",
            Inbuilt::Puts => "puts",
            Inbuilt::Putch => "putch",
            Inbuilt::Read => "read",
            Inbuilt::Readln => "readln",
            Inbuilt::Throw => "throw",
        }
    }
}

/// `symbol: type [= value]`, also used for parameters and hoisted locals
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub symbol: String,
    pub ty: FuxType,
    pub value: Option<Expr>,
    pub pos: Position,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null {
        pos: Position,
    },
    Bool {
        value: bool,
        pos: Position,
    },
    Number {
        value: NumberValue,
        pos: Position,
    },
    Char {
        value: char,
        pos: Position,
    },
    String {
        value: String,
        pos: Position,
    },
    Array {
        elements: Vec<Expr>,
        pos: Position,
    },
    Variable {
        name: String,
        pos: Position,
    },
    Member {
        base: Box<Expr>,
        member: Box<Expr>,
        pos: Position,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        is_async: bool,
        pos: Position,
    },
    Range {
        begin: Box<Expr>,
        end: Option<Box<Expr>>,
        pos: Position,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        pos: Position,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Option<Box<Expr>>, // `None` only for the empty index `a[]`
        pos: Position,
    },
    TypeCast {
        ty: FuxType,
        expr: Box<Expr>,
        pos: Position,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        pos: Position,
    },
}

impl Expr {
    /// Get the source position of this expression
    pub fn pos(&self) -> Position {
        match self {
            Expr::Null { pos }
            | Expr::Bool { pos, .. }
            | Expr::Number { pos, .. }
            | Expr::Char { pos, .. }
            | Expr::String { pos, .. }
            | Expr::Array { pos, .. }
            | Expr::Variable { pos, .. }
            | Expr::Member { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Range { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Binary { pos, .. }
            | Expr::TypeCast { pos, .. }
            | Expr::Ternary { pos, .. } => *pos,
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        let pos = lhs.pos().to(rhs.pos());
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Some(Box::new(rhs)),
            pos,
        }
    }

    pub fn unary(op: UnOp, operand: Expr, pos: Position) -> Expr {
        let pos = pos.to(operand.pos());
        Expr::Unary {
            op,
            operand: Box::new(operand),
            pos,
        }
    }
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    VariableDecl(VariableDecl),
    InbuiltCall {
        callee: Inbuilt,
        args: Vec<Expr>,
        pos: Position,
    },
    IfElse {
        cond: Expr,
        then_body: Box<Stmt>,
        else_body: Option<Box<Stmt>>,
        pos: Position,
    },
    CodeBlock {
        body: Vec<Stmt>,
        pos: Position,
    },
    WhileLoop {
        cond: Expr,
        body: Box<Stmt>,
        post_condition: bool, // do { } while (cond)
        pos: Position,
    },
    ForLoop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        /// Step expression, or the iterated expression of a for-each loop.
        iter: Option<Expr>,
        body: Box<Stmt>,
        for_each: bool,
        pos: Position,
    },
    Prototype {
        ty: FuxType,
        symbol: String,
        args: Vec<VariableDecl>,
        pos: Position,
    },
    Function {
        ty: FuxType,
        symbol: String,
        args: Vec<VariableDecl>,
        /// Declarations without initialiser found anywhere in the body.
        locals: Vec<VariableDecl>,
        body: Box<Stmt>,
        pos: Position,
    },
    NoOp {
        pos: Position,
    },
}

impl Stmt {
    /// Get the source position of this statement
    pub fn pos(&self) -> Position {
        match self {
            Stmt::Expr(expr) => expr.pos(),
            Stmt::VariableDecl(decl) => decl.pos,
            Stmt::InbuiltCall { pos, .. }
            | Stmt::IfElse { pos, .. }
            | Stmt::CodeBlock { pos, .. }
            | Stmt::WhileLoop { pos, .. }
            | Stmt::ForLoop { pos, .. }
            | Stmt::Prototype { pos, .. }
            | Stmt::Function { pos, .. }
            | Stmt::NoOp { pos } => *pos,
        }
    }

    /// Statements that end without a `;`.
    pub fn is_self_terminating(&self) -> bool {
        matches!(
            self,
            Stmt::CodeBlock { .. }
                | Stmt::Function { .. }
                | Stmt::IfElse { .. }
                | Stmt::WhileLoop { .. }
                | Stmt::ForLoop { .. }
        )
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Root {
    pub body: Vec<Stmt>,
}

impl Root {
    pub fn new() -> Self {
        Root::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_width_selection() {
        assert_eq!(NumberValue::from_integer(0), NumberValue::U8(0));
        assert_eq!(NumberValue::from_integer(255), NumberValue::U8(255));
        assert_eq!(NumberValue::from_integer(256), NumberValue::U16(256));
        assert_eq!(NumberValue::from_integer(70_000), NumberValue::U32(70_000));
        assert_eq!(
            NumberValue::from_integer(u64::MAX),
            NumberValue::U64(u64::MAX)
        );
    }

    #[test]
    fn test_access_is_deduplicated() {
        let mut ty = FuxType::new(TypeKind::I32, 0);
        ty.push_access(Access::Constant);
        ty.push_access(Access::Constant);
        ty.push_access(Access::Public);
        assert_eq!(ty.access, vec![Access::Public, Access::Constant]);
    }

    #[test]
    fn test_position_merge() {
        let a = Position::line(2, 5, 7);
        let b = Position::new(3, 4, 1, 3);
        assert_eq!(a.to(b), Position::new(2, 4, 5, 3));
        assert_eq!(b.to(a), Position::new(2, 4, 5, 3));
    }

    #[test]
    fn test_type_display() {
        let ty = FuxType::new(TypeKind::U8, 2).with_array(None);
        assert_eq!(ty.to_string(), "**u8[] (public)");

        let custom = FuxType::new(TypeKind::Custom, REFERENCE_DEPTH).with_name("Point");
        assert_eq!(custom.to_string(), "&'Point' (public)");
    }
}
