//! Code-builder IR.
//!
//! A small, target-neutral tree of declarations, statements, expressions and
//! type expressions. Generators build this tree; writers print it.

use serde::{Deserialize, Serialize};

/// A sequence of top-level statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.body.push(stmt);
    }
}

/// A statement or top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement (`expr;`).
    Expr(Expr),

    /// Variable binding. `mutable` selects `let` over `const`.
    Let {
        name: String,
        ty: Option<TypeExpr>,
        init: Option<Expr>,
        mutable: bool,
    },

    /// Bare block (`{ ... }`).
    Block(Vec<Stmt>),

    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },

    While {
        test: Expr,
        body: Box<Stmt>,
    },

    /// C-style loop.
    For {
        init: Option<Box<Stmt>>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },

    /// Iteration over the values of an iterable (`for (const x of xs)`).
    ForOf {
        variable: String,
        iterable: Expr,
        body: Box<Stmt>,
    },

    Return(Option<Expr>),

    Throw(Expr),

    Break,

    Continue,

    /// Named function declaration.
    Function(Function),

    /// Line comment. Multi-line text yields one comment line per line.
    Comment(String),

    /// Module import (`import { a, b } from "m";`).
    Import {
        names: Vec<String>,
        from: String,
        type_only: bool,
    },

    /// Type alias declaration (`type Name = ...;`).
    TypeAlias {
        name: String,
        ty: TypeExpr,
        exported: bool,
        docs: Option<String>,
    },

    /// Interface declaration (`interface Name { ... }`).
    Interface {
        name: String,
        fields: Vec<Field>,
        exported: bool,
        docs: Option<String>,
    },
}

/// A function, named or anonymous.
///
/// Anonymous functions in expression position print as arrow functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub exported: bool,
    pub docs: Option<String>,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub default: Option<Expr>,
}

/// A field of an interface or object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub docs: Option<String>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),

    Ident(String),

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },

    /// Postfix increment (`x++`).
    Increment(Box<Expr>),

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Constructor call (`new Callee(args)`).
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Property access. `computed` selects `obj[prop]` over `obj.prop`.
    Member {
        object: Box<Expr>,
        property: Box<Expr>,
        computed: bool,
    },

    Array(Vec<Expr>),

    Object(Vec<ObjectEntry>),

    /// Spread element (`...expr`), valid inside arrays, objects and calls.
    Spread(Box<Expr>),

    Function(Box<Function>),

    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },

    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Type assertion (`expr as T`).
    As {
        expr: Box<Expr>,
        ty: TypeExpr,
    },
}

/// An entry in an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectEntry {
    Property(String, Expr),
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    Typeof,
}

/// A type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A named type or keyword (`User`, `string`, `unknown`).
    Named(String),
    /// A literal type (`"a"`, `1`, `true`, `null`).
    Literal(Literal),
    /// Generic instantiation (`Record<string, unknown>`).
    Generic { name: String, args: Vec<TypeExpr> },
    Array(Box<TypeExpr>),
    /// Tuple type. `rest` appends a trailing rest element; `rest_note`
    /// is printed as an inline comment before it.
    Tuple {
        elements: Vec<TypeExpr>,
        rest: Option<Box<TypeExpr>>,
        rest_note: Option<String>,
    },
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// Inline object type (`{ a: string; b?: number }`).
    Object(Vec<Field>),
}

// ============================================================================
// Builders
// ============================================================================

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn const_decl(name: impl Into<String>, init: Expr) -> Self {
        Stmt::Let {
            name: name.into(),
            ty: None,
            init: Some(init),
            mutable: false,
        }
    }

    pub fn typed_const(name: impl Into<String>, ty: TypeExpr, init: Expr) -> Self {
        Stmt::Let {
            name: name.into(),
            ty: Some(ty),
            init: Some(init),
            mutable: false,
        }
    }

    pub fn let_decl(name: impl Into<String>, init: Option<Expr>) -> Self {
        Stmt::Let {
            name: name.into(),
            ty: None,
            init,
            mutable: true,
        }
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(stmts)
    }

    pub fn if_stmt(test: Expr, consequent: Stmt, alternate: Option<Stmt>) -> Self {
        Stmt::If {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
        }
    }

    /// `if (test) { body }` without an else branch.
    pub fn when(test: Expr, body: Vec<Stmt>) -> Self {
        Self::if_stmt(test, Stmt::Block(body), None)
    }

    pub fn while_loop(test: Expr, body: Stmt) -> Self {
        Stmt::While {
            test,
            body: Box::new(body),
        }
    }

    pub fn for_loop(
        init: Option<Stmt>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Stmt,
    ) -> Self {
        Stmt::For {
            init: init.map(Box::new),
            test,
            update,
            body: Box::new(body),
        }
    }

    pub fn for_of(variable: impl Into<String>, iterable: Expr, body: Vec<Stmt>) -> Self {
        Stmt::ForOf {
            variable: variable.into(),
            iterable,
            body: Box::new(Stmt::Block(body)),
        }
    }

    pub fn return_stmt(expr: Option<Expr>) -> Self {
        Stmt::Return(expr)
    }

    pub fn throw(expr: Expr) -> Self {
        Stmt::Throw(expr)
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Stmt::Comment(text.into())
    }

    pub fn import_types(names: Vec<String>, from: impl Into<String>) -> Self {
        Stmt::Import {
            names,
            from: from.into(),
            type_only: true,
        }
    }
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn bool(b: bool) -> Self {
        Expr::Literal(Literal::Bool(b))
    }

    pub fn number(n: impl Into<f64>) -> Self {
        Expr::Literal(Literal::Number(n.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn not(expr: Expr) -> Self {
        Self::unary(UnaryOp::Not, expr)
    }

    pub fn type_of(expr: Expr) -> Self {
        Self::unary(UnaryOp::Typeof, expr)
    }

    pub fn increment(expr: Expr) -> Self {
        Expr::Increment(Box::new(expr))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn new_instance(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            callee: Box::new(callee),
            args,
        }
    }

    /// Dotted member access (`object.property`).
    pub fn member(object: Expr, property: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: Box::new(Expr::string(property)),
            computed: false,
        }
    }

    /// Computed member access (`object[property]`).
    pub fn index(object: Expr, property: Expr) -> Self {
        Expr::Member {
            object: Box::new(object),
            property: Box::new(property),
            computed: true,
        }
    }

    /// Method call shorthand (`object.method(args)`).
    pub fn method(object: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Self::member(object, method), args)
    }

    pub fn array(items: Vec<Expr>) -> Self {
        Expr::Array(items)
    }

    pub fn object(pairs: Vec<(String, Expr)>) -> Self {
        Expr::Object(
            pairs
                .into_iter()
                .map(|(k, v)| ObjectEntry::Property(k, v))
                .collect(),
        )
    }

    pub fn spread(expr: Expr) -> Self {
        Expr::Spread(Box::new(expr))
    }

    pub fn arrow(params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Expr::Function(Box::new(Function::anonymous(params, body)))
    }

    pub fn conditional(test: Expr, consequent: Expr, alternate: Expr) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn cast(expr: Expr, ty: TypeExpr) -> Self {
        Expr::As {
            expr: Box::new(expr),
            ty,
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Eq, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Ne, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::And, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(left, BinaryOp::Or, right)
    }

    /// Left-folds `exprs` with `op`. Returns `None` for an empty list.
    pub fn fold(op: BinaryOp, exprs: Vec<Expr>) -> Option<Self> {
        exprs.into_iter().reduce(|acc, e| Self::binary(acc, op, e))
    }
}

impl Function {
    pub fn new(name: impl Into<String>, params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self {
            name: name.into(),
            params,
            return_type: None,
            body,
            exported: false,
            docs: None,
        }
    }

    pub fn anonymous(params: Vec<Param>, body: Vec<Stmt>) -> Self {
        Self::new(String::new(), params, body)
    }

    pub fn returns(mut self, ty: TypeExpr) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
        }
    }

    pub fn typed(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            default: None,
        }
    }

    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }
}

impl Field {
    pub fn required(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            docs: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
            docs: None,
        }
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn unknown() -> Self {
        Self::named("unknown")
    }

    pub fn never() -> Self {
        Self::named("never")
    }

    pub fn string() -> Self {
        Self::named("string")
    }

    pub fn number() -> Self {
        Self::named("number")
    }

    pub fn boolean() -> Self {
        Self::named("boolean")
    }

    pub fn null() -> Self {
        TypeExpr::Literal(Literal::Null)
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Generic {
            name: name.into(),
            args,
        }
    }

    pub fn array(element: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(element))
    }

    /// `Record<string, value>`.
    pub fn record(value: TypeExpr) -> Self {
        Self::generic("Record", vec![Self::string(), value])
    }

    /// Union of `members`; a single member is returned unwrapped.
    pub fn union(mut members: Vec<TypeExpr>) -> Self {
        if members.len() == 1 {
            return members.remove(0);
        }
        TypeExpr::Union(members)
    }

    /// Intersection of `members`; a single member is returned unwrapped.
    pub fn intersection(mut members: Vec<TypeExpr>) -> Self {
        if members.len() == 1 {
            return members.remove(0);
        }
        TypeExpr::Intersection(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_of_one_unwraps() {
        assert_eq!(
            TypeExpr::union(vec![TypeExpr::string()]),
            TypeExpr::string()
        );
        assert!(matches!(
            TypeExpr::union(vec![TypeExpr::string(), TypeExpr::null()]),
            TypeExpr::Union(m) if m.len() == 2
        ));
    }

    #[test]
    fn fold_builds_left_associative_chain() {
        let folded = Expr::fold(
            BinaryOp::Or,
            vec![Expr::ident("a"), Expr::ident("b"), Expr::ident("c")],
        )
        .unwrap();
        match folded {
            Expr::Binary { left, right, .. } => {
                assert_eq!(*right, Expr::ident("c"));
                assert!(matches!(*left, Expr::Binary { .. }));
            }
            other => panic!("expected binary, got {other:?}"),
        }
        assert!(Expr::fold(BinaryOp::And, vec![]).is_none());
    }
}
