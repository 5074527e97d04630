//! TypeScript writer for the code-builder IR.
//!
//! Emits IR as TypeScript source code. Parentheses are inserted from operator
//! precedence, so the builder never has to group expressions by hand.

use crate::ir::*;
use crate::traits::Writer;
use std::fmt::Write;

/// Static instance of the TypeScript writer.
pub static TYPESCRIPT_WRITER: TypeScriptWriterImpl = TypeScriptWriterImpl;

/// TypeScript writer implementing the Writer trait.
pub struct TypeScriptWriterImpl;

impl Writer for TypeScriptWriterImpl {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extension(&self) -> &'static str {
        "ts"
    }

    fn write(&self, program: &Program) -> String {
        TypeScriptWriter::emit(program)
    }
}

// Expression precedence levels, loosely following the ECMAScript grammar.
const PREC_SPREAD: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_OR: u8 = 4;
const PREC_AND: u8 = 5;
const PREC_EQUALITY: u8 = 9;
const PREC_RELATIONAL: u8 = 10;
const PREC_ADDITIVE: u8 = 12;
const PREC_MULTIPLICATIVE: u8 = 13;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 20;

// Type expression precedence levels.
const TYPE_UNION: u8 = 1;
const TYPE_INTERSECTION: u8 = 2;
const TYPE_PRIMARY: u8 = 4;

/// Emits IR as TypeScript source code.
pub struct TypeScriptWriter {
    output: String,
    indent: usize,
}

impl TypeScriptWriter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Emit a program to TypeScript source.
    pub fn emit(program: &Program) -> String {
        let mut writer = Self::new();
        writer.write_program(program);
        writer.output
    }

    /// Emit a single type expression.
    pub fn emit_type(ty: &TypeExpr) -> String {
        let mut writer = Self::new();
        writer.write_type(ty, 0);
        writer.output
    }

    /// Emit a single expression.
    pub fn emit_expr(expr: &Expr) -> String {
        let mut writer = Self::new();
        writer.write_expr(expr, 0);
        writer.output
    }

    fn write_program(&mut self, program: &Program) {
        for (i, stmt) in program.body.iter().enumerate() {
            if i > 0 && is_declaration(stmt) {
                self.output.push('\n');
            }
            self.write_stmt(stmt);
            self.output.push('\n');
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        match stmt {
            Stmt::Expr(expr) => {
                self.write_expr(expr, 0);
                self.output.push(';');
            }

            Stmt::Let { .. } => {
                self.write_stmt_inline(stmt);
                self.output.push(';');
            }

            Stmt::Block(stmts) => {
                self.write_braced(stmts);
            }

            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                self.output.push_str("if (");
                self.write_expr(test, 0);
                self.output.push_str(") ");
                self.write_block_stmt(consequent);
                if let Some(alt) = alternate {
                    self.output.push_str(" else ");
                    // Check if it's an else-if
                    if matches!(alt.as_ref(), Stmt::If { .. }) {
                        self.write_stmt_no_indent(alt);
                    } else {
                        self.write_block_stmt(alt);
                    }
                }
            }

            Stmt::While { test, body } => {
                self.output.push_str("while (");
                self.write_expr(test, 0);
                self.output.push_str(") ");
                self.write_block_stmt(body);
            }

            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                self.output.push_str("for (");
                if let Some(init) = init {
                    self.write_stmt_inline(init);
                }
                self.output.push_str("; ");
                if let Some(test) = test {
                    self.write_expr(test, 0);
                }
                self.output.push_str("; ");
                if let Some(update) = update {
                    self.write_expr(update, 0);
                }
                self.output.push_str(") ");
                self.write_block_stmt(body);
            }

            Stmt::ForOf {
                variable,
                iterable,
                body,
            } => {
                write!(self.output, "for (const {} of ", variable).unwrap();
                self.write_expr(iterable, 0);
                self.output.push_str(") ");
                self.write_block_stmt(body);
            }

            Stmt::Return(expr) => {
                self.output.push_str("return");
                if let Some(e) = expr {
                    self.output.push(' ');
                    self.write_expr(e, 0);
                }
                self.output.push(';');
            }

            Stmt::Throw(expr) => {
                self.output.push_str("throw ");
                self.write_expr(expr, 0);
                self.output.push(';');
            }

            Stmt::Break => {
                self.output.push_str("break;");
            }

            Stmt::Continue => {
                self.output.push_str("continue;");
            }

            Stmt::Function(f) => {
                self.write_function(f);
            }

            Stmt::Comment(text) => {
                let mut lines = text.lines().peekable();
                if lines.peek().is_none() {
                    self.output.push_str("//");
                }
                let mut first = true;
                for line in lines {
                    if !first {
                        self.output.push('\n');
                        self.write_indent();
                    }
                    first = false;
                    if line.is_empty() {
                        self.output.push_str("//");
                    } else {
                        write!(self.output, "// {}", line).unwrap();
                    }
                }
            }

            Stmt::Import {
                names,
                from,
                type_only,
            } => {
                self.output.push_str("import ");
                if *type_only {
                    self.output.push_str("type ");
                }
                write!(
                    self.output,
                    "{{ {} }} from \"{}\";",
                    names.join(", "),
                    escape_string(from)
                )
                .unwrap();
            }

            Stmt::TypeAlias {
                name,
                ty,
                exported,
                docs,
            } => {
                self.write_docs(docs.as_deref());
                if *exported {
                    self.output.push_str("export ");
                }
                write!(self.output, "type {} = ", name).unwrap();
                self.write_type(ty, 0);
                self.output.push(';');
            }

            Stmt::Interface {
                name,
                fields,
                exported,
                docs,
            } => {
                self.write_docs(docs.as_deref());
                if *exported {
                    self.output.push_str("export ");
                }
                write!(self.output, "interface {} ", name).unwrap();
                if fields.is_empty() {
                    self.output.push_str("{}");
                    return;
                }
                self.output.push_str("{\n");
                self.indent += 1;
                for field in fields {
                    self.write_indent();
                    self.write_docs(field.docs.as_deref());
                    self.write_field(field);
                    self.output.push_str(";\n");
                }
                self.indent -= 1;
                self.write_indent();
                self.output.push('}');
            }
        }
    }

    fn write_stmt_no_indent(&mut self, stmt: &Stmt) {
        // Write statement without the leading indent (for else-if chains)
        let saved_indent = self.indent;
        let mark = self.output.len();
        self.write_stmt(stmt);
        // write_stmt indented the first line; strip that prefix
        let prefix = "  ".repeat(saved_indent);
        if self.output[mark..].starts_with(&prefix) {
            self.output.replace_range(mark..mark + prefix.len(), "");
        }
    }

    fn write_stmt_inline(&mut self, stmt: &Stmt) {
        // Write statement without indent and without semicolon (for for-loop init)
        match stmt {
            Stmt::Let {
                name,
                ty,
                init,
                mutable,
            } => {
                if *mutable {
                    write!(self.output, "let {}", name).unwrap();
                } else {
                    write!(self.output, "const {}", name).unwrap();
                }
                if let Some(ty) = ty {
                    self.output.push_str(": ");
                    self.write_type(ty, 0);
                }
                if let Some(init) = init {
                    self.output.push_str(" = ");
                    self.write_expr(init, PREC_ASSIGN);
                }
            }
            Stmt::Expr(expr) => {
                self.write_expr(expr, 0);
            }
            _ => {}
        }
    }

    fn write_block_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => self.write_braced(stmts),
            _ => self.write_braced(std::slice::from_ref(stmt)),
        }
    }

    fn write_braced(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.output.push_str("{}");
            return;
        }
        self.output.push_str("{\n");
        self.indent += 1;
        for s in stmts {
            self.write_stmt(s);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.write_indent();
        self.output.push('}');
    }

    fn write_docs(&mut self, docs: Option<&str>) {
        let Some(docs) = docs else {
            return;
        };
        let lines: Vec<&str> = docs.lines().collect();
        match lines.as_slice() {
            [] => {}
            [line] => {
                writeln!(self.output, "/** {} */", line.replace("*/", "*\\/")).unwrap();
                self.write_indent();
            }
            _ => {
                self.output.push_str("/**\n");
                for line in &lines {
                    self.write_indent();
                    if line.is_empty() {
                        self.output.push_str(" *\n");
                    } else {
                        writeln!(self.output, " * {}", line.replace("*/", "*\\/")).unwrap();
                    }
                }
                self.write_indent();
                self.output.push_str(" */\n");
                self.write_indent();
            }
        }
    }

    fn write_params(&mut self, params: &[Param]) {
        self.output.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&param.name);
            if let Some(ty) = &param.ty {
                self.output.push_str(": ");
                self.write_type(ty, 0);
            }
            if let Some(default) = &param.default {
                self.output.push_str(" = ");
                self.write_expr(default, PREC_ASSIGN);
            }
        }
        self.output.push(')');
    }

    fn write_function(&mut self, f: &Function) {
        self.write_docs(f.docs.as_deref());
        if f.exported {
            self.output.push_str("export ");
        }
        write!(self.output, "function {}", f.name).unwrap();
        self.write_params(&f.params);
        if let Some(ret) = &f.return_type {
            self.output.push_str(": ");
            self.write_type(ret, 0);
        }
        self.output.push(' ');
        self.write_braced(&f.body);
    }

    fn write_arrow(&mut self, f: &Function) {
        self.write_params(&f.params);
        if let Some(ret) = &f.return_type {
            self.output.push_str(": ");
            self.write_type(ret, 0);
        }
        self.output.push_str(" => ");

        // Single return statement can be expression body
        if let [Stmt::Return(Some(expr))] = f.body.as_slice() {
            if matches!(expr, Expr::Object(_)) {
                self.output.push('(');
                self.write_expr(expr, 0);
                self.output.push(')');
            } else {
                self.write_expr(expr, PREC_ASSIGN);
            }
            return;
        }

        self.write_braced(&f.body);
    }

    fn write_expr(&mut self, expr: &Expr, min_prec: u8) {
        let prec = expr_precedence(expr);
        let wrap = prec < min_prec;
        if wrap {
            self.output.push('(');
        }
        self.write_expr_unwrapped(expr);
        if wrap {
            self.output.push(')');
        }
    }

    fn write_expr_unwrapped(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(lit) => self.write_literal(lit),

            Expr::Ident(name) => {
                self.output.push_str(name);
            }

            Expr::Binary { left, op, right } => {
                let prec = binary_precedence(*op);
                self.write_expr(left, prec);
                self.output.push(' ');
                self.output.push_str(binary_op_str(*op));
                self.output.push(' ');
                self.write_expr(right, prec + 1);
            }

            Expr::Unary { op, expr } => {
                self.output.push_str(match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                    UnaryOp::Typeof => "typeof ",
                });
                self.write_expr(expr, PREC_UNARY);
            }

            Expr::Increment(expr) => {
                self.write_expr(expr, PREC_CALL);
                self.output.push_str("++");
            }

            Expr::Call { callee, args } => {
                self.write_expr(callee, PREC_CALL);
                self.write_args(args);
            }

            Expr::New { callee, args } => {
                self.output.push_str("new ");
                self.write_expr(callee, PREC_CALL);
                self.write_args(args);
            }

            Expr::Member {
                object,
                property,
                computed,
            } => {
                self.write_expr(object, PREC_CALL);
                match property.as_ref() {
                    Expr::Literal(Literal::String(s)) if !*computed && is_valid_identifier(s) => {
                        self.output.push('.');
                        self.output.push_str(s);
                    }
                    _ => {
                        self.output.push('[');
                        self.write_expr(property, 0);
                        self.output.push(']');
                    }
                }
            }

            Expr::Array(items) => {
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_expr(item, PREC_ASSIGN);
                }
                self.output.push(']');
            }

            Expr::Object(entries) => {
                if entries.is_empty() {
                    self.output.push_str("{}");
                    return;
                }
                self.output.push_str("{ ");
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match entry {
                        ObjectEntry::Property(key, Expr::Ident(value)) if key == value => {
                            self.output.push_str(key);
                        }
                        ObjectEntry::Property(key, value) => {
                            self.write_property_key(key);
                            self.output.push_str(": ");
                            self.write_expr(value, PREC_ASSIGN);
                        }
                        ObjectEntry::Spread(value) => {
                            self.output.push_str("...");
                            self.write_expr(value, PREC_ASSIGN);
                        }
                    }
                }
                self.output.push_str(" }");
            }

            Expr::Spread(inner) => {
                self.output.push_str("...");
                self.write_expr(inner, PREC_ASSIGN);
            }

            Expr::Function(f) => {
                // Use arrow function syntax for anonymous functions
                if f.name.is_empty() {
                    self.write_arrow(f);
                } else {
                    self.write_function(f);
                }
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.write_expr(test, PREC_OR);
                self.output.push_str(" ? ");
                self.write_expr(consequent, PREC_CONDITIONAL);
                self.output.push_str(" : ");
                self.write_expr(alternate, PREC_CONDITIONAL);
            }

            Expr::Assign { target, value } => {
                self.write_expr(target, PREC_CALL);
                self.output.push_str(" = ");
                self.write_expr(value, PREC_ASSIGN);
            }

            Expr::As { expr, ty } => {
                self.write_expr(expr, PREC_RELATIONAL);
                self.output.push_str(" as ");
                self.write_type(ty, 0);
            }
        }
    }

    fn write_args(&mut self, args: &[Expr]) {
        self.output.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_expr(arg, PREC_ASSIGN);
        }
        self.output.push(')');
    }

    fn write_property_key(&mut self, key: &str) {
        if is_valid_identifier(key) {
            self.output.push_str(key);
        } else {
            write!(self.output, "\"{}\"", escape_string(key)).unwrap();
        }
    }

    fn write_literal(&mut self, lit: &Literal) {
        match lit {
            Literal::Null => self.output.push_str("null"),
            Literal::Bool(b) => write!(self.output, "{}", b).unwrap(),
            Literal::Number(n) => self.output.push_str(&format_number(*n)),
            Literal::String(s) => write!(self.output, "\"{}\"", escape_string(s)).unwrap(),
        }
    }

    fn write_field(&mut self, field: &Field) {
        self.write_property_key(&field.name);
        if field.optional {
            self.output.push('?');
        }
        self.output.push_str(": ");
        self.write_type(&field.ty, 0);
    }

    fn write_type(&mut self, ty: &TypeExpr, min_prec: u8) {
        let prec = match ty {
            TypeExpr::Union(members) if members.len() > 1 => TYPE_UNION,
            TypeExpr::Intersection(members) if members.len() > 1 => TYPE_INTERSECTION,
            _ => TYPE_PRIMARY,
        };
        let wrap = prec < min_prec;
        if wrap {
            self.output.push('(');
        }
        match ty {
            TypeExpr::Named(name) => self.output.push_str(name),
            TypeExpr::Literal(lit) => self.write_literal(lit),
            TypeExpr::Generic { name, args } => {
                self.output.push_str(name);
                self.output.push('<');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_type(arg, 0);
                }
                self.output.push('>');
            }
            TypeExpr::Array(element) => {
                self.write_type(element, TYPE_PRIMARY);
                self.output.push_str("[]");
            }
            TypeExpr::Tuple {
                elements,
                rest,
                rest_note,
            } => {
                self.output.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.write_type(element, 0);
                }
                if let Some(rest) = rest {
                    if !elements.is_empty() {
                        self.output.push_str(", ");
                    }
                    if let Some(note) = rest_note {
                        write!(self.output, "/* {} */ ", note.replace("*/", "*\\/")).unwrap();
                    }
                    self.output.push_str("...");
                    self.write_type(&TypeExpr::Array(rest.clone()), 0);
                }
                self.output.push(']');
            }
            TypeExpr::Union(members) => self.write_type_list(members, " | ", TYPE_INTERSECTION),
            TypeExpr::Intersection(members) => self.write_type_list(members, " & ", TYPE_PRIMARY),
            TypeExpr::Object(fields) => {
                if fields.is_empty() {
                    self.output.push_str("{}");
                } else {
                    self.output.push_str("{ ");
                    for (i, field) in fields.iter().enumerate() {
                        if i > 0 {
                            self.output.push_str("; ");
                        }
                        self.write_field(field);
                    }
                    self.output.push_str(" }");
                }
            }
        }
        if wrap {
            self.output.push(')');
        }
    }

    fn write_type_list(&mut self, members: &[TypeExpr], separator: &str, member_prec: u8) {
        if members.is_empty() {
            self.output.push_str("never");
            return;
        }
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.output.push_str(separator);
            }
            self.write_type(member, member_prec);
        }
    }
}

impl Default for TypeScriptWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_declaration(stmt: &Stmt) -> bool {
    matches!(
        stmt,
        Stmt::Function(_) | Stmt::TypeAlias { .. } | Stmt::Interface { .. }
    )
}

fn expr_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Literal(Literal::Number(n)) if *n < 0.0 => PREC_UNARY,
        Expr::Literal(_) | Expr::Ident(_) | Expr::Array(_) | Expr::Object(_) => PREC_PRIMARY,
        Expr::Binary { op, .. } => binary_precedence(*op),
        Expr::Unary { .. } => PREC_UNARY,
        Expr::Increment(_) => PREC_POSTFIX,
        Expr::Call { .. } | Expr::New { .. } | Expr::Member { .. } => PREC_CALL,
        Expr::Spread(_) => PREC_SPREAD,
        Expr::Function(_) | Expr::Assign { .. } => PREC_ASSIGN,
        Expr::Conditional { .. } => PREC_CONDITIONAL,
        Expr::As { .. } => PREC_RELATIONAL,
    }
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => PREC_OR,
        BinaryOp::And => PREC_AND,
        BinaryOp::Eq | BinaryOp::Ne => PREC_EQUALITY,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => PREC_RELATIONAL,
        BinaryOp::Add | BinaryOp::Sub => PREC_ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => PREC_MULTIPLICATIVE,
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "===",
        BinaryOp::Ne => "!==",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

/// Format a number the way JavaScript's `String(n)` does for ordinary values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Escape a string for a double-quoted TypeScript string literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                write!(out, "\\u{:04x}", c as u32).unwrap();
            }
            c => out.push(c),
        }
    }
    out
}

/// Whether `s` can be written as a bare property name.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_alphabetic() && first != '_' && first != '$' {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_const() {
        let program = Program::new(vec![Stmt::const_decl("x", Expr::number(42))]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "const x = 42;");
    }

    #[test]
    fn test_simple_let() {
        let program = Program::new(vec![Stmt::let_decl("x", Some(Expr::number(42)))]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "let x = 42;");
    }

    #[test]
    fn test_function_call() {
        let program = Program::new(vec![Stmt::expr(Expr::method(
            Expr::ident("console"),
            "log",
            vec![Expr::string("hello")],
        ))]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "console.log(\"hello\");");
    }

    #[test]
    fn test_binary_expr_has_no_redundant_parens() {
        let program = Program::new(vec![Stmt::const_decl(
            "sum",
            Expr::binary(Expr::number(1), BinaryOp::Add, Expr::number(2)),
        )]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "const sum = 1 + 2;");
    }

    #[test]
    fn test_precedence_inserts_parens() {
        // (a + b) * c
        let expr = Expr::binary(
            Expr::binary(Expr::ident("a"), BinaryOp::Add, Expr::ident("b")),
            BinaryOp::Mul,
            Expr::ident("c"),
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "(a + b) * c");

        // !(a && b)
        let expr = Expr::not(Expr::and(Expr::ident("a"), Expr::ident("b")));
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "!(a && b)");

        // a - (b - c)
        let expr = Expr::binary(
            Expr::ident("a"),
            BinaryOp::Sub,
            Expr::binary(Expr::ident("b"), BinaryOp::Sub, Expr::ident("c")),
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "a - (b - c)");
    }

    #[test]
    fn test_typeof_comparison() {
        let expr = Expr::ne(Expr::type_of(Expr::ident("v")), Expr::string("string"));
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "typeof v !== \"string\"");
    }

    #[test]
    fn test_arrow_function() {
        let program = Program::new(vec![Stmt::const_decl(
            "add",
            Expr::arrow(
                vec![Param::new("a"), Param::new("b")],
                vec![Stmt::return_stmt(Some(Expr::binary(
                    Expr::ident("a"),
                    BinaryOp::Add,
                    Expr::ident("b"),
                )))],
            ),
        )]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "const add = (a, b) => a + b;");
    }

    #[test]
    fn test_arrow_returning_object_is_parenthesized() {
        let expr = Expr::arrow(
            vec![],
            vec![Stmt::return_stmt(Some(Expr::object(vec![(
                "a".to_string(),
                Expr::number(1),
            )])))],
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "() => ({ a: 1 })");
    }

    #[test]
    fn test_if_statement() {
        let program = Program::new(vec![Stmt::if_stmt(
            Expr::binary(Expr::ident("x"), BinaryOp::Gt, Expr::number(0)),
            Stmt::return_stmt(Some(Expr::number(1))),
            Some(Stmt::return_stmt(Some(Expr::number(0)))),
        )]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts, "if (x > 0) {\n  return 1;\n} else {\n  return 0;\n}\n");
    }

    #[test]
    fn test_else_if_chain_is_flat() {
        let program = Program::new(vec![Stmt::block(vec![Stmt::if_stmt(
            Expr::ident("a"),
            Stmt::block(vec![Stmt::Break]),
            Some(Stmt::if_stmt(
                Expr::ident("b"),
                Stmt::block(vec![Stmt::Continue]),
                None,
            )),
        )])]);
        let ts = TypeScriptWriter::emit(&program);
        assert!(ts.contains("  } else if (b) {\n"), "{ts}");
    }

    #[test]
    fn test_for_loop() {
        let program = Program::new(vec![Stmt::for_loop(
            Some(Stmt::let_decl("i", Some(Expr::number(0)))),
            Some(Expr::binary(
                Expr::ident("i"),
                BinaryOp::Lt,
                Expr::number(10),
            )),
            Some(Expr::increment(Expr::ident("i"))),
            Stmt::block(vec![]),
        )]);
        let ts = TypeScriptWriter::emit(&program);
        assert!(ts.contains("for (let i = 0; i < 10; i++) {}"));
    }

    #[test]
    fn test_object_literal() {
        let program = Program::new(vec![Stmt::const_decl(
            "obj",
            Expr::object(vec![
                ("a".to_string(), Expr::number(1)),
                ("b-c".to_string(), Expr::number(2)),
                ("issues".to_string(), Expr::ident("issues")),
            ]),
        )]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(ts.trim(), "const obj = { a: 1, \"b-c\": 2, issues };");
    }

    #[test]
    fn test_spread_in_object_and_array() {
        let expr = Expr::Object(vec![
            ObjectEntry::Spread(Expr::ident("issue")),
            ObjectEntry::Property(
                "path".to_string(),
                Expr::array(vec![
                    Expr::string("a"),
                    Expr::spread(Expr::member(Expr::ident("issue"), "path")),
                ]),
            ),
        ]);
        assert_eq!(
            TypeScriptWriter::emit_expr(&expr),
            "{ ...issue, path: [\"a\", ...issue.path] }"
        );
    }

    #[test]
    fn test_computed_member_with_string_key() {
        let expr = Expr::index(Expr::ident("o"), Expr::string("first name"));
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "o[\"first name\"]");
    }

    #[test]
    fn test_new_then_method_call() {
        let expr = Expr::method(
            Expr::new_instance(Expr::ident("RegExp"), vec![Expr::string("^a$")]),
            "test",
            vec![Expr::ident("v")],
        );
        assert_eq!(
            TypeScriptWriter::emit_expr(&expr),
            "new RegExp(\"^a$\").test(v)"
        );
    }

    #[test]
    fn test_cast_in_member_position() {
        let expr = Expr::member(
            Expr::cast(Expr::ident("v"), TypeExpr::named("User")),
            "id",
        );
        assert_eq!(TypeScriptWriter::emit_expr(&expr), "(v as User).id");
    }

    #[test]
    fn test_union_in_array_is_parenthesized() {
        let ty = TypeExpr::array(TypeExpr::union(vec![
            TypeExpr::string(),
            TypeExpr::null(),
        ]));
        assert_eq!(TypeScriptWriter::emit_type(&ty), "(string | null)[]");
    }

    #[test]
    fn test_intersection_of_unions() {
        let ty = TypeExpr::intersection(vec![
            TypeExpr::union(vec![TypeExpr::named("A"), TypeExpr::named("B")]),
            TypeExpr::named("C"),
        ]);
        assert_eq!(TypeScriptWriter::emit_type(&ty), "(A | B) & C");
    }

    #[test]
    fn test_open_tuple() {
        let ty = TypeExpr::Tuple {
            elements: vec![TypeExpr::string(), TypeExpr::number()],
            rest: Some(Box::new(TypeExpr::unknown())),
            rest_note: Some("additional items: boolean".to_string()),
        };
        assert_eq!(
            TypeScriptWriter::emit_type(&ty),
            "[string, number, /* additional items: boolean */ ...unknown[]]"
        );
    }

    #[test]
    fn test_interface_with_docs_and_quoted_key() {
        let program = Program::new(vec![Stmt::Interface {
            name: "User".to_string(),
            fields: vec![
                Field::required("id", TypeExpr::number()).with_docs("Primary key"),
                Field::optional("first-name", TypeExpr::string()),
            ],
            exported: true,
            docs: Some("A user".to_string()),
        }]);
        let ts = TypeScriptWriter::emit(&program);
        assert_eq!(
            ts,
            "/** A user */\nexport interface User {\n  /** Primary key */\n  id: number;\n  \"first-name\"?: string;\n}\n"
        );
    }

    #[test]
    fn test_comment_lines() {
        let program = Program::new(vec![Stmt::comment("first\n\nsecond")]);
        assert_eq!(TypeScriptWriter::emit(&program), "// first\n//\n// second\n");
    }

    #[test]
    fn test_escape_string_control_chars() {
        assert_eq!(escape_string("a\"b\\c\n\u{1}"), "a\\\"b\\\\c\\n\\u0001");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.5), "1.5");
    }
}
