//! The analyzer: AST in, closure tree out.
//!
//! Dispatch is by ordered syntactic predicate (literal classifiers first,
//! then each special form by head symbol, then application). Validation
//! errors are reported with the offending node's `filename:line`. The
//! sugared forms (`cond`, `let`, `(define (f …) …)`) are rewritten here;
//! the evaluator never sees them.

use crate::{
    ast::Ast,
    expressions::{CodeLoc, Datum, Lambda, Literal, Node, NodeLoc},
    intern::{FunctionId, InternerBuilder, StringId},
    parse::{SyntaxError, decode_string_literal, is_float_text, is_integer_text, is_string_text},
};

/// Analyzer output: the compiled program plus the interner and the shared
/// lambda table it populated.
#[derive(Debug)]
pub(crate) struct Analyzed {
    pub program: NodeLoc,
    pub interner: InternerBuilder,
    pub functions: Vec<Lambda>,
}

pub(crate) fn analyze_program(ast: &Ast, filename: &str) -> Result<Analyzed, SyntaxError> {
    let mut interner = InternerBuilder::new();
    let filename_id = interner.intern(filename);
    let mut analyzer = Analyzer {
        interner,
        functions: Vec::new(),
        filename: filename.to_owned(),
        filename_id,
    };
    let program = analyzer.analyze(ast)?;
    Ok(Analyzed {
        program,
        interner: analyzer.interner,
        functions: analyzer.functions,
    })
}

struct Analyzer {
    interner: InternerBuilder,
    functions: Vec<Lambda>,
    filename: String,
    filename_id: StringId,
}

impl Analyzer {
    fn loc(&self, ast: &Ast) -> CodeLoc {
        CodeLoc {
            filename: self.filename_id,
            line: ast.line(),
        }
    }

    fn error(&self, ast: &Ast, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(&self.filename, ast.line(), message)
    }

    fn analyze(&mut self, ast: &Ast) -> Result<NodeLoc, SyntaxError> {
        let loc = self.loc(ast);
        match ast {
            Ast::Symbol { text, .. } => {
                let node = self.analyze_symbol(ast, text)?;
                Ok(NodeLoc::new(loc, node))
            }
            Ast::Expr { children, .. } => {
                let node = self.analyze_expr(ast, children)?;
                Ok(NodeLoc::new(loc, node))
            }
        }
    }

    /// Literal classifiers run first; any other symbol is a variable
    /// reference.
    fn analyze_symbol(&mut self, ast: &Ast, text: &str) -> Result<Node, SyntaxError> {
        if is_integer_text(text) {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(ast, "integer literal out of range"))?;
            Ok(Node::Literal(Literal::Int(value)))
        } else if is_float_text(text) {
            let value: f64 = text.parse().map_err(|_| self.error(ast, "bad float literal"))?;
            Ok(Node::Literal(Literal::Float(value)))
        } else if is_string_text(text) {
            let decoded = decode_string_literal(text).map_err(|msg| self.error(ast, msg))?;
            Ok(Node::Literal(Literal::Str(self.interner.intern(&decoded))))
        } else {
            Ok(Node::VarRef(self.interner.intern(text)))
        }
    }

    fn analyze_expr(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let Some(head) = children.first() else {
            return Err(self.error(ast, "empty expression"));
        };
        match head.symbol_text() {
            Some("quote") => self.analyze_quote(ast, children, false),
            Some("quasiquote") => self.analyze_quote(ast, children, true),
            Some("set!") => self.analyze_assignment(ast, children),
            Some("define") => self.analyze_definition(ast, children),
            Some("lambda") => self.analyze_lambda_form(ast, children),
            Some("if") => self.analyze_if(ast, children),
            Some("cond") => self.analyze_cond(ast, children),
            Some("begin") => self.analyze_begin(ast, children),
            Some("let") => self.analyze_let(ast, children),
            Some("and" | "or") => self.analyze_logical(ast, children),
            _ => self.analyze_application(ast, children),
        }
    }

    fn analyze_quote(&mut self, ast: &Ast, children: &[Ast], quasi: bool) -> Result<Node, SyntaxError> {
        let name = if quasi { "quasiquote" } else { "quote" };
        let [_, datum] = children else {
            return Err(self.error(ast, format!("{name}: expected exactly 1 clause")));
        };
        let datum = self.datum_from_ast(datum, quasi)?;
        Ok(if quasi {
            Node::Quasiquote(datum)
        } else {
            Node::Quote(datum)
        })
    }

    /// Pre-converts quoted data. Atoms become literal data; expressions
    /// become list builders. Under quasiquote, `(unquote x)` becomes an
    /// analyzed expression spliced in at execution time.
    fn datum_from_ast(&mut self, ast: &Ast, quasi: bool) -> Result<Datum, SyntaxError> {
        match ast {
            Ast::Symbol { text, .. } => {
                if is_integer_text(text) {
                    let value: i64 = text
                        .parse()
                        .map_err(|_| self.error(ast, "integer literal out of range"))?;
                    Ok(Datum::Int(value))
                } else if is_float_text(text) {
                    let value: f64 = text.parse().map_err(|_| self.error(ast, "bad float literal"))?;
                    Ok(Datum::Float(value))
                } else if is_string_text(text) {
                    let decoded = decode_string_literal(text).map_err(|msg| self.error(ast, msg))?;
                    Ok(Datum::Str(self.interner.intern(&decoded)))
                } else {
                    Ok(Datum::Symbol(self.interner.intern(text)))
                }
            }
            Ast::Expr { children, .. } => {
                if quasi
                    && let Some(head) = children.first()
                    && head.symbol_text() == Some("unquote")
                {
                    let [_, expr] = children.as_slice() else {
                        return Err(self.error(ast, "unquote: expected exactly 1 clause"));
                    };
                    return Ok(Datum::Unquote(Box::new(self.analyze(expr)?)));
                }
                let items = children
                    .iter()
                    .map(|child| self.datum_from_ast(child, quasi))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Datum::List(items))
            }
        }
    }

    fn analyze_assignment(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let [_, variable, expr] = children else {
            return Err(self.error(ast, "set!: expected a variable and an expression"));
        };
        let name = self.variable_name(variable, "set!")?;
        let expr = Box::new(self.analyze(expr)?);
        Ok(Node::Assign { name, expr })
    }

    fn analyze_definition(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        match children {
            // (define var expr)
            [_, variable @ Ast::Symbol { .. }, expr] => {
                let name = self.variable_name(variable, "define")?;
                let expr = self.analyze(expr)?;
                // name anonymous lambdas after the variable they are bound to
                if let Node::Lambda(function_id) = &expr.node {
                    let lambda = &mut self.functions[function_id.index()];
                    if lambda.name.is_none() {
                        lambda.name = Some(name);
                    }
                }
                Ok(Node::Define {
                    name,
                    expr: Box::new(expr),
                })
            }
            [_, Ast::Symbol { .. }, ..] => Err(self.error(ast, "define: expected exactly 1 value expression")),
            // (define (name params…) body…) => (define name (lambda (params…) body…))
            [_, header @ Ast::Expr { children: head, .. }, body @ ..] => {
                let Some((name_ast, params)) = head.split_first() else {
                    return Err(self.error(header, "define: empty procedure header"));
                };
                let name = self.variable_name(name_ast, "define")?;
                if body.is_empty() {
                    return Err(self.error(ast, "define: procedure has no body"));
                }
                let function_id = self.make_lambda_with_params(ast, params, body, Some(name))?;
                let expr = NodeLoc::new(self.loc(ast), Node::Lambda(function_id));
                Ok(Node::Define {
                    name,
                    expr: Box::new(expr),
                })
            }
            _ => Err(self.error(ast, "define: bad syntax")),
        }
    }

    fn analyze_lambda_form(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let [_, params, body @ ..] = children else {
            return Err(self.error(ast, "lambda: expected parameters and a body"));
        };
        if body.is_empty() {
            return Err(self.error(ast, "lambda: no body"));
        }
        let function_id = match params {
            // (lambda r body…): every argument collects into r
            Ast::Symbol { .. } => {
                let rest = self.variable_name(params, "lambda")?;
                self.push_lambda(ast, None, vec![rest], true, body)?
            }
            Ast::Expr { children: params, .. } => self.make_lambda_with_params(ast, params, body, None)?,
        };
        Ok(Node::Lambda(function_id))
    }

    fn make_lambda_with_params(
        &mut self,
        ast: &Ast,
        params: &[Ast],
        body: &[Ast],
        name: Option<StringId>,
    ) -> Result<FunctionId, SyntaxError> {
        let mut names: Vec<StringId> = Vec::with_capacity(params.len());
        let mut variadic = false;
        let mut iter = params.iter().peekable();
        while let Some(param) = iter.next() {
            if param.symbol_text() == Some(".") {
                // dotted tail: exactly one rest parameter must follow
                let Some(rest) = iter.next() else {
                    return Err(self.error(ast, "lambda: '.' must be followed by a rest parameter"));
                };
                if iter.peek().is_some() {
                    return Err(self.error(ast, "lambda: only one parameter may follow '.'"));
                }
                names.push(self.variable_name(rest, "lambda")?);
                variadic = true;
                break;
            }
            names.push(self.variable_name(param, "lambda")?);
        }
        if let Some(dup) = first_duplicate(&names) {
            let text = self.interner.get_str(dup).to_owned();
            return Err(self.error(ast, format!("lambda: duplicate parameter \"{text}\"")));
        }
        self.push_lambda(ast, name, names, variadic, body)
    }

    fn push_lambda(
        &mut self,
        ast: &Ast,
        name: Option<StringId>,
        params: Vec<StringId>,
        variadic: bool,
        body: &[Ast],
    ) -> Result<FunctionId, SyntaxError> {
        let body = self.analyze_body(ast, body)?;
        let function_id = FunctionId::new(self.functions.len());
        self.functions.push(Lambda {
            name,
            params,
            variadic,
            body,
        });
        Ok(function_id)
    }

    /// A body of one or more expressions, compiled as a sequence.
    fn analyze_body(&mut self, ast: &Ast, body: &[Ast]) -> Result<NodeLoc, SyntaxError> {
        let clauses = body
            .iter()
            .map(|clause| self.analyze(clause))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeLoc::new(self.loc(ast), Node::Sequence(clauses)))
    }

    fn analyze_if(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        match children {
            [_, test, then] => Ok(Node::If {
                test: Box::new(self.analyze(test)?),
                then: Box::new(self.analyze(then)?),
                orelse: None,
            }),
            [_, test, then, orelse] => Ok(Node::If {
                test: Box::new(self.analyze(test)?),
                then: Box::new(self.analyze(then)?),
                orelse: Some(Box::new(self.analyze(orelse)?)),
            }),
            _ => Err(self.error(ast, "if: expected 2 or 3 clauses")),
        }
    }

    /// `(cond (p₁ c₁…) … (pₙ cₙ…))` rewrites to nested `if`s. An `else`
    /// predicate is permitted only in the last clause and emits the
    /// consequent directly, with no enclosing `if`.
    fn analyze_cond(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let clauses = &children[1..];
        if clauses.is_empty() {
            return Err(self.error(ast, "cond: no clauses"));
        }
        let mut orelse: Option<Box<NodeLoc>> = None;
        for (i, clause) in clauses.iter().enumerate().rev() {
            let Some(parts) = clause.children() else {
                return Err(self.error(clause, "cond: clause must be an expression"));
            };
            let [predicate, consequents @ ..] = parts else {
                return Err(self.error(clause, "cond: empty clause"));
            };
            if consequents.is_empty() {
                return Err(self.error(clause, "cond: clause has no consequent"));
            }
            // a single consequent stays bare so it can keep tail position
            let body = if let [consequent] = consequents {
                self.analyze(consequent)?
            } else {
                self.analyze_body(clause, consequents)?
            };
            if predicate.symbol_text() == Some("else") {
                if i != clauses.len() - 1 {
                    return Err(self.error(clause, "cond: else must be the last clause"));
                }
                orelse = Some(Box::new(body));
            } else {
                let test = Box::new(self.analyze(predicate)?);
                let node = Node::If {
                    test,
                    then: Box::new(body),
                    orelse,
                };
                orelse = Some(Box::new(NodeLoc::new(self.loc(clause), node)));
            }
        }
        // the outermost clause owns the whole rewrite
        Ok(orelse.expect("cond has at least one clause").node)
    }

    fn analyze_begin(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let clauses = &children[1..];
        if clauses.is_empty() {
            return Err(self.error(ast, "begin: no clauses"));
        }
        let clauses = clauses
            .iter()
            .map(|clause| self.analyze(clause))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::Sequence(clauses))
    }

    /// `(let ((v₁ e₁) …) body…)` rewrites to `((lambda (v₁ …) body…) e₁ …)`.
    fn analyze_let(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let [_, bindings, body @ ..] = children else {
            return Err(self.error(ast, "let: expected bindings and a body"));
        };
        let Some(bindings) = bindings.children() else {
            return Err(self.error(ast, "let: bindings must be an expression"));
        };
        if body.is_empty() {
            return Err(self.error(ast, "let: no body"));
        }
        let mut params = Vec::with_capacity(bindings.len());
        let mut inits = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let Some([variable, init]) = binding.children() else {
                return Err(self.error(binding, "let: binding must be a (variable expression) pair"));
            };
            params.push(self.variable_name(variable, "let")?);
            inits.push(self.analyze(init)?);
        }
        if let Some(dup) = first_duplicate(&params) {
            let text = self.interner.get_str(dup).to_owned();
            return Err(self.error(ast, format!("let: duplicate variable \"{text}\"")));
        }
        let function_id = self.push_lambda(ast, None, params, false, body)?;
        Ok(Node::Apply {
            target: Box::new(NodeLoc::new(self.loc(ast), Node::Lambda(function_id))),
            args: inits,
            rendered: ast.render().into_boxed_str(),
        })
    }

    fn analyze_logical(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let name = children[0].symbol_text().expect("dispatched on head symbol");
        let clauses = &children[1..];
        if clauses.is_empty() {
            return Err(self.error(ast, format!("{name}: no clauses")));
        }
        let clauses = clauses
            .iter()
            .map(|clause| self.analyze(clause))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if name == "and" {
            Node::And(clauses)
        } else {
            Node::Or(clauses)
        })
    }

    fn analyze_application(&mut self, ast: &Ast, children: &[Ast]) -> Result<Node, SyntaxError> {
        let target = Box::new(self.analyze(&children[0])?);
        let args = children[1..]
            .iter()
            .map(|arg| self.analyze(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::Apply {
            target,
            args,
            rendered: ast.render().into_boxed_str(),
        })
    }

    /// Validates that `ast` is a plain variable symbol (not a literal) and
    /// interns it.
    fn variable_name(&mut self, ast: &Ast, form: &str) -> Result<StringId, SyntaxError> {
        let Some(text) = ast.symbol_text() else {
            return Err(self.error(ast, format!("{form}: expected a variable name")));
        };
        if is_integer_text(text) || is_float_text(text) || is_string_text(text) || text == "." {
            return Err(self.error(ast, format!("{form}: \"{text}\" is not a valid variable name")));
        }
        Ok(self.interner.intern(text))
    }
}

fn first_duplicate(names: &[StringId]) -> Option<StringId> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Some(*name);
        }
    }
    None
}
