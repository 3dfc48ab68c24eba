//! Statement parsing (spec.md §4.2, §3 flat statement array).
//!
//! Block constructs push an [`OpenBlock`](crate::OpenBlock) onto
//! `self.open_blocks` when their header is parsed, and pop it (back-
//! patching the header's jump index) when the matching closer is reached.
//! A file that ends with unclosed blocks is reported once at the end of
//! `parse_program`.

use sbasic_lex::{Keyword, Token};
use sbasic_util::Symbol;

use crate::ast::*;
use crate::{OpenBlock, Parser};

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self) {
        let span = self.current_span();
        match self.peek().token.clone() {
            Token::Keyword(Keyword::Let) => {
                self.advance();
                self.parse_assignment(span);
            }
            Token::Keyword(Keyword::Dim) => self.parse_dim(),
            Token::Keyword(Keyword::Redim) => self.parse_redim(),
            Token::Keyword(Keyword::Const) => self.parse_const(),
            Token::Keyword(Keyword::Print) => self.parse_print(),
            Token::Keyword(Keyword::Input) => self.parse_input(),
            Token::Keyword(Keyword::Write) => self.parse_print(),
            Token::Keyword(Keyword::If) => self.parse_if(),
            Token::Keyword(Keyword::ElseIf) | Token::Keyword(Keyword::Else) => {
                self.parse_elseif_or_else()
            }
            Token::Keyword(Keyword::For) => self.parse_for(),
            Token::Keyword(Keyword::Next) => self.parse_next(),
            Token::Keyword(Keyword::While) => self.parse_while(),
            Token::Keyword(Keyword::Wend) => self.parse_wend(),
            Token::Keyword(Keyword::Do) => self.parse_do(),
            Token::Keyword(Keyword::Loop) => self.parse_loop(),
            Token::Keyword(Keyword::Select) => self.parse_select(),
            Token::Keyword(Keyword::Case) => self.parse_case(),
            Token::Keyword(Keyword::GoTo) => self.parse_goto(),
            Token::Keyword(Keyword::GoSub) => self.parse_gosub(),
            Token::Keyword(Keyword::Return) => self.parse_return(),
            Token::Keyword(Keyword::On) => self.parse_on(),
            Token::Keyword(Keyword::Sub) => self.parse_sub_header(),
            Token::Keyword(Keyword::Function) => self.parse_function_header(),
            Token::Keyword(Keyword::End) => self.parse_end_or_block_end(),
            Token::Keyword(Keyword::Declare) => self.skip_declare(),
            Token::Keyword(Keyword::Call) => self.parse_call(),
            Token::Keyword(Keyword::Exit) => self.parse_exit(),
            Token::Keyword(Keyword::Data) => self.parse_data(),
            Token::Keyword(Keyword::Read) => self.parse_read(),
            Token::Keyword(Keyword::Restore) => self.parse_restore(),
            Token::Keyword(Keyword::Open) => self.parse_open(),
            Token::Keyword(Keyword::Close) => self.parse_close(),
            Token::Keyword(Keyword::Get) => self.parse_get(),
            Token::Keyword(Keyword::Put) => self.parse_put(),
            Token::Keyword(Keyword::Seek) => self.parse_seek(),
            Token::Keyword(Keyword::Stop) => {
                self.advance();
                self.push_statement(Statement::Stop { span });
            }
            Token::Keyword(Keyword::Line) => self.parse_line_stmt(),
            Token::Keyword(Keyword::PSet) => self.parse_pset(),
            Token::Keyword(Keyword::Circle) => self.parse_circle(),
            Token::Keyword(Keyword::Cls) => {
                self.advance();
                self.push_statement(Statement::Cls { span });
            }
            Token::Keyword(Keyword::Locate) => self.parse_locate(),
            Token::Keyword(Keyword::Color) => self.parse_color(),
            Token::Keyword(Keyword::Randomize) => self.parse_randomize(),
            Token::Rem(_) => {
                self.advance();
                self.push_statement(Statement::Rem { span });
            }
            Token::Ident(name) => {
                // A label (`Foo:`) or an implicit `CALL`-less sub
                // invocation, or a bare assignment target.
                if matches!(self.peek_at(1).token, Token::Colon)
                    && !matches!(self.peek_at(2).token, Token::Equal)
                {
                    self.advance();
                    self.advance();
                    let idx = self.push_statement(Statement::Label(name.clone()));
                    self.program_mut().label_map.insert(name, idx);
                    return;
                }
                self.parse_assignment_or_call(span);
            }
            Token::Newline | Token::Eof => {}
            _ => {
                let tok = self.peek().token.clone();
                self.error(span, &format!("unexpected token {tok}"));
                self.advance();
                self.synchronize();
            }
        }
    }

    // --- assignment & declarations ------------------------------------

    fn parse_lvalue(&mut self) -> LValue {
        let span = self.current_span();
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a variable name");
                Symbol::intern("")
            }
        };
        if self.match_token(&Token::LParen) {
            let mut indices = vec![self.parse_expression()];
            while self.match_token(&Token::Comma) {
                indices.push(self.parse_expression());
            }
            let end = self.current_span();
            self.expect_token(Token::RParen);
            LValue::Indexed(name, indices, span.to(end))
        } else {
            LValue::Scalar(name, span)
        }
    }

    fn parse_assignment(&mut self, start: sbasic_util::Span) {
        let target = self.parse_lvalue();
        self.expect_token(Token::Equal);
        let value = self.parse_expression();
        let span = start.to(value.span());
        self.push_statement(Statement::Let {
            target,
            value,
            span,
        });
    }

    /// `LET` is optional; `NAME = expr` and `NAME(...) = expr` are
    /// assignments, but a bare `NAME arg, arg` with no `=` is an implicit
    /// `CALL`.
    fn parse_assignment_or_call(&mut self, start: sbasic_util::Span) {
        let save = self.position;
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => unreachable!(),
        };
        if self.check(&Token::Equal) {
            self.position = save;
            self.parse_assignment(start);
            return;
        }
        if self.check(&Token::LParen) {
            // Could be `arr(i) = ...` or a zero-arg call; look ahead past
            // the balanced parens for `=`.
            let mut depth = 0usize;
            let mut probe = self.position;
            loop {
                match &self.tokens_peek(probe).token {
                    Token::LParen => depth += 1,
                    Token::RParen => {
                        depth -= 1;
                        if depth == 0 {
                            probe += 1;
                            break;
                        }
                    }
                    Token::Newline | Token::Eof => break,
                    _ => {}
                }
                probe += 1;
            }
            if matches!(self.tokens_peek(probe).token, Token::Equal) {
                self.position = save;
                self.parse_assignment(start);
                return;
            }
        }
        self.position = save;
        self.advance();
        let args = self.parse_implicit_call_args();
        let span = start.to(self.current_span());
        self.push_statement(Statement::CallStmt { name, args, span });
    }

    fn tokens_peek(&self, idx: usize) -> sbasic_lex::SpannedToken {
        self.tokens
            .get(idx.min(self.tokens.len() - 1))
            .cloned()
            .unwrap()
    }

    fn parse_implicit_call_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
            return args;
        }
        args.push(self.parse_expression());
        while self.match_token(&Token::Comma) {
            args.push(self.parse_expression());
        }
        args
    }

    fn parse_call(&mut self) {
        let span = self.current_span();
        self.advance();
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a sub name after CALL");
                Symbol::intern("")
            }
        };
        let args = if self.match_token(&Token::LParen) {
            let args = self.parse_arg_list_pub();
            self.expect_token(Token::RParen);
            args
        } else {
            self.parse_implicit_call_args()
        };
        self.push_statement(Statement::CallStmt { name, args, span });
    }

    fn parse_arg_list_pub(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        if self.check(&Token::RParen) {
            return args;
        }
        args.push(self.parse_expression());
        while self.match_token(&Token::Comma) {
            args.push(self.parse_expression());
        }
        args
    }

    fn parse_value_kind_suffix(&mut self) -> ValueKind {
        if self.match_keyword(Keyword::As) {
            match self.peek().token.clone() {
                Token::Keyword(Keyword::IntegerType) => {
                    self.advance();
                    ValueKind::Integer
                }
                Token::Keyword(Keyword::LongType) => {
                    self.advance();
                    ValueKind::Long
                }
                Token::Keyword(Keyword::SingleType) => {
                    self.advance();
                    ValueKind::Single
                }
                Token::Keyword(Keyword::DoubleType) => {
                    self.advance();
                    ValueKind::Double
                }
                Token::Keyword(Keyword::StringType) => {
                    self.advance();
                    ValueKind::String
                }
                other => {
                    let span = self.current_span();
                    self.error(span, &format!("expected a type name, found {other}"));
                    ValueKind::Single
                }
            }
        } else {
            ValueKind::Single
        }
    }

    fn parse_one_decl(&mut self) -> DimDecl {
        let span = self.current_span();
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a variable name");
                Symbol::intern("")
            }
        };
        let dims = if self.match_token(&Token::LParen) {
            let mut bounds = Vec::new();
            loop {
                let first = self.parse_expression();
                let (lo, hi) = if self.match_keyword(Keyword::To) {
                    (first, self.parse_expression())
                } else {
                    (Expr::Literal(Literal::Integer(0), span), first)
                };
                bounds.push((lo, hi));
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
            self.expect_token(Token::RParen);
            Some(bounds)
        } else {
            None
        };
        let suffix_kind = ValueKind::from_ident_text(name.as_str());
        let kind = if self.check_keyword(Keyword::As) {
            self.parse_value_kind_suffix()
        } else {
            suffix_kind
        };
        DimDecl { name, kind, dims }
    }

    fn parse_dim(&mut self) {
        let span = self.current_span();
        self.advance();
        let shared = self.match_keyword(Keyword::Shared);
        let is_static = self.match_keyword(Keyword::Static);
        let mut decls = vec![self.parse_one_decl()];
        while self.match_token(&Token::Comma) {
            decls.push(self.parse_one_decl());
        }
        self.push_statement(Statement::Dim {
            decls,
            shared,
            is_static,
            span,
        });
    }

    fn parse_redim(&mut self) {
        let span = self.current_span();
        self.advance();
        let preserve = self.match_keyword(Keyword::Preserve);
        let mut decls = vec![self.parse_one_decl()];
        while self.match_token(&Token::Comma) {
            decls.push(self.parse_one_decl());
        }
        self.push_statement(Statement::Redim {
            decls,
            preserve,
            span,
        });
    }

    fn parse_const(&mut self) {
        let span = self.current_span();
        self.advance();
        let name = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a constant name");
                Symbol::intern("")
            }
        };
        self.expect_token(Token::Equal);
        let value = self.parse_expression();
        self.push_statement(Statement::ConstDecl { name, value, span });
        while self.match_token(&Token::Comma) {
            let span = self.current_span();
            let name = match self.peek().token.clone() {
                Token::Ident(s) => {
                    self.advance();
                    s
                }
                _ => Symbol::intern(""),
            };
            self.expect_token(Token::Equal);
            let value = self.parse_expression();
            self.push_statement(Statement::ConstDecl { name, value, span });
        }
    }

    // --- PRINT / INPUT -------------------------------------------------

    fn parse_file_number(&mut self) -> Option<Expr> {
        if self.match_token(&Token::Hash) {
            let e = self.parse_expression();
            self.match_token(&Token::Comma);
            Some(e)
        } else {
            None
        }
    }

    fn parse_print(&mut self) {
        let span = self.current_span();
        self.advance();
        let file = self.parse_file_number();
        let using = if self.match_keyword(Keyword::Using) {
            let fmt = self.parse_expression();
            self.match_token(&Token::Semicolon);
            Some(fmt)
        } else {
            None
        };
        let mut items = Vec::new();
        loop {
            if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
                break;
            }
            if self.match_token(&Token::Comma) {
                items.push(PrintElem::Sep(PrintSep::Comma));
                continue;
            }
            if self.match_token(&Token::Semicolon) {
                items.push(PrintElem::Sep(PrintSep::Semicolon));
                continue;
            }
            items.push(PrintElem::Expr(self.parse_expression()));
        }
        self.push_statement(Statement::Print {
            file,
            using,
            items,
            span,
        });
    }

    fn parse_input(&mut self) {
        let span = self.current_span();
        self.advance();
        let file = self.parse_file_number();
        let prompt = if let Token::Str(s) = self.peek().token.clone() {
            self.advance();
            if self.match_token(&Token::Semicolon) || self.match_token(&Token::Comma) {
                Some(s)
            } else {
                None
            }
        } else {
            None
        };
        let mut targets = vec![self.parse_lvalue()];
        while self.match_token(&Token::Comma) {
            targets.push(self.parse_lvalue());
        }
        self.push_statement(Statement::Input {
            file,
            prompt,
            targets,
            span,
        });
    }

    // --- IF / ELSEIF / ELSE / END IF -----------------------------------

    fn parse_if(&mut self) {
        let span = self.current_span();
        self.advance();
        let cond = self.parse_expression();
        self.expect_keyword(Keyword::Then);

        let header_index = self.push_statement(Statement::IfHeader {
            cond,
            false_target: 0,
            span,
        });

        // Single-line form: `IF cond THEN stmt [: stmt...] [ELSE stmt...]`
        if !matches!(self.peek().token, Token::Newline | Token::Eof) {
            self.parse_single_line_if_body(header_index);
            return;
        }

        self.open_blocks.push(OpenBlock::If {
            header_index,
            end_gotos: Vec::new(),
        });
    }

    fn parse_single_line_if_body(&mut self, header_index: StmtIndex) {
        loop {
            self.parse_statement();
            if self.match_token(&Token::Colon) {
                if self.check_keyword(Keyword::Else) {
                    break;
                }
                continue;
            }
            break;
        }
        let goto_idx = if self.check_keyword(Keyword::Else) {
            let span = self.current_span();
            Some(self.push_statement(Statement::Goto {
                target: JumpTarget::Index(0),
                span,
            }))
        } else {
            None
        };

        let else_target = self.next_index();
        if let Statement::IfHeader { false_target, .. } = &mut self.program_mut().statements[header_index] {
            *false_target = else_target;
        }

        if self.match_keyword(Keyword::Else) {
            loop {
                self.parse_statement();
                if self.match_token(&Token::Colon) {
                    continue;
                }
                break;
            }
        }

        let end = self.next_index();
        if let Some(idx) = goto_idx {
            self.patch_goto(idx, end);
        }
    }

    fn patch_goto(&mut self, idx: StmtIndex, target_index: StmtIndex) {
        if let Statement::Goto { target, .. } = &mut self.program_mut().statements[idx] {
            *target = JumpTarget::Index(target_index);
        }
    }

    /// Handles `ELSEIF`/`ELSE` inside a block `IF`. Each call closes the
    /// previous branch with a `Goto` to the eventual `END IF` and patches
    /// the open `IfHeader`'s `false_target` to the statement that starts
    /// here.
    pub(crate) fn parse_elseif_or_else(&mut self) {
        let span = self.current_span();
        let is_elseif = self.match_keyword(Keyword::ElseIf);
        let is_else = !is_elseif && self.match_keyword(Keyword::Else);
        if !is_elseif && !is_else {
            return;
        }

        let Some(OpenBlock::If { header_index, mut end_gotos }) = self.open_blocks.pop() else {
            self.error(span, "ELSE/ELSEIF without matching IF");
            return;
        };

        let goto_idx = self.push_statement(Statement::Goto {
            target: JumpTarget::Index(0),
            span,
        });
        end_gotos.push(goto_idx);

        let branch_target = self.next_index();
        if let Statement::IfHeader { false_target, .. } = &mut self.program_mut().statements[header_index] {
            *false_target = branch_target;
        }

        if is_elseif {
            let cond = self.parse_expression();
            self.expect_keyword(Keyword::Then);
            let new_header = self.push_statement(Statement::IfHeader {
                cond,
                false_target: 0,
                span,
            });
            self.open_blocks.push(OpenBlock::If {
                header_index: new_header,
                end_gotos,
            });
        } else {
            // A plain ELSE has no header of its own; keep threading
            // end_gotos forward (with a dummy header_index — END IF never
            // reads it once a false_target has already been set above).
            self.open_blocks.push(OpenBlock::If {
                header_index,
                end_gotos,
            });
        }
    }

    fn close_if(&mut self, _header_index: StmtIndex, end_gotos: Vec<StmtIndex>) {
        let end = self.next_index();
        for idx in end_gotos {
            self.patch_goto(idx, end);
        }
    }

    // --- FOR / NEXT -----------------------------------------------------

    fn parse_for(&mut self) {
        let span = self.current_span();
        self.advance();
        let var = match self.peek().token.clone() {
            Token::Ident(s) => {
                self.advance();
                s
            }
            _ => {
                self.error(span, "expected a loop variable after FOR");
                Symbol::intern("")
            }
        };
        self.expect_token(Token::Equal);
        let start = self.parse_expression();
        self.expect_keyword(Keyword::To);
        let end = self.parse_expression();
        let step = if self.match_keyword(Keyword::Step) {
            Some(self.parse_expression())
        } else {
            None
        };
        let header_index = self.push_statement(Statement::ForHeader {
            var,
            start,
            end,
            step,
            next_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::For { header_index });
    }

    fn parse_next(&mut self) {
        let span = self.current_span();
        self.advance();
        let var = if let Token::Ident(s) = self.peek().token.clone() {
            self.advance();
            Some(s)
        } else {
            None
        };
        let Some(OpenBlock::For { header_index }) = self.open_blocks.pop() else {
            self.error(span, "NEXT without matching FOR");
            return;
        };
        let next_idx = self.push_statement(Statement::Next {
            var,
            header_index,
            span,
        });
        let after = next_idx + 1;
        if let Statement::ForHeader { next_index, .. } = &mut self.program_mut().statements[header_index] {
            *next_index = after;
        }
    }

    // --- WHILE / WEND -----------------------------------------------------

    fn parse_while(&mut self) {
        let span = self.current_span();
        self.advance();
        let cond = self.parse_expression();
        let header_index = self.push_statement(Statement::WhileHeader {
            cond,
            end_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::While { header_index });
    }

    fn parse_wend(&mut self) {
        let span = self.current_span();
        self.advance();
        let Some(OpenBlock::While { header_index }) = self.open_blocks.pop() else {
            self.error(span, "WEND without matching WHILE");
            return;
        };
        self.push_statement(Statement::Wend { header_index, span });
        let after = self.next_index();
        if let Statement::WhileHeader { end_index, .. } = &mut self.program_mut().statements[header_index] {
            *end_index = after;
        }
    }

    // --- DO / LOOP -------------------------------------------------------

    fn parse_do_condition(&mut self) -> Option<DoCondition> {
        let polarity = if self.match_keyword(Keyword::While) {
            CondPolarity::While
        } else if self.match_keyword(Keyword::Until) {
            CondPolarity::Until
        } else {
            return None;
        };
        Some(DoCondition {
            side: CondSide::Pre,
            polarity,
            expr: self.parse_expression(),
        })
    }

    fn parse_do(&mut self) {
        let span = self.current_span();
        self.advance();
        let pre = self.parse_do_condition();
        let header_index = self.push_statement(Statement::DoHeader {
            pre,
            end_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::Do { header_index });
    }

    fn parse_loop(&mut self) {
        let span = self.current_span();
        self.advance();
        let mut post = self.parse_do_condition();
        if let Some(cond) = &mut post {
            cond.side = CondSide::Post;
        }
        let Some(OpenBlock::Do { header_index }) = self.open_blocks.pop() else {
            self.error(span, "LOOP without matching DO");
            return;
        };
        self.push_statement(Statement::LoopStmt {
            post,
            header_index,
            span,
        });
        let after = self.next_index();
        if let Statement::DoHeader { end_index, .. } = &mut self.program_mut().statements[header_index] {
            *end_index = after;
        }
    }

    // --- SELECT CASE -----------------------------------------------------

    fn parse_select(&mut self) {
        let span = self.current_span();
        self.advance();
        self.expect_keyword(Keyword::Case);
        let scrutinee = self.parse_expression();
        let header_index = self.push_statement(Statement::SelectHeader {
            scrutinee,
            end_index: 0,
            span,
        });
        self.open_blocks.push(OpenBlock::Select {
            header_index,
            current_case: None,
            end_gotos: Vec::new(),
        });
    }

    fn parse_case_value(&mut self) -> CaseValue {
        if self.match_keyword(Keyword::Is) {
            let op = match self.peek().token.clone() {
                Token::Equal => BinOp::Eq,
                Token::NotEqual => BinOp::NotEq,
                Token::Less => BinOp::Lt,
                Token::LessEqual => BinOp::LtEq,
                Token::Greater => BinOp::Gt,
                Token::GreaterEqual => BinOp::GtEq,
                other => {
                    let span = self.current_span();
                    self.error(span, &format!("expected a comparison operator, found {other}"));
                    BinOp::Eq
                }
            };
            self.advance();
            return CaseValue::Is(op, self.parse_expression());
        }
        let first = self.parse_expression();
        if self.match_keyword(Keyword::To) {
            CaseValue::Range(first, self.parse_expression())
        } else {
            CaseValue::Single(first)
        }
    }

    fn parse_case(&mut self) {
        let span = self.current_span();
        self.advance();

        let Some(OpenBlock::Select { header_index, current_case, mut end_gotos }) =
            self.open_blocks.pop()
        else {
            self.error(span, "CASE without matching SELECT CASE");
            return;
        };

        if let Some(prev_case) = current_case {
            let goto_idx = self.push_statement(Statement::Goto {
                target: JumpTarget::Line(0),
                span,
            });
            end_gotos.push(goto_idx);
            let next_target = self.next_index();
            if let Statement::CaseHeader { next_case_index, .. } =
                &mut self.program_mut().statements[prev_case]
            {
                *next_case_index = next_target;
            }
        }

        let values = if self.match_keyword(Keyword::Else) {
            Vec::new()
        } else {
            let mut values = vec![self.parse_case_value()];
            while self.match_token(&Token::Comma) {
                values.push(self.parse_case_value());
            }
            values
        };

        let case_index = self.push_statement(Statement::CaseHeader {
            values,
            next_case_index: 0,
            span,
        });

        self.open_blocks.push(OpenBlock::Select {
            header_index,
            current_case: Some(case_index),
            end_gotos,
        });
    }

    // --- GOTO / GOSUB / RETURN / ON ---------------------------------------

    fn parse_jump_target(&mut self) -> JumpTarget {
        match self.peek().token.clone() {
            Token::Integer(n) => {
                self.advance();
                JumpTarget::Line(n as u32)
            }
            Token::LineNumber(n) => {
                self.advance();
                JumpTarget::Line(n)
            }
            Token::Ident(s) => {
                self.advance();
                JumpTarget::Label(s)
            }
            other => {
                let span = self.current_span();
                self.error(span, &format!("expected a line number or label, found {other}"));
                JumpTarget::Line(0)
            }
        }
    }

    fn parse_goto(&mut self) {
        let span = self.current_span();
        self.advance();
        let target = self.parse_jump_target();
        self.push_statement(Statement::GotoStmt { target, span });
    }

    fn parse_gosub(&mut self) {
        let span = self.current_span();
        self.advance();
        let target = self.parse_jump_target();
        self.push_statement(Statement::GosubStmt { target, span });
    }

    fn parse_return(&mut self) {
        let span = self.current_span();
        self.advance();
        let value = if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.push_statement(Statement::ReturnStmt { value, span });
    }

    fn parse_on(&mut self) {
        let span = self.current_span();
        self.advance();
        let selector = self.parse_expression();
        let is_gosub = if self.match_keyword(Keyword::GoSub) {
            true
        } else {
            self.expect_keyword(Keyword::GoTo);
            false
        };
        let mut targets = vec![self.parse_jump_target()];
        while self.match_token(&Token::Comma) {
            targets.push(self.parse_jump_target());
        }
        self.push_statement(Statement::OnJump {
            selector,
            is_gosub,
            targets,
            span,
        });
    }

    // --- misc simple statements --------------------------------------

    fn parse_exit(&mut self) {
        let span = self.current_span();
        self.advance();
        let kind = match self.peek().token.clone() {
            Token::Keyword(Keyword::For) => {
                self.advance();
                ExitKind::For
            }
            Token::Keyword(Keyword::Do) => {
                self.advance();
                ExitKind::Do
            }
            Token::Keyword(Keyword::While) => {
                self.advance();
                ExitKind::While
            }
            Token::Keyword(Keyword::Sub) => {
                self.advance();
                ExitKind::Sub
            }
            Token::Keyword(Keyword::Function) => {
                self.advance();
                ExitKind::Function
            }
            other => {
                self.error(span, &format!("expected FOR/DO/WHILE/SUB/FUNCTION after EXIT, found {other}"));
                ExitKind::For
            }
        };
        self.push_statement(Statement::Exit { kind, span });
    }

    fn parse_data(&mut self) {
        let span = self.current_span();
        self.advance();
        let mut values = vec![self.parse_data_literal()];
        while self.match_token(&Token::Comma) {
            values.push(self.parse_data_literal());
        }
        self.program_mut().data_items.extend(values.iter().cloned());
        self.push_statement(Statement::Data { values, span });
    }

    fn parse_data_literal(&mut self) -> Literal {
        let span = self.current_span();
        match self.peek().token.clone() {
            Token::Integer(n) => {
                self.advance();
                Literal::Integer(n)
            }
            Token::Long(n) => {
                self.advance();
                Literal::Long(n)
            }
            Token::Single(n) => {
                self.advance();
                Literal::Single(n)
            }
            Token::Double(n) => {
                self.advance();
                Literal::Double(n)
            }
            Token::Str(s) => {
                self.advance();
                Literal::Str(s)
            }
            Token::Minus => {
                self.advance();
                match self.parse_data_literal() {
                    Literal::Integer(n) => Literal::Integer(-n),
                    Literal::Long(n) => Literal::Long(-n),
                    Literal::Single(n) => Literal::Single(-n),
                    Literal::Double(n) => Literal::Double(-n),
                    other => other,
                }
            }
            Token::Ident(s) => {
                // Unquoted DATA text (a bareword) reads as a string.
                self.advance();
                Literal::Str(s)
            }
            _ => {
                self.error(span, "expected a DATA literal");
                Literal::Integer(0)
            }
        }
    }

    fn parse_read(&mut self) {
        let span = self.current_span();
        self.advance();
        let mut targets = vec![self.parse_lvalue()];
        while self.match_token(&Token::Comma) {
            targets.push(self.parse_lvalue());
        }
        self.push_statement(Statement::Read { targets, span });
    }

    fn parse_restore(&mut self) {
        let span = self.current_span();
        self.advance();
        let target = if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
            None
        } else {
            Some(self.parse_jump_target())
        };
        self.push_statement(Statement::Restore { target, span });
    }

    fn parse_open(&mut self) {
        let span = self.current_span();
        self.advance();
        let path = self.parse_expression();
        self.expect_keyword(Keyword::For);
        let mode = match self.peek().token.clone() {
            Token::Keyword(Keyword::Input) => {
                self.advance();
                FileMode::Input
            }
            Token::Keyword(Keyword::Output) => {
                self.advance();
                FileMode::Output
            }
            Token::Keyword(Keyword::Append) => {
                self.advance();
                FileMode::Append
            }
            Token::Keyword(Keyword::Binary) => {
                self.advance();
                FileMode::Binary
            }
            Token::Keyword(Keyword::Random) => {
                self.advance();
                FileMode::Random
            }
            other => {
                self.error(span, &format!("expected a file mode, found {other}"));
                FileMode::Input
            }
        };
        self.expect_keyword(Keyword::As);
        self.match_token(&Token::Hash);
        let file_no = self.parse_expression();
        let record_len = if self.match_keyword(Keyword::Len) {
            self.expect_token(Token::Equal);
            Some(self.parse_expression())
        } else {
            None
        };
        self.push_statement(Statement::Open {
            path,
            mode,
            file_no,
            record_len,
            span,
        });
    }

    fn parse_close(&mut self) {
        let span = self.current_span();
        self.advance();
        let mut files = Vec::new();
        if !matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
            self.match_token(&Token::Hash);
            files.push(self.parse_expression());
            while self.match_token(&Token::Comma) {
                self.match_token(&Token::Hash);
                files.push(self.parse_expression());
            }
        }
        self.push_statement(Statement::Close { files, span });
    }

    fn parse_get(&mut self) {
        let span = self.current_span();
        self.advance();
        self.match_token(&Token::Hash);
        let file = self.parse_expression();
        self.expect_token(Token::Comma);
        let record = if self.check(&Token::Comma) {
            None
        } else {
            let e = self.parse_expression();
            Some(e)
        };
        self.expect_token(Token::Comma);
        let target = self.parse_lvalue();
        self.push_statement(Statement::Get {
            file,
            record,
            target,
            span,
        });
    }

    fn parse_put(&mut self) {
        let span = self.current_span();
        self.advance();
        self.match_token(&Token::Hash);
        let file = self.parse_expression();
        self.expect_token(Token::Comma);
        let record = if self.check(&Token::Comma) {
            None
        } else {
            let e = self.parse_expression();
            Some(e)
        };
        self.expect_token(Token::Comma);
        let value = self.parse_expression();
        self.push_statement(Statement::Put {
            file,
            record,
            value,
            span,
        });
    }

    fn parse_seek(&mut self) {
        let span = self.current_span();
        self.advance();
        self.match_token(&Token::Hash);
        let file = self.parse_expression();
        self.expect_token(Token::Comma);
        let position = self.parse_expression();
        self.push_statement(Statement::Seek {
            file,
            position,
            span,
        });
    }

    fn skip_declare(&mut self) {
        // DECLARE SUB/FUNCTION forward-declares a signature the evaluator
        // does not need (it resolves routines from the statement array at
        // run time) — consume to end of line.
        self.advance();
        self.synchronize();
    }

    fn parse_line_stmt(&mut self) {
        let span = self.current_span();
        self.advance();
        let x1 = self.parse_expression();
        self.expect_token(Token::Minus);
        let y1 = self.parse_expression();
        self.expect_token(Token::Minus);
        self.expect_token(Token::LParen);
        let x2 = self.parse_expression();
        self.expect_token(Token::Comma);
        let y2 = self.parse_expression();
        self.expect_token(Token::RParen);
        let color = if self.match_token(&Token::Comma) {
            Some(self.parse_expression())
        } else {
            None
        };
        let filled = if self.match_token(&Token::Comma) {
            if let Token::Ident(s) = self.peek().token.clone() {
                self.advance();
                Some(s.as_str().eq_ignore_ascii_case("BF") || s.as_str().eq_ignore_ascii_case("B"))
            } else {
                None
            }
        } else {
            None
        };
        self.push_statement(Statement::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            filled,
            span,
        });
    }

    fn parse_pset(&mut self) {
        let span = self.current_span();
        self.advance();
        self.expect_token(Token::LParen);
        let x = self.parse_expression();
        self.expect_token(Token::Comma);
        let y = self.parse_expression();
        self.expect_token(Token::RParen);
        let color = if self.match_token(&Token::Comma) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.push_statement(Statement::PSet { x, y, color, span });
    }

    fn parse_circle(&mut self) {
        let span = self.current_span();
        self.advance();
        self.expect_token(Token::LParen);
        let x = self.parse_expression();
        self.expect_token(Token::Comma);
        let y = self.parse_expression();
        self.expect_token(Token::RParen);
        self.expect_token(Token::Comma);
        let radius = self.parse_expression();
        let color = if self.match_token(&Token::Comma) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.push_statement(Statement::Circle {
            x,
            y,
            radius,
            color,
            span,
        });
    }

    fn parse_locate(&mut self) {
        let span = self.current_span();
        self.advance();
        let row = if self.check(&Token::Comma) {
            None
        } else {
            Some(self.parse_expression())
        };
        let col = if self.match_token(&Token::Comma) {
            if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
                None
            } else {
                Some(self.parse_expression())
            }
        } else {
            None
        };
        self.push_statement(Statement::Locate { row, col, span });
    }

    fn parse_color(&mut self) {
        let span = self.current_span();
        self.advance();
        let fg = if self.check(&Token::Comma) {
            None
        } else {
            Some(self.parse_expression())
        };
        let bg = if self.match_token(&Token::Comma) {
            Some(self.parse_expression())
        } else {
            None
        };
        self.push_statement(Statement::Color { fg, bg, span });
    }

    fn parse_randomize(&mut self) {
        let span = self.current_span();
        self.advance();
        let seed = if matches!(self.peek().token, Token::Newline | Token::Colon | Token::Eof) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.push_statement(Statement::Randomize { seed, span });
    }

    /// Dispatches the bare `END` keyword: `END IF`/`END SELECT`/`END SUB`/
    /// `END FUNCTION` close their block; a lone `END` terminates the
    /// program.
    fn parse_end_or_block_end(&mut self) {
        let span = self.current_span();
        self.advance();
        match self.peek().token.clone() {
            Token::Keyword(Keyword::If) => {
                self.advance();
                self.close_matching_if(span);
            }
            Token::Keyword(Keyword::Select) => {
                self.advance();
                self.close_select(span);
            }
            Token::Keyword(Keyword::Sub) => {
                self.advance();
                self.close_sub(span);
            }
            Token::Keyword(Keyword::Function) => {
                self.advance();
                self.close_function(span);
            }
            _ => {
                self.push_statement(Statement::End { span });
            }
        }
    }

    fn close_matching_if(&mut self, span: sbasic_util::Span) {
        let Some(OpenBlock::If { header_index, end_gotos }) = self.open_blocks.pop() else {
            self.error(span, "END IF without matching IF");
            return;
        };
        let end = self.next_index();
        if let Statement::IfHeader { false_target, .. } = &mut self.program_mut().statements[header_index] {
            if *false_target == 0 {
                *false_target = end;
            }
        }
        self.close_if(header_index, end_gotos);
    }

    fn close_select(&mut self, span: sbasic_util::Span) {
        let Some(OpenBlock::Select { header_index, current_case, end_gotos }) = self.open_blocks.pop()
        else {
            self.error(span, "END SELECT without matching SELECT CASE");
            return;
        };
        let end = self.next_index();
        if let Some(case_idx) = current_case {
            if let Statement::CaseHeader { next_case_index, .. } =
                &mut self.program_mut().statements[case_idx]
            {
                *next_case_index = end;
            }
        }
        if let Statement::SelectHeader { end_index, .. } = &mut self.program_mut().statements[header_index] {
            *end_index = end;
        }
        for idx in end_gotos {
            self.patch_goto(idx, end);
        }
    }

    fn close_sub(&mut self, span: sbasic_util::Span) {
        let Some(OpenBlock::Sub { header_index }) = self.open_blocks.pop() else {
            self.error(span, "END SUB without matching SUB");
            return;
        };
        self.push_statement(Statement::EndSub { span });
        let end = self.next_index();
        let signature = match &mut self.program_mut().statements[header_index] {
            Statement::SubHeader { signature, end_index, .. } => {
                *end_index = end;
                signature.clone()
            }
            _ => unreachable!("OpenBlock::Sub header_index always points at a SubHeader"),
        };
        let name = signature.name;
        self.program_mut().subs.insert(
            name,
            SubDef {
                signature,
                header_index,
                end_index: end,
            },
        );
    }

    fn close_function(&mut self, span: sbasic_util::Span) {
        let Some(OpenBlock::Function { header_index }) = self.open_blocks.pop() else {
            self.error(span, "END FUNCTION without matching FUNCTION");
            return;
        };
        self.push_statement(Statement::EndFunc { span });
        let end = self.next_index();
        let signature = match &mut self.program_mut().statements[header_index] {
            Statement::FuncHeader { signature, end_index, .. } => {
                *end_index = end;
                signature.clone()
            }
            _ => unreachable!("OpenBlock::Function header_index always points at a FuncHeader"),
        };
        let name = signature.name;
        self.program_mut().funcs.insert(
            name,
            FuncDef {
                signature,
                header_index,
                end_index: end,
            },
        );
    }
}

