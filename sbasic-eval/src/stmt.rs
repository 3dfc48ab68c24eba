//! Statement dispatch (spec.md §4.4.3 – §4.4.7): one arm per [`Statement`]
//! variant, each returning a [`Flow`] telling `exec_loop` where to go next.
//!
//! Loop/`SELECT CASE` headers re-check their condition by jumping back to
//! their own header index rather than the evaluator tracking loop state
//! separately — `WhileHeader`/`DoHeader` re-push a fresh frame each time
//! they're re-entered, same as the parser intended when it back-patched
//! `end_index` onto them.

use sbasic_par::{CaseValue, DoCondition, ExitKind, LValue, Statement, ValueKind};
use sbasic_runtime::{Array, DoFrame, ForFrame, ReturnFrame, Value, WhileFrame};
use sbasic_util::{BasicError, BasicResult, Span};

use crate::builtins;
use crate::expr::literal_to_value;
use crate::host::Host;
use crate::print::{self, Cursor, FormatField};

use super::evaluator::{Evaluator, Flow, SelectFrame};

impl<'p, 'h, H: Host> Evaluator<'p, 'h, H> {
    pub(crate) fn dispatch(&mut self, idx: usize) -> BasicResult<Flow> {
        let program = self.program;
        let stmt = &program.statements[idx];
        match stmt {
            Statement::LineMarker(_) | Statement::Label(_) | Statement::Rem { .. } | Statement::Data { .. } => {
                Ok(Flow::Next)
            }
            Statement::Stop { .. } => Ok(Flow::Next),
            Statement::End { .. } => Ok(Flow::Halt),

            Statement::Let { target, value, span } => {
                let v = self.eval_expr(value)?;
                self.assign_lvalue(target, v, *span)?;
                Ok(Flow::Next)
            }
            Statement::ConstDecl { name, value, span } => {
                let v = self.eval_expr(value)?;
                self.envs.last_mut().unwrap().declare_const(*name, v);
                let _ = span;
                Ok(Flow::Next)
            }
            Statement::Dim { decls, shared, span, .. } => {
                for d in decls {
                    if *shared {
                        self.envs.last_mut().unwrap().mark_shared(d.name);
                    }
                    match &d.dims {
                        Some(bound_exprs) => {
                            let mut bounds = Vec::with_capacity(bound_exprs.len());
                            for (lo, hi) in bound_exprs {
                                let l = self.eval_expr(lo)?.as_f64().unwrap_or(0.0).round() as i32;
                                let h = self.eval_expr(hi)?.as_f64().unwrap_or(0.0).round() as i32;
                                bounds.push((l, h));
                            }
                            let env_idx = self.env_index_for(d.name);
                            self.envs[env_idx].declare_array(d.name, Array::new(d.kind, bounds));
                        }
                        None => {
                            let env_idx = self.env_index_for(d.name);
                            self.envs[env_idx].set_scalar(d.name, Value::default_for(d.kind), *span)?;
                        }
                    }
                }
                Ok(Flow::Next)
            }
            Statement::Redim { decls, preserve, .. } => {
                for d in decls {
                    let bound_exprs = d.dims.as_ref().expect("REDIM always names an array's bounds");
                    let mut bounds = Vec::with_capacity(bound_exprs.len());
                    for (lo, hi) in bound_exprs {
                        let l = self.eval_expr(lo)?.as_f64().unwrap_or(0.0).round() as i32;
                        let h = self.eval_expr(hi)?.as_f64().unwrap_or(0.0).round() as i32;
                        bounds.push((l, h));
                    }
                    let env_idx = self.env_index_for(d.name);
                    if *preserve && self.envs[env_idx].has_array(d.name) {
                        self.envs[env_idx].array_mut(d.name).unwrap().redim_preserve(bounds);
                    } else {
                        self.envs[env_idx].declare_array(d.name, Array::new(d.kind, bounds));
                    }
                }
                Ok(Flow::Next)
            }

            Statement::Print { file, using, items, span } => {
                self.exec_print(file.as_ref(), using.as_ref(), items, *span)?;
                Ok(Flow::Next)
            }
            Statement::Input { file, prompt, targets, span } => {
                self.exec_input(file.as_ref(), *prompt, targets, *span)?;
                Ok(Flow::Next)
            }
            Statement::LineInput { file, target, span } => {
                let line = match file {
                    Some(fe) => {
                        let n = self.eval_expr(fe)?.as_f64().unwrap_or(0.0) as i32;
                        if n == 0 {
                            self.files.console_read_line(*span)?.unwrap_or_default()
                        } else {
                            self.files.get_mut(n, *span)?.read_line(*span)?.unwrap_or_default()
                        }
                    }
                    None => self.host.input(""),
                };
                self.assign_lvalue(target, Value::Str(line), *span)?;
                Ok(Flow::Next)
            }

            Statement::IfHeader { cond, false_target, span } => {
                if self.eval_expr(cond)?.to_bool() {
                    Ok(Flow::Next)
                } else {
                    let _ = span;
                    Ok(Flow::Jump(*false_target))
                }
            }
            Statement::Goto { target, span } | Statement::GotoStmt { target, span } => {
                Ok(Flow::Jump(self.resolve(*target, *span)?))
            }
            Statement::GosubStmt { target, span } => {
                let idx = self.resolve(*target, *span)?;
                self.exec.push_gosub(ReturnFrame { return_index: self.pc + 1 });
                Ok(Flow::Jump(idx))
            }
            Statement::ReturnStmt { value, span } => self.do_return(value.as_ref(), *span),
            Statement::OnJump { selector, is_gosub, targets, span } => {
                let n = self.eval_expr(selector)?.as_f64().unwrap_or(0.0).round() as i64;
                if n >= 1 && (n as usize) <= targets.len() {
                    let target = targets[(n - 1) as usize];
                    let idx = self.resolve(target, *span)?;
                    if *is_gosub {
                        self.exec.push_gosub(ReturnFrame { return_index: self.pc + 1 });
                    }
                    Ok(Flow::Jump(idx))
                } else {
                    Ok(Flow::Next)
                }
            }

            Statement::ForHeader { var, start, end, step, next_index, span } => {
                let start_v = self.eval_expr(start)?;
                let end_v = self
                    .eval_expr(end)?
                    .as_f64()
                    .ok_or_else(|| BasicError::type_mismatch("FOR limit must be numeric".into(), *span))?;
                let step_v = match step {
                    Some(e) => self
                        .eval_expr(e)?
                        .as_f64()
                        .ok_or_else(|| BasicError::type_mismatch("FOR step must be numeric".into(), *span))?,
                    None => 1.0,
                };
                let start_f = start_v
                    .as_f64()
                    .ok_or_else(|| BasicError::type_mismatch("FOR start must be numeric".into(), *span))?;
                self.set_scalar(*var, start_v, *span)?;
                let continue_now = if step_v >= 0.0 { start_f <= end_v } else { start_f >= end_v };
                if !continue_now {
                    return Ok(Flow::Jump(*next_index));
                }
                self.exec.for_stack.push(ForFrame {
                    var: *var,
                    limit: end_v,
                    step: step_v,
                    header_index: idx,
                    body_start: idx + 1,
                    after_next: *next_index,
                });
                Ok(Flow::Next)
            }
            Statement::Next { span, .. } => {
                let frame = self
                    .exec
                    .for_stack
                    .last()
                    .cloned()
                    .ok_or_else(|| BasicError::control_error("NEXT without FOR".into(), *span))?;
                let kind = self.get_scalar(frame.var).kind();
                let current = self.get_scalar(frame.var).as_f64().unwrap_or(0.0);
                let updated = current + frame.step;
                let continue_loop = if frame.step >= 0.0 { updated <= frame.limit } else { updated >= frame.limit };
                if continue_loop {
                    self.set_scalar(frame.var, Value::from_f64(updated, kind), *span)?;
                    Ok(Flow::Jump(frame.body_start))
                } else {
                    self.exec.for_stack.pop();
                    Ok(Flow::Next)
                }
            }

            Statement::WhileHeader { cond, end_index, .. } => {
                if self.eval_expr(cond)?.to_bool() {
                    self.exec.while_stack.push(WhileFrame {
                        header_index: idx,
                        body_start: idx + 1,
                        after_wend: *end_index,
                    });
                    Ok(Flow::Next)
                } else {
                    Ok(Flow::Jump(*end_index))
                }
            }
            Statement::Wend { span, .. } => {
                let frame = self
                    .exec
                    .while_stack
                    .pop()
                    .ok_or_else(|| BasicError::control_error("WEND without WHILE".into(), *span))?;
                Ok(Flow::Jump(frame.header_index))
            }

            Statement::DoHeader { pre, end_index, .. } => {
                if let Some(cond) = pre {
                    if !self.eval_do_condition(cond)? {
                        return Ok(Flow::Jump(*end_index));
                    }
                }
                self.exec.do_stack.push(DoFrame {
                    header_index: idx,
                    body_start: idx + 1,
                    after_loop: *end_index,
                });
                Ok(Flow::Next)
            }
            Statement::LoopStmt { post, span, .. } => {
                let frame = self
                    .exec
                    .do_stack
                    .pop()
                    .ok_or_else(|| BasicError::control_error("LOOP without DO".into(), *span))?;
                let should_loop = match post {
                    Some(cond) => self.eval_do_condition(cond)?,
                    None => true,
                };
                if should_loop {
                    Ok(Flow::Jump(frame.header_index))
                } else {
                    Ok(Flow::Next)
                }
            }

            Statement::SelectHeader { scrutinee, end_index, .. } => {
                let v = self.eval_expr(scrutinee)?;
                self.select_stack.push(SelectFrame { end_index: *end_index, value: v });
                Ok(Flow::Next)
            }
            Statement::CaseHeader { values, next_case_index, span } => {
                let scrut = self
                    .select_stack
                    .last()
                    .ok_or_else(|| BasicError::control_error("CASE outside SELECT".into(), *span))?
                    .value
                    .clone();
                let matched = if values.is_empty() {
                    true
                } else {
                    let mut m = false;
                    for cv in values {
                        if self.case_value_matches(cv, &scrut, *span)? {
                            m = true;
                            break;
                        }
                    }
                    m
                };
                if matched {
                    Ok(Flow::Next)
                } else {
                    Ok(Flow::Jump(*next_case_index))
                }
            }

            Statement::SubHeader { end_index, .. } => Ok(Flow::Jump(*end_index)),
            Statement::FuncHeader { end_index, .. } => Ok(Flow::Jump(*end_index)),
            Statement::EndSub { span } | Statement::EndFunc { span } => self.do_return(None, *span),
            Statement::CallStmt { name, args, span } => {
                self.call_statement(*name, args, *span)?;
                Ok(Flow::Next)
            }
            Statement::Exit { kind, span } => match kind {
                ExitKind::For => {
                    let frame = self
                        .exec
                        .for_stack
                        .pop()
                        .ok_or_else(|| BasicError::control_error("EXIT FOR outside FOR".into(), *span))?;
                    Ok(Flow::Jump(frame.after_next))
                }
                ExitKind::Do => {
                    let frame = self
                        .exec
                        .do_stack
                        .pop()
                        .ok_or_else(|| BasicError::control_error("EXIT DO outside DO".into(), *span))?;
                    Ok(Flow::Jump(frame.after_loop))
                }
                ExitKind::While => {
                    let frame = self
                        .exec
                        .while_stack
                        .pop()
                        .ok_or_else(|| BasicError::control_error("EXIT WHILE outside WHILE".into(), *span))?;
                    Ok(Flow::Jump(frame.after_wend))
                }
                ExitKind::Sub | ExitKind::Function => self.do_return(None, *span),
            },

            Statement::Read { targets, span } => {
                for t in targets {
                    let lit = self
                        .program
                        .data_items
                        .get(self.data_ptr)
                        .cloned()
                        .ok_or_else(|| BasicError::control_error("out of DATA".into(), *span))?;
                    self.data_ptr += 1;
                    let kind = self.target_kind(t, *span)?;
                    let value = literal_to_value(&lit).coerce(kind, *span)?;
                    self.assign_lvalue(t, value, *span)?;
                }
                Ok(Flow::Next)
            }
            Statement::Restore { target, span } => {
                match target {
                    None => self.data_ptr = 0,
                    Some(jt) => {
                        let idx = self.resolve(*jt, *span)?;
                        let mut count = 0;
                        for s in &self.program.statements[..idx] {
                            if let Statement::Data { values, .. } = s {
                                count += values.len();
                            }
                        }
                        self.data_ptr = count;
                    }
                }
                Ok(Flow::Next)
            }

            Statement::Open { path, mode, file_no, record_len, span } => {
                let p = self.eval_expr(path)?.as_str(*span)?.to_string();
                let n = self.eval_expr(file_no)?.as_f64().unwrap_or(0.0) as i32;
                let rl = match record_len {
                    Some(e) => Some(self.eval_expr(e)?.as_f64().unwrap_or(128.0).max(1.0) as usize),
                    None => None,
                };
                self.files.open(n, &p, *mode, rl, *span)?;
                Ok(Flow::Next)
            }
            Statement::Close { files, span } => {
                if files.is_empty() {
                    self.files.close_all();
                } else {
                    for e in files {
                        let n = self.eval_expr(e)?.as_f64().unwrap_or(0.0) as i32;
                        self.files.close(n);
                    }
                }
                let _ = span;
                Ok(Flow::Next)
            }
            Statement::Get { file, record, target, span } => {
                let n = self.eval_expr(file)?.as_f64().unwrap_or(0.0) as i32;
                let rec = match record {
                    Some(e) => Some(self.eval_expr(e)?.as_f64().unwrap_or(0.0) as u64),
                    None => None,
                };
                let kind = self.target_kind(target, *span)?;
                let bytes = self.files.get_mut(n, *span)?.read_record(rec, *span)?;
                let value = bytes_to_value(&bytes, kind);
                self.assign_lvalue(target, value, *span)?;
                Ok(Flow::Next)
            }
            Statement::Put { file, record, value, span } => {
                let n = self.eval_expr(file)?.as_f64().unwrap_or(0.0) as i32;
                let rec = match record {
                    Some(e) => Some(self.eval_expr(e)?.as_f64().unwrap_or(0.0) as u64),
                    None => None,
                };
                let v = self.eval_expr(value)?;
                let record_len = self.files.get_mut(n, *span)?.record_len;
                let bytes = value_to_bytes(&v, record_len);
                self.files.get_mut(n, *span)?.write_record(rec, &bytes, *span)?;
                Ok(Flow::Next)
            }
            Statement::Seek { file, position, span } => {
                let n = self.eval_expr(file)?.as_f64().unwrap_or(0.0) as i32;
                let pos = self.eval_expr(position)?.as_f64().unwrap_or(1.0) as u64;
                self.files.get_mut(n, *span)?.seek_to(pos, *span)?;
                Ok(Flow::Next)
            }

            Statement::Cls { .. } => {
                self.host.clear();
                Ok(Flow::Next)
            }
            Statement::Locate { row, col, .. } => {
                let r = match row {
                    Some(e) => self.eval_expr(e)?.as_f64().unwrap_or(1.0) as u16,
                    None => 1,
                };
                let c = match col {
                    Some(e) => self.eval_expr(e)?.as_f64().unwrap_or(1.0) as u16,
                    None => 1,
                };
                self.host.locate(r, c);
                Ok(Flow::Next)
            }
            Statement::Color { fg, bg, .. } => {
                let f = match fg {
                    Some(e) => self.eval_expr(e)?.as_f64().unwrap_or(7.0) as u8,
                    None => 7,
                };
                let b = match bg {
                    Some(e) => self.eval_expr(e)?.as_f64().unwrap_or(0.0) as u8,
                    None => 0,
                };
                self.host.set_color(f, b);
                Ok(Flow::Next)
            }
            Statement::Randomize { seed, .. } => {
                let bits = match seed {
                    Some(e) => self.eval_expr(e)?.as_f64().unwrap_or(0.0).to_bits(),
                    None => std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_nanos() as u64)
                        .unwrap_or(0),
                };
                self.rng.reseed(bits);
                Ok(Flow::Next)
            }
            Statement::PSet { x, y, color, .. } => {
                let xi = self.eval_expr(x)?.as_f64().unwrap_or(0.0) as i32;
                let yi = self.eval_expr(y)?.as_f64().unwrap_or(0.0) as i32;
                self.apply_color(color.as_ref())?;
                self.host.set_cell(xi, yi, '*');
                self.host.show();
                Ok(Flow::Next)
            }
            Statement::Line { x1, y1, x2, y2, color, filled, .. } => {
                let x1i = self.eval_expr(x1)?.as_f64().unwrap_or(0.0) as i32;
                let y1i = self.eval_expr(y1)?.as_f64().unwrap_or(0.0) as i32;
                let x2i = self.eval_expr(x2)?.as_f64().unwrap_or(0.0) as i32;
                let y2i = self.eval_expr(y2)?.as_f64().unwrap_or(0.0) as i32;
                self.apply_color(color.as_ref())?;
                match filled {
                    None => self.rasterize_line(x1i, y1i, x2i, y2i),
                    Some(false) => self.rasterize_box_outline(x1i, y1i, x2i, y2i),
                    Some(true) => self.rasterize_box_filled(x1i, y1i, x2i, y2i),
                }
                self.host.show();
                Ok(Flow::Next)
            }
            Statement::Circle { x, y, radius, color, .. } => {
                let xi = self.eval_expr(x)?.as_f64().unwrap_or(0.0) as i32;
                let yi = self.eval_expr(y)?.as_f64().unwrap_or(0.0) as i32;
                let ri = self.eval_expr(radius)?.as_f64().unwrap_or(0.0) as i32;
                self.apply_color(color.as_ref())?;
                self.rasterize_circle(xi, yi, ri);
                self.host.show();
                Ok(Flow::Next)
            }
        }
    }

    fn apply_color(&mut self, color: Option<&sbasic_par::Expr>) -> BasicResult<()> {
        if let Some(e) = color {
            let c = self.eval_expr(e)?.as_f64().unwrap_or(7.0) as u8;
            self.host.set_color(c, 0);
        }
        Ok(())
    }

    fn rasterize_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (mut x, mut y) = (x1, y1);
        let dx = (x2 - x1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let dy = -(y2 - y1).abs();
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.host.set_cell(x, y, '*');
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn rasterize_box_outline(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.rasterize_line(x1, y1, x2, y1);
        self.rasterize_line(x2, y1, x2, y2);
        self.rasterize_line(x2, y2, x1, y2);
        self.rasterize_line(x1, y2, x1, y1);
    }

    fn rasterize_box_filled(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (xmin, xmax) = (x1.min(x2), x1.max(x2));
        let (ymin, ymax) = (y1.min(y2), y1.max(y2));
        for y in ymin..=ymax {
            for x in xmin..=xmax {
                self.host.set_cell(x, y, '*');
            }
        }
    }

    /// Midpoint circle algorithm, plotted 8-way symmetric per octant.
    fn rasterize_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;
        while x >= y {
            for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.host.set_cell(cx + dx, cy + dy, '*');
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn eval_do_condition(&mut self, cond: &DoCondition) -> BasicResult<bool> {
        let v = self.eval_expr(&cond.expr)?.to_bool();
        Ok(match cond.polarity {
            sbasic_par::CondPolarity::While => v,
            sbasic_par::CondPolarity::Until => !v,
        })
    }

    fn case_value_matches(&mut self, cv: &CaseValue, scrut: &Value, span: Span) -> BasicResult<bool> {
        match cv {
            CaseValue::Single(e) => {
                let v = self.eval_expr(e)?;
                Ok(self.eval_binop(sbasic_par::BinOp::Eq, scrut, &v, span)?.to_bool())
            }
            CaseValue::Range(lo, hi) => {
                let l = self.eval_expr(lo)?;
                let h = self.eval_expr(hi)?;
                let above = self.eval_binop(sbasic_par::BinOp::GtEq, scrut, &l, span)?.to_bool();
                let below = self.eval_binop(sbasic_par::BinOp::LtEq, scrut, &h, span)?.to_bool();
                Ok(above && below)
            }
            CaseValue::Is(op, e) => {
                let v = self.eval_expr(e)?;
                Ok(self.eval_binop(*op, scrut, &v, span)?.to_bool())
            }
        }
    }

    fn print_cursor(&mut self, file_no: Option<i32>) -> &mut Cursor {
        match file_no {
            Some(n) => self.file_cursors.entry(n).or_default(),
            None => &mut self.cursor,
        }
    }

    fn exec_print(
        &mut self,
        file: Option<&sbasic_par::Expr>,
        using: Option<&sbasic_par::Expr>,
        items: &[sbasic_par::PrintElem],
        span: Span,
    ) -> BasicResult<()> {
        let file_no = match file {
            Some(e) => Some(self.eval_expr(e)?.as_f64().unwrap_or(0.0) as i32),
            None => None,
        };

        let mut buf = String::new();
        let mut suppress_newline = false;

        if let Some(fmt_expr) = using {
            let fmt = self.eval_expr(fmt_expr)?.as_str(span)?.to_string();
            let mut values = Vec::new();
            for item in items {
                if let sbasic_par::PrintElem::Expr(e) = item {
                    values.push(self.eval_expr(e)?);
                }
            }
            let rendered = self.print_using(&fmt, &values);
            let cursor = self.print_cursor(file_no);
            cursor.write(&mut buf, &rendered);
        } else {
            for item in items {
                match item {
                    sbasic_par::PrintElem::Sep(sbasic_par::PrintSep::Comma) => {
                        suppress_newline = true;
                        let cursor = self.print_cursor(file_no);
                        cursor.zone_pad(&mut buf);
                    }
                    sbasic_par::PrintElem::Sep(sbasic_par::PrintSep::Semicolon) => {
                        suppress_newline = true;
                    }
                    sbasic_par::PrintElem::Expr(e) => {
                        suppress_newline = false;
                        if let sbasic_par::Expr::Call(name, args, _) = e {
                            if name.as_str() == "TAB" {
                                let col = self.eval_expr(&args[0])?.as_f64().unwrap_or(1.0).max(1.0) as usize;
                                let cursor = self.print_cursor(file_no);
                                cursor.pad_to(&mut buf, col.saturating_sub(1));
                                continue;
                            }
                            if name.as_str() == "SPC" {
                                let n = self.eval_expr(&args[0])?.as_f64().unwrap_or(0.0).max(0.0) as usize;
                                let cursor = self.print_cursor(file_no);
                                cursor.write(&mut buf, &" ".repeat(n));
                                continue;
                            }
                        }
                        let v = self.eval_expr(e)?;
                        let mut rendered = v.to_string();
                        // Classic PRINT (unlike STR$) trails every numeric
                        // item with a space, the field terminator that
                        // makes `PRINT 10; 8` read " 10  8 " instead of
                        // running the digits together.
                        if v.kind() != ValueKind::String {
                            rendered.push(' ');
                        }
                        let cursor = self.print_cursor(file_no);
                        cursor.write(&mut buf, &rendered);
                    }
                }
            }
        }

        if !suppress_newline {
            let cursor = self.print_cursor(file_no);
            cursor.newline(&mut buf);
        }

        match file_no {
            Some(n) => self.files.get_mut(n, span)?.write_text(&buf, span),
            None => {
                self.host.print(&buf);
                Ok(())
            }
        }
    }

    /// Cycles the format string across the value list, repeating it (as
    /// classic `PRINT USING` does) when there are more values than
    /// fields.
    fn print_using(&mut self, fmt: &str, values: &[Value]) -> String {
        let fields = print::parse_format(fmt);
        let has_value_field = fields
            .iter()
            .any(|f| !matches!(f, FormatField::Literal(_)));
        if !has_value_field || values.is_empty() {
            return fields
                .iter()
                .filter_map(|f| match f {
                    FormatField::Literal(s) => Some(s.clone()),
                    _ => None,
                })
                .collect();
        }
        let mut out = String::new();
        let mut i = 0;
        while i < values.len() {
            for f in &fields {
                match f {
                    FormatField::Literal(s) => out.push_str(s),
                    FormatField::Numeric { .. } => {
                        if i >= values.len() {
                            break;
                        }
                        let v = values[i].as_f64().unwrap_or(0.0);
                        i += 1;
                        out.push_str(&print::format_numeric_field(v, f));
                    }
                    FormatField::Exponential { mantissa_digits } => {
                        if i >= values.len() {
                            break;
                        }
                        let v = values[i].as_f64().unwrap_or(0.0);
                        i += 1;
                        out.push_str(&print::format_exponential(v, *mantissa_digits));
                    }
                    FormatField::StringField { .. } | FormatField::FirstChar | FormatField::WholeString => {
                        if i >= values.len() {
                            break;
                        }
                        let s = match &values[i] {
                            Value::Str(s) => s.clone(),
                            other => other.to_string(),
                        };
                        i += 1;
                        out.push_str(&print::format_string_field(&s, f));
                    }
                }
            }
        }
        out
    }

    fn exec_input(
        &mut self,
        file: Option<&sbasic_par::Expr>,
        prompt: Option<sbasic_util::Symbol>,
        targets: &[LValue],
        span: Span,
    ) -> BasicResult<()> {
        let line = match file {
            Some(fe) => {
                let n = self.eval_expr(fe)?.as_f64().unwrap_or(0.0) as i32;
                if n == 0 {
                    self.files.console_read_line(span)?.unwrap_or_default()
                } else {
                    self.files.get_mut(n, span)?.read_line(span)?.unwrap_or_default()
                }
            }
            None => {
                let p = prompt.map(|s| s.as_str().to_string()).unwrap_or_default();
                self.host.input(&p)
            }
        };
        let fields: Vec<&str> = line.split(',').collect();
        for (i, t) in targets.iter().enumerate() {
            let raw = fields.get(i).copied().unwrap_or("").trim();
            let kind = self.target_kind(t, span)?;
            let value = if kind == ValueKind::String {
                Value::Str(raw.trim_matches('"').to_string())
            } else {
                Value::from_f64(builtins::parse_numeric_prefix(raw), kind)
            };
            self.assign_lvalue(t, value, span)?;
        }
        Ok(())
    }
}

fn value_to_bytes(v: &Value, record_len: usize) -> Vec<u8> {
    match v {
        Value::Integer(n) => n.to_le_bytes().to_vec(),
        Value::Long(n) => n.to_le_bytes().to_vec(),
        Value::Single(n) => n.to_le_bytes().to_vec(),
        Value::Double(n) => n.to_le_bytes().to_vec(),
        Value::Str(s) => {
            let mut b = s.as_bytes().to_vec();
            b.truncate(record_len);
            b
        }
    }
}

fn bytes_to_value(bytes: &[u8], kind: ValueKind) -> Value {
    match kind {
        ValueKind::Integer => Value::Integer(i16::from_le_bytes(bytes[..2].try_into().unwrap_or([0, 0]))),
        ValueKind::Long => Value::Long(i32::from_le_bytes(bytes[..4].try_into().unwrap_or([0, 0, 0, 0]))),
        ValueKind::Single => Value::Single(f32::from_le_bytes(bytes[..4].try_into().unwrap_or([0, 0, 0, 0]))),
        ValueKind::Double => {
            Value::Double(f64::from_le_bytes(bytes[..8].try_into().unwrap_or([0, 0, 0, 0, 0, 0, 0, 0])))
        }
        ValueKind::String => Value::Str(String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()),
    }
}
