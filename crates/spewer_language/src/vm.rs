//! Tree-walking interpreter for spewer modules.
//!
//! The VM runs parsed modules and reports what it does to the observer
//! installed in its [`ObserverSlot`]:
//!
//! - `Enter` when an activation starts. The slot's current observer is asked,
//!   and whatever it returns becomes the activation's local observer.
//! - `Step` before each statement, `Exit` on normal return, and `Raise` at
//!   the failing statement of every activation an exception unwinds through.
//!   These go to the local observer.
//! - `NativeEnter`, `NativeExit` and `NativeRaise` around builtin calls,
//!   delivered to the slot's current observer with the caller's frame.
//!
//! Every event first checks that the slot is still occupied, so removing the
//! observer stops delivery immediately.
//!
//! Activations live on the Rust stack; recursion is bounded by
//! [`Vm::set_max_depth`] and reported as a `RecursionError`. Activations and
//! expression evaluation grow the stack on demand, so the limit is reached
//! before the thread's stack runs out, whatever its size.

mod frame;
mod native;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use spewer_foundation::{
    Callee, Error, ErrorKind, ExecutionEvent, FnRef, ObserverSlot, Result, Value,
};

use crate::ast::{BinaryOp, Expr, Stmt, StmtKind, UnaryOp};
use crate::bindings::Bindings;
use crate::parser::parse_module;
use frame::{Activation, FrameView};
use native::{
    add_values, compare_values, div_values, index_value, mul_values, neg_value, rem_values,
    sub_values,
};

/// Default limit on nested activations.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Stack that must remain before recursing further.
const STACK_RED_ZONE: usize = 128 * 1024;

/// Size of each stack segment allocated once the red zone is reached.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Code name reported for top-level module code.
pub const MODULE_CODE_NAME: &str = "<module>";

/// Whether the VM keeps a module's source text after parsing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceRetention {
    /// Keep the text; frames can reconstruct their source.
    #[default]
    Keep,
    /// Drop the text; source reconstruction fails.
    Discard,
}

/// A loaded module.
pub(crate) struct Module {
    name: Arc<str>,
    path: Option<PathBuf>,
    source: Option<Vec<String>>,
    globals: Bindings,
    body: Arc<[Stmt]>,
    line_count: u32,
}

/// A script function.
struct Function {
    name: Arc<str>,
    module: usize,
    params: Vec<String>,
    body: Vec<Stmt>,
    line: u32,
    end_line: u32,
}

/// Outcome of executing a statement.
enum Flow {
    Next,
    Return(Value),
}

/// The interpreter.
pub struct Vm {
    /// Where observers are looked up.
    slot: Arc<ObserverSlot>,
    /// Loaded modules, in load order.
    modules: Vec<Module>,
    /// Function table indexed by [`FnRef::Script`] indices.
    functions: Vec<Arc<Function>>,
    /// Output from `print`.
    output: Vec<String>,
    /// Current activation depth.
    depth: usize,
    /// Activation depth limit.
    max_depth: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a VM bound to the process-wide observer slot.
    #[must_use]
    pub fn new() -> Self {
        Self::with_slot(ObserverSlot::global())
    }

    /// Creates a VM bound to an explicit observer slot.
    #[must_use]
    pub fn with_slot(slot: Arc<ObserverSlot>) -> Self {
        Self {
            slot,
            modules: Vec::new(),
            functions: Vec::new(),
            output: Vec::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// The slot this VM reports to.
    #[must_use]
    pub fn slot(&self) -> &Arc<ObserverSlot> {
        &self.slot
    }

    /// Sets the activation depth limit.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Output from `print` calls.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Takes the accumulated `print` output.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Names of the loaded modules, in load order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_ref())
    }

    /// Reads a global from a loaded module.
    #[must_use]
    pub fn global(&self, module: &str, name: &str) -> Option<&Value> {
        let index = self.module_index(module)?;
        self.modules[index].globals.value(name)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads a module from a file. The module is named after the file stem
    /// and its frames carry the file's identity.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, a parse error for
    /// invalid source, or `DuplicateModule` if the name is taken.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<str>> {
        let path = path.as_ref();
        let io_error = |source| {
            Error::new(ErrorKind::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let text = std::fs::read_to_string(path).map_err(io_error)?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| {
                io_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file name is not a valid module name",
                ))
            })?;
        self.load(name, Some(path.to_path_buf()), &text, SourceRetention::Keep)
    }

    /// Loads a module from text. Its frames have no file identity but can
    /// reconstruct their source.
    ///
    /// # Errors
    ///
    /// Returns a parse error for invalid source, or `DuplicateModule` if the
    /// name is taken.
    pub fn load_source(&mut self, name: &str, text: &str) -> Result<Arc<str>> {
        self.load(name, None, text, SourceRetention::Keep)
    }

    /// Loads a module from text and discards the text, so its frames have
    /// neither a file identity nor reconstructable source.
    ///
    /// # Errors
    ///
    /// As [`Vm::load_source`].
    pub fn load_source_discarding_text(&mut self, name: &str, text: &str) -> Result<Arc<str>> {
        self.load(name, None, text, SourceRetention::Discard)
    }

    /// Loads a module from text with an explicit retention policy.
    ///
    /// # Errors
    ///
    /// As [`Vm::load_source`].
    pub fn load_source_with(
        &mut self,
        name: &str,
        text: &str,
        retention: SourceRetention,
    ) -> Result<Arc<str>> {
        self.load(name, None, text, retention)
    }

    fn load(
        &mut self,
        name: &str,
        path: Option<PathBuf>,
        text: &str,
        retention: SourceRetention,
    ) -> Result<Arc<str>> {
        if self.module_index(name).is_some() {
            return Err(Error::new(ErrorKind::DuplicateModule(name.to_string())));
        }
        let ast = parse_module(text)?;
        let index = self.modules.len();
        let name: Arc<str> = name.into();

        let mut globals = Bindings::new();
        for def in ast.functions {
            let fn_index = u32::try_from(self.functions.len())
                .map_err(|_| Error::raised("OverflowError", "too many functions"))?;
            let fn_name: Arc<str> = def.name.as_str().into();
            globals.set(
                &def.name,
                Value::Fn(FnRef::Script {
                    name: Arc::clone(&fn_name),
                    index: fn_index,
                }),
            );
            self.functions.push(Arc::new(Function {
                name: fn_name,
                module: index,
                params: def.params,
                body: def.body,
                line: def.line,
                end_line: def.end_line,
            }));
        }

        let source = match retention {
            SourceRetention::Keep => Some(text.lines().map(String::from).collect()),
            SourceRetention::Discard => None,
        };
        tracing::debug!(
            module = %name,
            file = path.is_some(),
            retained = source.is_some(),
            "module loaded"
        );
        self.modules.push(Module {
            name: Arc::clone(&name),
            path,
            source,
            globals,
            body: ast.body.into(),
            line_count: ast.line_count,
        });
        Ok(name)
    }

    fn module_index(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name.as_ref() == name)
    }

    fn require_module(&self, name: &str) -> Result<usize> {
        self.module_index(name)
            .ok_or_else(|| Error::new(ErrorKind::UnknownModule(name.to_string())))
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Runs a module's top-level code.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModule`, or the script exception that escaped.
    pub fn run_module(&mut self, name: &str) -> Result<Value> {
        let index = self.require_module(name)?;
        let module = &self.modules[index];
        let body = Arc::clone(&module.body);
        let span = (1, module.line_count.max(1));
        let mut act = Activation::new(index, MODULE_CODE_NAME.into(), None, span);
        self.run_activation(&mut act, &body)
    }

    /// Calls a module's global function with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns `UnknownModule`, a `NameError` if the function is missing, or
    /// the script exception that escaped.
    pub fn call(&mut self, module: &str, function: &str, args: &[Value]) -> Result<Value> {
        self.call_with_kwargs(module, function, args, &[])
    }

    /// Calls a module's global function with positional and keyword
    /// arguments.
    ///
    /// # Errors
    ///
    /// As [`Vm::call`].
    pub fn call_with_kwargs(
        &mut self,
        module: &str,
        function: &str,
        args: &[Value],
        kwargs: &[(&str, Value)],
    ) -> Result<Value> {
        let index = self.require_module(module)?;
        let target = self.modules[index]
            .globals
            .value(function)
            .cloned()
            .ok_or_else(|| Error::name_error(function))?;
        let kwargs = kwargs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        match target {
            Value::Fn(FnRef::Script { index, .. }) => {
                let func = self.function(index)?;
                self.call_function(&func, args.to_vec(), kwargs)
            }
            Value::Fn(FnRef::Native { name }) => {
                let (_, f) = native::lookup(name).ok_or_else(|| Error::name_error(name))?;
                f(args, &mut self.output)
            }
            other => Err(not_callable(&other)),
        }
    }

    fn function(&self, index: u32) -> Result<Arc<Function>> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.functions.get(i))
            .cloned()
            .ok_or_else(|| Error::type_error(format!("no function with index {index}")))
    }

    // =========================================================================
    // Activations
    // =========================================================================

    fn call_function(
        &mut self,
        func: &Function,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value> {
        let locals = bind_arguments(func, args, kwargs)?;
        let mut act = Activation::new(
            func.module,
            Arc::clone(&func.name),
            Some(locals),
            (func.line, func.end_line),
        );
        self.run_activation(&mut act, &func.body)
    }

    fn run_activation(&mut self, act: &mut Activation, body: &[Stmt]) -> Result<Value> {
        if self.depth >= self.max_depth {
            return Err(Error::raised(
                "RecursionError",
                "maximum recursion depth exceeded",
            ));
        }
        self.depth += 1;
        self.notify(act, &ExecutionEvent::Enter);
        let result = self.exec_block(act, body);
        self.depth -= 1;

        let value = match result? {
            Flow::Return(value) => value,
            Flow::Next => Value::Nil,
        };
        self.notify(act, &ExecutionEvent::Exit { value: &value });
        Ok(value)
    }

    /// Delivers one event for `act`.
    fn notify(&self, act: &mut Activation, event: &ExecutionEvent<'_>) {
        let Some(installed) = self.slot.current() else {
            return;
        };
        let observer = match event {
            ExecutionEvent::Enter => Some(installed),
            _ => act.observer.clone(),
        };
        let Some(observer) = observer else {
            return;
        };
        let next = {
            let view = FrameView {
                act,
                module: &self.modules[act.module],
            };
            observer.observe(&view, event)
        };
        act.observer = next;
    }

    /// Delivers a native-call event to the slot's current observer.
    fn notify_native(&self, act: &Activation, event: &ExecutionEvent<'_>) {
        let Some(observer) = self.slot.current() else {
            return;
        };
        let view = FrameView {
            act,
            module: &self.modules[act.module],
        };
        let _ = observer.observe(&view, event);
    }

    /// Records that `act` moved to `line`.
    fn step(&self, act: &mut Activation, line: u32) {
        act.line = line;
        act.instruction += 1;
        self.notify(act, &ExecutionEvent::Step);
    }

    /// Tags an escaping error with its location and reports it to `act`.
    fn report_raise(&self, act: &mut Activation, err: Error) -> Error {
        let err = err.at(&self.modules[act.module].name, act.line);
        if let Some((kind, value)) = err.exception() {
            self.notify(act, &ExecutionEvent::Raise { kind, value });
        }
        err
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn exec_block(&mut self, act: &mut Activation, body: &[Stmt]) -> Result<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            for stmt in body {
                if let Flow::Return(value) = self.exec_stmt(act, stmt)? {
                    return Ok(Flow::Return(value));
                }
            }
            Ok(Flow::Next)
        })
    }

    fn exec_stmt(&mut self, act: &mut Activation, stmt: &Stmt) -> Result<Flow> {
        self.step(act, stmt.line);
        match &stmt.kind {
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let body = if self.eval_reported(act, cond)?.is_truthy() {
                    then_body
                } else {
                    else_body
                };
                self.exec_block(act, body)
            }
            StmtKind::While { cond, body } => loop {
                if !self.eval_reported(act, cond)?.is_truthy() {
                    return Ok(Flow::Next);
                }
                if let Flow::Return(value) = self.exec_block(act, body)? {
                    return Ok(Flow::Return(value));
                }
                self.step(act, stmt.line);
            },
            kind => match self.exec_simple(act, kind) {
                Ok(flow) => Ok(flow),
                Err(err) => Err(self.report_raise(act, err)),
            },
        }
    }

    /// Executes a statement without nested blocks.
    fn exec_simple(&mut self, act: &mut Activation, kind: &StmtKind) -> Result<Flow> {
        match kind {
            StmtKind::Assign { name, value } => {
                let value = self.eval(act, value)?;
                match &mut act.locals {
                    Some(locals) => locals.set(name, value),
                    None => self.modules[act.module].globals.set(name, value),
                }
                Ok(Flow::Next)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(act, expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Raise { kind, value } => {
                let value = match value {
                    Some(expr) => self.eval(act, expr)?,
                    None => Value::Nil,
                };
                Err(Error::raised(kind.as_str(), value))
            }
            StmtKind::Expr(expr) => {
                self.eval(act, expr)?;
                Ok(Flow::Next)
            }
            StmtKind::If { .. } | StmtKind::While { .. } => Ok(Flow::Next),
        }
    }

    /// Evaluates a block header's condition, reporting failures.
    fn eval_reported(&mut self, act: &mut Activation, expr: &Expr) -> Result<Value> {
        match self.eval(act, expr) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.report_raise(act, err)),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn eval(&mut self, act: &mut Activation, expr: &Expr) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || self.eval_expr(act, expr))
    }

    fn eval_expr(&mut self, act: &mut Activation, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(act, name),
            Expr::Qualified { module, name } => {
                let qualified = || Error::name_error(&format!("{module}.{name}"));
                let index = self.module_index(module).ok_or_else(qualified)?;
                self.modules[index]
                    .globals
                    .value(name)
                    .cloned()
                    .ok_or_else(qualified)
            }
            Expr::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(act, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::list(items))
            }
            Expr::Index { target, index } => {
                let target = self.eval(act, target)?;
                let index = self.eval(act, index)?;
                index_value(&target, &index)
            }
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                let target = self.eval(act, callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(act, arg))
                    .collect::<Result<Vec<_>>>()?;
                let kwargs = kwargs
                    .iter()
                    .map(|(name, arg)| -> Result<(String, Value)> {
                        Ok((name.clone(), self.eval(act, arg)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.call_value(act, &target, args, kwargs)
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(act, lhs)?;
                let rhs = self.eval(act, rhs)?;
                binary_op(*op, &lhs, &rhs)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(act, operand)?;
                match op {
                    UnaryOp::Neg => neg_value(&operand),
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                }
            }
        }
    }

    /// Resolves a bare name: locals, then module globals, then builtins.
    fn lookup(&self, act: &Activation, name: &str) -> Result<Value> {
        if let Some(value) = act.locals.as_ref().and_then(|l| l.value(name)) {
            return Ok(value.clone());
        }
        if let Some(value) = self.modules[act.module].globals.value(name) {
            return Ok(value.clone());
        }
        native::lookup(name)
            .map(|(name, _)| Value::Fn(FnRef::Native { name }))
            .ok_or_else(|| Error::name_error(name))
    }

    fn call_value(
        &mut self,
        act: &Activation,
        target: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value> {
        match target {
            Value::Fn(FnRef::Script { index, .. }) => {
                let func = self.function(*index)?;
                self.call_function(&func, args, kwargs)
            }
            Value::Fn(FnRef::Native { name }) => self.call_native(act, name, &args, &kwargs),
            other => Err(not_callable(other)),
        }
    }

    fn call_native(
        &mut self,
        act: &Activation,
        name: &'static str,
        args: &[Value],
        kwargs: &[(String, Value)],
    ) -> Result<Value> {
        let (_, f) = native::lookup(name).ok_or_else(|| Error::name_error(name))?;
        let callee = Callee { name };
        self.notify_native(act, &ExecutionEvent::NativeEnter { callee });

        let result = if kwargs.is_empty() {
            f(args, &mut self.output)
        } else {
            Err(Error::type_error(format!(
                "{name}() takes no keyword arguments"
            )))
        };

        match &result {
            Ok(_) => self.notify_native(act, &ExecutionEvent::NativeExit { callee }),
            Err(err) => {
                if let Some((kind, value)) = err.exception() {
                    self.notify_native(act, &ExecutionEvent::NativeRaise { callee, kind, value });
                }
            }
        }
        result
    }
}

fn not_callable(value: &Value) -> Error {
    Error::type_error(format!("'{}' object is not callable", value.type_name()))
}

fn binary_op(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    use std::cmp::Ordering::{Equal, Greater, Less};

    match op {
        BinaryOp::Add => add_values(lhs, rhs),
        BinaryOp::Sub => sub_values(lhs, rhs),
        BinaryOp::Mul => mul_values(lhs, rhs),
        BinaryOp::Div => div_values(lhs, rhs),
        BinaryOp::Rem => rem_values(lhs, rhs),
        BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Lt => Ok(Value::Bool(compare_values(lhs, rhs)? == Less)),
        BinaryOp::Le => Ok(Value::Bool(compare_values(lhs, rhs)? != Greater)),
        BinaryOp::Gt => Ok(Value::Bool(compare_values(lhs, rhs)? == Greater)),
        BinaryOp::Ge => Ok(Value::Bool(matches!(
            compare_values(lhs, rhs)?,
            Greater | Equal
        ))),
    }
}

/// Binds call arguments to parameters, in declaration order.
fn bind_arguments(
    func: &Function,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> Result<Bindings> {
    let name = &func.name;
    if args.len() > func.params.len() {
        return Err(Error::type_error(format!(
            "{name}() takes {} positional argument(s) but {} were given",
            func.params.len(),
            args.len()
        )));
    }

    let mut slots: Vec<Option<Value>> = vec![None; func.params.len()];
    for (slot, value) in slots.iter_mut().zip(args) {
        *slot = Some(value);
    }
    for (key, value) in kwargs {
        let Some(position) = func.params.iter().position(|p| *p == key) else {
            return Err(Error::type_error(format!(
                "{name}() got an unexpected keyword argument '{key}'"
            )));
        };
        if slots[position].replace(value).is_some() {
            return Err(Error::type_error(format!(
                "{name}() got multiple values for argument '{key}'"
            )));
        }
    }

    func.params
        .iter()
        .zip(slots)
        .map(|(param, slot)| {
            slot.map(|value| (param.as_str(), value)).ok_or_else(|| {
                Error::type_error(format!("{name}() missing required argument '{param}'"))
            })
        })
        .collect()
}
