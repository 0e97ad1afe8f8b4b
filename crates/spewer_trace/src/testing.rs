//! Hand-built frames and misbehaving values for unit tests.

use std::path::PathBuf;

use spewer_foundation::{
    Frame, Inspect, Origin, ReprContext, ReprError, Scope, SourceError, SourceLines, Value,
};

/// A value whose display reports failure.
pub(crate) struct Broken;

impl Inspect for Broken {
    fn type_name(&self) -> &str {
        "Broken"
    }

    fn inspect(&self, _ctx: &mut ReprContext) -> Result<(), ReprError> {
        Err(ReprError::Failed("no display".into()))
    }
}

/// A value whose display panics.
pub(crate) struct Panicky;

impl Inspect for Panicky {
    fn type_name(&self) -> &str {
        "Panicky"
    }

    fn inspect(&self, _ctx: &mut ReprContext) -> Result<(), ReprError> {
        panic!("display exploded")
    }
}

/// A value whose display contains itself.
pub(crate) struct SelfReferential;

impl Inspect for SelfReferential {
    fn type_name(&self) -> &str {
        "SelfReferential"
    }

    fn inspect(&self, ctx: &mut ReprContext) -> Result<(), ReprError> {
        ctx.push_str("[");
        ctx.nested(self)?;
        ctx.push_str("]");
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct StubScope(Vec<(String, Box<dyn Inspect>)>);

impl Scope for StubScope {
    fn get(&self, name: &str) -> Option<&dyn Inspect> {
        self.0
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.as_ref())
    }

    fn entries(&self) -> Vec<(&str, &dyn Inspect)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
            .collect()
    }
}

/// A frame with fixed contents.
pub(crate) struct StubFrame {
    origin: Option<(String, PathBuf)>,
    line: u32,
    instruction: usize,
    code_name: String,
    locals: StubScope,
    globals: StubScope,
    source: Option<SourceLines>,
}

impl StubFrame {
    /// A frame in `f` at line 1 with no origin, bindings or source.
    pub fn new() -> Self {
        Self {
            origin: None,
            line: 1,
            instruction: 0,
            code_name: "f".into(),
            locals: StubScope::default(),
            globals: StubScope::default(),
            source: None,
        }
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn code(mut self, name: &str) -> Self {
        self.code_name = name.into();
        self
    }

    pub fn at_instruction(mut self, instruction: usize) -> Self {
        self.instruction = instruction;
        self
    }

    pub fn in_file(mut self, module: &str, path: impl Into<PathBuf>) -> Self {
        self.origin = Some((module.into(), path.into()));
        self
    }

    pub fn source(mut self, first_line: u32, lines: &[&str]) -> Self {
        self.source = Some(SourceLines {
            first_line,
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
        });
        self
    }

    pub fn local(self, name: &str, value: Value) -> Self {
        self.local_object(name, value)
    }

    pub fn local_object(mut self, name: &str, value: impl Inspect + 'static) -> Self {
        self.locals.0.push((name.into(), Box::new(value)));
        self
    }

    pub fn global(mut self, name: &str, value: Value) -> Self {
        self.globals.0.push((name.into(), Box::new(value)));
        self
    }
}

impl Frame for StubFrame {
    fn origin(&self) -> Option<Origin<'_>> {
        self.origin.as_ref().map(|(module, path)| Origin {
            module,
            path,
        })
    }

    fn line(&self) -> u32 {
        self.line
    }

    fn instruction(&self) -> usize {
        self.instruction
    }

    fn code_name(&self) -> &str {
        &self.code_name
    }

    fn locals(&self) -> &dyn Scope {
        &self.locals
    }

    fn globals(&self) -> &dyn Scope {
        &self.globals
    }

    fn reconstruct_source(&self) -> Result<SourceLines, SourceError> {
        self.source.clone().ok_or_else(|| SourceError::NotFound {
            code: self.code_name.clone(),
        })
    }
}
