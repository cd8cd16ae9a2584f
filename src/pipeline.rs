//! Text to member, keeping each step's last good result.
//!
//! An editor calls [`AssemblerPipeline::set_text`] on every change, then
//! [`AssemblerPipeline::update_ast`] and one of the `generate_*` methods.
//! Steps whose input hasn't changed are skipped.

use log::trace;

use crate::ast::{CodeEntry, Position, Unit};
use crate::compile::{self, Collaborators, CompileError, CompileOptions, CompiledMethod, Variables};
use crate::text::{self, ParseError, Syntax};
use crate::tree::FieldNode;

pub struct AssemblerPipeline {
    syntax: Syntax,
    options: CompileOptions,
    text: String,
    text_dirty: bool,
    unit_outdated: bool,
    output_outdated: bool,
    unit: Option<Unit>,
    last_method: Option<CompiledMethod>,
    last_field: Option<FieldNode>,
}

impl AssemblerPipeline {
    pub fn new(syntax: Syntax) -> Self {
        Self::with_options(syntax, CompileOptions::default())
    }

    pub fn with_options(syntax: Syntax, options: CompileOptions) -> Self {
        AssemblerPipeline {
            syntax,
            options,
            text: String::new(),
            text_dirty: true,
            unit_outdated: true,
            output_outdated: true,
            unit: None,
            last_method: None,
            last_field: None,
        }
    }

    /// Internal name of the class declaring the member being edited.
    pub fn set_self_type(&mut self, self_type: impl Into<String>) {
        self.options.self_type = self_type.into();
        self.output_outdated = true;
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Replaces the text. Returns `false` when it is unchanged.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.text_dirty = true;
        self.unit_outdated = true;
        trace!("assembler text updated");
        true
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text changed since the last [`AssemblerPipeline::update_ast`].
    pub fn is_dirty(&self) -> bool {
        self.text_dirty
    }

    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// Whether the unit predates the current text, e.g. after a parse error.
    pub fn is_unit_outdated(&self) -> bool {
        self.unit_outdated
    }

    pub fn is_output_outdated(&self) -> bool {
        self.output_outdated
    }

    pub fn is_method(&self) -> bool {
        self.unit.as_ref().is_some_and(Unit::is_method)
    }

    pub fn is_field(&self) -> bool {
        self.unit.as_ref().is_some_and(Unit::is_field)
    }

    pub fn last_method(&self) -> Option<&CompiledMethod> {
        self.last_method.as_ref()
    }

    pub fn last_field(&self) -> Option<&FieldNode> {
        self.last_field.as_ref()
    }

    pub fn last_variables(&self) -> Option<&Variables> {
        self.last_method.as_ref().map(|compiled| &compiled.variables)
    }

    /// Code entry of the latest unit starting on `line`.
    pub fn element_on_line(&self, line: usize) -> Option<&CodeEntry> {
        self.unit.as_ref()?.code.as_ref()?.entry_on_line(line)
    }

    /// Re-parses the text if it changed. `Ok(false)` means nothing to do.
    ///
    /// On a parse error the previous unit is kept but marked outdated.
    pub fn update_ast(&mut self) -> Result<bool, ParseError> {
        if !self.text_dirty {
            return Ok(false);
        }
        self.text_dirty = false;
        trace!("assembler AST updating");
        let unit = text::parse(&self.text, self.syntax)?;
        self.unit = Some(unit);
        self.unit_outdated = false;
        self.output_outdated = true;
        trace!("assembler AST up-to-date");
        Ok(true)
    }

    pub fn generate_method(
        &mut self,
        collaborators: Collaborators<'_>,
    ) -> Result<&CompiledMethod, CompileError> {
        if !self.output_outdated && self.last_method.is_some() {
            return self.last_method.as_ref().ok_or_else(not_generated);
        }
        self.last_method = None;
        self.last_field = None;
        let unit = self.unit.as_ref().ok_or_else(not_generated)?;
        if !unit.is_method() {
            return Err(CompileError::structural(
                "Unit does not define a method",
                unit.definition.position(),
            ));
        }
        let compiled = compile::compile_method(unit, &self.options, collaborators)?;
        self.output_outdated = false;
        Ok(self.last_method.insert(compiled))
    }

    pub fn generate_field(&mut self) -> Result<&FieldNode, CompileError> {
        if !self.output_outdated && self.last_field.is_some() {
            return self.last_field.as_ref().ok_or_else(not_generated);
        }
        self.last_method = None;
        self.last_field = None;
        let unit = self.unit.as_ref().ok_or_else(not_generated)?;
        let field = compile::compile_field(unit)?;
        self.output_outdated = false;
        Ok(self.last_field.insert(field))
    }
}

fn not_generated() -> CompileError {
    CompileError::structural(
        "The instructions have not been successfully generated!",
        Position::default(),
    )
}
