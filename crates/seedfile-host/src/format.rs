//! Deferred string interpolation.
//!
//! `ValueFormat` fills positional `{}` placeholders, `ValueFormatTemplate` fills
//! named `{name}` placeholders. Both accept `{{` and `}}` as literal braces and
//! stay `Later` until every deferred argument is ready.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::context::ResolveContext;
use crate::data::{ResolvedData, TableId, ValuesMutable};
use crate::error::{HostError, HostResult};
use crate::value::{DeferredValue, Readiness};

/// Argument of a format string.
#[derive(Clone)]
pub enum FormatArg {
    /// A value known when the fixture is written.
    Literal(JsonValue),
    /// A value computed during resolution.
    Deferred(Arc<dyn DeferredValue>),
}

impl FormatArg {
    /// Wrap a deferred value.
    pub fn deferred(value: impl DeferredValue + 'static) -> Self {
        Self::Deferred(Arc::new(value))
    }

    fn resolve(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        match self {
            Self::Literal(value) => Ok(Readiness::Ready(value.clone())),
            Self::Deferred(value) => value.resolve_value(ctx, resolved_data, values),
        }
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        match self {
            Self::Literal(_) => Vec::new(),
            Self::Deferred(value) => value.table_dependencies(),
        }
    }
}

impl Debug for FormatArg {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => formatter.debug_tuple("Literal").field(value).finish(),
            Self::Deferred(_) => formatter.write_str("Deferred(..)"),
        }
    }
}

impl From<JsonValue> for FormatArg {
    fn from(value: JsonValue) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        Self::Literal(JsonValue::String(value.to_string()))
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        Self::Literal(JsonValue::String(value))
    }
}

/// Positional format string resolved against row data.
#[derive(Debug, Clone)]
pub struct ValueFormat {
    format: String,
    args: Vec<FormatArg>,
}

impl ValueFormat {
    /// Format `format`, replacing each `{}` with the next argument.
    #[must_use]
    pub fn new(format: impl Into<String>, args: Vec<FormatArg>) -> Self {
        Self {
            format: format.into(),
            args,
        }
    }
}

impl DeferredValue for ValueFormat {
    fn resolve_value(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        let mut rendered = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            match arg.resolve(ctx, resolved_data, values)? {
                Readiness::Ready(value) => rendered.push(render(&value)),
                Readiness::Later => return Ok(Readiness::Later),
            }
        }

        let mut next = rendered.into_iter();
        let output = interpolate(&self.format, |name| {
            if !name.is_empty() {
                return Err(HostError::format(
                    &self.format,
                    "named placeholder in positional format",
                ));
            }
            next.next()
                .ok_or_else(|| HostError::format(&self.format, "too few arguments"))
        })?;
        if next.next().is_some() {
            return Err(HostError::format(&self.format, "too many arguments"));
        }
        Ok(Readiness::Ready(JsonValue::String(output)))
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        self.args
            .iter()
            .flat_map(FormatArg::table_dependencies)
            .collect()
    }
}

/// Named-placeholder template resolved against row data.
#[derive(Debug, Clone)]
pub struct ValueFormatTemplate {
    template: String,
    args: BTreeMap<String, FormatArg>,
}

impl ValueFormatTemplate {
    /// Format `template`, replacing each `{name}` with the matching argument.
    #[must_use]
    pub fn new(template: impl Into<String>, args: BTreeMap<String, FormatArg>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }
}

impl DeferredValue for ValueFormatTemplate {
    fn resolve_value(
        &self,
        ctx: &ResolveContext,
        resolved_data: &ResolvedData,
        values: &dyn ValuesMutable,
    ) -> HostResult<Readiness<JsonValue>> {
        let mut rendered = BTreeMap::new();
        for (name, arg) in &self.args {
            match arg.resolve(ctx, resolved_data, values)? {
                Readiness::Ready(value) => {
                    rendered.insert(name.as_str(), render(&value));
                }
                Readiness::Later => return Ok(Readiness::Later),
            }
        }

        let output = interpolate(&self.template, |name| {
            rendered
                .get(name)
                .cloned()
                .ok_or_else(|| HostError::format(&self.template, "unknown placeholder"))
        })?;
        Ok(Readiness::Ready(JsonValue::String(output)))
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        self.args
            .values()
            .flat_map(FormatArg::table_dependencies)
            .collect()
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn interpolate(
    format: &str,
    mut lookup: impl FnMut(&str) -> HostResult<String>,
) -> HostResult<String> {
    let mut output = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                output.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(inner) => name.push(inner),
                        None => return Err(HostError::format(format, "unclosed placeholder")),
                    }
                }
                output.push_str(&lookup(name.trim())?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                output.push('}');
            }
            '}' => return Err(HostError::format(format, "unmatched closing brace")),
            other => output.push(other),
        }
    }
    Ok(output)
}
