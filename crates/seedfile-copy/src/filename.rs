//! Filesystem sources and destinations named by literal or computed filenames.
//!
//! # Design
//! - Absolute filenames are used as given and never consult the process.
//! - Relative filenames go through the filename provider of the process in context.
//! - Computed filenames defer until their value is known and must resolve to a string.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use seedfile_host::{
    DeferredValue, FormatArg, Readiness, TableId, ValueFormat, ValueFormatTemplate,
};
use serde_json::Value as JsonValue;

use crate::context::from_context_check;
use crate::endpoint::{
    FileDestination, FileField, FileReader, FileSource, FileWriter, ResolveScope,
};
use crate::error::{CopyError, CopyResult};
use crate::reader::FsFileReader;
use crate::writer::FsFileWriter;

/// Options of filename declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilenameOptions {
    /// Use the filename as a path without consulting the filename provider.
    pub is_absolute: bool,
}

/// Literal filename usable as source or destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename {
    filename: String,
    is_absolute: bool,
}

impl Filename {
    /// Relative filename, resolved by the filename provider.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self::with_options(filename, FilenameOptions::default())
    }

    /// Absolute filename, used as given.
    #[must_use]
    pub fn absolute(filename: impl Into<String>) -> Self {
        Self::with_options(filename, FilenameOptions { is_absolute: true })
    }

    /// Filename with explicit options.
    #[must_use]
    pub fn with_options(filename: impl Into<String>, options: FilenameOptions) -> Self {
        Self {
            filename: filename.into(),
            is_absolute: options.is_absolute,
        }
    }

    /// Filename as declared.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Whether the filename bypasses the provider.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.is_absolute
    }
}

impl FileSource for Filename {
    fn resolve_source(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileReader>>> {
        let path = endpoint_path(scope, FileField::Source, &self.filename, self.is_absolute)?;
        Ok(Readiness::Ready(Box::new(FsFileReader::new(
            self.filename.clone(),
            path,
        ))))
    }
}

impl FileDestination for Filename {
    fn resolve_destination(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileWriter>>> {
        let path = endpoint_path(
            scope,
            FileField::Destination,
            &self.filename,
            self.is_absolute,
        )?;
        Ok(Readiness::Ready(Box::new(FsFileWriter::new(
            self.filename.clone(),
            path,
        ))))
    }
}

/// Filename computed by a deferred value, usable as source or destination.
#[derive(Clone)]
pub struct FilenameValue {
    value: Arc<dyn DeferredValue>,
    is_absolute: bool,
}

impl FilenameValue {
    /// Relative filename computed by `value`.
    #[must_use]
    pub fn new(value: impl DeferredValue + 'static) -> Self {
        Self::with_options(value, FilenameOptions::default())
    }

    /// Absolute filename computed by `value`.
    #[must_use]
    pub fn absolute(value: impl DeferredValue + 'static) -> Self {
        Self::with_options(value, FilenameOptions { is_absolute: true })
    }

    /// Computed filename with explicit options.
    #[must_use]
    pub fn with_options(value: impl DeferredValue + 'static, options: FilenameOptions) -> Self {
        Self::from_shared(Arc::new(value), options)
    }

    /// Computed filename sharing an existing deferred value.
    #[must_use]
    pub fn from_shared(value: Arc<dyn DeferredValue>, options: FilenameOptions) -> Self {
        Self {
            value,
            is_absolute: options.is_absolute,
        }
    }

    /// Whether the computed filename bypasses the provider.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    fn compute(&self, scope: &ResolveScope<'_>) -> CopyResult<Readiness<String>> {
        let resolved = self
            .value
            .resolve_value(scope.ctx, scope.resolved_data, scope.values)
            .map_err(|source| CopyError::ValueResolve { source })?;
        match resolved {
            Readiness::Later => Ok(Readiness::Later),
            Readiness::Ready(JsonValue::String(filename)) => Ok(Readiness::Ready(filename)),
            Readiness::Ready(other) => Err(CopyError::TypeMismatch {
                observed: json_type_name(&other),
            }),
        }
    }
}

impl FileSource for FilenameValue {
    fn resolve_source(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileReader>>> {
        let Readiness::Ready(filename) = self.compute(scope)? else {
            return Ok(Readiness::Later);
        };
        let path = endpoint_path(scope, FileField::Source, &filename, self.is_absolute)?;
        Ok(Readiness::Ready(Box::new(FsFileReader::new(filename, path))))
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        self.value.table_dependencies()
    }
}

impl FileDestination for FilenameValue {
    fn resolve_destination(
        &self,
        scope: &ResolveScope<'_>,
    ) -> CopyResult<Readiness<Box<dyn FileWriter>>> {
        let Readiness::Ready(filename) = self.compute(scope)? else {
            return Ok(Readiness::Later);
        };
        let path = endpoint_path(scope, FileField::Destination, &filename, self.is_absolute)?;
        Ok(Readiness::Ready(Box::new(FsFileWriter::new(filename, path))))
    }

    fn table_dependencies(&self) -> Vec<TableId> {
        self.value.table_dependencies()
    }
}

impl Debug for FilenameValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FilenameValue")
            .field("is_absolute", &self.is_absolute)
            .finish_non_exhaustive()
    }
}

/// Relative filename built from a positional format string.
#[must_use]
pub fn filename_format(format: impl Into<String>, args: Vec<FormatArg>) -> FilenameValue {
    filename_format_opt(format, args, FilenameOptions::default())
}

/// Filename built from a positional format string, with explicit options.
#[must_use]
pub fn filename_format_opt(
    format: impl Into<String>,
    args: Vec<FormatArg>,
    options: FilenameOptions,
) -> FilenameValue {
    FilenameValue::with_options(ValueFormat::new(format, args), options)
}

/// Relative filename built from a template with named placeholders.
#[must_use]
pub fn filename_format_template(
    template: impl Into<String>,
    args: BTreeMap<String, FormatArg>,
) -> FilenameValue {
    filename_format_template_opt(template, args, FilenameOptions::default())
}

/// Filename built from a template with named placeholders, with explicit options.
#[must_use]
pub fn filename_format_template_opt(
    template: impl Into<String>,
    args: BTreeMap<String, FormatArg>,
    options: FilenameOptions,
) -> FilenameValue {
    FilenameValue::with_options(ValueFormatTemplate::new(template, args), options)
}

fn endpoint_path(
    scope: &ResolveScope<'_>,
    field: FileField,
    filename: &str,
    is_absolute: bool,
) -> CopyResult<PathBuf> {
    if is_absolute {
        return Ok(PathBuf::from(filename));
    }
    let process = from_context_check(scope.ctx)?;
    process.resolve_filename(scope, field, filename)
}

const fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::to_context;
    use crate::process::CopyProcess;
    use crate::value::CopyValue;
    use seedfile_host::{MapValues, ResolveContext, ResolvedData, ValueStatic, ValueTableRef};
    use serde_json::json;

    struct Fixture {
        data: ResolvedData,
        table: TableId,
        values: MapValues,
        value: CopyValue,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                data: ResolvedData::new(),
                table: TableId::new("files"),
                values: MapValues::new(),
                value: CopyValue::new(Filename::absolute("/unused"), Filename::absolute("/unused")),
            }
        }

        fn scope<'a>(&'a self, ctx: &'a ResolveContext) -> ResolveScope<'a> {
            ResolveScope {
                ctx,
                resolved_data: &self.data,
                table_id: &self.table,
                field_name: "_copy",
                values: &self.values,
                value: &self.value,
            }
        }
    }

    fn expect_ready<T>(readiness: Readiness<T>) -> T {
        match readiness {
            Readiness::Ready(value) => value,
            Readiness::Later => panic!("expected a ready endpoint"),
        }
    }

    #[test]
    fn absolute_filename_needs_no_process() -> CopyResult<()> {
        let fixture = Fixture::new();
        let ctx = ResolveContext::new();
        let source = Filename::absolute("/data/a.txt");
        let reader = expect_ready(source.resolve_source(&fixture.scope(&ctx))?);
        assert_eq!(reader.filename(), Some("/data/a.txt"));
        Ok(())
    }

    #[test]
    fn relative_filename_requires_process_and_provider() {
        let fixture = Fixture::new();
        let bare = ResolveContext::new();
        let err = Filename::new("a.txt").resolve_source(&fixture.scope(&bare)).err();
        assert!(matches!(err, Some(CopyError::ProcessNotInitialized)));

        let started = to_context(&bare, Arc::new(CopyProcess::new()));
        let err = Filename::new("a.txt")
            .resolve_destination(&fixture.scope(&started))
            .err();
        assert!(matches!(
            err,
            Some(CopyError::FilenameProviderMissing {
                field: FileField::Destination
            })
        ));
    }

    #[test]
    fn relative_filename_uses_provider_path() -> CopyResult<()> {
        let fixture = Fixture::new();
        let process = CopyProcess::new().with_filename_provider(|request| {
            Ok(PathBuf::from("/root").join(request.field.as_str()).join(request.filename))
        });
        let ctx = to_context(&ResolveContext::new(), Arc::new(process));

        let destination = Filename::new("out.txt");
        let writer = expect_ready(destination.resolve_destination(&fixture.scope(&ctx))?);
        assert_eq!(writer.filename(), Some("out.txt"));
        assert_eq!(writer.to_string(), "file 'out.txt' (/root/destination/out.txt)");
        Ok(())
    }

    #[test]
    fn provider_failures_are_wrapped() {
        let fixture = Fixture::new();
        let process = CopyProcess::new().with_filename_provider(|_| Err("denied".into()));
        let ctx = to_context(&ResolveContext::new(), Arc::new(process));

        match Filename::new("a.txt").resolve_source(&fixture.scope(&ctx)) {
            Err(CopyError::FilenameProvider { field, filename, source }) => {
                assert_eq!(field, FileField::Source);
                assert_eq!(filename, "a.txt");
                assert_eq!(source.to_string(), "denied");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected provider failure"),
        }
    }

    #[test]
    fn computed_filename_defers_and_checks_type() -> CopyResult<()> {
        let fixture = Fixture::new();
        let ctx = ResolveContext::new();
        let users = TableId::new("users");

        let pending =
            FilenameValue::absolute(ValueTableRef::new(users.clone(), "id", json!(1), "avatar"));
        assert_eq!(FileSource::table_dependencies(&pending), vec![users]);
        assert!(pending.resolve_source(&fixture.scope(&ctx))?.is_later());

        let number = FilenameValue::absolute(ValueStatic(json!(42)));
        let err = number.resolve_source(&fixture.scope(&ctx)).err();
        assert!(matches!(err, Some(CopyError::TypeMismatch { observed: "number" })));
        Ok(())
    }

    #[test]
    fn format_helpers_build_filenames() -> CopyResult<()> {
        let fixture = Fixture::new();
        let ctx = ResolveContext::new();

        let positional = filename_format_opt(
            "/data/{}.{}",
            vec!["avatar".into(), "png".into()],
            FilenameOptions { is_absolute: true },
        );
        let reader = expect_ready(positional.resolve_source(&fixture.scope(&ctx))?);
        assert_eq!(reader.filename(), Some("/data/avatar.png"));

        let templated = filename_format_template(
            "img/{name}.png",
            BTreeMap::from([("name".to_string(), FormatArg::from("logo"))]),
        );
        assert!(!templated.is_absolute());

        let absolute_template = filename_format_template_opt(
            "/data/{name}.png",
            BTreeMap::from([("name".to_string(), FormatArg::from("logo"))]),
            FilenameOptions { is_absolute: true },
        );
        assert!(absolute_template.is_absolute());
        let reader = expect_ready(absolute_template.resolve_source(&fixture.scope(&ctx))?);
        assert_eq!(reader.filename(), Some("/data/logo.png"));
        assert!(!filename_format("{}", vec!["a".into()]).is_absolute());
        Ok(())
    }
}
