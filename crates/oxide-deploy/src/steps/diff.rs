//! Diff configuration steps.
//!
//! These build configuration objects only; no database is touched.

use tracing::info;

use crate::pipeline::{
    ArgumentDefinition, ArgumentType, BoxFuture, CommandScope, CommandStep, PipelineResults,
    ResultType, StepResult,
};

use super::{COMPARE_CONTROL, DIFF_OUTPUT_CONTROL};

const BEST_PRACTICE: &str = "BEST PRACTICE: The changelog generated by diffChangeLog/generateChangeLog \
should be inspected for correctness and completeness before being deployed. Some database objects \
and their dependencies cannot be represented automatically, and they may need to be manually \
updated before being deployed.";

const COMPARE_ARGUMENTS: &[ArgumentDefinition] = &[ArgumentDefinition::new("schemas", ArgumentType::StringList)
    .description("Schemas to compare, as name or reference:comparison")];

const OUTPUT_ARGUMENTS: &[ArgumentDefinition] = &[
    ArgumentDefinition::new("includeCatalog", ArgumentType::Boolean)
        .default_value("false")
        .description("Qualify generated objects with their catalog"),
    ArgumentDefinition::new("includeSchema", ArgumentType::Boolean)
        .default_value("false")
        .description("Qualify generated objects with their schema"),
    ArgumentDefinition::new("includeTablespace", ArgumentType::Boolean)
        .default_value("false")
        .description("Include tablespace clauses"),
    ArgumentDefinition::new("preserveNullValues", ArgumentType::Boolean)
        .default_value("true")
        .description("Keep explicit NULL values in generated changes"),
];

/// A reference schema compared against a comparison schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaComparison {
    /// Schema in the reference database.
    pub reference: String,
    /// Schema in the compared database.
    pub comparison: String,
}

impl SchemaComparison {
    /// Parses `name` or `reference:comparison`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((reference, comparison)) => Self {
                reference: reference.trim().to_string(),
                comparison: comparison.trim().to_string(),
            },
            None => Self {
                reference: text.trim().to_string(),
                comparison: text.trim().to_string(),
            },
        }
    }
}

/// Which schemas a diff compares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareControl {
    /// Compared schema pairs.
    pub schema_comparisons: Vec<SchemaComparison>,
}

/// How diff results are written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutputControl {
    /// Qualify objects with their catalog.
    pub include_catalog: bool,
    /// Qualify objects with their schema.
    pub include_schema: bool,
    /// Include tablespace clauses.
    pub include_tablespace: bool,
    /// Keep explicit NULL values.
    pub preserve_null_values: bool,
    /// Schemas whose objects are written.
    pub included_schemas: Vec<String>,
}

impl DiffOutputControl {
    /// Creates the settings with no included schemas.
    #[must_use]
    pub fn new(
        include_catalog: bool,
        include_schema: bool,
        include_tablespace: bool,
        preserve_null_values: bool,
    ) -> Self {
        Self {
            include_catalog,
            include_schema,
            include_tablespace,
            preserve_null_values,
            included_schemas: Vec::new(),
        }
    }

    /// Includes a schema, once.
    pub fn include_schema(&mut self, schema: &str) {
        if !self.included_schemas.iter().any(|s| s == schema) {
            self.included_schemas.push(schema.to_string());
        }
    }
}

/// Builds a [`CompareControl`] from `schemas`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareControlStep;

impl CommandStep for CompareControlStep {
    fn name(&self) -> &'static str {
        "compareControl"
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![COMPARE_CONTROL.result_type()]
    }

    fn arguments(&self) -> &'static [ArgumentDefinition] {
        COMPARE_ARGUMENTS
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let control = CompareControl {
                schema_comparisons: scope
                    .arguments
                    .list("schemas")
                    .iter()
                    .map(|s| SchemaComparison::parse(s))
                    .collect(),
            };
            results.add(COMPARE_CONTROL, control)?;
            Ok(())
        })
    }
}

/// Builds a [`DiffOutputControl`] including every compared schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOutputControlStep;

impl CommandStep for DiffOutputControlStep {
    fn name(&self) -> &'static str {
        "diffOutputControl"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["diffOutputControl"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![COMPARE_CONTROL.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![DIFF_OUTPUT_CONTROL.result_type()]
    }

    fn arguments(&self) -> &'static [ArgumentDefinition] {
        OUTPUT_ARGUMENTS
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let args = scope.arguments;
            let mut control = DiffOutputControl::new(
                args.boolean("includeCatalog").unwrap_or(false),
                args.boolean("includeSchema").unwrap_or(false),
                args.boolean("includeTablespace").unwrap_or(false),
                args.boolean("preserveNullValues").unwrap_or(true),
            );
            for comparison in &results.require(COMPARE_CONTROL)?.schema_comparisons {
                control.include_schema(&comparison.reference);
                control.include_schema(&comparison.comparison);
            }
            info!("{BEST_PRACTICE}");
            results.add(DIFF_OUTPUT_CONTROL, control)?;
            Ok(())
        })
    }
}
