//! Command, argument and result declarations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::PipelineError;
use crate::pipeline::results::{ResultKey, ResultType};

/// Value type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    /// Free text.
    String,
    /// `true` or `false`.
    Boolean,
    /// Signed integer.
    Integer,
    /// Comma-separated list of text values.
    StringList,
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::StringList => "list",
        })
    }
}

/// A parsed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    /// Free text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// Integer.
    Integer(i64),
    /// List of text values.
    StringList(Vec<String>),
}

impl ArgumentValue {
    /// Parses raw text as the given type.
    ///
    /// # Errors
    ///
    /// Returns a message describing the expected format.
    pub fn parse(kind: ArgumentType, raw: &str) -> Result<Self, String> {
        match kind {
            ArgumentType::String => Ok(Self::String(raw.to_string())),
            ArgumentType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Self::Boolean(true)),
                "false" => Ok(Self::Boolean(false)),
                _ => Err(format!("expected true or false, got '{raw}'")),
            },
            ArgumentType::Integer => raw
                .trim()
                .parse()
                .map(Self::Integer)
                .map_err(|_| format!("expected an integer, got '{raw}'")),
            ArgumentType::StringList => Ok(Self::StringList(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

/// Declares one argument of a command or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentDefinition {
    /// Argument name.
    pub name: &'static str,
    /// Value type.
    pub kind: ArgumentType,
    /// Must be given when there is no default.
    pub required: bool,
    /// Raw default, parsed like user input.
    pub default: Option<&'static str>,
    /// Help text.
    pub description: &'static str,
}

impl ArgumentDefinition {
    /// Declares an optional argument without default.
    #[must_use]
    pub const fn new(name: &'static str, kind: ArgumentType) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description: "",
        }
    }

    /// Marks the argument required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default.
    #[must_use]
    pub const fn default_value(mut self, raw: &'static str) -> Self {
        self.default = Some(raw);
        self
    }

    /// Sets the help text.
    #[must_use]
    pub const fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Declares a result a command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultDefinition {
    /// Name and type.
    pub result: ResultType,
    /// Help text.
    pub description: &'static str,
}

impl ResultDefinition {
    /// Declares a result from its key.
    #[must_use]
    pub fn of<T>(key: ResultKey<T>, description: &'static str) -> Self {
        Self {
            result: key.result_type(),
            description,
        }
    }
}

/// Arguments bound for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArguments {
    values: HashMap<&'static str, ArgumentValue>,
}

impl CommandArguments {
    /// Validates raw arguments against definitions and applies defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidArgument`] for an unknown argument,
    /// a missing required argument, or a value of the wrong type.
    pub fn bind(
        command: &str,
        definitions: &[ArgumentDefinition],
        raw: &BTreeMap<String, String>,
    ) -> Result<Self, PipelineError> {
        let invalid = |argument: &str, message: String| PipelineError::InvalidArgument {
            command: command.to_string(),
            argument: argument.to_string(),
            message,
        };

        if let Some(unknown) = raw.keys().find(|k| !definitions.iter().any(|d| d.name == *k)) {
            return Err(invalid(unknown, "unknown argument".to_string()));
        }

        let mut values = HashMap::new();
        for definition in definitions {
            let text = raw.get(definition.name).map(String::as_str).or(definition.default);
            match text {
                Some(text) => {
                    let value = ArgumentValue::parse(definition.kind, text)
                        .map_err(|message| invalid(definition.name, message))?;
                    values.insert(definition.name, value);
                }
                None if definition.required => {
                    return Err(invalid(definition.name, "is required".to_string()));
                }
                None => {}
            }
        }
        Ok(Self { values })
    }

    /// Returns a raw value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.values.get(name)
    }

    /// Returns a string argument.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgumentValue::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a boolean argument.
    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgumentValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns an integer argument.
    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgumentValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a list argument, empty when absent.
    #[must_use]
    pub fn list(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(ArgumentValue::StringList(values)) => values,
            _ => &[],
        }
    }
}

/// A command users can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    name: &'static str,
    aliases: Vec<&'static str>,
    description: &'static str,
    arguments: Vec<ArgumentDefinition>,
    results: Vec<ResultDefinition>,
}

impl CommandDefinition {
    /// Returns the command name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns alternative names.
    #[must_use]
    pub fn aliases(&self) -> &[&'static str] {
        &self.aliases
    }

    /// Returns the help text.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns command-level arguments. Steps add their own at plan time.
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentDefinition] {
        &self.arguments
    }

    /// Returns the declared results.
    #[must_use]
    pub fn results(&self) -> &[ResultDefinition] {
        &self.results
    }

    /// Returns true for the name or any alias.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

/// Builds a [`CommandDefinition`].
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    definition: CommandDefinition,
}

impl CommandBuilder {
    /// Starts a command.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            definition: CommandDefinition {
                name,
                aliases: Vec::new(),
                description: "",
                arguments: Vec::new(),
                results: Vec::new(),
            },
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.definition.aliases.push(alias);
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.definition.description = description;
        self
    }

    /// Adds a command-level argument.
    #[must_use]
    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.definition.arguments.push(argument);
        self
    }

    /// Declares a result.
    #[must_use]
    pub fn result(mut self, result: ResultDefinition) -> Self {
        self.definition.results.push(result);
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(self) -> CommandDefinition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITIONS: &[ArgumentDefinition] = &[
        ArgumentDefinition::new("url", ArgumentType::String).required(),
        ArgumentDefinition::new("includeSchema", ArgumentType::Boolean).default_value("false"),
        ArgumentDefinition::new("schemas", ArgumentType::StringList),
        ArgumentDefinition::new("count", ArgumentType::Integer),
    ];

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_bind_applies_defaults() {
        let args = CommandArguments::bind(
            "diff",
            DEFINITIONS,
            &raw(&[("url", "sqlite::memory:"), ("schemas", "a, b,,c")]),
        )
        .unwrap();

        assert_eq!(args.string("url"), Some("sqlite::memory:"));
        assert_eq!(args.boolean("includeSchema"), Some(false));
        assert_eq!(args.list("schemas"), ["a", "b", "c"]);
        assert_eq!(args.integer("count"), None);
    }

    #[test]
    fn test_bind_errors() {
        let unknown = CommandArguments::bind("diff", DEFINITIONS, &raw(&[("url", "x"), ("bogus", "1")]));
        assert!(matches!(
            unknown,
            Err(PipelineError::InvalidArgument { ref argument, .. }) if argument == "bogus"
        ));

        let missing = CommandArguments::bind("diff", DEFINITIONS, &raw(&[]));
        assert_eq!(
            missing.unwrap_err().to_string(),
            "Invalid argument 'url' for command 'diff': is required"
        );

        let mistyped = CommandArguments::bind("diff", DEFINITIONS, &raw(&[("url", "x"), ("count", "ten")]));
        assert_eq!(
            mistyped.unwrap_err().to_string(),
            "Invalid argument 'count' for command 'diff': expected an integer, got 'ten'"
        );
    }

    #[test]
    fn test_builder() {
        const TOTAL: ResultKey<u64> = ResultKey::new("total");
        let command = CommandBuilder::new("update")
            .alias("migrate")
            .description("Apply pending change sets")
            .result(ResultDefinition::of(TOTAL, "Rows"))
            .build();

        assert!(command.answers_to("update"));
        assert!(command.answers_to("migrate"));
        assert!(!command.answers_to("rollback"));
        assert_eq!(command.results()[0].result.name, "total");
    }
}
