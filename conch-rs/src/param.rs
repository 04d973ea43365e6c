//! Parameter binding.
//!
//! A leaf command asks for a typed value by slot name. If the text left over
//! after resolution supplies it, that text is parsed once and a parse failure
//! is an error. If nothing was supplied, the operator is prompted until a valid
//! value is entered or the console reports end of input.

use std::fmt;
use std::path::PathBuf;

use crate::console::{Console, OutputLevel};
use crate::error::{ShellError, ShellResult};

// ============================================================================
// Conversion
// ============================================================================

/// Strict conversion from parameter text.
///
/// Only types implementing this trait can be bound, so binding to an
/// unsupported type is rejected at compile time. Enums get an implementation
/// from `#[derive(ParamEnum)]`.
pub trait FromParam: Sized + Send {
    /// Human name of the expected type, used in messages.
    const TYPE_NAME: &'static str;

    /// Parse `text`. The error is a short reason shown to the operator.
    fn from_param(text: &str) -> Result<Self, String>;

    /// Render a value so that `from_param` parses it back.
    fn to_param(&self) -> String;

    /// The accepted values, for closed sets.
    fn choices() -> Option<Vec<String>> {
        None
    }
}

impl FromParam for String {
    const TYPE_NAME: &'static str = "text";

    fn from_param(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }

    fn to_param(&self) -> String {
        self.clone()
    }
}

impl FromParam for PathBuf {
    const TYPE_NAME: &'static str = "path";

    fn from_param(text: &str) -> Result<Self, String> {
        Ok(PathBuf::from(text))
    }

    fn to_param(&self) -> String {
        self.display().to_string()
    }
}

impl FromParam for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn from_param(text: &str) -> Result<Self, String> {
        match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "no" | "n" | "off" | "0" => Ok(false),
            _ => Err("expected true or false".to_string()),
        }
    }

    fn to_param(&self) -> String {
        self.to_string()
    }

    fn choices() -> Option<Vec<String>> {
        Some(vec!["true".to_string(), "false".to_string()])
    }
}

impl FromParam for char {
    const TYPE_NAME: &'static str = "character";

    fn from_param(text: &str) -> Result<Self, String> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err("expected exactly one character".to_string()),
        }
    }

    fn to_param(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_from_param_parse {
    ($type_name:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl FromParam for $ty {
                const TYPE_NAME: &'static str = $type_name;

                fn from_param(text: &str) -> Result<Self, String> {
                    text.trim().parse::<$ty>().map_err(|e| e.to_string())
                }

                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )+
    };
}

impl_from_param_parse!("integer" => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_from_param_parse!("number" => f32, f64);

// ============================================================================
// Slots
// ============================================================================

type Validator<T> = Box<dyn Fn(&T) -> Result<(), String> + Send + Sync>;

/// A declared parameter: name, optional default, optional validator.
///
/// ```
/// use conch::param::ParamSlot;
///
/// let slot = ParamSlot::<u64>::new("Milliseconds")
///     .default(1000)
///     .validate(|ms| if *ms <= 60_000 { Ok(()) } else { Err("at most a minute".into()) });
///
/// assert_eq!(slot.prompt(), "Milliseconds [1000]: ");
/// assert!(slot.convert("120000").is_err());
/// ```
pub struct ParamSlot<T> {
    name: String,
    default: Option<String>,
    validator: Option<Validator<T>>,
}

impl<T: FromParam> ParamSlot<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            validator: None,
        }
    }

    /// Value taken when the operator answers a prompt with an empty line.
    pub fn default(mut self, value: T) -> Self {
        self.default = Some(value.to_param());
        self
    }

    /// Extra check run after a successful parse.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prompt text shown when the slot has to be asked for.
    pub fn prompt(&self) -> String {
        let mut prompt = self.name.clone();
        if let Some(default) = &self.default {
            prompt.push_str(&format!(" [{}]", default));
        }
        if let Some(choices) = T::choices() {
            prompt.push_str(&format!(" ({})", choices.join("/")));
        }
        prompt.push_str(": ");
        prompt
    }

    /// Parse and validate `text`.
    pub fn convert(&self, text: &str) -> Result<T, String> {
        let value = T::from_param(text)?;
        if let Some(validator) = &self.validator {
            validator(&value)?;
        }
        Ok(value)
    }
}

impl<T> fmt::Debug for ParamSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamSlot")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

// ============================================================================
// Binder
// ============================================================================

/// Resolves parameter slots from supplied text or by prompting.
#[derive(Clone, Copy)]
pub struct ParamBinder<'a> {
    console: &'a dyn Console,
}

impl<'a> ParamBinder<'a> {
    pub fn new(console: &'a dyn Console) -> Self {
        Self { console }
    }

    /// Bind `supplied` to a `T`, prompting for `slot` when it is empty.
    pub async fn query_param<T: FromParam>(&self, slot: &str, supplied: &str) -> ShellResult<T> {
        self.query_slot(&ParamSlot::new(slot), supplied).await
    }

    /// Bind `supplied` against a declared slot.
    ///
    /// Non-empty `supplied` text is parsed exactly once and never prompts, so
    /// binding the same text twice gives the same value. Invalid answers to a
    /// prompt are not errors: a warning is shown and the prompt repeats.
    pub async fn query_slot<T: FromParam>(
        &self,
        slot: &ParamSlot<T>,
        supplied: &str,
    ) -> ShellResult<T> {
        if !supplied.trim().is_empty() {
            return slot
                .convert(supplied)
                .map_err(|reason| ShellError::ParameterFormat {
                    slot: slot.name().to_string(),
                    text: supplied.to_string(),
                    expected: T::TYPE_NAME,
                    reason,
                });
        }

        let prompt = slot.prompt();
        loop {
            let Some(answer) = self.console.read_line(&prompt).await? else {
                return Err(ShellError::Cancelled {
                    slot: slot.name().to_string(),
                });
            };

            let text = match (answer.trim().is_empty(), &slot.default) {
                (false, _) => answer.as_str(),
                (true, Some(default)) => default.as_str(),
                (true, None) => continue,
            };

            match slot.convert(text) {
                Ok(value) => return Ok(value),
                Err(reason) => {
                    tracing::debug!(slot = %slot.name(), answer = %text, reason = %reason, "Re-prompting");
                    self.console.write(
                        &format!("Invalid {} for {}: {}", T::TYPE_NAME, slot.name(), reason),
                        OutputLevel::Warning,
                    );
                }
            }
        }
    }
}

impl fmt::Debug for ParamBinder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamBinder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::MemoryConsole;

    #[test]
    fn test_integers_are_strict() {
        assert_eq!(i32::from_param("42"), Ok(42));
        assert_eq!(i32::from_param(" -7 "), Ok(-7));
        assert!(i32::from_param("5.5").is_err());
        assert!(u8::from_param("256").is_err());
        assert!(u64::from_param("-1").is_err());
        assert!(i64::from_param("12abc").is_err());
    }

    #[test]
    fn test_booleans() {
        assert_eq!(bool::from_param("YES"), Ok(true));
        assert_eq!(bool::from_param("off"), Ok(false));
        assert!(bool::from_param("maybe").is_err());
    }

    #[test]
    fn test_strings_pass_through_verbatim() {
        assert_eq!(String::from_param("  keep me "), Ok("  keep me ".to_string()));
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(char::from_param("x"), Ok('x'));
        assert!(char::from_param("xy").is_err());
        assert!(char::from_param("").is_err());
    }

    #[test]
    fn test_prompt_mentions_default_and_choices() {
        let slot = ParamSlot::<bool>::new("Force").default(false);
        assert_eq!(slot.prompt(), "Force [false] (true/false): ");
    }

    #[tokio::test]
    async fn test_supplied_text_never_prompts() {
        let console = MemoryConsole::with_input(["99"]);
        let binder = ParamBinder::new(&console);

        let first: u32 = binder.query_param("Count", "5").await.unwrap();
        let second: u32 = binder.query_param("Count", "5").await.unwrap();

        assert_eq!(first, 5);
        assert_eq!(first, second);
        assert!(console.prompts().is_empty());
        assert_eq!(console.remaining_input(), 1);
    }

    #[tokio::test]
    async fn test_supplied_text_format_error() {
        let console = MemoryConsole::new();
        let binder = ParamBinder::new(&console);

        let err = binder.query_param::<u32>("Count", "five").await.unwrap_err();
        match err {
            ShellError::ParameterFormat {
                slot,
                text,
                expected,
                ..
            } => {
                assert_eq!(slot, "Count");
                assert_eq!(text, "five");
                assert_eq!(expected, "integer");
            }
            other => panic!("Expected ParameterFormat, got {:?}", other),
        }
        assert!(console.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_repeats_until_valid() {
        let console = MemoryConsole::with_input(["soon", "", "12"]);
        let binder = ParamBinder::new(&console);

        let value: u64 = binder.query_param("Milliseconds", "").await.unwrap();

        assert_eq!(value, 12);
        assert_eq!(console.prompts().len(), 3);
        assert_eq!(console.lines_at(OutputLevel::Warning).len(), 1);
        assert!(console.lines_at(OutputLevel::Error).is_empty());
    }

    #[tokio::test]
    async fn test_prompt_empty_answer_takes_default() {
        let console = MemoryConsole::with_input([""]);
        let binder = ParamBinder::new(&console);
        let slot = ParamSlot::<u64>::new("Milliseconds").default(250);

        let value = binder.query_slot(&slot, "").await.unwrap();
        assert_eq!(value, 250);
    }

    #[tokio::test]
    async fn test_validator_applies_to_supplied_and_prompted() {
        let console = MemoryConsole::with_input(["0", "3"]);
        let binder = ParamBinder::new(&console);
        let slot = ParamSlot::<i32>::new("Retries").validate(|n| {
            if *n > 0 {
                Ok(())
            } else {
                Err("must be positive".to_string())
            }
        });

        let err = binder.query_slot(&slot, "-1").await.unwrap_err();
        assert!(matches!(err, ShellError::ParameterFormat { ref reason, .. } if reason == "must be positive"));

        let value = binder.query_slot(&slot, "").await.unwrap();
        assert_eq!(value, 3);
        assert_eq!(console.lines_at(OutputLevel::Warning).len(), 1);
    }

    #[tokio::test]
    async fn test_end_of_input_cancels() {
        let console = MemoryConsole::new();
        let binder = ParamBinder::new(&console);

        let err = binder.query_param::<String>("Input", "").await.unwrap_err();
        assert!(matches!(err, ShellError::Cancelled { ref slot } if slot == "Input"));
    }
}
