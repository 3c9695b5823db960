//! Facet types for the fnsync request file.
//!
//! A request file is a JSON object describing one routine:
//!
//! ```json
//! {
//!   "name": "billing.total",
//!   "language": "plpgsql",
//!   "return_type": "numeric",
//!   "arguments": ["a numeric", "b numeric"],
//!   "source": "BEGIN RETURN a + b; END;",
//!   "volatility": "immutable"
//! }
//! ```
//!
//! Every key except `name` is optional. Which keys may be combined is
//! checked later, by [`fnsync::ReconcileRequest::from_spec`].

use facet::Facet;
use fnsync::{FunctionSpec, State};

/// Accepted values for `state`.
pub const STATE_CHOICES: &[&str] = &["present", "absent"];

/// Accepted values for `volatility`, compared case-insensitively.
pub const VOLATILITY_CHOICES: &[&str] = &["immutable", "stable", "volatile"];

/// Desired state of one routine, as written in a request file.
#[derive(Debug, Clone, Default, Facet)]
pub struct FunctionConfig {
    /// Routine name, `name` or `schema.name`.
    pub name: String,

    /// `present` (the default) or `absent`.
    #[facet(default)]
    pub state: Option<String>,

    /// New local name. Only valid with `state=present` and nothing else.
    #[facet(default)]
    pub rename: Option<String>,

    /// Role that should own the routine.
    #[facet(default)]
    pub owner: Option<String>,

    #[facet(default)]
    pub language: Option<String>,

    #[facet(default)]
    pub return_type: Option<String>,

    /// Routine body, without dollar quotes.
    #[facet(default)]
    pub source: Option<String>,

    /// Argument declarations, one per entry (`"a integer"`).
    #[facet(default)]
    pub arguments: Option<Vec<String>>,

    #[facet(default)]
    pub volatility: Option<String>,

    #[facet(default)]
    pub strict: Option<bool>,

    #[facet(default)]
    pub security_definer: Option<bool>,

    /// Drop dependent objects too. Only meaningful with `state=absent`.
    #[facet(default)]
    pub cascade: Option<bool>,

    /// Skip the injection screen on names, types and roles. Defaults to true.
    #[facet(default)]
    pub trust_input: Option<bool>,
}

impl FunctionConfig {
    /// Parse a request file's contents.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        facet_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check enumerated values and hand over a raw spec.
    pub fn into_spec(self) -> Result<FunctionSpec, ConfigError> {
        let state = match self.state.as_deref() {
            None | Some("present") => State::Present,
            Some("absent") => State::Absent,
            Some(other) => return Err(invalid_choice("state", other, STATE_CHOICES)),
        };

        if let Some(volatility) = &self.volatility {
            let known = VOLATILITY_CHOICES
                .iter()
                .any(|choice| choice.eq_ignore_ascii_case(volatility));
            if !known {
                return Err(invalid_choice("volatility", volatility, VOLATILITY_CHOICES));
            }
        }

        Ok(FunctionSpec {
            name: self.name,
            state,
            rename: self.rename,
            owner: self.owner,
            language: self.language,
            return_type: self.return_type,
            source: self.source,
            arguments: self.arguments,
            volatility: self.volatility,
            strict: self.strict,
            security_definer: self.security_definer,
            cascade: self.cascade.unwrap_or(false),
            trust_input: self.trust_input.unwrap_or(true),
        })
    }
}

fn invalid_choice(field: &'static str, value: &str, choices: &'static [&'static str]) -> ConfigError {
    ConfigError::InvalidChoice {
        field,
        value: value.to_string(),
        choices,
    }
}

/// Errors that can occur when loading a request file.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the file
    Io(String),
    /// The file is not a valid request object
    Parse(String),
    /// An enumerated key has a value outside its choices
    InvalidChoice {
        field: &'static str,
        value: String,
        choices: &'static [&'static str],
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read request file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse request file: {}", e),
            ConfigError::InvalidChoice {
                field,
                value,
                choices,
            } => write!(
                f,
                "value of {} must be one of: {}, got: {}",
                field,
                choices.join(", "),
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
