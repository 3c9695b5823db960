//! Reconciliation requests.
//!
//! A [`FunctionSpec`] is the loosely-typed payload handed over by whatever
//! parsed the configuration. [`ReconcileRequest::from_spec`] validates it
//! once, before any catalog access, and produces an immutable request whose
//! [`Mode`] makes the present / absent / rename semantics mutually exclusive
//! by construction.

use fnsync_sql::{ObjectKind, QualifiedName, split_segments};

use crate::normalize::normalize;
use crate::{Error, FunctionRecord, Result, safety};

/// Requested existence of the routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Raw desired state, one field per configuration option.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub state: State,
    pub rename: Option<String>,
    pub owner: Option<String>,
    pub language: Option<String>,
    pub return_type: Option<String>,
    pub source: Option<String>,
    pub arguments: Option<Vec<String>>,
    pub volatility: Option<String>,
    pub strict: Option<bool>,
    pub security_definer: Option<bool>,
    pub cascade: bool,
    pub trust_input: bool,
}

impl Default for FunctionSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            state: State::Present,
            rename: None,
            owner: None,
            language: None,
            return_type: None,
            source: None,
            arguments: None,
            volatility: None,
            strict: None,
            security_definer: None,
            cascade: false,
            trust_input: true,
        }
    }
}

impl FunctionSpec {
    /// Names of the set options that only make sense with `state=present`.
    ///
    /// An explicit `false` for a flag reads the same as leaving it out.
    fn present_only_fields(&self) -> Vec<&'static str> {
        [
            ("language", self.language.is_some()),
            ("return_type", self.return_type.is_some()),
            ("source", self.source.is_some()),
            ("volatility", self.volatility.is_some()),
            ("strict", self.strict == Some(true)),
            ("security_definer", self.security_definer == Some(true)),
            ("owner", self.owner.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }
}

/// What the request asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Converge on this record.
    Present(FunctionRecord),
    /// Make sure the routine does not exist.
    Absent,
    /// Rename the routine to this local name, within its schema.
    Rename(String),
}

/// A validated request, built once per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    name: QualifiedName,
    mode: Mode,
    cascade: bool,
    trust_input: bool,
}

impl ReconcileRequest {
    /// Validate a raw spec.
    ///
    /// Fails with [`Error::Configuration`] on unsafe input (when input is not
    /// trusted), a malformed name, mutually exclusive options, or a missing
    /// required field.
    pub fn from_spec(spec: &FunctionSpec) -> Result<Self> {
        if !spec.trust_input {
            safety::check_spec(spec)?;
        }

        let name = QualifiedName::parse(&spec.name)?;
        let conflicting = spec.present_only_fields();

        let mode = match (spec.state, &spec.rename) {
            (State::Absent, Some(_)) => {
                return Err(Error::Configuration(format!(
                    "{}: state=absent is mutually exclusive with: rename",
                    spec.name
                )));
            }
            (State::Absent, None) => {
                if !conflicting.is_empty() {
                    return Err(Error::Configuration(format!(
                        "{}: state=absent is mutually exclusive with: {}",
                        spec.name,
                        conflicting.join(", ")
                    )));
                }
                Mode::Absent
            }
            (State::Present, Some(to)) => {
                if !conflicting.is_empty() {
                    return Err(Error::Configuration(format!(
                        "{}: rename is mutually exclusive with: {}",
                        spec.name,
                        conflicting.join(", ")
                    )));
                }
                Mode::Rename(rename_target(&name, to)?)
            }
            (State::Present, None) => Mode::Present(normalize(&name, spec)?),
        };

        Ok(Self {
            name,
            mode,
            cascade: spec.cascade,
            trust_input: spec.trust_input,
        })
    }

    /// Converge on `desired`, which also names the routine.
    pub fn present(desired: FunctionRecord) -> Self {
        Self {
            name: desired.name.clone(),
            mode: Mode::Present(desired),
            cascade: false,
            trust_input: true,
        }
    }

    /// Drop `name` if it exists.
    pub fn absent(name: QualifiedName, cascade: bool) -> Self {
        Self {
            name,
            mode: Mode::Absent,
            cascade,
            trust_input: true,
        }
    }

    /// Rename `name` to `to`, which may be bare or qualified with the same schema.
    pub fn rename(name: QualifiedName, to: &str) -> Result<Self> {
        let to = rename_target(&name, to)?;
        Ok(Self {
            name,
            mode: Mode::Rename(to),
            cascade: false,
            trust_input: true,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn cascade(&self) -> bool {
        self.cascade
    }

    /// Whether the raw input was exempt from the safety screen.
    pub fn trust_input(&self) -> bool {
        self.trust_input
    }

    /// The desired record, in `present` mode.
    pub fn desired(&self) -> Option<&FunctionRecord> {
        match &self.mode {
            Mode::Present(desired) => Some(desired),
            Mode::Absent | Mode::Rename(_) => None,
        }
    }

    /// The name the routine should have once reconciled.
    pub fn target_name(&self) -> QualifiedName {
        match &self.mode {
            Mode::Rename(to) => self.name.with_name(to.clone()),
            Mode::Present(_) | Mode::Absent => self.name.clone(),
        }
    }
}

/// Resolve a rename target to a local name in `name`'s schema.
fn rename_target(name: &QualifiedName, to: &str) -> Result<String> {
    match split_segments(to, ObjectKind::Function)?.as_slice() {
        [schema, _] if *schema != name.schema() => Err(Error::Configuration(format!(
            "{}: cannot rename into schema '{}'; a rename stays within '{}'",
            name,
            schema,
            name.schema()
        ))),
        [.., local] => Ok(local.to_string()),
        [] => Err(Error::Configuration(format!(
            "{}: rename target is empty",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present_spec() -> FunctionSpec {
        FunctionSpec {
            name: "myfunc".into(),
            language: Some("plpgsql".into()),
            return_type: Some("integer".into()),
            source: Some("BEGIN RETURN 1; END;".into()),
            arguments: Some(vec!["a integer".into(), "b integer".into()]),
            ..Default::default()
        }
    }

    fn config_err(spec: &FunctionSpec) -> String {
        match ReconcileRequest::from_spec(spec) {
            Err(Error::Configuration(msg)) => msg,
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_present_request() {
        let request = ReconcileRequest::from_spec(&present_spec()).unwrap();
        assert_eq!(request.name().to_string(), "public.myfunc");
        let desired = request.desired().unwrap();
        assert_eq!(desired.arguments, "a integer, b integer");
        assert_eq!(desired.language, "plpgsql");
    }

    #[test]
    fn test_absent_rejects_present_only_fields() {
        let setters: [fn(&mut FunctionSpec); 7] = [
            |s: &mut FunctionSpec| s.language = Some("sql".into()),
            |s: &mut FunctionSpec| s.return_type = Some("integer".into()),
            |s: &mut FunctionSpec| s.source = Some("SELECT 1".into()),
            |s: &mut FunctionSpec| s.volatility = Some("stable".into()),
            |s: &mut FunctionSpec| s.strict = Some(true),
            |s: &mut FunctionSpec| s.security_definer = Some(true),
            |s: &mut FunctionSpec| s.owner = Some("alice".into()),
        ];
        for set in setters {
            let mut spec = FunctionSpec {
                name: "myfunc".into(),
                state: State::Absent,
                ..Default::default()
            };
            set(&mut spec);
            let msg = config_err(&spec);
            assert!(msg.contains("state=absent is mutually exclusive"), "{msg}");
        }
    }

    #[test]
    fn test_absent_accepts_false_flags() {
        let spec = FunctionSpec {
            name: "myfunc".into(),
            state: State::Absent,
            strict: Some(false),
            security_definer: Some(false),
            ..Default::default()
        };
        let request = ReconcileRequest::from_spec(&spec).unwrap();
        assert_eq!(request.mode(), &Mode::Absent);

        let spec = FunctionSpec {
            name: "myfunc".into(),
            rename: Some("other".into()),
            strict: Some(false),
            ..Default::default()
        };
        assert!(ReconcileRequest::from_spec(&spec).is_ok());
    }

    #[test]
    fn test_absent_rejects_rename() {
        let spec = FunctionSpec {
            name: "myfunc".into(),
            state: State::Absent,
            rename: Some("other".into()),
            ..Default::default()
        };
        assert!(config_err(&spec).contains("rename"));
    }

    #[test]
    fn test_rename_rejects_present_only_fields() {
        let mut spec = present_spec();
        spec.rename = Some("other".into());
        let msg = config_err(&spec);
        assert!(
            msg.contains("rename is mutually exclusive with: language, return_type, source"),
            "{msg}"
        );
    }

    #[test]
    fn test_rename_target_schema() {
        let name = QualifiedName::parse("billing.old").unwrap();
        let same = ReconcileRequest::rename(name.clone(), "billing.new").unwrap();
        assert_eq!(same.mode(), &Mode::Rename("new".into()));
        assert_eq!(same.target_name().to_string(), "billing.new");

        let bare = ReconcileRequest::rename(name.clone(), "new").unwrap();
        assert_eq!(bare.mode(), &Mode::Rename("new".into()));

        assert!(matches!(
            ReconcileRequest::rename(name, "other.new"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_present_requires_fields() {
        let mut spec = present_spec();
        spec.return_type = None;
        assert!(config_err(&spec).contains("'return_type'"));
    }

    #[test]
    fn test_malformed_name() {
        let mut spec = present_spec();
        spec.name = "a.b.c".into();
        config_err(&spec);
        spec.name = String::new();
        config_err(&spec);
    }

    #[test]
    fn test_untrusted_input_is_screened() {
        let mut spec = present_spec();
        spec.trust_input = false;
        spec.owner = Some("alice; DROP ROLE bob".into());
        assert!(config_err(&spec).contains("'owner'"));

        spec.trust_input = true;
        assert!(ReconcileRequest::from_spec(&spec).is_ok());
    }
}
