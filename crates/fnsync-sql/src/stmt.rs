//! Function DDL statements.

use crate::QualifiedName;

/// Routine volatility class.
///
/// The catalog stores it as a single letter (`provolatile`), DDL spells it
/// out as a keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Volatility {
    Immutable,
    Stable,
    #[default]
    Volatile,
}

impl Volatility {
    /// Single-letter catalog code.
    pub fn code(self) -> char {
        match self {
            Volatility::Immutable => 'i',
            Volatility::Stable => 's',
            Volatility::Volatile => 'v',
        }
    }

    /// Parse a catalog code (`i`, `s`, `v`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "i" => Some(Volatility::Immutable),
            "s" => Some(Volatility::Stable),
            "v" => Some(Volatility::Volatile),
            _ => None,
        }
    }

    /// Parse a volatility word, case-insensitively.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "immutable" => Some(Volatility::Immutable),
            "stable" => Some(Volatility::Stable),
            "volatile" => Some(Volatility::Volatile),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Volatility::Immutable => "IMMUTABLE",
            Volatility::Stable => "STABLE",
            Volatility::Volatile => "VOLATILE",
        }
    }
}

/// A statement that changes a routine.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionStmt {
    CreateOrReplace(CreateFunction),
    AlterOwner(AlterOwner),
    Rename(RenameFunction),
    Drop(DropFunction),
}

/// `CREATE OR REPLACE FUNCTION`.
///
/// `arguments` and `returns` are type expressions and are embedded as given;
/// `body` is opaque and always ends up behind a dollar-quote delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateFunction {
    pub name: QualifiedName,
    /// Comma-separated argument declarations, possibly empty.
    pub arguments: String,
    pub returns: String,
    pub language: String,
    pub volatility: Volatility,
    pub strict: bool,
    pub security_definer: bool,
    pub body: String,
}

/// `ALTER FUNCTION ... OWNER TO`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterOwner {
    pub name: QualifiedName,
    /// Argument list used to pick one overload among several.
    pub signature: Option<String>,
    pub owner: String,
}

/// `ALTER FUNCTION ... RENAME TO`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameFunction {
    pub name: QualifiedName,
    /// Local name only: a rename never moves the routine to another schema.
    pub to: String,
}

/// `DROP FUNCTION`.
#[derive(Debug, Clone, PartialEq)]
pub struct DropFunction {
    pub name: QualifiedName,
    pub cascade: bool,
}

impl From<CreateFunction> for FunctionStmt {
    fn from(stmt: CreateFunction) -> Self {
        FunctionStmt::CreateOrReplace(stmt)
    }
}

impl From<AlterOwner> for FunctionStmt {
    fn from(stmt: AlterOwner) -> Self {
        FunctionStmt::AlterOwner(stmt)
    }
}

impl From<RenameFunction> for FunctionStmt {
    fn from(stmt: RenameFunction) -> Self {
        FunctionStmt::Rename(stmt)
    }
}

impl From<DropFunction> for FunctionStmt {
    fn from(stmt: DropFunction) -> Self {
        FunctionStmt::Drop(stmt)
    }
}
