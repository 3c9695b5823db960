//! Render function statements to SQL text.

use std::fmt;

use crate::stmt::*;
use crate::Ident;

/// Pick a dollar-quote tag that cannot terminate early inside `body`.
///
/// `$$` is preferred. A tag is usable when its first occurrence in
/// `body + tag` is the closing one, which also rules out bodies ending in a
/// partial tag such as a trailing `$`.
pub fn dollar_tag(body: &str) -> String {
    let usable = |tag: &str| format!("{body}{tag}").find(tag) == Some(body.len());

    if usable("$$") {
        return "$$".to_string();
    }
    if usable("$body$") {
        return "$body$".to_string();
    }
    let mut n = 1usize;
    loop {
        let tag = format!("$body_{n}$");
        if usable(&tag) {
            return tag;
        }
        n += 1;
    }
}

/// Wrap `body` in a dollar-quoted literal.
pub fn dollar_quote(body: &str) -> String {
    let tag = dollar_tag(body);
    format!("{tag}{body}{tag}")
}

/// Render a statement to SQL, without a trailing semicolon.
pub fn render(stmt: &FunctionStmt) -> String {
    stmt.to_string()
}

impl fmt::Display for FunctionStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionStmt::CreateOrReplace(s) => fmt::Display::fmt(s, f),
            FunctionStmt::AlterOwner(s) => fmt::Display::fmt(s, f),
            FunctionStmt::Rename(s) => fmt::Display::fmt(s, f),
            FunctionStmt::Drop(s) => fmt::Display::fmt(s, f),
        }
    }
}

impl fmt::Display for CreateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CREATE OR REPLACE FUNCTION {}({}) RETURNS {} LANGUAGE {} {}",
            self.name.quoted(),
            self.arguments,
            self.returns,
            self.language,
            self.volatility.as_sql()
        )?;
        if self.strict {
            write!(f, " STRICT")?;
        }
        if self.security_definer {
            write!(f, " SECURITY DEFINER")?;
        }
        write!(f, " AS {}", dollar_quote(&self.body))
    }
}

impl fmt::Display for AlterOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER FUNCTION {}", self.name.quoted())?;
        if let Some(signature) = &self.signature {
            write!(f, "({})", signature)?;
        }
        write!(f, " OWNER TO {}", Ident(&self.owner))
    }
}

impl fmt::Display for RenameFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALTER FUNCTION {} RENAME TO {}",
            self.name.quoted(),
            Ident(&self.to)
        )
    }
}

impl fmt::Display for DropFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP FUNCTION {}", self.name.quoted())?;
        if self.cascade {
            write!(f, " CASCADE")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
