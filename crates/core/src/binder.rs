//! Named-parameter binding for composed SQL.
//!
//! Query templates use `@name` placeholders. [`Statement::prepare`] rewrites
//! them into PostgreSQL positional parameters (`$1`, `$2`, ...) and collects
//! the typed values in ordinal order, so the executable SQL text never
//! depends on a parameter value. The db crate feeds [`Statement::values`]
//! through the driver's typed bind API.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::CoreError;

/// Declared SQL type of a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    SmallInt,
    Int,
    BigInt,
    Float,
    Text,
    Bool,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::SmallInt => "SMALLINT",
            SqlType::Int => "INT",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT8",
            SqlType::Text => "TEXT",
            SqlType::Bool => "BOOL",
        };
        f.write_str(name)
    }
}

/// A parameter value. `Null` is accepted for every declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl SqlValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::SmallInt(_) => "SMALLINT",
            SqlValue::Int(_) => "INT",
            SqlValue::BigInt(_) => "BIGINT",
            SqlValue::Float(_) => "FLOAT8",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Bool(_) => "BOOL",
            SqlValue::Null => "NULL",
        }
    }

    fn matches(&self, ty: SqlType) -> bool {
        matches!(
            (self, ty),
            (SqlValue::Null, _)
                | (SqlValue::SmallInt(_), SqlType::SmallInt)
                | (SqlValue::Int(_), SqlType::Int)
                | (SqlValue::BigInt(_), SqlType::BigInt)
                | (SqlValue::Float(_), SqlType::Float)
                | (SqlValue::Text(_), SqlType::Text)
                | (SqlValue::Bool(_), SqlType::Bool)
        )
    }

    /// Render as a SQL literal. Only used for logging composed statements.
    fn to_literal(&self) -> String {
        match self {
            SqlValue::SmallInt(v) => v.to_string(),
            SqlValue::Int(v) => v.to_string(),
            SqlValue::BigInt(v) => v.to_string(),
            SqlValue::Float(v) if v.is_finite() => format!("{v:?}"),
            SqlValue::Float(_) => "'NaN'::float8".to_string(),
            SqlValue::Text(v) => format!("'{}'", v.replace('\'', "''")),
            SqlValue::Bool(true) => "TRUE".to_string(),
            SqlValue::Bool(false) => "FALSE".to_string(),
            SqlValue::Null => "NULL".to_string(),
        }
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::SmallInt(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// A value together with the type it was declared with.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub ty: SqlType,
    pub value: SqlValue,
}

/// Named parameter map, filled through [`Params::input`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    inner: BTreeMap<String, BoundValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare and bind a parameter.
    ///
    /// Fails with [`CoreError::TypeMismatch`] when the value's variant does
    /// not agree with `ty`. Re-declaring a name replaces the earlier binding.
    pub fn input(
        &mut self,
        name: &str,
        ty: SqlType,
        value: impl Into<SqlValue>,
    ) -> Result<&mut Self, CoreError> {
        let value = value.into();
        if !value.matches(ty) {
            return Err(CoreError::TypeMismatch {
                name: name.to_string(),
                expected: ty,
                actual: value.type_name(),
            });
        }
        self.inner.insert(name.to_string(), BoundValue { ty, value });
        Ok(self)
    }

    /// Merge another parameter map into this one.
    ///
    /// The same name bound to two different values is a composition bug.
    pub fn extend(&mut self, other: Params) -> Result<(), CoreError> {
        for (name, bound) in other.inner {
            match self.inner.get(&name) {
                Some(existing) if *existing != bound => {
                    return Err(CoreError::Internal(format!(
                        "parameter @{name} bound to two different values"
                    )));
                }
                _ => {
                    self.inner.insert(name, bound);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.inner.get(name)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// An executable statement: positional SQL plus values in ordinal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    values: Vec<BoundValue>,
}

impl Statement {
    /// Rewrite `@name` placeholders into `$n` and collect their values.
    ///
    /// A name used more than once keeps a single ordinal. `@` inside a
    /// single-quoted string literal is left untouched. Parameters that the
    /// template never references are ignored.
    pub fn prepare(template: &str, params: &Params) -> Result<Self, CoreError> {
        let mut sql = String::with_capacity(template.len());
        let mut values: Vec<BoundValue> = Vec::new();
        let mut ordinals: BTreeMap<&str, usize> = BTreeMap::new();
        let mut in_literal = false;

        let bytes = template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            if c == b'\'' {
                in_literal = !in_literal;
                sql.push('\'');
                i += 1;
                continue;
            }
            if c == b'@' && !in_literal && i + 1 < bytes.len() && is_ident_start(bytes[i + 1]) {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                let name = &template[start..end];
                let ordinal = match ordinals.get(name) {
                    Some(n) => *n,
                    None => {
                        let bound = params.get(name).ok_or_else(|| CoreError::Binding {
                            placeholder: name.to_string(),
                        })?;
                        values.push(bound.clone());
                        ordinals.insert(name, values.len());
                        values.len()
                    }
                };
                sql.push('$');
                sql.push_str(&ordinal.to_string());
                i = end;
                continue;
            }
            // Copy the full UTF-8 character starting at `i`.
            let ch_len = utf8_len(c);
            sql.push_str(&template[i..i + ch_len]);
            i += ch_len;
        }

        Ok(Self { sql, values })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    /// Render the statement with every value inlined as a quoted literal.
    ///
    /// Intended for debug logs; execution always goes through [`Self::sql`]
    /// and [`Self::values`].
    pub fn to_literal_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let bytes = self.sql.as_bytes();
        let mut in_literal = false;
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            if c == b'\'' {
                in_literal = !in_literal;
            }
            if c == b'$' && !in_literal && i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                let ordinal: usize = self.sql[start..end].parse().unwrap_or(0);
                match ordinal.checked_sub(1).and_then(|idx| self.values.get(idx)) {
                    Some(bound) => out.push_str(&bound.value.to_literal()),
                    None => out.push_str(&self.sql[i..end]),
                }
                i = end;
                continue;
            }
            let ch_len = utf8_len(c);
            out.push_str(&self.sql[i..i + ch_len]);
            i += ch_len;
        }
        out
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn utf8_len(first: u8) -> usize {
    match first {
        b if b < 0x80 => 1,
        b if b >= 0xF0 => 4,
        b if b >= 0xE0 => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn params(entries: &[(&str, SqlType, SqlValue)]) -> Params {
        let mut p = Params::new();
        for (name, ty, value) in entries {
            p.input(name, *ty, value.clone()).unwrap();
        }
        p
    }

    #[test]
    fn placeholders_become_positional() {
        let p = params(&[
            ("min_level", SqlType::Int, SqlValue::Int(80)),
            ("guild", SqlType::Text, SqlValue::Text("%Lions%".into())),
        ]);
        let stmt =
            Statement::prepare("SELECT 1 WHERE lvl >= @min_level AND name ILIKE @guild", &p).unwrap();

        assert_eq!(stmt.sql(), "SELECT 1 WHERE lvl >= $1 AND name ILIKE $2");
        assert_eq!(stmt.values().len(), 2);
        assert_eq!(stmt.values()[0].value, SqlValue::Int(80));
    }

    #[test]
    fn repeated_placeholder_reuses_ordinal() {
        let p = params(&[("offset", SqlType::BigInt, SqlValue::BigInt(10))]);
        let stmt = Statement::prepare("a > @offset AND b > @offset", &p).unwrap();

        assert_eq!(stmt.sql(), "a > $1 AND b > $1");
        assert_eq!(stmt.values().len(), 1);
    }

    #[test]
    fn unknown_placeholder_is_binding_error() {
        let err = Statement::prepare("WHERE x = @missing", &Params::new()).unwrap_err();
        assert_matches!(err, CoreError::Binding { placeholder } if placeholder == "missing");
    }

    #[test]
    fn declared_type_mismatch_is_rejected() {
        let mut p = Params::new();
        let err = p.input("job_type", SqlType::Int, "trader").unwrap_err();

        assert_matches!(
            err,
            CoreError::TypeMismatch { expected: SqlType::Int, actual: "TEXT", .. }
        );
        assert!(p.is_empty());
    }

    #[test]
    fn null_is_accepted_for_any_type() {
        let mut p = Params::new();
        p.input("guild", SqlType::Text, None::<String>).unwrap();
        assert_eq!(p.get("guild").unwrap().value, SqlValue::Null);
    }

    #[test]
    fn at_sign_inside_string_literal_is_not_a_placeholder() {
        let stmt = Statement::prepare("SELECT 'mail@host' AS x", &Params::new()).unwrap();
        assert_eq!(stmt.sql(), "SELECT 'mail@host' AS x");
    }

    #[test]
    fn hostile_value_never_changes_sql_text() {
        let hostile = "x'; DROP TABLE _char; --";
        let p = params(&[("name", SqlType::Text, SqlValue::Text(hostile.into()))]);
        let stmt = Statement::prepare("SELECT * FROM _char WHERE char_name16 = @name", &p).unwrap();

        assert_eq!(stmt.sql(), "SELECT * FROM _char WHERE char_name16 = $1");
        assert!(!stmt.sql().contains("DROP"));
    }

    #[test]
    fn literal_rendering_escapes_quotes() {
        let p = params(&[
            ("name", SqlType::Text, SqlValue::Text("O'Neil".into())),
            ("lvl", SqlType::Int, SqlValue::Int(5)),
            ("flag", SqlType::Bool, SqlValue::Bool(true)),
        ]);
        let stmt = Statement::prepare("n = @name AND l = @lvl AND f = @flag", &p).unwrap();

        assert_eq!(stmt.to_literal_sql(), "n = 'O''Neil' AND l = 5 AND f = TRUE");
    }

    #[test]
    fn non_ascii_text_survives_rewrite() {
        let p = params(&[("n", SqlType::Text, SqlValue::Text("x".into()))]);
        let stmt = Statement::prepare("SELECT 'ünï' || @n", &p).unwrap();
        assert_eq!(stmt.sql(), "SELECT 'ünï' || $1");
    }

    #[test]
    fn extend_rejects_conflicting_duplicate() {
        let mut a = params(&[("x", SqlType::Int, SqlValue::Int(1))]);
        let b = params(&[("x", SqlType::Int, SqlValue::Int(2))]);
        assert_matches!(a.extend(b), Err(CoreError::Internal(_)));
    }
}
