use crate::*;

fn myfunc() -> QualifiedName {
    QualifiedName::parse("myfunc").unwrap()
}

fn create(body: &str) -> CreateFunction {
    CreateFunction {
        name: myfunc(),
        arguments: "a integer, b integer".into(),
        returns: "integer".into(),
        language: "plpgsql".into(),
        volatility: Volatility::Volatile,
        strict: false,
        security_definer: false,
        body: body.into(),
    }
}

#[test]
fn test_create_or_replace() {
    let stmt = FunctionStmt::from(create("BEGIN RETURN 1; END;"));
    insta::assert_snapshot!(render(&stmt), @r#"CREATE OR REPLACE FUNCTION "public"."myfunc"(a integer, b integer) RETURNS integer LANGUAGE plpgsql VOLATILE AS $$BEGIN RETURN 1; END;$$"#);
}

#[test]
fn test_create_or_replace_all_flags() {
    let mut stmt = create("SELECT $1 * 2");
    stmt.name = QualifiedName::parse("math.double").unwrap();
    stmt.arguments = "x integer".into();
    stmt.language = "sql".into();
    stmt.volatility = Volatility::Immutable;
    stmt.strict = true;
    stmt.security_definer = true;

    insta::assert_snapshot!(render(&stmt.into()), @r#"CREATE OR REPLACE FUNCTION "math"."double"(x integer) RETURNS integer LANGUAGE sql IMMUTABLE STRICT SECURITY DEFINER AS $$SELECT $1 * 2$$"#);
}

#[test]
fn test_create_without_arguments_keeps_parens() {
    let mut stmt = create("SELECT now()");
    stmt.arguments = String::new();
    stmt.returns = "timestamp with time zone".into();
    stmt.language = "sql".into();
    stmt.volatility = Volatility::Stable;

    insta::assert_snapshot!(render(&stmt.into()), @r#"CREATE OR REPLACE FUNCTION "public"."myfunc"() RETURNS timestamp with time zone LANGUAGE sql STABLE AS $$SELECT now()$$"#);
}

#[test]
fn test_create_body_with_dollar_quotes() {
    let stmt = create("BEGIN EXECUTE $$SELECT 1$$; RETURN 1; END;");
    insta::assert_snapshot!(render(&stmt.into()), @r#"CREATE OR REPLACE FUNCTION "public"."myfunc"(a integer, b integer) RETURNS integer LANGUAGE plpgsql VOLATILE AS $body$BEGIN EXECUTE $$SELECT 1$$; RETURN 1; END;$body$"#);
}

#[test]
fn test_alter_owner() {
    let stmt = FunctionStmt::from(AlterOwner {
        name: myfunc(),
        signature: None,
        owner: "app_owner".into(),
    });
    insta::assert_snapshot!(render(&stmt), @r#"ALTER FUNCTION "public"."myfunc" OWNER TO "app_owner""#);
}

#[test]
fn test_alter_owner_of_overload() {
    let stmt = FunctionStmt::from(AlterOwner {
        name: myfunc(),
        signature: Some("a integer".into()),
        owner: "app_owner".into(),
    });
    insta::assert_snapshot!(render(&stmt), @r#"ALTER FUNCTION "public"."myfunc"(a integer) OWNER TO "app_owner""#);
}

#[test]
fn test_rename() {
    let stmt = FunctionStmt::from(RenameFunction {
        name: QualifiedName::parse("billing.old_total").unwrap(),
        to: "total".into(),
    });
    insta::assert_snapshot!(render(&stmt), @r#"ALTER FUNCTION "billing"."old_total" RENAME TO "total""#);
}

#[test]
fn test_drop() {
    let plain = FunctionStmt::from(DropFunction {
        name: myfunc(),
        cascade: false,
    });
    let cascade = FunctionStmt::from(DropFunction {
        name: myfunc(),
        cascade: true,
    });
    assert_eq!(render(&plain), r#"DROP FUNCTION "public"."myfunc""#);
    assert_eq!(render(&cascade), r#"DROP FUNCTION "public"."myfunc" CASCADE"#);
}

#[test]
fn test_dollar_tag_avoids_collisions() {
    assert_eq!(dollar_tag("SELECT 1"), "$$");
    assert_eq!(dollar_tag("SELECT '$$'"), "$body$");
    // A trailing `$` would merge with the closing `$$`.
    assert_eq!(dollar_tag("SELECT '$"), "$body$");
    assert_eq!(dollar_tag("$$ and $body$"), "$body_1$");
    assert_eq!(dollar_tag("$$ $body$ $body_1$"), "$body_2$");
}

#[test]
fn test_dollar_quote_round_trips_body() {
    let body = "RETURN '$$';";
    let quoted = dollar_quote(body);
    let tag = dollar_tag(body);
    assert!(quoted.starts_with(&tag));
    assert!(quoted.ends_with(&tag));
    assert_eq!(&quoted[tag.len()..quoted.len() - tag.len()], body);
}

#[test]
fn test_volatility_codes() {
    for v in [
        Volatility::Immutable,
        Volatility::Stable,
        Volatility::Volatile,
    ] {
        assert_eq!(Volatility::from_code(&v.code().to_string()), Some(v));
    }
    assert_eq!(Volatility::from_word("STABLE"), Some(Volatility::Stable));
    assert_eq!(Volatility::from_word("sometimes"), None);
    assert_eq!(Volatility::default(), Volatility::Volatile);
}
