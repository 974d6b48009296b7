//! SQL identifier quoting for generated warehouse statements

/// Double-quote an identifier, doubling embedded quotes.
///
/// # Examples
/// ```
/// use sm_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("sale"), r#""sale""#);
/// assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote each dot-separated part of a possibly schema-qualified name.
///
/// # Examples
/// ```
/// use sm_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("mart.customer"), r#""mart"."customer""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split `schema.table` at the last dot; unqualified names live in `main`.
pub fn split_qualified_name(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((schema, table)) => (schema, table),
        None => ("main", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_qualified_unqualified() {
        assert_eq!(quote_qualified("product"), r#""product""#);
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_split_qualified_name() {
        assert_eq!(split_qualified_name("sale"), ("main", "sale"));
        assert_eq!(split_qualified_name("mart.sale"), ("mart", "sale"));
    }
}
