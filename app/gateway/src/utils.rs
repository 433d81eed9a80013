//! Gateway utility functions.

/// Expand `${VAR}` and `${VAR:-default}` patterns with environment
/// variable values.
///
/// Unset variables without a default expand to an empty string, which
/// [`GatewayConfig::validate`](crate::GatewayConfig::validate) then
/// reports for required settings.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }

        chars.next();
        let mut expr = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            expr.push(c);
        }
        if !closed {
            // Unterminated, keep it verbatim.
            result.push_str("${");
            result.push_str(&expr);
            continue;
        }

        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (expr.as_str(), None),
        };
        match std::env::var(name) {
            Ok(val) if !val.is_empty() => result.push_str(&val),
            _ => result.push_str(fallback.unwrap_or_default()),
        }
    }

    result
}
