//! `${VAR}` placeholder expansion for raw config text.

/// Expand `${VAR}` placeholders from the process environment.
///
/// Unknown variables and unterminated placeholders are kept verbatim so a
/// typo shows up in the loaded value instead of silently becoming empty.
pub fn substitute_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match (!name.is_empty()).then(|| lookup(name)).flatten() {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variables() {
        assert_eq!(
            expand_with("api_key = \"${OPENAI_API_KEY}\"\nport = ${PORT}", lookup),
            "api_key = \"sk-test\"\nport = 9000"
        );
    }

    #[test]
    fn keeps_unknown_variables() {
        assert_eq!(expand_with("${NOPE}", lookup), "${NOPE}");
        assert_eq!(expand_with("${}", lookup), "${}");
    }

    #[test]
    fn keeps_unterminated_placeholder() {
        assert_eq!(expand_with("a ${PORT", lookup), "a ${PORT");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(substitute_env("greeting = \"hi\""), "greeting = \"hi\"");
    }
}
