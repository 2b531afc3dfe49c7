/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw
/// config text.
///
/// Unresolvable variables without a fallback are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`] with a caller-supplied lookup, so tests never
/// touch the process environment.
pub(crate) fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated placeholder: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };
        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        let resolved = if name.is_empty() {
            None
        } else {
            lookup(name)
                .filter(|value| !value.is_empty() || fallback.is_none())
                .or_else(|| fallback.map(str::to_owned))
        };
        match resolved {
            Some(value) => out.push_str(&value),
            None => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
