use regex::Regex;
use std::sync::LazyLock;

static CALLBACK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9()_.]{1,128}$").expect("callback pattern is valid")
});

/// Whether `name` may be used to wrap a JSONP response.
pub fn is_valid_callback(name: &str) -> bool {
    CALLBACK_NAME.is_match(name)
}

/// Resolves the argument list from decoded query pairs, in query order.
///
/// Only `arg` and `arg[]` keys are considered. When the last of them is
/// `arg`, its value is the sole argument. When it is `arg[]`, the trailing
/// run of `arg[]` values (back to the closest `arg`) is the argument list.
/// Returns `None` when the query carries neither key.
pub fn parse_legacy_args(pairs: &[(String, String)]) -> Option<Vec<String>> {
    let mut candidates = pairs
        .iter()
        .rev()
        .filter(|(key, _)| key == "arg" || key == "arg[]")
        .peekable();

    let (last_key, last_value) = candidates.peek()?;
    if last_key == "arg" {
        return Some(vec![last_value.clone()]);
    }

    let mut args: Vec<String> = candidates
        .take_while(|(key, _)| key == "arg[]")
        .map(|(_, value)| value.clone())
        .collect();
    args.reverse();
    Some(args)
}
