/// Cleans admin-entered display text (test, slide and category names) with
/// ammonia's whitelist sanitizer before it is stored.
///
/// Script tags are removed together with their content; safe inline markup
/// survives. Plain names without markup pass through unchanged.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}
