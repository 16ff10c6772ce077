/// Prefix `https://` unless the input already starts with `http://` or
/// `https://` (ASCII case-insensitive). Nothing else about the URL is checked.
pub fn ensure_https(url: &str) -> String {
    if has_prefix_ignore_case(url, "http://") || has_prefix_ignore_case(url, "https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
