/// Characters that are not allowed in bare DOT identifiers as we emit them.
const RESERVED: [char; 6] = [':', '&', '<', '>', ' ', ','];

/// Replace each reserved character with `_<codepoint>_`, e.g. `:` becomes `_58_`.
pub fn sanitize_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        if RESERVED.contains(&c) {
            out.push('_');
            out.push_str(&u32::from(c).to_string());
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

/// Node identifier for a thread: `<platform>_<application>_<thread>`, sanitized.
pub fn node_name(platform: &str, application: &str, thread: &str) -> String {
    format!(
        "{}_{}_{}",
        sanitize_component(platform),
        sanitize_component(application),
        sanitize_component(thread)
    )
}

/// Escape text for use inside a GraphViz HTML-like label.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

/// HTML label for a thread node.
///
/// Template arguments start on a new line in a smaller font, and each
/// `, `-separated argument gets its own line.
pub fn thread_label(display_name: &str) -> String {
    let escaped = escape_html(display_name);
    let broken = escaped.replacen("&lt;", "<br/>&lt;", 1);
    broken
        .replace("&lt;", "<font point-size=\"10\">&lt;")
        .replace("&gt;", "&gt;</font>")
        .replace(", ", ",<br/>")
}
