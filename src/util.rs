//! Small shared helpers.

/// Render an argv as a copy-pasteable shell line.
pub(crate) fn format_command_line(argv: &[String]) -> String {
    let parts: Vec<String> = argv.iter().map(|arg| shell_quote(arg)).collect();
    parts.join(" ")
}

fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg.chars().all(|ch| {
        matches!(
            ch,
            'a'..='z'
                | 'A'..='Z'
                | '0'..='9'
                | '_'
                | '-'
                | '.'
                | '/'
                | ':'
                | '@'
                | '+'
                | '='
        )
    });
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}
