use crate::cli::OutputFormat;
use colored::Colorize;
use serde_json::Value;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            println!("{pretty}");
        }
        OutputFormat::Text => {
            print!("{}", format_text(value));
        }
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// One `key: value` line per top-level field.
fn format_text(value: &Value) -> String {
    match value {
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| {
                let rendered = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}: {}\n", k.cyan(), rendered)
            })
            .collect(),
        other => format!("{other}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_renders_strings_unquoted() {
        colored::control::set_override(false);
        let out = format_text(&json!({"sub": "u1", "exp": 600}));
        assert_eq!(out, "exp: 600\nsub: u1\n");
    }
}
