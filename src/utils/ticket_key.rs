use regex::Regex;
use std::sync::OnceLock;

fn ticket_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]*-\d+$").expect("regex de clave de ticket"))
}

/// Comprueba el formato de una clave de ticket de Jira (PROYECTO-123)
pub fn is_valid_ticket_key(key: &str) -> bool {
    ticket_key_regex().is_match(key.trim())
}
