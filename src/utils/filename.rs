use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static pattern"))
}

/// Client name reduced to characters safe for a `Content-Disposition` filename.
pub fn sanitize_client_name(name: &str) -> String {
    let cleaned = unsafe_chars().replace_all(name.trim(), "_").into_owned();
    if cleaned.trim_matches('_').is_empty() {
        "Client".to_string()
    } else {
        cleaned
    }
}

/// `<prefix>_<client>_<YYYYMMDD>.pdf`
pub fn report_filename(prefix: &str, client_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.pdf",
        prefix,
        sanitize_client_name(client_name),
        date.format("%Y%m%d")
    )
}
