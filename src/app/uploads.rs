use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Media extensions a wish may carry, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "mp4", "mov", "avi"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi"];

/// Lowercased text after the last dot, if there is a dot at all.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

pub fn allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_video(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduces a client-supplied filename to `[A-Za-z0-9_.-]`.
///
/// Path separators become word breaks, whitespace runs collapse into a single
/// underscore and leading/trailing dots and underscores are stripped, so the
/// result can never point outside the upload directory. May be empty.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// The name an accepted upload is stored under: `<YYYYMMDD_HHMMSS>_<sanitized>`.
///
/// `None` means the upload is rejected and the wish goes out without media:
/// the extension is not allowlisted, or nothing usable survives sanitizing.
pub fn stored_filename(original: &str, now: OffsetDateTime) -> Option<String> {
    if !allowed_file(original) {
        return None;
    }

    let sanitized = secure_filename(original);
    if !allowed_file(&sanitized) {
        return None;
    }

    let stamp = now
        .to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .ok()?;

    Some(format!("{}_{}", stamp, sanitized))
}

const STAMP_LEN: usize = "YYYYMMDD_HHMMSS_".len();

/// Alternative name for a stored upload whose first choice is taken:
/// `20240315_080509_photo.png` becomes `20240315_080509_2_photo.png`.
pub fn numbered_filename(stored: &str, n: u32) -> String {
    match (stored.get(..STAMP_LEN), stored.get(STAMP_LEN..)) {
        (Some(stamp), Some(rest)) => format!("{}{}_{}", stamp, n, rest),
        _ => format!("{}_{}", n, stored),
    }
}
