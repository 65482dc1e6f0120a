use time::macros::format_description;
use time::OffsetDateTime;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Renders how long ago `then` happened, relative to `now`.
///
/// Elapsed time is truncated to whole seconds. Anything under a minute
/// (including timestamps slightly in the future) is "Just now"; from one
/// week on the absolute date is shown, e.g. "March 07, 2024".
pub fn time_ago(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let seconds = (now - then).whole_seconds();

    if seconds < MINUTE {
        "Just now".to_string()
    } else if seconds < HOUR {
        plural(seconds / MINUTE, "minute")
    } else if seconds < DAY {
        plural(seconds / HOUR, "hour")
    } else if seconds < 2 * DAY {
        "Yesterday".to_string()
    } else if seconds < WEEK {
        format!("{} days ago", seconds / DAY)
    } else {
        then.format(format_description!("[month repr:long] [day], [year]"))
            .unwrap_or_else(|_| then.date().to_string())
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}
