pub const WATCH_URL: &str = "https://www.youtube.com/watch";

/// Watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("{}?v={}", WATCH_URL, video_id)
}

/// Strip backslashes that shells leave in pasted ids
pub fn sanitize_video_id(video_id: &str) -> String {
    video_id.replace('\\', "")
}

/// Format seconds as `HH:MM:SS{separator}mmm`
pub fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1_000;
    let millis = total_millis % 1_000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}

/// Parse a float attribute, tolerating surrounding whitespace
pub fn parse_seconds(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
