//! TMDB image CDN URLs and small display helpers.

pub const POSTER_SIZES: [&str; 7] = ["w92", "w154", "w185", "w342", "w500", "w780", "original"];
pub const BACKDROP_SIZES: [&str; 4] = ["w300", "w780", "w1280", "original"];
pub const PROFILE_SIZES: [&str; 4] = ["w45", "w185", "h632", "original"];

pub const DEFAULT_POSTER_SIZE: &str = "w342";
pub const DEFAULT_BACKDROP_SIZE: &str = "w1280";
pub const DEFAULT_PROFILE_SIZE: &str = "w185";

pub const POSTER_PLACEHOLDER: &str = "/default-poster.png";
pub const BACKDROP_PLACEHOLDER: &str = "https://i.ibb.co/8X7hTpN/404-movie-poster-default.jpg";
pub const PROFILE_PLACEHOLDER: &str = "https://i.ibb.co/0QpRBRb/404-movie-profile-default.jpg";

pub fn poster_url(base: &str, path: Option<&str>, size: &str) -> String {
    image_url(base, path, size, POSTER_PLACEHOLDER)
}

pub fn backdrop_url(base: &str, path: Option<&str>, size: &str) -> String {
    image_url(base, path, size, BACKDROP_PLACEHOLDER)
}

pub fn profile_url(base: &str, path: Option<&str>, size: &str) -> String {
    image_url(base, path, size, PROFILE_PLACEHOLDER)
}

fn image_url(base: &str, path: Option<&str>, size: &str, placeholder: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}/{size}{path}", base.trim_end_matches('/')),
        None => placeholder.to_string(),
    }
}

/// `139` → `"2h 19m"`, `45` → `"45 min"`.
pub fn format_runtime(minutes: i32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours == 0 { format!("{rest} min") } else { format!("{hours}h {rest}m") }
}

pub fn year_of(release_date: Option<&str>) -> Option<i16> {
    let date: jiff::civil::Date = release_date?.trim().parse().ok()?;
    Some(date.year())
}
