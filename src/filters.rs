//! Local post-filters applied to upstream pages. Both keep `page` and
//! `total_pages` as upstream sent them, so a filtered page may hold fewer
//! movies than a full one.

use jiff::{Span, civil::Date};

use crate::models::{MovieSummary, Paged};

/// Width of the recent-release window, inclusive of both ends.
pub const RECENT_WINDOW_DAYS: i64 = 21;

/// Keeps movies released between `today - 21 days` and `today`. Movies with a
/// missing or unparseable release date are dropped.
pub fn recent_only(page: &mut Paged<MovieSummary>, today: Date) {
    let cutoff = today.saturating_sub(Span::new().days(RECENT_WINDOW_DAYS));
    page.results.retain(|movie| {
        release_date(movie).is_some_and(|released| released >= cutoff && released <= today)
    });
}

/// Keeps movies whose `vote_average` is at least `min`. A non-positive `min`
/// leaves the page untouched.
pub fn min_rating(page: &mut Paged<MovieSummary>, min: f64) {
    if min.is_nan() || min <= 0.0 {
        return;
    }
    page.results.retain(|movie| movie.vote_average.is_some_and(|v| v >= min));
}

fn release_date(movie: &MovieSummary) -> Option<Date> {
    movie.release_date.as_deref().map(str::trim).filter(|s| !s.is_empty())?.parse().ok()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    fn movie(id: i32, release_date: Option<&str>, vote_average: Option<f64>) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {id}"),
            release_date: release_date.map(str::to_string),
            vote_average,
            ..Default::default()
        }
    }

    fn page(results: Vec<MovieSummary>) -> Paged<MovieSummary> {
        Paged { page: 3, results, total_pages: 50, total_results: Some(1000) }
    }

    #[test]
    fn recent_window_is_inclusive() {
        let today = date(2025, 3, 22);
        let mut p = page(vec![
            movie(1, Some("2025-03-01"), None), // exactly 21 days back
            movie(2, Some("2025-02-28"), None), // 22 days back
            movie(3, Some("2025-03-22"), None), // today
            movie(4, Some("2025-03-10"), None),
        ]);
        recent_only(&mut p, today);
        let ids: Vec<_> = p.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn recent_drops_missing_and_future_dates() {
        let today = date(2025, 3, 22);
        let mut p = page(vec![
            movie(1, None, None),
            movie(2, Some(""), None),
            movie(3, Some("not a date"), None),
            movie(4, Some("2025-04-30"), None),
            movie(5, Some("2025-03-20"), None),
        ]);
        recent_only(&mut p, today);
        assert_eq!(p.results.len(), 1);
        assert_eq!(p.results[0].id, 5);
    }

    #[test]
    fn filtering_keeps_envelope_counts() {
        let mut p = page(vec![movie(1, None, Some(9.0)), movie(2, None, Some(3.0))]);
        min_rating(&mut p, 7.0);
        recent_only(&mut p, date(2025, 1, 1));
        assert!(p.results.is_empty());
        assert_eq!(p.page, 3);
        assert_eq!(p.total_pages, 50);
        assert_eq!(p.total_results, Some(1000));
    }

    #[test]
    fn min_rating_is_inclusive_and_drops_unrated() {
        let mut p = page(vec![
            movie(1, None, Some(7.0)),
            movie(2, None, Some(6.9)),
            movie(3, None, None),
            movie(4, None, Some(8.4)),
        ]);
        min_rating(&mut p, 7.0);
        let ids: Vec<_> = p.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert!(p.results.iter().all(|m| m.vote_average.unwrap() >= 7.0));
    }

    #[test]
    fn zero_min_rating_is_a_no_op() {
        let mut p = page(vec![movie(1, None, None), movie(2, None, Some(1.0))]);
        min_rating(&mut p, 0.0);
        assert_eq!(p.results.len(), 2);
        min_rating(&mut p, f64::NAN);
        assert_eq!(p.results.len(), 2);
    }
}
