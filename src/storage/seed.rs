//! Sample records for development and demos

use crate::core::entity::{Actor, Movie, Status};
use chrono::{DateTime, NaiveDate, Utc};

/// Seed movies, in store order
pub fn movies() -> Vec<Movie> {
    vec![
        Movie::new("naeeurehnin", "Aladdin")
            .with_release_date(utc_midnight(1992, 11, 25))
            .with_rating(4)
            .with_status(Status::Watched)
            .with_actor("robin"),
        Movie::new("vnyhiorvn", "The Little Mermaid")
            .with_release_date(utc_midnight(1989, 11, 17))
            .with_rating(3),
    ]
}

/// Seed actors, in store order
pub fn actors() -> Vec<Actor> {
    vec![
        Actor::new("robin", "Robin Williams"),
        Actor::new("scott", "Scott Weinger"),
    ]
}

fn utc_midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}
