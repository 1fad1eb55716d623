//! Entity types served by the engine: movies, actors and their inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Base trait for all entities held by an [`EntityStore`](crate::core::store::EntityStore).
///
/// Every entity has a stable string id and can be built from its mutation
/// payload. The payload type is what `create` receives; building the entity
/// is where a missing id gets assigned.
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    /// Payload accepted by `create`
    type Input: Send + 'static;

    /// Singular type name (e.g., "movie"), used in logs and errors
    fn type_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> &str;

    /// Build a complete entity from a creation payload
    fn from_input(input: Self::Input) -> Self;
}

/// Viewing status of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Watched,
    Interested,
    NotInterested,
    Unknown,
}

impl Status {
    /// Wire/storage name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Watched => "WATCHED",
            Status::Interested => "INTERESTED",
            Status::NotInterested => "NOT_INTERESTED",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WATCHED" => Ok(Status::Watched),
            "INTERESTED" => Ok(Status::Interested),
            "NOT_INTERESTED" => Ok(Status::NotInterested),
            "UNKNOWN" => Ok(Status::Unknown),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Reference from a movie to an actor. Only the id is held, never actor data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorRef {
    pub id: String,
}

impl ActorRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A movie record as owned by the movie store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub actor: Vec<ActorRef>,
}

impl Movie {
    /// Create a movie with only an id and a title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            release_date: None,
            rating: None,
            status: None,
            actor: Vec::new(),
        }
    }

    pub fn with_release_date(mut self, date: DateTime<Utc>) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor.push(ActorRef::new(actor_id));
        self
    }

    /// Ids referenced by the `actor` list, in reference order
    pub fn actor_ids(&self) -> impl Iterator<Item = &str> {
        self.actor.iter().map(|r| r.id.as_str())
    }
}

impl Entity for Movie {
    type Input = MovieInput;

    fn type_name() -> &'static str {
        "movie"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(input: MovieInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(generate_id),
            title: input.title,
            release_date: input.release_date,
            rating: input.rating,
            status: input.status,
            actor: input.actor.unwrap_or_default(),
        }
    }
}

/// Mutation payload for a movie. Every field is optional and actor entries
/// are id-only references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MovieInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub actor: Option<Vec<ActorRef>>,
}

/// An actor record. `name` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Creation payload for an actor; the name is mandatory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

impl Entity for Actor {
    type Input = ActorInput;

    fn type_name() -> &'static str {
        "actor"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_input(input: ActorInput) -> Self {
        Self {
            id: input.id.unwrap_or_else(generate_id),
            name: input.name,
        }
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_movie_serializes_with_wire_field_names() {
        let movie = Movie::new("m1", "Aladdin")
            .with_rating(4)
            .with_status(Status::NotInterested)
            .with_actor("robin");

        let value = serde_json::to_value(&movie).unwrap();
        assert_eq!(value["id"], "m1");
        assert_eq!(value["rating"], 4);
        assert_eq!(value["status"], "NOT_INTERESTED");
        assert_eq!(value["actor"], json!([{ "id": "robin" }]));
        assert!(value.get("releaseDate").is_some());
    }

    #[test]
    fn test_from_input_generates_missing_id() {
        let movie = Movie::from_input(MovieInput {
            title: Some("Hook".into()),
            ..Default::default()
        });
        assert!(Uuid::parse_str(&movie.id).is_ok());
        assert_eq!(movie.title.as_deref(), Some("Hook"));
        assert!(movie.actor.is_empty());
    }

    #[test]
    fn test_from_input_keeps_explicit_id() {
        let actor = Actor::from_input(ActorInput {
            id: Some("robin".into()),
            name: "Robin Williams".into(),
        });
        assert_eq!(actor.id(), "robin");
    }

    #[test]
    fn test_movie_input_rejects_nested_actor_data() {
        let nested = json!({ "title": "Hook", "actor": [{ "id": "robin", "name": "Robin" }] });
        assert!(serde_json::from_value::<MovieInput>(nested).is_err());

        let by_id = json!({ "title": "Hook", "actor": [{ "id": "robin" }] });
        let input: MovieInput = serde_json::from_value(by_id).unwrap();
        assert_eq!(input.actor.unwrap(), vec![ActorRef::new("robin")]);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            Status::Watched,
            Status::Interested,
            Status::NotInterested,
            Status::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<Status>().unwrap(), status);
        }
        assert!("SEEN".parse::<Status>().is_err());
    }
}
