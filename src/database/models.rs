use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Board membership role. Stored as text in `boards_collaborators.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Collaborator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Collaborator => "Collaborator",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "Owner" => Some(Role::Owner),
            "Collaborator" => Some(Role::Collaborator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct List {
    pub id: Uuid,
    pub board_id: Uuid,
    pub title: String,
    pub position: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: Uuid,
    pub board_id: Uuid,
    pub list_id: Uuid,
    pub title: String,
    pub description: String,
    pub position: f64,
}

/// Membership row joined with the member's profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Collaborator {
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

pub trait Positioned {
    fn position(&self) -> f64;
}

impl Positioned for List {
    fn position(&self) -> f64 {
        self.position
    }
}

impl Positioned for Card {
    fn position(&self) -> f64 {
        self.position
    }
}

/// Ascending sort by position. Positions are opaque client-supplied
/// values; equal positions compare equal, so the (stable) sort preserves
/// their relative input order.
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.position()
            .partial_cmp(&b.position())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(Role::parse("Owner"), Some(Role::Owner));
        assert_eq!(Role::parse("Collaborator"), Some(Role::Collaborator));
        assert_eq!(Role::parse(Role::Owner.as_str()), Some(Role::Owner));
        assert_eq!(Role::parse("owner"), None);
        assert_eq!(Role::parse(""), None);
    }

    struct Item {
        tag: &'static str,
        position: f64,
    }

    impl Positioned for Item {
        fn position(&self) -> f64 {
            self.position
        }
    }

    #[test]
    fn sort_is_ascending_by_position() {
        let mut items = vec![
            Item { tag: "c", position: 3.0 },
            Item { tag: "a", position: 1.0 },
            Item { tag: "b", position: 2.5 },
        ];
        sort_by_position(&mut items);
        let tags: Vec<_> = items.iter().map(|i| i.tag).collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_positions_preserve_input_order() {
        let mut items = vec![
            Item { tag: "first", position: 1.0 },
            Item { tag: "second", position: 1.0 },
            Item { tag: "zero", position: 0.0 },
            Item { tag: "third", position: 1.0 },
        ];
        sort_by_position(&mut items);
        let tags: Vec<_> = items.iter().map(|i| i.tag).collect();
        assert_eq!(tags, vec!["zero", "first", "second", "third"]);
    }
}
