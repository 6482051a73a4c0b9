use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A platform user. Account provisioning lives elsewhere; this server only
/// reads the row referenced by a validated session.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A community that users join and post into.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Membership row; the (community_id, user_id) pair is unique.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct CommunityMember {
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

// Stored as TEXT; the database CHECK constraint mirrors these variants.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Moderator,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct CommunityTag {
    pub id: Uuid,
    pub community_id: Uuid,
    pub name: String,
}

/// A post within a community. Content is the only mutable field.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub community_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post together with its read-time aggregates. Counts are computed by
/// counting related rows; no denormalized counters exist.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct PostDetail {
    pub id: Uuid,
    pub community_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub like_count: i64,
    pub save_count: i64,
    pub comment_count: i64,
    pub score: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A like or save marker; existence of the row is the whole signal.
#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Reaction {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Vote {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: i16,
    pub created_at: DateTime<Utc>,
}

/// A user's standing vote on a post. Neutral is row absence; the database
/// never stores a zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteState {
    Neutral,
    Upvoted,
    Downvoted,
}

/// What a cast has to do to the stored row, decided by comparing the
/// requested value against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    Create,
    Switch,
    Remove,
}

impl VoteState {
    pub fn from_stored(vote_type: Option<i16>) -> Self {
        match vote_type {
            None => VoteState::Neutral,
            Some(v) if v > 0 => VoteState::Upvoted,
            Some(_) => VoteState::Downvoted,
        }
    }

    /// Transition rules for a cast: no row yet creates one, a different
    /// value switches in place, the same value removes the row (second
    /// click undoes the vote).
    pub fn cast(self, requested: i16) -> VoteTransition {
        let requested_state = if requested > 0 {
            VoteState::Upvoted
        } else {
            VoteState::Downvoted
        };
        match (self, requested_state) {
            (VoteState::Neutral, _) => VoteTransition::Create,
            (current, wanted) if current == wanted => VoteTransition::Remove,
            _ => VoteTransition::Switch,
        }
    }
}

/// Server identity returned from the root route.
#[derive(Serialize)]
pub struct ServerInfo {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_cast_creates() {
        assert_eq!(VoteState::Neutral.cast(1), VoteTransition::Create);
        assert_eq!(VoteState::Neutral.cast(-1), VoteTransition::Create);
    }

    #[test]
    fn repeated_cast_removes() {
        assert_eq!(VoteState::Upvoted.cast(1), VoteTransition::Remove);
        assert_eq!(VoteState::Downvoted.cast(-1), VoteTransition::Remove);
    }

    #[test]
    fn opposite_cast_switches() {
        assert_eq!(VoteState::Upvoted.cast(-1), VoteTransition::Switch);
        assert_eq!(VoteState::Downvoted.cast(1), VoteTransition::Switch);
    }

    #[test]
    fn stored_value_maps_to_state() {
        assert_eq!(VoteState::from_stored(None), VoteState::Neutral);
        assert_eq!(VoteState::from_stored(Some(1)), VoteState::Upvoted);
        assert_eq!(VoteState::from_stored(Some(-1)), VoteState::Downvoted);
    }
}
