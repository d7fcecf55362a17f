use serde::{Deserialize, Serialize};

use super::MovieId;

/// Direction of a user's vote on a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteType {
    Up,
    Down,
}

/// A single user vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieVote {
    pub user_id: String,
    pub movie_id: MovieId,
    pub vote_type: VoteType,
}

impl MovieVote {
    pub fn up(user_id: impl Into<String>, movie_id: MovieId) -> Self {
        Self {
            user_id: user_id.into(),
            movie_id,
            vote_type: VoteType::Up,
        }
    }

    pub fn down(user_id: impl Into<String>, movie_id: MovieId) -> Self {
        Self {
            user_id: user_id.into(),
            movie_id,
            vote_type: VoteType::Down,
        }
    }
}
