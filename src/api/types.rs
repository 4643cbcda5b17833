//! Content API payloads.

use serde::{Deserialize, Serialize};

/// A user record from `GET /user/{username}.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Ids of the user's stories, comments and polls, newest first.
    #[serde(default)]
    pub submitted: Vec<u64>,
}

/// An item (story, comment, poll...) from `GET /item/{id}.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(default)]
    pub by: Option<String>,
    /// Creation time in unix seconds.
    #[serde(default)]
    pub time: i64,
    /// HTML body, absent for stories without text.
    #[serde(default)]
    pub text: Option<String>,
    /// Direct children, in ranked display order.
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Item {
    /// Whether the item was deleted by its author or killed by moderation.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.deleted || self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let json = r#"{"id":"pg","created":1160418092,"karma":155111,"submitted":[3,2,1]}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "pg");
        assert_eq!(user.submitted, vec![3, 2, 1]);
    }

    #[test]
    fn test_parse_user_without_submissions() {
        let user: User = serde_json::from_str(r#"{"id":"lurker"}"#).unwrap();
        assert!(user.submitted.is_empty());
    }

    #[test]
    fn test_parse_null_user() {
        let user: Option<User> = serde_json::from_str("null").unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn test_parse_comment() {
        let json = r#"{
            "by": "norvig",
            "id": 2921983,
            "kids": [2922097, 2922429],
            "parent": 2921506,
            "text": "Aw shucks, guys ... you make me blush with your compliments.",
            "time": 1314211127,
            "type": "comment"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 2_921_983);
        assert_eq!(item.by.as_deref(), Some("norvig"));
        assert_eq!(item.time, 1_314_211_127);
        assert_eq!(item.kids, vec![2_922_097, 2_922_429]);
        assert!(!item.is_removed());
    }

    #[test]
    fn test_parse_deleted_comment() {
        let json = r#"{"deleted":true,"id":42,"parent":1,"time":1700000000,"type":"comment"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.deleted);
        assert!(item.by.is_none());
        assert!(item.is_removed());
    }

    #[test]
    fn test_parse_dead_comment() {
        let json = r#"{"by":"spam","dead":true,"id":43,"text":"buy now","time":1700000000}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.is_removed());
    }
}
