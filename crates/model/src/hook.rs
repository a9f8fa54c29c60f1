//! Wire format of an outgoing webhook as posted by the chat server.

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// A message that was posted in a channel watched by the webhook.
#[derive(Debug, Deserialize)]
pub struct Post {
    /// Shared secret configured on the chat server.
    #[serde(default)]
    pub token: Option<String>,
    /// Author of the message.
    pub user_id: String,
    /// Conversation in which the message was posted.
    pub channel_id: String,
    /// The message itself. Replies are threaded under it.
    pub post_id: String,
    /// Raw message text.
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Threads the reply under the triggering post.
    Comment,
}

#[derive(Debug, Serialize)]
pub struct Reply<'text> {
    pub text: &'text str,
    pub response_type: ResponseType,
}

#[cfg(test)]
mod tests {
    use super::{Post, Reply, ResponseType};

    #[test]
    fn ignores_unknown_fields() {
        let post: Post = serde_json::from_str(
            r#"{
                "token": "secret",
                "team_id": "t1",
                "channel_id": "c1",
                "channel_name": "town-square",
                "timestamp": 1700000000000,
                "user_id": "u1",
                "user_name": "alice",
                "post_id": "p1",
                "text": "/vote results abc",
                "trigger_word": "/vote",
                "file_ids": ""
            }"#,
        )
        .unwrap();
        assert_eq!(post.token.as_deref(), Some("secret"));
        assert_eq!(post.user_id, "u1");
        assert_eq!(post.channel_id, "c1");
        assert_eq!(post.post_id, "p1");
        assert_eq!(post.text, "/vote results abc");
    }

    #[test]
    fn token_is_optional() {
        let post: Post =
            serde_json::from_str(r#"{"user_id":"u1","channel_id":"c1","post_id":"p1","text":"/vote"}"#).unwrap();
        assert!(post.token.is_none());
    }

    #[test]
    fn replies_as_comment() {
        let reply = Reply { text: "Poll ended!", response_type: ResponseType::Comment };
        assert_eq!(serde_json::to_string(&reply).unwrap(), r#"{"text":"Poll ended!","response_type":"comment"}"#);
    }
}
