use crate::bot::Bot;
use alloc::boxed::Box;
use db::PollStore;
use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::{HeaderValue, CONTENT_TYPE},
    Method, Request, Response, StatusCode,
};
use model::hook::{Post, Reply, ResponseType};

/// HTTP front for the chat server's outgoing webhook.
pub struct Hook<S> {
    bot: Bot<S>,
    /// Shared secret that every inbound post must carry, if configured.
    token: Option<Box<str>>,
}

impl<S: PollStore> Hook<S> {
    pub fn new(bot: Bot<S>, token: Option<Box<str>>) -> Self {
        Self { bot, token }
    }

    pub fn bot(&self) -> &Bot<S> {
        &self.bot
    }

    pub fn into_bot(self) -> Bot<S> {
        self.bot
    }

    /// Same as [`Hook::try_respond`], but failures are turned into empty responses.
    pub async fn respond<B: Body>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        self.try_respond(req).await.unwrap_or_else(|status| {
            let mut res = Response::new(Full::default());
            *res.status_mut() = status;
            res
        })
    }

    pub async fn try_respond<B: Body>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, StatusCode> {
        // Disallow non-POST methods and unexpected paths
        if req.method() != Method::POST || req.uri().path() != "/" {
            return Err(StatusCode::NOT_FOUND);
        }

        // Parse incoming post
        let payload = req.into_body().collect().await.map_err(|_| StatusCode::BAD_REQUEST)?.to_bytes();
        let post: Post = serde_json::from_slice(&payload).map_err(|_| StatusCode::BAD_REQUEST)?;
        drop(payload);

        if let Some(expected) = self.token.as_deref() {
            if post.token.as_deref() != Some(expected) {
                log::warn!("rejected post {} from user {} with a bad token", post.post_id, post.user_id);
                return Err(StatusCode::UNAUTHORIZED);
            }
        }

        // Messages that are not addressed to us get an empty acknowledgement.
        let Some(text) = self.bot.on_post(&post).await else {
            return Ok(Response::new(Full::default()));
        };

        let reply = Reply { text: &text, response_type: ResponseType::Comment };
        let bytes = serde_json::to_vec(&reply).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        let mut res = Response::new(Full::new(Bytes::from(bytes)));
        res.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(res)
    }
}
