//! Reply actions
//!
//! Adding a reply is a sequence of independent writes:
//! insert the reply, move the topic's last-reply marker, then notify the
//! topic author when someone else replied. A failure stops the sequence
//! where it is; earlier writes stay.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{page_of, parse, require_id, Forum, ForumError, ForumResult, RequestContext};
use crate::model::{unix_now, Notice, Replay, Topic, NOTICE_REPLY};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplayPage {
    topic: String,
    page: usize,
}

pub(super) fn add(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let principal = ctx.session.require_login()?;
    let parsed: Replay = parse(body)?;
    require_id(&parsed.topic)?;

    let topic = Topic::find_by_id(forum.store(), &parsed.topic)?
        .ok_or(ForumError::NotFound("Topic"))?;

    let replay = Replay {
        id: String::new(),
        topic: topic.id.clone(),
        author: principal.id.clone(),
        content: parsed.content,
        time: unix_now(),
    };
    let executor = forum.executor();

    let id = executor.create(&replay)?;
    executor.update(&topic.id, &topic.replay_marker(&principal.name, replay.time))?;

    if principal.id != topic.author {
        let notice = Notice {
            kind: NOTICE_REPLY,
            time: replay.time,
            master: topic.author.clone(),
            user: principal.name.clone(),
            topic_id: topic.id.clone(),
            topic_title: topic.title.clone(),
            ..Default::default()
        };
        executor.create(&notice)?;
    }

    Ok(Some(json!({ "id": id })))
}

pub(super) fn list(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let query: ReplayPage = parse(body)?;
    let (items, total) =
        Replay::paginate(forum.store(), &query.topic, query.page, forum.page_size())?;
    page_of(&items, total, query.page)
}
