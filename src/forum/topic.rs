//! Topic actions

use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    encode, page_of, parse, require_id, ById, Forum, ForumError, ForumResult, RequestContext,
};
use crate::model::{unix_now, Node, Topic};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TopicPage {
    node: String,
    page: usize,
}

pub(super) fn add(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let principal = ctx.session.require_login()?;
    let parsed: Topic = parse(body)?;

    // Client-supplied author, time and reply marker are ignored
    let topic = Topic {
        node: parsed.node,
        title: parsed.title,
        content: parsed.content,
        author: principal.id,
        time: unix_now(),
        ..Default::default()
    };
    forum.validator().validate(&topic)?;

    if !Node::id_exists(forum.store(), &topic.node)? {
        return Err(ForumError::NotFound("Node"));
    }

    let id = forum.executor().create(&topic)?;
    Ok(Some(json!({ "id": id })))
}

pub(super) fn list(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let query: TopicPage = parse(body)?;
    let (items, total) = Topic::paginate(forum.store(), &query.node, query.page, forum.page_size())?;
    page_of(&items, total, query.page)
}

pub(super) fn info(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let ById { id } = parse(body)?;
    require_id(&id)?;
    let topic = Topic::find_by_id(forum.store(), &id)?.ok_or(ForumError::NotFound("Topic"))?;
    encode(&topic)
}
