//! Notice actions. All of them act on the logged-in user's own notices.

use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, require_id, ById, Forum, ForumError, ForumResult, RequestContext};
use crate::auth::Principal;
use crate::model::Notice;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoticePage {
    page: usize,
}

pub(super) fn list(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let principal = ctx.session.require_login()?;
    let query: NoticePage = parse(body)?;

    let store = forum.store();
    let (items, total) = Notice::paginate(store, &principal.id, query.page, forum.page_size())?;
    let unread = Notice::unread_count(store, &principal.id)?;

    Ok(Some(json!({
        "items": serde_json::to_value(&items)?,
        "total": total,
        "page": query.page.max(1),
        "unread": unread,
    })))
}

pub(super) fn read(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let principal = ctx.session.require_login()?;
    let ById { id } = parse(body)?;
    owned_notice(forum, &principal, &id)?;

    let patch = Notice {
        read: true,
        ..Default::default()
    };
    forum.executor().update(&id, &patch)?;
    Ok(None)
}

pub(super) fn remove(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let principal = ctx.session.require_login()?;
    let ById { id } = parse(body)?;
    require_id(&id)?;

    // Already gone counts as removed
    match Notice::find_by_id(forum.store(), &id)? {
        Some(notice) if notice.master != principal.id => Err(ForumError::NotFound("Notice")),
        _ => {
            forum.executor().remove::<Notice>(&id)?;
            Ok(None)
        }
    }
}

/// Someone else's notice is reported as missing
fn owned_notice(forum: &Forum, principal: &Principal, id: &str) -> ForumResult<Notice> {
    require_id(id)?;
    Notice::find_by_id(forum.store(), id)?
        .filter(|notice| notice.master == principal.id)
        .ok_or(ForumError::NotFound("Notice"))
}
