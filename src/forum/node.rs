//! Node actions

use serde::Deserialize;
use serde_json::{json, Value};

use super::{encode, parse, require_id, ById, Forum, ForumError, ForumResult};
use crate::model::Node;
use crate::schema::ValidationFailure;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeQuery {
    id: String,
    name: String,
}

pub(super) fn add(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let node: Node = parse(body)?;
    forum.validator().validate(&node)?;

    let store = forum.store();
    if Node::name_exists(store, &node.name)? {
        return Err(ForumError::Conflict("node name already exists".into()));
    }
    if !node.parent.is_empty() && !Node::id_exists(store, &node.parent)? {
        return Err(ForumError::NotFound("Parent node"));
    }

    let id = forum.executor().create(&node)?;
    Ok(Some(json!({ "id": id })))
}

/// Sparse update: only the fields present in the body change
pub(super) fn save(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let node: Node = parse(body)?;
    require_id(&node.id)?;
    forum.validator().validate_patch(&node)?;

    let store = forum.store();
    if !node.name.is_empty() {
        if let Some(existing) = Node::find_by_name(store, &node.name)? {
            if existing.id != node.id {
                return Err(ForumError::Conflict("node name already exists".into()));
            }
        }
    }
    if !node.parent.is_empty() {
        if node.parent == node.id {
            return Err(ForumError::Conflict("node cannot be its own parent".into()));
        }
        if !Node::id_exists(store, &node.parent)? {
            return Err(ForumError::NotFound("Parent node"));
        }
    }

    forum.executor().update(&node.id, &node)?;
    Ok(None)
}

/// Refused while anything still hangs off the node
pub(super) fn remove(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let ById { id } = parse(body)?;
    require_id(&id)?;

    let store = forum.store();
    if Node::has_child(store, &id)? {
        return Err(ForumError::Conflict("node still has child nodes".into()));
    }
    if Node::has_topic(store, &id)? {
        return Err(ForumError::Conflict("node still has topics".into()));
    }

    forum.executor().remove::<Node>(&id)?;
    Ok(None)
}

pub(super) fn list(forum: &Forum) -> ForumResult<Option<Value>> {
    encode(&Node::find_all(forum.store())?)
}

pub(super) fn info(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let query: NodeQuery = parse(body)?;
    if query.id.is_empty() && query.name.is_empty() {
        return Err(ValidationFailure::new("Id", "required", "id or name is required").into());
    }

    let node = Node::find_by_id_or_name(forum.store(), &query.id, &query.name)?
        .ok_or(ForumError::NotFound("Node"))?;
    encode(&node)
}
