//! User actions

use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse, Forum, ForumError, ForumResult, RequestContext};
use crate::auth::{hash_password, verify_password, AuthError};
use crate::model::{unix_now, User};
use crate::schema::Rule;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Credentials {
    name: String,
    password: String,
}

pub(super) fn reg(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let mut user: User = parse(body)?;
    forum.validator().validate(&user)?;

    if User::name_exists(forum.store(), &user.name)? {
        return Err(ForumError::Conflict("user name already exists".into()));
    }

    let hash = hash_password(&user.password)?;
    user.reg_ip = ctx.client_ip.clone();
    user.reg_time = unix_now();

    forum.executor().create_with(&user, |doc| {
        doc.insert("password".into(), Value::String(hash));
    })?;
    Ok(None)
}

/// On success the session carries `user_id`, `user_name` and `user_email`
pub(super) fn login(
    forum: &Forum,
    ctx: &RequestContext<'_>,
    body: &Value,
) -> ForumResult<Option<Value>> {
    let creds: Credentials = parse(body)?;
    forum.validator().validate_each(
        &[("Name", json!(creds.name)), ("Password", json!(creds.password))],
        &[Rule::Required],
    )?;

    let user = User::find_by_name(forum.store(), &creds.name)?.ok_or(AuthError::UnknownUser)?;
    if !verify_password(&creds.password, &user.password)? {
        return Err(AuthError::PasswordMismatch.into());
    }

    ctx.session.login(&user.id, &user.name, &user.email);
    Ok(Some(json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
    })))
}

/// Succeeds when the name is still free
pub(super) fn check(forum: &Forum, body: &Value) -> ForumResult<Option<Value>> {
    let creds: Credentials = parse(body)?;
    forum
        .validator()
        .validate_var("Name", &json!(creds.name), &[Rule::Required])?;

    if User::name_exists(forum.store(), &creds.name)? {
        return Err(ForumError::Conflict("user name already exists".into()));
    }
    Ok(None)
}
