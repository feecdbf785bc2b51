use sqlx::{Pool, Sqlite};

use crate::constants::FOLLOW_COUNT_PER_PAGE;
use crate::error::Error;
use crate::pagination::PageContext;
use crate::schema::{FollowedAuthorRow, Id};

use super::memberships::{add_member, contains_member, remove_member, Relation};
use super::users::get_user_by_id;

/// Follows an author. Users cannot follow themselves.
pub async fn subscribe(user_id: Id, author_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if user_id == author_id {
        return Err(Error::InvalidTarget("cannot subscribe to yourself"));
    }
    if get_user_by_id(author_id, pool).await?.is_none() {
        return Err(Error::NotFound("user"));
    }

    if !add_member(Relation::Follows, user_id, author_id, pool).await? {
        return Err(Error::AlreadyExists("already subscribed to this author"));
    }

    Ok(())
}

pub async fn unsubscribe(user_id: Id, author_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    if !remove_member(Relation::Follows, user_id, author_id, pool).await? {
        return Err(Error::NotPresent("not subscribed to this author"));
    }

    Ok(())
}

pub async fn is_subscribed(user_id: Id, author_id: Id, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    contains_member(Relation::Follows, user_id, author_id, pool).await
}

/// Followed authors with their recipe counts, in follow order.
pub async fn fetch_subscriptions(
    user_id: Id,
    offset: i64,
    pool: &Pool<Sqlite>,
) -> Result<PageContext<FollowedAuthorRow>, Error> {
    let rows: Vec<FollowedAuthorRow> = sqlx::query_as(
        "
        SELECT u.id AS id, u.email AS email, u.username AS username,
               u.first_name AS first_name, u.last_name AS last_name,
               (SELECT COUNT(*) FROM recipes r WHERE r.author_id = u.id) AS recipes_count,
               COUNT(*) OVER () AS count
        FROM user_follows f
        INNER JOIN users u ON u.id = f.author_id
        WHERE f.user_id = ?
        ORDER BY f.id
        LIMIT ? OFFSET ?
    ",
    )
    .bind(user_id)
    .bind(FOLLOW_COUNT_PER_PAGE)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total_count = rows.first().map(|row| row.count).unwrap_or(0);
    let page = PageContext::from_rows(rows, total_count, FOLLOW_COUNT_PER_PAGE, offset);

    Ok(page)
}
