//! Post repository contract and SQLite implementation.
//!
//! # Invariants
//! - `blog_id` is stored as given; no existence check against `blogs`.
//! - Flag toggles rewrite the whole row inside one transaction.

use super::{bool_to_int, lock, parse_stored_bool, parse_stored_id, RepoResult, SharedConnection};
use crate::model::post::{Post, PostFilter, PostPatch};
use crate::model::DocumentId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const POST_SELECT_SQL: &str = "SELECT
    id,
    blog_id,
    headline,
    byline,
    lead,
    body,
    date,
    published,
    comments_allowed
FROM posts";

/// Data access for the `posts` collection.
pub trait PostRepository: Send + Sync {
    fn insert(&self, post: &Post) -> RepoResult<Post>;
    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Post>>;
    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Post>>;
    fn find_and_update_by_id(&self, id: DocumentId, patch: &PostPatch)
        -> RepoResult<Option<Post>>;
    fn find_all(&self, filter: &PostFilter) -> RepoResult<Vec<Post>>;
}

/// SQLite-backed post repository.
#[derive(Clone)]
pub struct SqlitePostRepository {
    conn: SharedConnection,
}

impl SqlitePostRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl PostRepository for SqlitePostRepository {
    fn insert(&self, post: &Post) -> RepoResult<Post> {
        post.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO posts (
                id,
                blog_id,
                headline,
                byline,
                lead,
                body,
                date,
                published,
                comments_allowed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                post.id.to_string(),
                post.blog_id.map(|id| id.to_string()),
                post.headline.as_str(),
                post.byline.as_str(),
                post.lead.as_deref(),
                post.body.as_deref(),
                post.date,
                bool_to_int(post.published),
                bool_to_int(post.comments_allowed),
            ],
        )?;
        Ok(post.clone())
    }

    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Post>> {
        let conn = lock(&self.conn)?;
        select_post(&conn, id)
    }

    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Post>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(post) = select_post(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM posts WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(Some(post))
    }

    fn find_and_update_by_id(
        &self,
        id: DocumentId,
        patch: &PostPatch,
    ) -> RepoResult<Option<Post>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(mut post) = select_post(&tx, id)? else {
            return Ok(None);
        };

        patch.apply_to(&mut post);
        post.validate()?;
        tx.execute(
            "UPDATE posts
             SET
                published = ?2,
                comments_allowed = ?3
             WHERE id = ?1;",
            params![
                id.to_string(),
                bool_to_int(post.published),
                bool_to_int(post.comments_allowed),
            ],
        )?;
        tx.commit()?;
        Ok(Some(post))
    }

    fn find_all(&self, filter: &PostFilter) -> RepoResult<Vec<Post>> {
        let mut sql = format!("{POST_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(blog_id) = filter.blog_id {
            sql.push_str(" AND blog_id = ?");
            bind_values.push(Value::Text(blog_id.to_string()));
        }
        if let Some(published) = filter.published {
            sql.push_str(" AND published = ?");
            bind_values.push(Value::Integer(bool_to_int(published)));
        }
        sql.push_str(" ORDER BY date ASC, id ASC");

        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        Ok(posts)
    }
}

fn select_post(conn: &Connection, id: DocumentId) -> RepoResult<Option<Post>> {
    let mut stmt = conn.prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_post_row(row)?));
    }

    Ok(None)
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let id_text: String = row.get("id")?;
    let blog_id = match row.get::<_, Option<String>>("blog_id")? {
        Some(value) => Some(parse_stored_id("posts.blog_id", &value)?),
        None => None,
    };

    let post = Post {
        id: parse_stored_id("posts.id", &id_text)?,
        blog_id,
        headline: row.get("headline")?,
        byline: row.get("byline")?,
        lead: row.get("lead")?,
        body: row.get("body")?,
        date: row.get("date")?,
        published: parse_stored_bool("posts.published", row.get("published")?)?,
        comments_allowed: parse_stored_bool(
            "posts.comments_allowed",
            row.get("comments_allowed")?,
        )?,
    };
    post.validate()?;
    Ok(post)
}
