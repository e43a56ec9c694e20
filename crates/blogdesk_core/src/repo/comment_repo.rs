//! Comment repository contract and SQLite implementation.

use super::{lock, parse_stored_id, RepoResult, SharedConnection};
use crate::model::comment::{Comment, CommentFilter, CommentPatch};
use crate::model::DocumentId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const COMMENT_SELECT_SQL: &str = "SELECT id, post_id, byline, body, date FROM comments";

/// Data access for the `comments` collection.
pub trait CommentRepository: Send + Sync {
    fn insert(&self, comment: &Comment) -> RepoResult<Comment>;
    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Comment>>;
    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Comment>>;
    fn find_and_update_by_id(
        &self,
        id: DocumentId,
        patch: &CommentPatch,
    ) -> RepoResult<Option<Comment>>;
    fn find_all(&self, filter: &CommentFilter) -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed comment repository.
#[derive(Clone)]
pub struct SqliteCommentRepository {
    conn: SharedConnection,
}

impl SqliteCommentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository {
    fn insert(&self, comment: &Comment) -> RepoResult<Comment> {
        comment.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO comments (id, post_id, byline, body, date)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                comment.id.to_string(),
                comment.post_id.map(|id| id.to_string()),
                comment.byline.as_str(),
                comment.body.as_str(),
                comment.date,
            ],
        )?;
        Ok(comment.clone())
    }

    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Comment>> {
        let conn = lock(&self.conn)?;
        select_comment(&conn, id)
    }

    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Comment>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(comment) = select_comment(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM comments WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(Some(comment))
    }

    fn find_and_update_by_id(
        &self,
        id: DocumentId,
        patch: &CommentPatch,
    ) -> RepoResult<Option<Comment>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(mut comment) = select_comment(&tx, id)? else {
            return Ok(None);
        };

        patch.apply_to(&mut comment);
        comment.validate()?;
        tx.execute(
            "UPDATE comments SET body = ?2 WHERE id = ?1;",
            params![id.to_string(), comment.body.as_str()],
        )?;
        tx.commit()?;
        Ok(Some(comment))
    }

    fn find_all(&self, filter: &CommentFilter) -> RepoResult<Vec<Comment>> {
        let mut sql = format!("{COMMENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(post_id) = filter.post_id {
            sql.push_str(" AND post_id = ?");
            bind_values.push(Value::Text(post_id.to_string()));
        }
        sql.push_str(" ORDER BY date ASC, id ASC");

        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }

        Ok(comments)
    }
}

fn select_comment(conn: &Connection, id: DocumentId) -> RepoResult<Option<Comment>> {
    let mut stmt = conn.prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_comment_row(row)?));
    }

    Ok(None)
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("id")?;
    let post_id = match row.get::<_, Option<String>>("post_id")? {
        Some(value) => Some(parse_stored_id("comments.post_id", &value)?),
        None => None,
    };

    let comment = Comment {
        id: parse_stored_id("comments.id", &id_text)?,
        post_id,
        byline: row.get("byline")?,
        body: row.get("body")?,
        date: row.get("date")?,
    };
    comment.validate()?;
    Ok(comment)
}
