//! Blog repository contract and SQLite implementation.

use super::{lock, parse_stored_id, RepoResult, SharedConnection};
use crate::model::blog::{Blog, BlogFilter, BlogPatch};
use crate::model::DocumentId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const BLOG_SELECT_SQL: &str = "SELECT id, title FROM blogs";

/// Data access for the `blogs` collection.
pub trait BlogRepository: Send + Sync {
    /// Persists a new blog and returns the stored document.
    fn insert(&self, blog: &Blog) -> RepoResult<Blog>;
    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Blog>>;
    /// Removes a blog and returns what was removed, `None` if absent.
    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Blog>>;
    /// Applies `patch` and returns the updated blog, `None` if absent.
    fn find_and_update_by_id(&self, id: DocumentId, patch: &BlogPatch)
        -> RepoResult<Option<Blog>>;
    fn find_all(&self, filter: &BlogFilter) -> RepoResult<Vec<Blog>>;
}

/// SQLite-backed blog repository.
#[derive(Clone)]
pub struct SqliteBlogRepository {
    conn: SharedConnection,
}

impl SqliteBlogRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

impl BlogRepository for SqliteBlogRepository {
    fn insert(&self, blog: &Blog) -> RepoResult<Blog> {
        blog.validate()?;

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO blogs (id, title) VALUES (?1, ?2);",
            params![blog.id.to_string(), blog.title.as_str()],
        )?;
        Ok(blog.clone())
    }

    fn find_by_id(&self, id: DocumentId) -> RepoResult<Option<Blog>> {
        let conn = lock(&self.conn)?;
        select_blog(&conn, id)
    }

    fn find_and_delete_by_id(&self, id: DocumentId) -> RepoResult<Option<Blog>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(blog) = select_blog(&tx, id)? else {
            return Ok(None);
        };

        tx.execute("DELETE FROM blogs WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(Some(blog))
    }

    fn find_and_update_by_id(
        &self,
        id: DocumentId,
        patch: &BlogPatch,
    ) -> RepoResult<Option<Blog>> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let Some(mut blog) = select_blog(&tx, id)? else {
            return Ok(None);
        };

        patch.apply_to(&mut blog);
        blog.validate()?;
        tx.execute(
            "UPDATE blogs SET title = ?2 WHERE id = ?1;",
            params![id.to_string(), blog.title.as_str()],
        )?;
        tx.commit()?;
        Ok(Some(blog))
    }

    fn find_all(&self, filter: &BlogFilter) -> RepoResult<Vec<Blog>> {
        let mut sql = format!("{BLOG_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &filter.title {
            sql.push_str(" AND title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        sql.push_str(" ORDER BY title ASC, id ASC");

        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut blogs = Vec::new();
        while let Some(row) = rows.next()? {
            blogs.push(parse_blog_row(row)?);
        }

        Ok(blogs)
    }
}

fn select_blog(conn: &Connection, id: DocumentId) -> RepoResult<Option<Blog>> {
    let mut stmt = conn.prepare(&format!("{BLOG_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_blog_row(row)?));
    }

    Ok(None)
}

fn parse_blog_row(row: &Row<'_>) -> RepoResult<Blog> {
    let id_text: String = row.get("id")?;
    let blog = Blog {
        id: parse_stored_id("blogs.id", &id_text)?,
        title: row.get("title")?,
    };
    blog.validate()?;
    Ok(blog)
}
