//! Gateway over a model registry.
//!
//! # Invariants
//! - Permission is checked before the payload, the payload before the store.
//! - `delete_blog` resolves `true` whether or not the blog existed, while
//!   `delete_post` / `delete_comment` resolve the removed document or `None`.

use super::envelope::{content_id, ActionRequest, Caller};
use super::error::{ActionError, ActionResult};
use super::name::ActionName;
use crate::model::blog::Blog;
use crate::model::comment::Comment;
use crate::model::post::{Post, PostPatch};
use crate::model::Payload;
use crate::repo::registry::ModelRegistry;
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

/// Permission-gated entry point for blog, post and comment actions.
pub struct ActionGateway<M: ModelRegistry> {
    models: M,
}

impl<M: ModelRegistry> ActionGateway<M> {
    pub fn new(models: M) -> Self {
        Self { models }
    }

    /// The registry every action dispatches to.
    pub fn models(&self) -> &M {
        &self.models
    }

    /// Runs the action named `name` and renders its outcome as JSON.
    ///
    /// Absent documents from deletes and updates render as `null`.
    pub fn execute(
        &self,
        name: ActionName,
        caller: &Caller,
        request: &ActionRequest,
    ) -> ActionResult<Value> {
        match name {
            ActionName::CreateBlog => to_json(self.create_blog(caller, request)?),
            ActionName::DeleteBlog => to_json(self.delete_blog(caller, request)?),
            ActionName::SavePost => to_json(self.save_post(caller, request)?),
            ActionName::DeletePost => to_json(self.delete_post(caller, request)?),
            ActionName::PublishPost => to_json(self.publish_post(caller, request)?),
            ActionName::AllowComments => to_json(self.allow_comments(caller, request)?),
            ActionName::SaveComment => to_json(self.save_comment(caller, request)?),
            ActionName::DeleteComment => to_json(self.delete_comment(caller, request)?),
        }
    }

    /// Inserts a blog titled `content.title`.
    pub fn create_blog(&self, caller: &Caller, request: &ActionRequest) -> ActionResult<Blog> {
        self.authorized(ActionName::CreateBlog, caller, request, |models, content| {
            let mut fields = Payload::new();
            if let Some(title) = content.get("title") {
                fields.insert("title".to_string(), title.clone());
            }
            let blog = Blog::from_payload(&fields)?;
            models.blogs().insert(&blog)
        })
    }

    /// Removes the blog `content.id`. Resolves `true` even when absent.
    pub fn delete_blog(&self, caller: &Caller, request: &ActionRequest) -> ActionResult<bool> {
        self.authorized(ActionName::DeleteBlog, caller, request, |models, content| {
            let id = content_id(content)?;
            models.blogs().find_and_delete_by_id(id).map(|_| true)
        })
    }

    /// Inserts a post built from the whole content object.
    pub fn save_post(&self, caller: &Caller, request: &ActionRequest) -> ActionResult<Post> {
        self.authorized(ActionName::SavePost, caller, request, |models, content| {
            let post = Post::from_payload(content)?;
            models.posts().insert(&post)
        })
    }

    pub fn delete_post(
        &self,
        caller: &Caller,
        request: &ActionRequest,
    ) -> ActionResult<Option<Post>> {
        self.authorized(ActionName::DeletePost, caller, request, |models, content| {
            let id = content_id(content)?;
            models.posts().find_and_delete_by_id(id)
        })
    }

    /// Sets `published` on post `content.id` to `content.published`.
    pub fn publish_post(
        &self,
        caller: &Caller,
        request: &ActionRequest,
    ) -> ActionResult<Option<Post>> {
        self.authorized(ActionName::PublishPost, caller, request, |models, content| {
            let id = content_id(content)?;
            let patch = PostPatch {
                published: content.get("published").and_then(Value::as_bool),
                ..PostPatch::default()
            };
            models.posts().find_and_update_by_id(id, &patch)
        })
    }

    /// Sets `comments_allowed` on post `content.id` to `content.allow`.
    pub fn allow_comments(
        &self,
        caller: &Caller,
        request: &ActionRequest,
    ) -> ActionResult<Option<Post>> {
        self.authorized(ActionName::AllowComments, caller, request, |models, content| {
            let id = content_id(content)?;
            let patch = PostPatch {
                comments_allowed: content.get("allow").and_then(Value::as_bool),
                ..PostPatch::default()
            };
            models.posts().find_and_update_by_id(id, &patch)
        })
    }

    pub fn save_comment(&self, caller: &Caller, request: &ActionRequest) -> ActionResult<Comment> {
        self.authorized(ActionName::SaveComment, caller, request, |models, content| {
            let comment = Comment::from_payload(content)?;
            models.comments().insert(&comment)
        })
    }

    pub fn delete_comment(
        &self,
        caller: &Caller,
        request: &ActionRequest,
    ) -> ActionResult<Option<Comment>> {
        self.authorized(ActionName::DeleteComment, caller, request, |models, content| {
            let id = content_id(content)?;
            models.comments().find_and_delete_by_id(id)
        })
    }

    /// Shared guard: permission, required fields, then exactly one dispatch.
    fn authorized<T>(
        &self,
        action: ActionName,
        caller: &Caller,
        request: &ActionRequest,
        dispatch: impl FnOnce(&M, &Payload) -> RepoResult<T>,
    ) -> ActionResult<T> {
        if !caller.is_permitted() {
            info!("event=action module=gateway status=denied action={action}");
            return Err(ActionError::NotPermitted);
        }

        let content = match request.content_object() {
            Some(content) if action.accepts(request) => content,
            _ => {
                debug!("event=action module=gateway status=invalid action={action}");
                return Err(ActionError::ValidationFailed(action.validation_message()));
            }
        };

        let started_at = Instant::now();
        match dispatch(&self.models, content) {
            Ok(value) => {
                info!(
                    "event=action module=gateway status=ok action={action} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!("{}", store_failure_line(action, started_at.elapsed().as_millis(), &err));
                Err(ActionError::Store(err))
            }
        }
    }
}

/// Store errors echo request values, so only their code is logged.
fn store_failure_line(action: ActionName, duration_ms: u128, err: &RepoError) -> String {
    format!(
        "event=action module=gateway status=error action={action} duration_ms={duration_ms} error_code={}",
        err.code()
    )
}

fn to_json<T: Serialize>(value: T) -> ActionResult<Value> {
    serde_json::to_value(value).map_err(ActionError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::{store_failure_line, ActionGateway};
    use crate::action::{ActionError, ActionName, ActionRequest, Caller};
    use crate::model::blog::{Blog, BlogFilter, BlogPatch};
    use crate::model::comment::{Comment, CommentFilter, CommentPatch};
    use crate::model::post::{Post, PostFilter, PostPatch};
    use crate::model::DocumentId;
    use crate::repo::blog_repo::BlogRepository;
    use crate::repo::comment_repo::CommentRepository;
    use crate::repo::post_repo::PostRepository;
    use crate::repo::registry::ModelRegistry;
    use crate::repo::{RepoError, RepoResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Registry whose every collection counts calls and stores nothing.
    #[derive(Default)]
    struct CountingRegistry {
        calls: AtomicUsize,
    }

    impl CountingRegistry {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BlogRepository for CountingRegistry {
        fn insert(&self, blog: &Blog) -> RepoResult<Blog> {
            self.hit();
            Ok(blog.clone())
        }
        fn find_by_id(&self, _id: DocumentId) -> RepoResult<Option<Blog>> {
            self.hit();
            Ok(None)
        }
        fn find_and_delete_by_id(&self, _id: DocumentId) -> RepoResult<Option<Blog>> {
            self.hit();
            Ok(None)
        }
        fn find_and_update_by_id(
            &self,
            _id: DocumentId,
            _patch: &BlogPatch,
        ) -> RepoResult<Option<Blog>> {
            self.hit();
            Ok(None)
        }
        fn find_all(&self, _filter: &BlogFilter) -> RepoResult<Vec<Blog>> {
            self.hit();
            Ok(Vec::new())
        }
    }

    impl PostRepository for CountingRegistry {
        fn insert(&self, post: &Post) -> RepoResult<Post> {
            self.hit();
            Ok(post.clone())
        }
        fn find_by_id(&self, _id: DocumentId) -> RepoResult<Option<Post>> {
            self.hit();
            Ok(None)
        }
        fn find_and_delete_by_id(&self, _id: DocumentId) -> RepoResult<Option<Post>> {
            self.hit();
            Ok(None)
        }
        fn find_and_update_by_id(
            &self,
            _id: DocumentId,
            _patch: &PostPatch,
        ) -> RepoResult<Option<Post>> {
            self.hit();
            Ok(None)
        }
        fn find_all(&self, _filter: &PostFilter) -> RepoResult<Vec<Post>> {
            self.hit();
            Ok(Vec::new())
        }
    }

    impl CommentRepository for CountingRegistry {
        fn insert(&self, comment: &Comment) -> RepoResult<Comment> {
            self.hit();
            Ok(comment.clone())
        }
        fn find_by_id(&self, _id: DocumentId) -> RepoResult<Option<Comment>> {
            self.hit();
            Ok(None)
        }
        fn find_and_delete_by_id(&self, _id: DocumentId) -> RepoResult<Option<Comment>> {
            self.hit();
            Ok(None)
        }
        fn find_and_update_by_id(
            &self,
            _id: DocumentId,
            _patch: &CommentPatch,
        ) -> RepoResult<Option<Comment>> {
            self.hit();
            Ok(None)
        }
        fn find_all(&self, _filter: &CommentFilter) -> RepoResult<Vec<Comment>> {
            self.hit();
            Ok(Vec::new())
        }
    }

    impl ModelRegistry for CountingRegistry {
        fn blogs(&self) -> &dyn BlogRepository {
            self
        }
        fn posts(&self) -> &dyn PostRepository {
            self
        }
        fn comments(&self) -> &dyn CommentRepository {
            self
        }
    }

    fn complete_request(action: ActionName) -> ActionRequest {
        let id = "0f8fad5b-d9cb-469f-a165-70867728950e";
        ActionRequest::new(match action {
            ActionName::CreateBlog => json!({ "title": "My cool new blog" }),
            ActionName::DeleteBlog | ActionName::DeletePost | ActionName::DeleteComment => {
                json!({ "id": id })
            }
            ActionName::SavePost => json!({ "headline": "h", "byline": "b" }),
            ActionName::PublishPost => json!({ "id": id, "published": true }),
            ActionName::AllowComments => json!({ "id": id, "allow": true }),
            ActionName::SaveComment => json!({ "byline": "b", "body": "c" }),
        })
    }

    #[test]
    fn denied_callers_never_reach_the_store() {
        let gateway = ActionGateway::new(CountingRegistry::default());
        for action in ActionName::ALL {
            let err = gateway
                .execute(action, &Caller::anonymous(), &complete_request(action))
                .unwrap_err();
            assert!(matches!(err, ActionError::NotPermitted), "{action}");
        }
        assert_eq!(gateway.models().calls(), 0);
    }

    #[test]
    fn permission_is_checked_before_payload() {
        let gateway = ActionGateway::new(CountingRegistry::default());
        for action in ActionName::ALL {
            let err = gateway
                .execute(action, &Caller::anonymous(), &ActionRequest::empty())
                .unwrap_err();
            assert!(matches!(err, ActionError::NotPermitted), "{action}");
        }
    }

    #[test]
    fn incomplete_payloads_never_reach_the_store() {
        let gateway = ActionGateway::new(CountingRegistry::default());
        for action in ActionName::ALL {
            for request in [ActionRequest::empty(), ActionRequest::new(json!({}))] {
                let err = gateway
                    .execute(action, &Caller::writer(), &request)
                    .unwrap_err();
                match err {
                    ActionError::ValidationFailed(message) => {
                        assert_eq!(message, action.validation_message())
                    }
                    other => panic!("{action}: unexpected error {other}"),
                }
            }
        }
        assert_eq!(gateway.models().calls(), 0);
    }

    #[test]
    fn complete_payloads_dispatch_exactly_once() {
        for action in ActionName::ALL {
            let gateway = ActionGateway::new(CountingRegistry::default());
            gateway
                .execute(action, &Caller::admin(), &complete_request(action))
                .unwrap();
            assert_eq!(gateway.models().calls(), 1, "{action}");
        }
    }

    #[test]
    fn malformed_id_is_a_store_failure_without_a_store_call() {
        let gateway = ActionGateway::new(CountingRegistry::default());
        let err = gateway
            .delete_post(&Caller::writer(), &ActionRequest::new(json!({ "id": "nope" })))
            .unwrap_err();
        assert!(err.is_store_failure());
        assert_eq!(gateway.models().calls(), 0);
    }

    #[test]
    fn execute_renders_absent_documents_as_null() {
        let gateway = ActionGateway::new(CountingRegistry::default());
        let value = gateway
            .execute(
                ActionName::DeletePost,
                &Caller::writer(),
                &complete_request(ActionName::DeletePost),
            )
            .unwrap();
        assert!(value.is_null());

        let value = gateway
            .execute(
                ActionName::DeleteBlog,
                &Caller::writer(),
                &complete_request(ActionName::DeleteBlog),
            )
            .unwrap();
        assert_eq!(value, json!(true));
    }

    #[test]
    fn store_failure_lines_omit_request_values() {
        let content = json!({ "headline": "h", "byline": "b", "date": "TOP-SECRET-VALUE" });
        let err = RepoError::from(Post::from_payload(content.as_object().unwrap()).unwrap_err());
        assert!(err.to_string().contains("TOP-SECRET-VALUE"));
        let line = store_failure_line(ActionName::SavePost, 3, &err);
        assert!(!line.contains("TOP-SECRET-VALUE"), "{line}");
        assert!(line.ends_with("error_code=validation"), "{line}");

        let gateway = ActionGateway::new(CountingRegistry::default());
        let err = gateway
            .delete_post(
                &Caller::writer(),
                &ActionRequest::new(json!({ "id": "PRIVATE-ID-123" })),
            )
            .unwrap_err();
        let ActionError::Store(store) = &err else {
            panic!("unexpected error {err}");
        };
        let line = store_failure_line(ActionName::DeletePost, 0, store);
        assert!(!line.contains("PRIVATE-ID-123"), "{line}");
        assert!(line.contains("error_code=invalid_id"), "{line}");
        assert!(err.reason().contains("PRIVATE-ID-123"));
    }
}
