//! Discussion persistence.
//!
//! Handlers never build queries themselves; every read and write of the
//! `discussions` table goes through [`DiscussionStore`].

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::entities::{comment, discussion, user};
use crate::error::{Result, ServerError};

/// Category used when none is submitted
pub const DEFAULT_CATEGORY: &str = "general";

/// Fields for a new discussion. The author is passed separately and never
/// comes from the request body.
#[derive(Debug, Clone, Default)]
pub struct NewDiscussion {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DiscussionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A discussion with its author and (optionally) comments resolved
#[derive(Debug, Clone)]
pub struct PopulatedDiscussion {
    pub discussion: discussion::Model,
    pub author: Option<user::Model>,
    pub comments: Vec<comment::Model>,
}

#[derive(Clone)]
pub struct DiscussionStore {
    db: Arc<DatabaseConnection>,
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServerError::Validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn category_or_default(category: &str) -> String {
    let category = category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category.to_string()
    }
}

impl DiscussionStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new discussion owned by `author`
    pub async fn create(
        &self,
        fields: NewDiscussion,
        author: &user::Model,
    ) -> Result<discussion::Model> {
        let title = required("Title", &fields.title)?;
        let description = required("Description", &fields.description)?;
        let now = now_secs();

        let new_discussion = discussion::ActiveModel {
            title: Set(title),
            description: Set(description),
            author_id: Set(author.id),
            category: Set(category_or_default(&fields.category)),
            tags: Set(discussion::Tags(fields.tags)),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(new_discussion.insert(self.db.as_ref()).await?)
    }

    /// All discussions in creation order, each with its author
    pub async fn find_all(&self) -> Result<Vec<(discussion::Model, Option<user::Model>)>> {
        Ok(discussion::Entity::find()
            .find_also_related(user::Entity)
            .order_by_asc(discussion::Column::Id)
            .all(self.db.as_ref())
            .await?)
    }

    /// Look up one discussion with its author, and its comments when asked
    pub async fn find_by_id(
        &self,
        id: i32,
        with_comments: bool,
    ) -> Result<Option<PopulatedDiscussion>> {
        let found = discussion::Entity::find_by_id(id)
            .find_also_related(user::Entity)
            .one(self.db.as_ref())
            .await?;

        let Some((discussion, author)) = found else {
            return Ok(None);
        };

        let comments = if with_comments {
            discussion
                .find_related(comment::Entity)
                .order_by_asc(comment::Column::CreatedAt)
                .all(self.db.as_ref())
                .await?
        } else {
            Vec::new()
        };

        Ok(Some(PopulatedDiscussion {
            discussion,
            author,
            comments,
        }))
    }

    /// Apply `patch` to the discussion with `id`. Returns `None` when no
    /// such discussion exists. Author and view count are never touched.
    pub async fn find_by_id_and_update(
        &self,
        id: i32,
        patch: DiscussionPatch,
    ) -> Result<Option<(discussion::Model, Option<user::Model>)>> {
        let Some(existing) = discussion::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
        else {
            return Ok(None);
        };

        let mut active: discussion::ActiveModel = existing.into();
        if let Some(title) = patch.title {
            active.title = Set(required("Title", &title)?);
        }
        if let Some(description) = patch.description {
            active.description = Set(required("Description", &description)?);
        }
        if let Some(category) = patch.category {
            active.category = Set(category_or_default(&category));
        }
        if let Some(tags) = patch.tags {
            active.tags = Set(discussion::Tags(tags));
        }
        active.updated_at = Set(now_secs());

        // The row can vanish between the read and the write
        let updated = match active.update(self.db.as_ref()).await {
            Ok(updated) => updated,
            Err(DbErr::RecordNotUpdated) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let author = updated
            .find_related(user::Entity)
            .one(self.db.as_ref())
            .await?;

        Ok(Some((updated, author)))
    }

    /// Hard delete of a discussion and its comments. Returns whether a
    /// discussion was removed.
    pub async fn find_by_id_and_delete(&self, id: i32) -> Result<bool> {
        let txn = self.db.begin().await?;

        comment::Entity::delete_many()
            .filter(comment::Column::DiscussionId.eq(id))
            .exec(&txn)
            .await?;
        let result = discussion::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Persist a view of `discussion`, returning the stored record, or
    /// `None` if it was deleted since it was read.
    ///
    /// This is a read-modify-write: two concurrent reads of the same
    /// discussion can both write `views + 1`, losing one count.
    pub async fn save_views(
        &self,
        discussion: discussion::Model,
    ) -> Result<Option<discussion::Model>> {
        let views = discussion.views + 1;
        let mut active: discussion::ActiveModel = discussion.into();
        active.views = Set(views);
        match active.update(self.db.as_ref()).await {
            Ok(saved) => Ok(Some(saved)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use sea_orm::PaginatorTrait;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, DiscussionStore, user::Model) {
        let temp_dir = TempDir::new().unwrap();
        let db = init_database(&temp_dir.path().join("store.db")).await.unwrap();

        let author = user::ActiveModel {
            username: Set("alice".to_string()),
            password_hash: Set(String::new()),
            created_at: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        (temp_dir, DiscussionStore::new(Arc::new(db)), author)
    }

    fn sample() -> NewDiscussion {
        NewDiscussion {
            title: "T".to_string(),
            description: "D".to_string(),
            category: "general".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (_dir, store, author) = setup().await;

        let created = store.create(sample(), &author).await.unwrap();
        assert_eq!(created.author_id, author.id);
        assert_eq!(created.views, 0);

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        let (disc, disc_author) = &all[0];
        assert_eq!(disc.title, "T");
        assert_eq!(disc.description, "D");
        assert_eq!(disc.category, "general");
        assert_eq!(disc.tags.0, vec!["a", "b"]);
        assert_eq!(disc.views, 0);
        assert_eq!(disc_author.as_ref().map(|u| u.id), Some(author.id));
    }

    #[tokio::test]
    async fn test_create_requires_title_and_description() {
        let (_dir, store, author) = setup().await;

        let mut fields = sample();
        fields.title = "   ".to_string();
        assert!(matches!(
            store.create(fields, &author).await,
            Err(ServerError::Validation(_))
        ));

        let mut fields = sample();
        fields.description = String::new();
        assert!(matches!(
            store.create(fields, &author).await,
            Err(ServerError::Validation(_))
        ));

        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_category_defaults() {
        let (_dir, store, author) = setup().await;

        let mut fields = sample();
        fields.category = String::new();
        let created = store.create(fields, &author).await.unwrap();
        assert_eq!(created.category, DEFAULT_CATEGORY);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();

        let patch = DiscussionPatch {
            title: Some("T2".to_string()),
            ..Default::default()
        };
        let (updated, updated_author) = store
            .find_by_id_and_update(created.id, patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "T2");
        assert_eq!(updated.description, "D");
        assert_eq!(updated.category, "general");
        assert_eq!(updated.tags.0, vec!["a", "b"]);
        assert_eq!(updated.author_id, author.id);
        assert_eq!(updated_author.map(|u| u.id), Some(author.id));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let (_dir, store, _author) = setup().await;
        let result = store
            .find_by_id_and_update(999, DiscussionPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_views_are_durable() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();

        let first = store.find_by_id(created.id, false).await.unwrap().unwrap();
        let first = store.save_views(first.discussion).await.unwrap().unwrap();
        assert_eq!(first.views, 1);

        let second = store.find_by_id(created.id, false).await.unwrap().unwrap();
        assert_eq!(second.discussion.views, 1);
        let second = store.save_views(second.discussion).await.unwrap().unwrap();
        assert_eq!(second.views, 2);
    }

    #[tokio::test]
    async fn test_find_by_id_resolves_comments() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();

        for (i, content) in ["first", "second"].iter().enumerate() {
            comment::ActiveModel {
                discussion_id: Set(created.id),
                author_id: Set(author.id),
                content: Set(content.to_string()),
                created_at: Set(i as i64),
                ..Default::default()
            }
            .insert(store.db.as_ref())
            .await
            .unwrap();
        }

        let found = store.find_by_id(created.id, true).await.unwrap().unwrap();
        let contents: Vec<_> = found.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
        assert_eq!(found.author.map(|u| u.username), Some("alice".to_string()));

        let without = store.find_by_id(created.id, false).await.unwrap().unwrap();
        assert!(without.comments.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();

        assert!(store.find_by_id_and_delete(created.id).await.unwrap());
        assert!(!store.find_by_id_and_delete(created.id).await.unwrap());
        assert!(store.find_by_id(created.id, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_bumps_updated_at() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();

        // Backdate the row so the bump is visible within the same second
        discussion::Entity::update_many()
            .col_expr(discussion::Column::UpdatedAt, sea_orm::sea_query::Expr::value(0i64))
            .filter(discussion::Column::Id.eq(created.id))
            .exec(store.db.as_ref())
            .await
            .unwrap();

        let patch = DiscussionPatch {
            description: Some("D2".to_string()),
            ..Default::default()
        };
        let (updated, _) = store
            .find_by_id_and_update(created.id, patch)
            .await
            .unwrap()
            .unwrap();

        assert!(updated.updated_at >= created.updated_at);
        assert!(updated.updated_at > 0);
        assert_eq!(updated.created_at, created.created_at);

        let stored = store.find_by_id(created.id, false).await.unwrap().unwrap();
        assert_eq!(stored.discussion.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn test_delete_removes_comments() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();
        let other = store.create(sample(), &author).await.unwrap();

        for discussion_id in [created.id, created.id, other.id] {
            comment::ActiveModel {
                discussion_id: Set(discussion_id),
                author_id: Set(author.id),
                content: Set("reply".to_string()),
                created_at: Set(0),
                ..Default::default()
            }
            .insert(store.db.as_ref())
            .await
            .unwrap();
        }

        assert!(store.find_by_id_and_delete(created.id).await.unwrap());

        let orphaned = comment::Entity::find()
            .filter(comment::Column::DiscussionId.eq(created.id))
            .count(store.db.as_ref())
            .await
            .unwrap();
        assert_eq!(orphaned, 0);

        let kept = store.find_by_id(other.id, true).await.unwrap().unwrap();
        assert_eq!(kept.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_writes_to_deleted_discussion_report_missing() {
        let (_dir, store, author) = setup().await;
        let created = store.create(sample(), &author).await.unwrap();
        let stale = store.find_by_id(created.id, false).await.unwrap().unwrap();

        assert!(store.find_by_id_and_delete(created.id).await.unwrap());

        assert!(store.save_views(stale.discussion).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_racing_delete_reports_missing() {
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

        // Row read succeeds, then the write finds nothing to update
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([vec![discussion::Model {
                id: 1,
                title: "T".to_string(),
                description: "D".to_string(),
                author_id: 1,
                category: "general".to_string(),
                tags: discussion::Tags(Vec::new()),
                views: 0,
                created_at: 0,
                updated_at: 0,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([Vec::<discussion::Model>::new()])
            .into_connection();
        let store = DiscussionStore::new(Arc::new(db));

        let patch = DiscussionPatch {
            title: Some("T2".to_string()),
            ..Default::default()
        };
        assert!(store
            .find_by_id_and_update(1, patch)
            .await
            .unwrap()
            .is_none());
    }
}
