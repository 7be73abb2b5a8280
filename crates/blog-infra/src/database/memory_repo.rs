//! In-memory repositories - used when no database is configured and in tests.
//!
//! They enforce the same constraints as the SQL schema: unique emails and
//! posts that reference an existing user.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{AuthoredPost, Post, User};
use blog_core::error::RepoError;
use blog_core::ports::{BaseRepository, PostRepository, UserRepository};

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn exists(&self, id: Uuid) -> bool {
        self.users.read().await.contains_key(&id)
    }

    async fn author_name(&self, id: Uuid) -> Option<String> {
        self.users.read().await.get(&id).map(User::full_name)
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(RepoError::Constraint("users.email must be unique".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.users.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

/// In-memory post store. Resolves owners through the shared user store.
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
            users,
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        if !self.users.exists(post.user_id).await {
            return Err(RepoError::Constraint(
                "posts.user_id must reference an existing user".to_string(),
            ));
        }

        self.posts.write().await.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_recent_with_authors(&self) -> Result<Vec<AuthoredPost>, RepoError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            // Orphans cannot exist through this API; skip them if they do.
            if let Some(author) = self.users.author_name(post.user_id).await {
                out.push(AuthoredPost::new(post, author));
            }
        }
        Ok(out)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|_, p| p.user_id != user_id);
        Ok((before - posts.len()) as u64)
    }
}
