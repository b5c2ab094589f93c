pub mod repositories;
pub mod mongo_repositories;
#[cfg(test)]
pub mod memory;

pub use repositories::*;

use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;

use crate::utils::AppError;
use mongo_repositories::{MongoCourseRepository, MongoEnrollmentRepository, MongoUserRepository};

pub const USERS: &str = "users";
pub const COURSES: &str = "courses";
pub const ENROLLMENTS: &str = "enrollments";

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.app_name = Some("courseshare-service".to_string());
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        let mongodb = Self { client, db };

        // Test connection
        mongodb.ping().await?;

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the indexes the routes rely on. Existing indexes are left alone.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let unique = || IndexOptions::builder().unique(true).build();

        let indexes: Vec<(&str, Document, Option<IndexOptions>)> = vec![
            (USERS, doc! { "uid": 1 }, Some(unique())),
            (COURSES, doc! { "createdAt": -1 }, None),
            (COURSES, doc! { "category": 1, "createdAt": -1 }, None),
            (ENROLLMENTS, doc! { "userId": 1, "enrolledAt": -1 }, None),
            // Backs the "already enrolled" pre-check against concurrent enrolls
            (ENROLLMENTS, doc! { "userId": 1, "courseId": 1 }, Some(unique())),
        ];

        for (collection, keys, options) in indexes {
            let label = format!("{}({})", collection, keys.keys().cloned().collect::<Vec<_>>().join(", "));
            let model = IndexModel::builder().keys(keys).options(options).build();

            match self.collection::<Document>(collection).create_index(model).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", label),
                Err(e) => log::warn!("   ⚠️  Could not create index {}: {}", label, e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl StoreHealth for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        MongoDB::ping(self).await
    }
}

impl Store {
    pub fn mongo(db: MongoDB) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(&db)),
            courses: Arc::new(MongoCourseRepository::new(&db)),
            enrollments: Arc::new(MongoEnrollmentRepository::new(&db)),
            health: Arc::new(db),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        let memory = Arc::new(memory::InMemoryStore::default());
        Self {
            users: memory.clone(),
            courses: memory.clone(),
            enrollments: memory.clone(),
            health: memory,
        }
    }
}
