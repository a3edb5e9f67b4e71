use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Foo, FooPayload};

/// Operations over the Foo resource.
///
/// Implementations report absence with `Ok(None)` and reserve `Err` for
/// genuine faults. Updates and deletes either complete or fail as a whole.
#[async_trait]
pub trait FooService: Send + Sync {
    /// Creates a Foo and returns its newly minted identifier.
    async fn create(&self, foo: &FooPayload) -> AppResult<i32>;

    /// All Foo records. May be empty.
    async fn list(&self) -> AppResult<Vec<Foo>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Foo>>;

    async fn update(&self, foo: &FooPayload) -> AppResult<()>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Always fails. Used to exercise the fault handling path.
    fn throw_demo(&self) -> AppResult<()>;
}

/// Stand-in implementation that fabricates data and stores nothing.
#[derive(Debug, Clone, Default)]
pub struct DemoFooService {
    connection_strings: HashMap<String, String>,
}

impl DemoFooService {
    pub fn new(connection_strings: HashMap<String, String>) -> Self {
        debug!(
            connections = connection_strings.len(),
            "Demo foo service configured"
        );
        Self { connection_strings }
    }

    fn has_store(&self) -> bool {
        self.connection_strings.contains_key("default")
    }
}

/// Five random hex characters.
fn random_value() -> String {
    Uuid::new_v4().simple().to_string().chars().take(5).collect()
}

#[async_trait]
impl FooService for DemoFooService {
    async fn create(&self, foo: &FooPayload) -> AppResult<i32> {
        let id = rand::thread_rng().gen_range(1..=i32::MAX);
        debug!(id, value = ?foo.value, store = self.has_store(), "Pretending to create foo");
        Ok(id)
    }

    async fn list(&self) -> AppResult<Vec<Foo>> {
        Ok(vec![Foo::new(1, random_value()), Foo::new(3, random_value())])
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Option<Foo>> {
        if id == 0 {
            return Ok(None);
        }
        Ok(Some(Foo::new(id, random_value())))
    }

    async fn update(&self, foo: &FooPayload) -> AppResult<()> {
        debug!(id = ?foo.id, "Pretending to update foo");
        Ok(())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        debug!(id, "Pretending to delete foo");
        Ok(())
    }

    fn throw_demo(&self) -> AppResult<()> {
        Err(anyhow!("Here is an error for you").into())
    }
}
