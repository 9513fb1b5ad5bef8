use async_trait::async_trait;
use super::task::{CreateTask, Task, TaskFilter, TaskId, TaskStats, UpdateTask};

#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn create(&self, input: CreateTask) -> anyhow::Result<Task>;
    async fn get(&self, id: TaskId) -> anyhow::Result<Option<Task>>;
    async fn list(&self, filter: TaskFilter) -> anyhow::Result<Vec<Task>>;
    async fn update(&self, id: TaskId, input: UpdateTask) -> anyhow::Result<Option<Task>>;
    async fn delete(&self, id: TaskId) -> anyhow::Result<bool>;
    async fn stats(&self) -> anyhow::Result<TaskStats>;
}
