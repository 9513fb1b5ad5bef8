use crate::domain::repository::TaskRepository;
use crate::domain::task::{CreateTask, Task, TaskFilter, TaskId, TaskStats, UpdateTask};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TaskService: Send + Sync + 'static {
    async fn create(&self, input: CreateTask) -> Result<Task>;
    async fn get(&self, id: TaskId) -> Result<Option<Task>>;
    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>>;
    async fn update(&self, id: TaskId, input: UpdateTask) -> Result<Option<Task>>;
    async fn delete(&self, id: TaskId) -> Result<bool>;
    async fn stats(&self) -> Result<TaskStats>;
}

#[derive(Clone)]
pub struct TaskServiceImpl<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TaskRepository> TaskService for TaskServiceImpl<R> {
    async fn create(&self, input: CreateTask) -> Result<Task> { self.repo.create(input).await }
    async fn get(&self, id: TaskId) -> Result<Option<Task>> { self.repo.get(id).await }
    async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>> { self.repo.list(filter).await }
    async fn update(&self, id: TaskId, input: UpdateTask) -> Result<Option<Task>> { self.repo.update(id, input).await }
    async fn delete(&self, id: TaskId) -> Result<bool> { self.repo.delete(id).await }
    async fn stats(&self) -> Result<TaskStats> { self.repo.stats().await }
}
