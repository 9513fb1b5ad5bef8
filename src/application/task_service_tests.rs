#[cfg(test)]
mod tests {
    use super::super::task_service::{TaskService, TaskServiceImpl};
    use crate::domain::{
        repository::TaskRepository,
        task::{CreateTask, Task, TaskFilter, TaskId, TaskStats, UpdateTask},
    };
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Default)]
    struct InMemoryRepo {
        items: std::sync::Mutex<std::collections::HashMap<i64, Task>>,
        next_id: AtomicI64,
    }

    #[async_trait]
    impl TaskRepository for InMemoryRepo {
        async fn init(&self) -> Result<()> { Ok(()) }
        async fn create(&self, input: CreateTask) -> Result<Task> {
            let now = Utc::now();
            let id = TaskId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let task = Task {
                id,
                title: input.title,
                description: input.description,
                status: input.status,
                priority: input.priority,
                created_at: now,
                updated_at: now,
                due_date: input.due_date,
            };
            self.items.lock().unwrap().insert(id.0, task.clone());
            Ok(task)
        }
        async fn get(&self, id: TaskId) -> Result<Option<Task>> {
            Ok(self.items.lock().unwrap().get(&id.0).cloned())
        }
        async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>> {
            let mut tasks: Vec<Task> = self
                .items
                .lock()
                .unwrap()
                .values()
                .filter(|t| filter.status.as_deref().map_or(true, |s| t.status == s))
                .filter(|t| filter.priority.as_deref().map_or(true, |p| t.priority == p))
                .cloned()
                .collect();
            tasks.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
            Ok(tasks)
        }
        async fn update(&self, id: TaskId, input: UpdateTask) -> Result<Option<Task>> {
            let mut map = self.items.lock().unwrap();
            let Some(mut task) = map.get(&id.0).cloned() else { return Ok(None) };
            if let Some(t) = input.title { task.title = t; }
            if let Some(d) = input.description { task.description = d; }
            if let Some(s) = input.status { task.status = s; }
            if let Some(p) = input.priority { task.priority = p; }
            if let Some(due) = input.due_date { task.due_date = Some(due); }
            task.updated_at = Utc::now();
            map.insert(id.0, task.clone());
            Ok(Some(task))
        }
        async fn delete(&self, id: TaskId) -> Result<bool> {
            Ok(self.items.lock().unwrap().remove(&id.0).is_some())
        }
        async fn stats(&self) -> Result<TaskStats> {
            let map = self.items.lock().unwrap();
            let count = |s: &str| map.values().filter(|t| t.status == s).count() as i64;
            Ok(TaskStats {
                total: map.len() as i64,
                completed: count("completed"),
                pending: count("pending"),
                in_progress: count("in_progress"),
            })
        }
    }

    fn service() -> TaskServiceImpl<InMemoryRepo> {
        TaskServiceImpl::new(InMemoryRepo::default())
    }

    fn new_task(title: &str, status: &str, priority: &str) -> CreateTask {
        CreateTask {
            title: title.into(),
            description: String::new(),
            status: status.into(),
            priority: priority.into(),
            due_date: None,
        }
    }

    #[tokio::test]
    async fn unit_create_applies_defaults() {
        let service = service();
        let created = service.create(new_task("X", "pending", "medium")).await.unwrap();
        assert_eq!(created.title, "X");
        assert_eq!(created.description, "");
        assert_eq!(created.status, "pending");
        assert_eq!(created.priority, "medium");
        assert_eq!(created.created_at, created.updated_at);
        assert!(created.due_date.is_none());
        let got = service.get(created.id).await.unwrap().unwrap();
        assert_eq!(got, created);
    }

    #[tokio::test]
    async fn unit_update_touches_only_supplied_fields() {
        let service = service();
        let created = service.create(new_task("X", "pending", "high")).await.unwrap();
        let patch = UpdateTask { status: Some("completed".into()), ..Default::default() };
        let updated = service.update(created.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.status, "completed");
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn unit_update_keeps_due_date_when_absent() {
        let service = service();
        let due: chrono::DateTime<Utc> = "2024-01-15T10:00:00Z".parse().unwrap();
        let mut input = new_task("X", "pending", "medium");
        input.due_date = Some(due);
        let created = service.create(input).await.unwrap();
        let updated = service
            .update(created.id, UpdateTask { title: Some("Y".into()), ..Default::default() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.due_date, Some(due));
    }

    #[tokio::test]
    async fn unit_update_and_delete_missing_id() {
        let service = service();
        let missing = TaskId(999);
        assert!(service.update(missing, UpdateTask::default()).await.unwrap().is_none());
        assert!(!service.delete(missing).await.unwrap());
    }

    #[tokio::test]
    async fn unit_delete_removes_task() {
        let service = service();
        let created = service.create(new_task("X", "pending", "medium")).await.unwrap();
        assert!(service.delete(created.id).await.unwrap());
        assert!(service.get(created.id).await.unwrap().is_none());
        assert!(service.list(TaskFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unit_list_filters_by_status_newest_first() {
        let service = service();
        service.create(new_task("a", "pending", "low")).await.unwrap();
        service.create(new_task("b", "completed", "low")).await.unwrap();
        service.create(new_task("c", "pending", "high")).await.unwrap();
        let pending = service
            .list(TaskFilter { status: Some("pending".into()), priority: None })
            .await
            .unwrap();
        let titles: Vec<&str> = pending.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn unit_stats_counts_each_status() {
        let service = service();
        service.create(new_task("a", "pending", "low")).await.unwrap();
        service.create(new_task("b", "pending", "low")).await.unwrap();
        service.create(new_task("c", "completed", "low")).await.unwrap();
        service.create(new_task("d", "in_progress", "low")).await.unwrap();
        let stats = service.stats().await.unwrap();
        assert_eq!(stats, TaskStats { total: 4, completed: 1, pending: 2, in_progress: 1 });
    }
}
