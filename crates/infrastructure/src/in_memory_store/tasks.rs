use super::*;

use chrono::{DateTime, Utc};
use workhive_application::{CreatedTask, NewSubtask, NewTask, TaskRepository};
use workhive_domain::{TaskKey, TaskPriority, creates_dependency_cycle};

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn create_task(&self, workspace_id: WorkspaceId, task: NewTask) -> AppResult<CreatedTask> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let project_name = state.project(workspace_id, task.project_id)?.name.clone();

        let sequence = state.task_sequences.entry(task.project_id).or_insert(0);
        *sequence += 1;
        let key = TaskKey::for_project(project_name.as_str(), *sequence)?;

        let position = state
            .cards
            .values()
            .filter(|card| card.project_id == task.project_id)
            .map(|card| card.position)
            .max()
            .map_or(0, |position| position + 1);

        let stored = Task {
            task_id: task.task_id,
            project_id: task.project_id,
            key,
            description: task.description,
            priority: task.priority,
            due_date: task.due_date,
            labels: task.labels,
            reporter_id: task.reporter_id,
            assignee_id: None,
            parent_id: None,
            status_id: task.status_id,
            created_at: task.created_at,
            updated_at: task.created_at,
            completed_at: None,
        };
        let card = Card {
            card_id: task.card_id,
            task_id: task.task_id,
            project_id: task.project_id,
            column_id: task.column_id,
            sprint_id: task.sprint_id,
            position,
        };
        state.tasks.insert(stored.task_id, stored.clone());
        state.cards.insert(card.card_id, card.clone());

        Ok(CreatedTask { task: stored, card })
    }

    async fn create_subtask(&self, workspace_id: WorkspaceId, subtask: NewSubtask) -> AppResult<Task> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let parent = state.task(workspace_id, subtask.parent_id)?;
        let (parent_key, project_id) = (parent.key.clone(), parent.project_id);

        let sequence = state
            .subtask_sequences
            .entry(subtask.parent_id)
            .or_insert(0);
        *sequence += 1;

        let stored = Task {
            task_id: subtask.task_id,
            project_id,
            key: TaskKey::for_subtask(&parent_key, *sequence)?,
            description: subtask.description,
            priority: TaskPriority::default(),
            due_date: None,
            labels: Vec::new(),
            reporter_id: subtask.reporter_id,
            assignee_id: None,
            parent_id: Some(subtask.parent_id),
            status_id: subtask.status_id,
            created_at: subtask.created_at,
            updated_at: subtask.created_at,
            completed_at: None,
        };
        state.tasks.insert(stored.task_id, stored.clone());

        Ok(stored)
    }

    async fn find_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<Option<Task>> {
        Ok(self
            .state
            .read()
            .await
            .task(workspace_id, task_id)
            .ok()
            .cloned())
    }

    async fn list_tasks(&self, workspace_id: WorkspaceId, project_id: Uuid) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        state.project(workspace_id, project_id)?;

        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.project_id == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.created_at);

        Ok(tasks)
    }

    async fn list_subtasks(
        &self,
        workspace_id: WorkspaceId,
        parent_id: Uuid,
    ) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        state.task(workspace_id, parent_id)?;

        let mut subtasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.parent_id == Some(parent_id))
            .cloned()
            .collect();
        subtasks.sort_by_key(|task| task.created_at);

        Ok(subtasks)
    }

    async fn find_card_for_task(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Option<Card>> {
        let state = self.state.read().await;
        state.task(workspace_id, task_id)?;

        Ok(state
            .cards
            .values()
            .find(|card| card.task_id == task_id)
            .cloned())
    }

    async fn save_task(&self, workspace_id: WorkspaceId, task: Task) -> AppResult<Task> {
        let mut state = self.state.write().await;
        state.task(workspace_id, task.task_id)?;

        let stored = state.tasks.get_mut(&task.task_id).ok_or_else(|| {
            AppError::NotFound(format!("task '{}' does not exist", task.task_id))
        })?;
        stored.description = task.description;
        stored.priority = task.priority;
        stored.due_date = task.due_date;
        stored.labels = task.labels;
        stored.updated_at = task.updated_at;

        Ok(stored.clone())
    }

    async fn delete_task(&self, workspace_id: WorkspaceId, task_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.task(workspace_id, task_id)?;

        let mut doomed = vec![task_id];
        let mut cursor = 0;
        while let Some(parent_id) = doomed.get(cursor).copied() {
            doomed.extend(
                state
                    .tasks
                    .values()
                    .filter(|task| task.parent_id == Some(parent_id))
                    .map(|task| task.task_id),
            );
            cursor += 1;
        }
        state.remove_tasks(&doomed);

        Ok(())
    }

    async fn set_assignee(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        assignee_id: Option<UserId>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Task> {
        let mut state = self.state.write().await;
        state.task(workspace_id, task_id)?;

        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' does not exist")))?;
        task.assignee_id = assignee_id;
        task.updated_at = updated_at;

        Ok(task.clone())
    }

    async fn list_dependencies(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<TaskDependency>> {
        let state = self.state.read().await;
        state.task(workspace_id, task_id)?;

        Ok(state
            .dependencies
            .iter()
            .filter(|dependency| dependency.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn add_dependency(
        &self,
        workspace_id: WorkspaceId,
        dependency: TaskDependency,
        reject_cycles: bool,
    ) -> AppResult<TaskDependency> {
        let mut state = self.state.write().await;
        state.task(workspace_id, dependency.task_id)?;
        state.task(workspace_id, dependency.depends_on_task_id)?;

        if state.dependencies.iter().any(|stored| {
            stored.task_id == dependency.task_id
                && stored.depends_on_task_id == dependency.depends_on_task_id
        }) {
            return Err(AppError::Conflict(
                "task already depends on that task".to_owned(),
            ));
        }

        if reject_cycles {
            let edges: Vec<(Uuid, Uuid)> = state
                .dependencies
                .iter()
                .map(|stored| (stored.task_id, stored.depends_on_task_id))
                .collect();
            if creates_dependency_cycle(&edges, dependency.task_id, dependency.depends_on_task_id)
            {
                return Err(AppError::Conflict(
                    "dependency would create a cycle".to_owned(),
                ));
            }
        }

        state.dependencies.push(dependency.clone());
        Ok(dependency)
    }

    async fn remove_dependency(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
        depends_on_task_id: Uuid,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.task(workspace_id, task_id)?;

        let before = state.dependencies.len();
        state.dependencies.retain(|dependency| {
            !(dependency.task_id == task_id && dependency.depends_on_task_id == depends_on_task_id)
        });
        if state.dependencies.len() == before {
            return Err(AppError::NotFound(format!(
                "task '{task_id}' does not depend on task '{depends_on_task_id}'"
            )));
        }

        Ok(())
    }

    async fn list_checklist_items(
        &self,
        workspace_id: WorkspaceId,
        task_id: Uuid,
    ) -> AppResult<Vec<ChecklistItem>> {
        let state = self.state.read().await;
        state.task(workspace_id, task_id)?;

        let mut items: Vec<ChecklistItem> = state
            .checklist_items
            .values()
            .filter(|item| item.task_id == task_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.position);

        Ok(items)
    }

    async fn add_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        mut item: ChecklistItem,
    ) -> AppResult<ChecklistItem> {
        let mut state = self.state.write().await;
        state.task(workspace_id, item.task_id)?;

        item.position = state
            .checklist_items
            .values()
            .filter(|stored| stored.task_id == item.task_id)
            .map(|stored| stored.position)
            .max()
            .map_or(0, |position| position + 1);
        state.checklist_items.insert(item.item_id, item.clone());

        Ok(item)
    }

    async fn find_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<Option<ChecklistItem>> {
        Ok(self
            .state
            .read()
            .await
            .checklist_item(workspace_id, item_id)
            .ok()
            .cloned())
    }

    async fn set_checklist_item_done(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
        is_done: bool,
    ) -> AppResult<ChecklistItem> {
        let mut state = self.state.write().await;
        state.checklist_item(workspace_id, item_id)?;

        let item = state.checklist_items.get_mut(&item_id).ok_or_else(|| {
            AppError::NotFound(format!("checklist item '{item_id}' does not exist"))
        })?;
        item.is_done = is_done;

        Ok(item.clone())
    }

    async fn remove_checklist_item(
        &self,
        workspace_id: WorkspaceId,
        item_id: Uuid,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.checklist_item(workspace_id, item_id)?;
        state.checklist_items.remove(&item_id);

        Ok(())
    }
}
