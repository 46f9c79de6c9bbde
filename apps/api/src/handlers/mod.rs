pub mod health;
pub mod projects;
pub mod security;
pub mod sprints;
pub mod tasks;
pub mod workspaces;
