use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    Engine, EngineError, NewProjectCmd, NewTaskCmd, TaskStatus, UpdateProjectCmd, UpdateTaskCmd,
};
use migration::MigratorTrait;

async fn engine_with_users(users: &[&str]) -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .password_cost(4)
        .build()
        .await
        .unwrap();
    for user in users {
        engine.create_user(user, "password").await.unwrap();
    }
    engine
}

#[tokio::test]
async fn users_authenticate_with_their_password() {
    let engine = engine_with_users(&["alice"]).await;
    assert_eq!(
        engine.authenticate("alice", "password").await.unwrap(),
        Some("alice".to_string())
    );
    assert_eq!(engine.authenticate("alice", "nope").await.unwrap(), None);
    assert_eq!(engine.authenticate("carol", "password").await.unwrap(), None);
    assert!(engine.user_exists("alice").await.unwrap());
    assert!(!engine.user_exists("carol").await.unwrap());

    let err = engine.create_user("alice", "other").await.unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("alice".to_string()));
    let err = engine.create_user("  ", "pw").await.unwrap_err();
    assert_eq!(err.field(), Some("username"));
}

#[tokio::test]
async fn categories_are_scoped_to_their_owner() {
    let engine = engine_with_users(&["alice", "bob"]).await;
    let food = engine.create_category("alice", "  Food ").await.unwrap();
    assert_eq!(food.name, "Food");
    engine.create_category("bob", "Travel").await.unwrap();

    let names: Vec<String> = engine
        .list_categories("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["Food"]);

    assert!(matches!(
        engine.category("bob", food.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.update_category("bob", food.id, "Mine").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_category("bob", food.id).await,
        Err(EngineError::KeyNotFound(_))
    ));

    let renamed = engine
        .update_category("alice", food.id, "Groceries")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Groceries");

    assert!(matches!(
        engine.create_category("alice", "   ").await,
        Err(EngineError::InvalidName(_))
    ));
}

#[tokio::test]
async fn projects_filter_by_activity_and_sort_by_update() {
    let engine = engine_with_users(&["alice"]).await;
    let first = engine
        .create_project(NewProjectCmd::new("alice", "House"))
        .await
        .unwrap();
    let second = engine
        .create_project(NewProjectCmd {
            is_active: Some(false),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..NewProjectCmd::new("alice", "Garden")
        })
        .await
        .unwrap();
    assert!(first.is_active);
    assert!(!second.is_active);

    let active = engine.list_projects("alice", Some(true)).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, first.id);

    engine
        .update_project(
            "alice",
            first.id,
            UpdateProjectCmd {
                description: Some(Some("kitchen".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let all = engine.list_projects("alice", None).await.unwrap();
    assert_eq!(all[0].id, first.id);
    assert_eq!(all[0].description.as_deref(), Some("kitchen"));

    assert!(matches!(
        engine
            .update_project(
                "alice",
                first.id,
                UpdateProjectCmd {
                    name: Some(String::new()),
                    ..Default::default()
                },
            )
            .await,
        Err(EngineError::InvalidName(_))
    ));
}

#[tokio::test]
async fn tasks_live_inside_owned_projects() {
    let engine = engine_with_users(&["alice", "bob"]).await;
    let project = engine
        .create_project(NewProjectCmd::new("alice", "House"))
        .await
        .unwrap();

    let task = engine
        .create_task(NewTaskCmd {
            owner: Some("bob".to_string()),
            priority: Some(2),
            ..NewTaskCmd::new("alice", project.id, "Paint walls")
        })
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::NotStarted);
    assert_eq!(task.owner_id.as_deref(), Some("bob"));

    let touched = engine.project("alice", project.id).await.unwrap();
    assert!(touched.updated_at >= project.updated_at);

    let err = engine
        .create_task(NewTaskCmd {
            owner: Some("nobody".to_string()),
            ..NewTaskCmd::new("alice", project.id, "Ghost work")
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("owner"));

    assert!(matches!(
        engine.list_tasks("bob", project.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .create_task(NewTaskCmd::new("bob", project.id, "Sneaky"))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));

    let updated = engine
        .update_task(
            "alice",
            project.id,
            task.id,
            UpdateTaskCmd {
                status: Some(TaskStatus::Completed),
                owner: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);
    assert_eq!(updated.owner_id, None);

    engine.delete_task("alice", project.id, task.id).await.unwrap();
    assert!(engine.list_tasks("alice", project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_project_removes_its_tasks() {
    let engine = engine_with_users(&["alice"]).await;
    let project = engine
        .create_project(NewProjectCmd::new("alice", "House"))
        .await
        .unwrap();
    let task = engine
        .create_task(NewTaskCmd::new("alice", project.id, "Paint"))
        .await
        .unwrap();

    engine.delete_project("alice", project.id).await.unwrap();
    assert!(matches!(
        engine.task("alice", project.id, task.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.list_projects("alice", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn teams_keep_unique_existing_members() {
    let engine = engine_with_users(&["alice", "bob", "carol"]).await;
    let team = engine
        .create_team(
            "alice",
            &["bob".to_string(), "carol".to_string(), "bob".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(team.members, vec!["bob", "carol"]);

    let err = engine
        .create_team("alice", &["mallory".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("members"));

    let updated = engine
        .update_team("alice", team.id, &["alice".to_string()])
        .await
        .unwrap();
    assert_eq!(updated.members, vec!["alice"]);

    let listed = engine.list_teams("alice").await.unwrap();
    assert_eq!(listed, vec![updated.clone()]);
    assert!(engine.list_teams("bob").await.unwrap().is_empty());

    assert!(matches!(
        engine.delete_team("bob", team.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine.delete_team("alice", team.id).await.unwrap();
    assert!(matches!(
        engine.team("alice", team.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
