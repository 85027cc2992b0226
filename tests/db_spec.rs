use std::path::Path;

use chrono::{Duration, NaiveDate, SecondsFormat, Utc};
use speculate2::speculate;
use taskpulse::analytics::AnalyticsAggregator;
use taskpulse::db::Database;
use taskpulse::insights::{basic_analysis, InsightGenerator};
use taskpulse::models::*;
use taskpulse::repository::TaskRepository;
use taskpulse::Error;

fn open_memory() -> Database {
    let db = Database::open_memory().expect("Failed to create in-memory database");
    db.migrate().expect("Failed to run migrations");
    db
}

fn create(repo: &TaskRepository, title: &str) -> Task {
    repo.create(CreateTaskInput::titled(title))
        .expect("Failed to create task")
}

fn create_with(
    repo: &TaskRepository,
    title: &str,
    status: TaskStatus,
    priority: TaskPriority,
) -> Task {
    repo.create(CreateTaskInput {
        title: Some(title.to_string()),
        status: Some(status),
        priority: Some(priority),
        ..CreateTaskInput::default()
    })
    .expect("Failed to create task")
}

fn backdate(path: &Path, id: i64, days: i64) -> NaiveDate {
    backdate_by(path, id, Duration::days(days))
}

/// Move a task's creation time into the past through a second connection.
fn backdate_by(path: &Path, id: i64, age: Duration) -> NaiveDate {
    let when = Utc::now() - age;
    let conn = rusqlite::Connection::open(path).expect("Failed to open second connection");
    conn.execute(
        "UPDATE tasks SET created_at = ?1 WHERE id = ?2",
        (when.to_rfc3339_opts(SecondsFormat::Millis, true), id),
    )
    .expect("Failed to backdate task");
    when.date_naive()
}

speculate! {
    before {
        let db = open_memory();
        let repo = TaskRepository::new(db.clone());
    }

    describe "tasks" {
        describe "create" {
            it "applies default status, priority and position" {
                let task = create(&repo, "Write tests");

                assert!(task.id > 0);
                assert_eq!(task.title, "Write tests");
                assert_eq!(task.status, TaskStatus::Todo);
                assert_eq!(task.priority, TaskPriority::Medium);
                assert_eq!(task.position, 0);
                assert!(task.description.is_none());
                assert!(task.completed_at.is_none());
            }

            it "keeps supplied fields" {
                let task = repo.create(CreateTaskInput {
                    title: Some("Ship release".to_string()),
                    description: Some("v1.2".to_string()),
                    status: Some(TaskStatus::InProgress),
                    priority: Some(TaskPriority::High),
                    position: Some(4),
                }).expect("Failed to create");

                assert_eq!(task.description, Some("v1.2".to_string()));
                assert_eq!(task.status, TaskStatus::InProgress);
                assert_eq!(task.priority, TaskPriority::High);
                assert_eq!(task.position, 4);
            }

            it "assigns distinct ids" {
                let a = create(&repo, "A");
                let b = create(&repo, "B");
                assert_ne!(a.id, b.id);
            }

            it "rejects an empty title" {
                let result = repo.create(CreateTaskInput::titled(""));
                assert!(matches!(result, Err(Error::Validation(_))));

                let result = repo.create(CreateTaskInput::titled("   "));
                assert!(matches!(result, Err(Error::Validation(_))));

                let result = repo.create(CreateTaskInput::default());
                assert!(matches!(result, Err(Error::Validation(_))));

                assert_eq!(repo.count().unwrap(), 0);
            }
        }

        describe "get" {
            it "returns the created task unchanged" {
                let created = repo.create(CreateTaskInput {
                    title: Some("Round trip".to_string()),
                    description: Some("details".to_string()),
                    status: Some(TaskStatus::Todo),
                    priority: Some(TaskPriority::Low),
                    position: Some(2),
                }).expect("Failed to create");

                let found = repo.get(created.id).expect("Query failed");
                assert_eq!(found, created);
            }

            it "returns NotFound for an unknown id" {
                assert!(matches!(repo.get(999), Err(Error::NotFound(_))));
            }
        }

        describe "list_all" {
            it "returns empty list when no tasks exist" {
                assert!(repo.list_all().unwrap().is_empty());
            }

            it "orders by position ascending" {
                repo.create(CreateTaskInput { position: Some(2), ..CreateTaskInput::titled("third") }).unwrap();
                repo.create(CreateTaskInput { position: Some(0), ..CreateTaskInput::titled("first") }).unwrap();
                repo.create(CreateTaskInput { position: Some(1), ..CreateTaskInput::titled("second") }).unwrap();

                let titles: Vec<_> = repo.list_all().unwrap().into_iter().map(|t| t.title).collect();
                assert_eq!(titles, vec!["first", "second", "third"]);
            }

            it "lists newer tasks first within the same position" {
                let older = create(&repo, "older");
                let newer = create(&repo, "newer");

                let ids: Vec<_> = repo.list_all().unwrap().into_iter().map(|t| t.id).collect();
                assert_eq!(ids, vec![newer.id, older.id]);
            }
        }

        describe "update" {
            it "changes only supplied fields" {
                let task = repo.create(CreateTaskInput {
                    description: Some("keep me".to_string()),
                    priority: Some(TaskPriority::High),
                    ..CreateTaskInput::titled("Original")
                }).unwrap();

                let updated = repo.update(task.id, UpdateTaskInput {
                    title: Some("Renamed".to_string()),
                    ..UpdateTaskInput::default()
                }).unwrap();

                assert_eq!(updated.title, "Renamed");
                assert_eq!(updated.description, Some("keep me".to_string()));
                assert_eq!(updated.priority, TaskPriority::High);
                assert_eq!(updated.status, TaskStatus::Todo);
                assert_eq!(updated.created_at, task.created_at);
            }

            it "stamps completed_at when moving into done" {
                let task = create(&repo, "Finish me");

                let done = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::Done),
                    ..UpdateTaskInput::default()
                }).unwrap();

                let completed_at = done.completed_at.expect("completed_at should be set");
                assert!(completed_at >= done.created_at);
            }

            it "leaves completed_at unchanged when already done" {
                let task = create(&repo, "Finish me");
                let first = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::Done),
                    ..UpdateTaskInput::default()
                }).unwrap();

                std::thread::sleep(std::time::Duration::from_millis(5));
                let second = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::Done),
                    title: Some("Still done".to_string()),
                    ..UpdateTaskInput::default()
                }).unwrap();

                assert_eq!(second.completed_at, first.completed_at);
            }

            it "keeps completed_at when moving back out of done" {
                let task = create(&repo, "Reopen me");
                let done = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::Done),
                    ..UpdateTaskInput::default()
                }).unwrap();

                let reopened = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::InProgress),
                    ..UpdateTaskInput::default()
                }).unwrap();

                assert_eq!(reopened.status, TaskStatus::InProgress);
                assert_eq!(reopened.completed_at, done.completed_at);
            }

            it "does not stamp completed_at for other transitions" {
                let task = create(&repo, "Start me");
                let started = repo.update(task.id, UpdateTaskInput {
                    status: Some(TaskStatus::InProgress),
                    ..UpdateTaskInput::default()
                }).unwrap();
                assert!(started.completed_at.is_none());
            }

            it "returns NotFound for an unknown id" {
                let result = repo.update(42, UpdateTaskInput::default());
                assert!(matches!(result, Err(Error::NotFound(_))));
            }

            it "rejects an empty title" {
                let task = create(&repo, "Named");
                let result = repo.update(task.id, UpdateTaskInput {
                    title: Some(String::new()),
                    ..UpdateTaskInput::default()
                });
                assert!(matches!(result, Err(Error::Validation(_))));
                assert_eq!(repo.get(task.id).unwrap().title, "Named");
            }
        }

        describe "reorder" {
            it "applies the submitted positions" {
                let a = create(&repo, "A");
                let b = create(&repo, "B");

                repo.reorder(&[
                    ReorderItem { id: a.id, position: 2 },
                    ReorderItem { id: b.id, position: 0 },
                ]).unwrap();

                let ids: Vec<_> = repo.list_all().unwrap().into_iter().map(|t| t.id).collect();
                assert_eq!(ids, vec![b.id, a.id]);
            }

            it "leaves tasks outside the batch untouched" {
                let a = create(&repo, "A");
                let b = repo.create(CreateTaskInput { position: Some(7), ..CreateTaskInput::titled("B") }).unwrap();

                repo.reorder(&[ReorderItem { id: a.id, position: 7 }]).unwrap();

                assert_eq!(repo.get(a.id).unwrap().position, 7);
                assert_eq!(repo.get(b.id).unwrap().position, 7);
            }

            it "ignores ids that do not exist" {
                let a = create(&repo, "A");

                repo.reorder(&[
                    ReorderItem { id: 9999, position: 1 },
                    ReorderItem { id: a.id, position: 3 },
                ]).unwrap();

                assert_eq!(repo.get(a.id).unwrap().position, 3);
                assert_eq!(repo.count().unwrap(), 1);
            }
        }

        describe "delete" {
            it "removes the task" {
                let task = create(&repo, "Remove me");
                repo.delete(task.id).unwrap();
                assert!(matches!(repo.get(task.id), Err(Error::NotFound(_))));
            }

            it "returns NotFound and leaves the store unchanged for an unknown id" {
                create(&repo, "Survivor");
                let before = repo.count().unwrap();

                let result = repo.delete(12345);

                assert!(matches!(result, Err(Error::NotFound(_))));
                assert_eq!(repo.count().unwrap(), before);
            }
        }
    }

    describe "analytics" {
        describe "daily_stats" {
            it "reports today's tasks by default" {
                let analytics = AnalyticsAggregator::new(db.clone());
                let a = create(&repo, "A");
                create(&repo, "B");
                create(&repo, "C");
                create(&repo, "D");
                repo.update(a.id, UpdateTaskInput { status: Some(TaskStatus::Done), ..UpdateTaskInput::default() }).unwrap();

                let stat = analytics.daily_stats(None).unwrap();

                assert_eq!(stat.date, Utc::now().date_naive());
                assert_eq!(stat.total_tasks, 4);
                assert_eq!(stat.completed_tasks, 1);
                assert_eq!(stat.completion_rate, 25.0);
            }

            it "zero-fills a date without tasks" {
                let analytics = AnalyticsAggregator::new(db.clone());
                create(&repo, "today only");
                let date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();

                let stat = analytics.daily_stats(Some(date)).unwrap();

                assert_eq!(stat, DailyStat { date, total_tasks: 0, completed_tasks: 0, completion_rate: 0.0 });
                assert!(!stat.completion_rate.is_nan());
            }
        }

        describe "weekly_stats" {
            it "is empty without tasks" {
                let analytics = AnalyticsAggregator::new(db.clone());
                assert!(analytics.weekly_stats().unwrap().is_empty());
            }

            it "groups the trailing week by date, newest first" {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("tasks.db");
                let file_db = Database::open(path.clone()).unwrap();
                file_db.migrate().unwrap();
                let repo = TaskRepository::new(file_db.clone());
                let analytics = AnalyticsAggregator::new(file_db.clone());

                let today_done = create(&repo, "today done");
                create(&repo, "today open");
                let earlier = create_with(&repo, "earlier", TaskStatus::Done, TaskPriority::Low);
                let ancient = create(&repo, "ancient");
                repo.update(today_done.id, UpdateTaskInput { status: Some(TaskStatus::Done), ..UpdateTaskInput::default() }).unwrap();
                let earlier_date = backdate(&path, earlier.id, 2);
                backdate(&path, ancient.id, 10);

                let stats = analytics.weekly_stats().unwrap();

                assert_eq!(stats.len(), 2);
                assert_eq!(stats[0].date, Utc::now().date_naive());
                assert_eq!(stats[0].total_tasks, 2);
                assert_eq!(stats[0].completed_tasks, 1);
                assert_eq!(stats[0].completion_rate, 50.0);
                assert_eq!(stats[1].date, earlier_date);
                assert_eq!(stats[1].total_tasks, 1);
                assert_eq!(stats[1].completion_rate, 100.0);

                let daily = analytics.daily_stats(Some(earlier_date)).unwrap();
                assert_eq!(daily.total_tasks, 1);
                assert_eq!(daily.completed_tasks, 1);
            }

            it "cuts the window off seven days before now" {
                let dir = tempfile::tempdir().unwrap();
                let path = dir.path().join("tasks.db");
                let file_db = Database::open(path.clone()).unwrap();
                file_db.migrate().unwrap();
                let repo = TaskRepository::new(file_db.clone());
                let analytics = AnalyticsAggregator::new(file_db.clone());

                let inside = create(&repo, "six days and change");
                let outside = create(&repo, "just over a week");
                let inside_date = backdate_by(&path, inside.id, Duration::days(7) - Duration::minutes(30));
                backdate_by(&path, outside.id, Duration::days(7) + Duration::minutes(30));

                let stats = analytics.weekly_stats().unwrap();

                assert_eq!(stats.len(), 1);
                assert_eq!(stats[0].date, inside_date);
                assert_eq!(stats[0].total_tasks, 1);
            }
        }

        describe "daily_stats cache" {
            it "stores and overwrites a day's record" {
                let analytics = AnalyticsAggregator::new(db.clone());
                let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
                assert!(analytics.cached_daily_stat(date).unwrap().is_none());

                analytics.cache_daily_stat(&DailyStat::new(date, 4, 1)).unwrap();
                analytics.cache_daily_stat(&DailyStat::new(date, 5, 5)).unwrap();

                let cached = analytics.cached_daily_stat(date).unwrap().expect("cached row");
                assert_eq!(cached, DailyStat::new(date, 5, 5));
            }
        }
    }

    describe "insights" {
        it "records a heuristic analysis and lists it newest first" {
            let generator = InsightGenerator::new(db.clone(), None);
            create_with(&repo, "Plan sprint", TaskStatus::Done, TaskPriority::High);
            create_with(&repo, "Fix login", TaskStatus::Todo, TaskPriority::High);

            let tasks = repo.list_all().unwrap();
            let result = tokio_test::block_on(generator.analyze(&tasks));
            assert_eq!(result, basic_analysis(&tasks));

            let saved = generator.record_analysis(&result).unwrap();
            assert_eq!(saved.len(), result.len());
            assert!(saved.iter().all(|i| i.confidence_score == DEFAULT_CONFIDENCE));

            let recent = generator.recent_insights().unwrap();
            assert_eq!(recent.len(), saved.len().min(10));
            assert_eq!(recent[0].id, saved.last().unwrap().id);
            assert_eq!(recent[0].insight_type, InsightType::Recommendation);
        }

        it "returns placeholders for an empty task list" {
            let generator = InsightGenerator::new(db.clone(), None);

            let result = tokio_test::block_on(generator.analyze(&[]));

            assert_eq!(result.patterns, vec!["No tasks to analyze yet"]);
            assert_eq!(result.completion_insights, vec!["Start adding tasks to get insights"]);
            assert!(result.failure_reasons.is_empty());
            assert_eq!(result.recommendations, vec!["Create your first task to begin tracking your productivity"]);
        }

        it "keeps a supplied confidence score" {
            let generator = InsightGenerator::new(db.clone(), None);
            let saved = generator.save_insight(NewInsight {
                insight_type: InsightType::Pattern,
                content: "Fridays are slow".to_string(),
                related_tasks: Some("[1,2]".to_string()),
                confidence_score: Some(0.35),
            }).unwrap();

            assert_eq!(saved.confidence_score, 0.35);
            assert_eq!(saved.related_tasks, Some("[1,2]".to_string()));
        }
    }
}
