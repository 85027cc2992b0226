//! Rule-based analysis used whenever the text-generation API is unavailable.

use crate::models::{AnalysisResult, Task, TaskPriority, TaskStatus};

/// Counts derived from a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub high_completed: usize,
    pub high_pending: usize,
}

impl TaskCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let mut counts = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            let high = task.priority == TaskPriority::High;
            if task.status == TaskStatus::Done {
                counts.completed += 1;
                counts.high_completed += usize::from(high);
            } else {
                counts.incomplete += 1;
                counts.high_pending += usize::from(high);
            }
        }
        counts
    }

    /// Percentage of tasks done, 0 for an empty list.
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// The priority bucket with the most tasks.
///
/// Buckets are compared in the order high, medium, low and only a strictly
/// larger count replaces the current leader, so earlier buckets win ties.
pub fn most_common_priority(tasks: &[Task]) -> TaskPriority {
    let count = |p: TaskPriority| tasks.iter().filter(|t| t.priority == p).count();
    let mut best = (TaskPriority::High, count(TaskPriority::High));
    for priority in [TaskPriority::Medium, TaskPriority::Low] {
        let n = count(priority);
        if n > best.1 {
            best = (priority, n);
        }
    }
    best.0
}

/// Deterministic analysis from task counts alone.
pub fn basic_analysis(tasks: &[Task]) -> AnalysisResult {
    let counts = TaskCounts::of(tasks);
    let rate = counts.completion_rate();

    let patterns = vec![
        format!(
            "You create an average of {:.1} tasks per week",
            counts.total as f64 / 7.0
        ),
        format!(
            "Most of your tasks are {} priority",
            most_common_priority(tasks).as_str()
        ),
    ];

    let mut completion_insights = Vec::new();
    if counts.completed == 0 {
        completion_insights.push(
            "You haven't completed any tasks yet. Start with a small one to build momentum!"
                .to_string(),
        );
    } else {
        completion_insights.push(format!(
            "Your completion rate is {}%",
            rate.round() as i64
        ));
        if counts.high_completed > 0 {
            completion_insights.push(format!(
                "You've completed {} high-priority task{}",
                counts.high_completed,
                plural(counts.high_completed)
            ));
        }
    }

    let mut failure_reasons = Vec::new();
    if counts.incomplete > 0 {
        if counts.high_pending > 0 {
            failure_reasons.push(format!(
                "{} high-priority task{} still pending",
                counts.high_pending,
                if counts.high_pending == 1 { " is" } else { "s are" }
            ));
        }
        if counts.incomplete > counts.completed {
            failure_reasons
                .push("You have more incomplete tasks than completed ones".to_string());
        }
    }

    let mut recommendations = Vec::new();
    if rate < 50.0 && counts.total > 3 {
        recommendations.push("Focus on finishing existing tasks before adding more".to_string());
    }
    if counts.high_pending > 0 {
        recommendations.push("Prioritize your high-priority tasks first".to_string());
    }
    if counts.incomplete > 10 {
        recommendations
            .push("Consider archiving or breaking down old incomplete tasks".to_string());
    } else {
        recommendations.push("Keep up the good work and stay consistent".to_string());
    }

    AnalysisResult {
        patterns,
        completion_insights,
        failure_reasons,
        recommendations,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
