//! Users, render jobs and dashboard statistics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    AdminSuper,
    AdminOrg,
    Member,
    EndUser,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::AdminSuper | Role::AdminOrg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub organization_id: String,
    pub credits: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub id: String,
    pub user_id: String,
    pub status: RenderStatus,
    /// Zero while pending
    pub latency_ms: u64,
}

impl RenderJob {
    pub fn new(id: &str, user_id: &str, status: RenderStatus, latency_ms: u64) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            status,
            latency_ms,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status != RenderStatus::Pending
    }
}

pub fn mock_users() -> Vec<User> {
    let user = |id: &str, email: &str, name: &str, role, credits| User {
        id: id.into(),
        email: email.into(),
        name: name.into(),
        role,
        organization_id: "org1".into(),
        credits,
    };
    vec![
        user("user1", "olivia@example.com", "Olivia Martin", Role::AdminOrg, 500),
        user("user2", "jackson@example.com", "Jackson Lee", Role::Member, 99),
        user("user3", "sofia@example.com", "Sofia Nguyen", Role::EndUser, 8),
    ]
}

pub fn mock_jobs() -> Vec<RenderJob> {
    vec![
        RenderJob::new("RND-8210", "user1", RenderStatus::Failed, 30_412),
        RenderJob::new("RND-8219", "user1", RenderStatus::Completed, 14_230),
        RenderJob::new("RND-8220", "user2", RenderStatus::Completed, 11_870),
        RenderJob::new("RND-8221", "user3", RenderStatus::Pending, 0),
    ]
}

/// Users whose credit balance is below `threshold`
pub fn low_balance(users: &[User], threshold: i64) -> impl Iterator<Item = &User> {
    users.iter().filter(move |u| u.credits < threshold)
}

/// Aggregate render figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
    /// Completed share of finished jobs; `None` when nothing has finished
    pub success_rate: Option<f64>,
    /// Mean latency of finished jobs
    pub mean_latency_ms: Option<f64>,
}

impl DashboardStats {
    pub fn from_jobs(jobs: &[RenderJob]) -> Self {
        let mut stats = Self {
            total: jobs.len(),
            ..Self::default()
        };
        let mut latency_sum = 0u64;
        for job in jobs {
            match job.status {
                RenderStatus::Completed => stats.completed += 1,
                RenderStatus::Failed => stats.failed += 1,
                RenderStatus::Pending => stats.pending += 1,
            }
            if job.is_finished() {
                latency_sum += job.latency_ms;
            }
        }

        let finished = stats.completed + stats.failed;
        if finished > 0 {
            stats.success_rate = Some(stats.completed as f64 / finished as f64);
            stats.mean_latency_ms = Some(latency_sum as f64 / finished as f64);
        }
        stats
    }
}
