use crate::db::executor::SqlValue;
use serde::{Deserialize, Deserializer, Serialize};

// Distinguishes an absent key (None) from an explicit null (Some(None))
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ============================================================================
// Company Models
// ============================================================================

/// Company a job belongs to; read-only from this crate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

// ============================================================================
// Job Models
// ============================================================================

/// Job as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Exact decimal in [0, 1], kept as its string form
    pub equity: Option<String>,
    pub company_handle: String,
}

/// Data for creating a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<String>,
    pub company_handle: String,
}

/// Row of a job listing, with the company's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

/// Single job with its company nested in place of the handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company: Option<Company>,
}

/// Optional search criteria for listing jobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    #[serde(default)]
    pub min_salary: Option<u32>,
    #[serde(default)]
    pub has_equity: Option<bool>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Partial update for a job. `id` and `companyHandle` cannot change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub equity: Option<Option<String>>,
}

impl JobUpdate {
    /// Present fields as (column, value) pairs.
    ///
    /// The order is fixed by field declaration (title, salary, equity), not by
    /// the key order of the incoming document. Only placeholder numbering
    /// depends on it.
    pub fn into_changes(self) -> Vec<(&'static str, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(title) = self.title {
            changes.push(("title", SqlValue::from(title)));
        }
        if let Some(salary) = self.salary {
            changes.push(("salary", SqlValue::from(salary)));
        }
        if let Some(equity) = self.equity {
            changes.push(("equity", SqlValue::numeric(equity)));
        }
        changes
    }
}

// ============================================================================
// User Models
// ============================================================================

/// Registration data; `password` is plaintext and never stored as-is
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// User as returned to callers. There is deliberately no password field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// User with the ids of the jobs they applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub applications: Vec<i32>,
}

/// Partial update for a user. `username` cannot change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.is_admin.is_none()
    }

    /// Present fields as (domain key, value) pairs.
    ///
    /// The order is fixed by field declaration, not by the key order of the
    /// incoming document. The plaintext password is dropped; `password_hash` takes its slot.
    pub fn into_changes(self, password_hash: Option<String>) -> Vec<(&'static str, SqlValue)> {
        let mut changes = Vec::new();
        if let Some(first_name) = self.first_name {
            changes.push(("firstName", SqlValue::from(first_name)));
        }
        if let Some(last_name) = self.last_name {
            changes.push(("lastName", SqlValue::from(last_name)));
        }
        if let Some(email) = self.email {
            changes.push(("email", SqlValue::from(email)));
        }
        if let Some(hash) = password_hash {
            changes.push(("password", SqlValue::from(hash)));
        }
        if let Some(is_admin) = self.is_admin {
            changes.push(("isAdmin", SqlValue::from(is_admin)));
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_update_distinguishes_null_from_absent() {
        let update: JobUpdate = serde_json::from_value(json!({"salary": null})).unwrap();
        assert_eq!(update.salary, Some(None));
        assert_eq!(update.equity, None);

        let changes = update.into_changes();
        assert_eq!(changes, vec![("salary", SqlValue::Int(None))]);
    }

    #[test]
    fn test_job_update_rejects_immutable_fields() {
        let result = serde_json::from_value::<JobUpdate>(json!({"companyHandle": "c2"}));
        assert!(result.is_err());
        let result = serde_json::from_value::<JobUpdate>(json!({"handle": "new"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_job_filter_rejects_unknown_keys() {
        let result = serde_json::from_value::<JobFilter>(json!({"minSalary": 2, "nope": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_job_detail_serializes_nested_company() {
        let detail = JobDetail {
            id: 1,
            title: "J1".to_string(),
            salary: Some(1),
            equity: Some("0.1".to_string()),
            company: Some(Company {
                handle: "c1".to_string(),
                name: "C1".to_string(),
                description: Some("Desc1".to_string()),
                num_employees: Some(1),
                logo_url: Some("http://c1.img".to_string()),
            }),
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["company"]["numEmployees"], json!(1));
        assert_eq!(value["company"]["logoUrl"], json!("http://c1.img"));
        assert!(value.get("companyHandle").is_none());
    }

    #[test]
    fn test_user_detail_flattens_user() {
        let detail = UserDetail {
            user: User {
                username: "u1".to_string(),
                first_name: "U1F".to_string(),
                last_name: "U1L".to_string(),
                email: "u1@email.com".to_string(),
                is_admin: false,
            },
            applications: vec![3],
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["firstName"], json!("U1F"));
        assert_eq!(value["applications"], json!([3]));
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_user_update_substitutes_password_hash() {
        let update = UserUpdate {
            first_name: Some("New".to_string()),
            password: Some("plaintext".to_string()),
            is_admin: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());

        let changes = update.into_changes(Some("$2b$hash".to_string()));
        assert_eq!(
            changes,
            vec![
                ("firstName", SqlValue::from("New")),
                ("password", SqlValue::from("$2b$hash")),
                ("isAdmin", SqlValue::from(true)),
            ]
        );
    }

    #[test]
    fn test_job_update_changes_follow_declaration_order() {
        let update: JobUpdate =
            serde_json::from_value(json!({"equity": "0.5", "title": "Dev"})).unwrap();

        let keys: Vec<_> = update.into_changes().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["title", "equity"]);
    }
}
