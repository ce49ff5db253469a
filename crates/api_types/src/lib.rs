use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A monetary amount as it travels over the wire.
///
/// Requests may carry a JSON number (`12.5`) or a string (`"12.50"`);
/// responses always carry a string with two decimals. The value is parsed
/// and validated by the server, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(pub String);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Self(text),
            Raw::Integer(value) => Self(value.to_string()),
            Raw::Float(value) => Self(value.to_string()),
        })
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Distinguishes a field set to `null` from a missing one in PATCH bodies.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: a
/// missing field stays `None`, `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Balance {
        pub id: i32,
        pub amount: Amount,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionType {
        In,
        Out,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub transaction_type: TransactionType,
        pub amount: Amount,
        /// Defaults to today.
        pub created_at: Option<NaiveDate>,
        pub description: Option<String>,
        /// Category id.
        pub category: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub transaction_type: Option<TransactionType>,
        pub amount: Option<Amount>,
        pub created_at: Option<NaiveDate>,
        #[serde(default, deserialize_with = "double_option")]
        pub description: Option<Option<String>>,
        #[serde(default, deserialize_with = "double_option")]
        pub category: Option<Option<i32>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        /// Any day of the month to list (`YYYY-MM-DD`).
        pub created_at: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Transaction {
        pub id: i32,
        pub transaction_type: TransactionType,
        pub amount: Amount,
        pub created_at: NaiveDate,
        pub updated_at: DateTime<Utc>,
        pub description: Option<String>,
        pub category: Option<i32>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Category {
        pub id: i32,
        pub name: String,
    }
}

pub mod project {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub name: String,
        pub description: Option<String>,
        pub end_date: Option<NaiveDate>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectUpdate {
        pub name: Option<String>,
        #[serde(default, deserialize_with = "double_option")]
        pub description: Option<Option<String>>,
        #[serde(default, deserialize_with = "double_option")]
        pub end_date: Option<Option<NaiveDate>>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProjectListQuery {
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Project {
        pub id: i32,
        pub user: String,
        pub name: String,
        pub description: Option<String>,
        pub end_date: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        pub is_active: bool,
    }
}

pub mod task {
    use super::*;

    /// `N` not started, `P` in progress, `R` in review, `C` completed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum TaskStatus {
        N,
        P,
        R,
        C,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TaskNew {
        pub name: String,
        pub description: Option<String>,
        pub status: Option<TaskStatus>,
        pub priority: Option<u32>,
        pub due_date: Option<NaiveDate>,
        /// Username of the assignee.
        pub owner: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TaskUpdate {
        pub name: Option<String>,
        #[serde(default, deserialize_with = "double_option")]
        pub description: Option<Option<String>>,
        pub status: Option<TaskStatus>,
        pub priority: Option<u32>,
        #[serde(default, deserialize_with = "double_option")]
        pub due_date: Option<Option<NaiveDate>>,
        #[serde(default, deserialize_with = "double_option")]
        pub owner: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Task {
        pub id: i32,
        pub project: i32,
        pub user: String,
        pub owner: Option<String>,
        pub name: String,
        pub description: Option<String>,
        pub status: TaskStatus,
        pub priority: u32,
        pub due_date: Option<NaiveDate>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod team {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TeamMembers {
        #[serde(default)]
        pub members: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Team {
        pub id: i32,
        pub user: String,
        pub members: Vec<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transaction::TransactionUpdate;

    #[test]
    fn amount_accepts_numbers_and_strings() {
        let amount: Amount = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(amount, Amount::from("12.50"));
        let amount: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(amount, Amount::from("12.5"));
        let amount: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(amount, Amount::from("7"));
        assert_eq!(serde_json::to_string(&Amount::from("7.00")).unwrap(), "\"7.00\"");
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let patch: TransactionUpdate = serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert_eq!(patch.category, Some(None));
        assert_eq!(patch.description, None);

        let patch: TransactionUpdate =
            serde_json::from_str(r#"{"category": 3, "description": "rent"}"#).unwrap();
        assert_eq!(patch.category, Some(Some(3)));
        assert_eq!(patch.description, Some(Some("rent".to_string())));
    }
}
