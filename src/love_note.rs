use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub struct LoveNote {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    pub created_at: DateTime<Utc>,
}
