use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer reference data. Read-only from the dashboard's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image_url: String,
}
