pub mod admin;
pub mod auth;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod uploads;
pub mod users;

use serde::{Deserialize, Serialize};

/// `?page=&size=` query. Defaults depend on the endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Count {
    pub count: i64,
}
