//! Homepage banners

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "active_by_default")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn active_by_default() -> bool { true }

impl Promotion {
    pub fn create(image_url: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(), image_url: image_url.into(), title: None, description: None,
            link: None, position: 0, active: true, created_at: Utc::now(),
        }
    }
}

/// Active banners in carousel order.
pub fn carousel(mut promotions: Vec<Promotion>) -> Vec<Promotion> {
    promotions.retain(|p| p.active);
    promotions.sort_by_key(|p| p.position);
    promotions
}

impl Entity for Promotion {
    const COLLECTION: &'static str = "promotions";
    const NAME: &'static str = "Promotion";
    fn id(&self) -> &str { &self.id }
}
