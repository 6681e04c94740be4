//! Categories and brands

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Slug;
use crate::store::Entity;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { id: uuid::Uuid::now_v7().to_string(), slug: Slug::from_name(&name), name, image_url: None, created_at: Utc::now() }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = Slug::from_name(&self.name);
    }
}

impl Brand {
    pub fn create(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { id: uuid::Uuid::now_v7().to_string(), slug: Slug::from_name(&name), name, logo_url: None, created_at: Utc::now() }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = Slug::from_name(&self.name);
    }
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const NAME: &'static str = "Category";
    fn id(&self) -> &str { &self.id }
}

impl Entity for Brand {
    const COLLECTION: &'static str = "brands";
    const NAME: &'static str = "Brand";
    fn id(&self) -> &str { &self.id }
}
