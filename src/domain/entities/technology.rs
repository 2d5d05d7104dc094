use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub id: Uuid,
    pub name: String,
    pub icon_url: String,
}

/// Name and icon for a technology that is looked up by name, or created.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTechnology {
    #[validate(length(min = 1, max = 255, message = "Technology name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Icon URL cannot be empty"))]
    pub icon_url: String,
}

/// Body of `POST /projects/{id}/technologies`: an existing technology by id,
/// or a new one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyRequest {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Technology name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Icon URL cannot be empty"))]
    pub icon_url: String,
}

impl TechnologyRequest {
    pub fn into_technology(self) -> Technology {
        Technology {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self.name,
            icon_url: self.icon_url,
        }
    }
}

impl NewTechnology {
    pub fn into_technology(self) -> Technology {
        Technology {
            id: Uuid::new_v4(),
            name: self.name,
            icon_url: self.icon_url,
        }
    }
}

/// A technology together with the projects that list it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyDetails {
    pub id: Uuid,
    pub name: String,
    pub icon_url: String,
    pub project_ids: Vec<Uuid>,
}

impl TechnologyDetails {
    pub fn new(technology: Technology, project_ids: Vec<Uuid>) -> Self {
        TechnologyDetails {
            id: technology.id,
            name: technology.name,
            icon_url: technology.icon_url,
            project_ids,
        }
    }
}
