use serde::{Deserialize, Serialize};

/// Per-section rule constraining whether content blocks may/must carry an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    Required,
    Optional,
    Forbidden,
}

impl ImageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMode::Required => "required",
            ImageMode::Optional => "optional",
            ImageMode::Forbidden => "forbidden",
        }
    }

    /// Unknown values from the DB fall back to `Optional` rather than panicking.
    pub fn parse(s: &str) -> Self {
        match s {
            "required" => ImageMode::Required,
            "forbidden" => ImageMode::Forbidden,
            _ => ImageMode::Optional,
        }
    }
}

/// A section template: fixed catalog entry defining which sub-entities and
/// image mode a section supports. Capability flags are derived from here at
/// section creation and never taken from the client.
#[derive(Debug, Clone, Serialize)]
pub struct SectionTemplate {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub image_mode: ImageMode,
    pub has_title: bool,
    pub has_description: bool,
    pub has_link: bool,
    pub has_features: bool,
    pub has_services: bool,
    pub has_gallery: bool,
    pub has_overlay: bool,
    pub max_blocks: Option<i64>,
    pub supports_image_position: bool,
}

pub const TEMPLATES: &[SectionTemplate] = &[
    SectionTemplate {
        code: "hero",
        name: "Hero banner",
        description: "Full-width header image with overlay text",
        image_mode: ImageMode::Required,
        has_title: false,
        has_description: false,
        has_link: false,
        has_features: false,
        has_services: false,
        has_gallery: false,
        has_overlay: true,
        max_blocks: Some(1),
        supports_image_position: true,
    },
    SectionTemplate {
        code: "text_image",
        name: "Text with image",
        description: "Paragraph of text next to a photo",
        image_mode: ImageMode::Optional,
        has_title: true,
        has_description: true,
        has_link: true,
        has_features: false,
        has_services: false,
        has_gallery: false,
        has_overlay: false,
        max_blocks: None,
        supports_image_position: true,
    },
    SectionTemplate {
        code: "services_grid",
        name: "Services grid",
        description: "Grid of hotel services with icons",
        image_mode: ImageMode::Forbidden,
        has_title: true,
        has_description: true,
        has_link: false,
        has_features: false,
        has_services: true,
        has_gallery: false,
        has_overlay: false,
        max_blocks: None,
        supports_image_position: false,
    },
    SectionTemplate {
        code: "features_list",
        name: "Features list",
        description: "List of amenities with icons",
        image_mode: ImageMode::Forbidden,
        has_title: true,
        has_description: true,
        has_link: false,
        has_features: true,
        has_services: false,
        has_gallery: false,
        has_overlay: false,
        max_blocks: None,
        supports_image_position: false,
    },
    SectionTemplate {
        code: "checklist",
        name: "Checklist",
        description: "Checkmarked list of included items",
        image_mode: ImageMode::Forbidden,
        has_title: true,
        has_description: false,
        has_link: false,
        has_features: true,
        has_services: false,
        has_gallery: false,
        has_overlay: false,
        max_blocks: None,
        supports_image_position: false,
    },
    SectionTemplate {
        code: "gallery",
        name: "Photo gallery",
        description: "Grid of photos with lightbox",
        image_mode: ImageMode::Forbidden,
        has_title: true,
        has_description: false,
        has_link: false,
        has_features: false,
        has_services: false,
        has_gallery: true,
        has_overlay: false,
        max_blocks: None,
        supports_image_position: false,
    },
    SectionTemplate {
        code: "cards",
        name: "Card row",
        description: "Row of image cards with title and link",
        image_mode: ImageMode::Required,
        has_title: true,
        has_description: true,
        has_link: true,
        has_features: false,
        has_services: false,
        has_gallery: false,
        has_overlay: false,
        max_blocks: Some(6),
        supports_image_position: false,
    },
    SectionTemplate {
        code: "banner",
        name: "Call-to-action banner",
        description: "Single highlighted message with a button",
        image_mode: ImageMode::Optional,
        has_title: true,
        has_description: true,
        has_link: true,
        has_features: false,
        has_services: false,
        has_gallery: false,
        has_overlay: false,
        max_blocks: Some(1),
        supports_image_position: true,
    },
];

/// Look up a template by code. Server-side only — client-submitted capability
/// flags are never trusted.
pub fn find_template(code: &str) -> Option<&'static SectionTemplate> {
    TEMPLATES.iter().find(|t| t.code == code)
}

/// Icon code pinned to checklist-template features when the form omits one.
pub const CHECKLIST_ICON: &str = "check";
