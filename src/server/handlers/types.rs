//! Element type catalogue for editor palettes.

use axum::Json;

use crate::template::{ElementTypeMeta, element_types};

/// Handle GET /api/element-types - list element types with starter properties.
pub async fn list() -> Json<Vec<ElementTypeMeta>> {
    Json(element_types())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_every_type() {
        let Json(types) = list().await;
        let names: Vec<&str> = types.iter().map(|t| t.type_name.as_str()).collect();
        assert_eq!(names, vec!["text", "paragraph", "image", "rectangle", "circle", "table"]);
    }
}
