//! # Template Model
//!
//! A template is a page description plus an ordered list of positioned,
//! typed elements. Element order is paint order: index 0 is painted first,
//! later elements cover earlier ones.
//!
//! ```
//! use folio::template::*;
//!
//! let json = r#"{
//!     "id": "invoice",
//!     "name": "Invoice",
//!     "pageSize": "a4",
//!     "orientation": "portrait",
//!     "elements": [
//!         {"id": "title", "type": "text",
//!          "position": {"x": 40, "y": 40, "width": 300, "height": 30},
//!          "properties": {"text": "INVOICE", "fontSize": 24}}
//!     ]
//! }"#;
//! let template = Template::from_json(json).unwrap();
//! template.validate().unwrap();
//! assert_eq!(template.page_geometry().width, 595.0);
//! ```
//!
//! The editor owns mutation: every update is a whole-element replacement
//! keyed by id ([`Template::replace_element`]). The renderer never mutates
//! a template.

pub mod types;

pub use types::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{FolioError, Result, ValidationError};

// ============================================================================
// PAGE
// ============================================================================

/// Named page size. Unrecognized names are kept so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
    Custom,
    Unrecognized(String),
}

impl From<String> for PageSize {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "a4" => PageSize::A4,
            "letter" => PageSize::Letter,
            "legal" => PageSize::Legal,
            "custom" => PageSize::Custom,
            _ => PageSize::Unrecognized(s),
        }
    }
}

impl From<PageSize> for String {
    fn from(size: PageSize) -> Self {
        size.to_string()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::A4 => write!(f, "a4"),
            PageSize::Letter => write!(f, "letter"),
            PageSize::Legal => write!(f, "legal"),
            PageSize::Custom => write!(f, "custom"),
            PageSize::Unrecognized(s) => write!(f, "{}", s),
        }
    }
}

/// Page orientation. Unrecognized values are kept so validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
    Unrecognized(String),
}

impl From<String> for Orientation {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Orientation::Portrait,
            "landscape" => Orientation::Landscape,
            _ => Orientation::Unrecognized(s),
        }
    }
}

impl From<Orientation> for String {
    fn from(o: Orientation) -> Self {
        o.to_string()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Unrecognized(s) => write!(f, "{}", s),
        }
    }
}

/// Page dimensions in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub const A4_PORTRAIT: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
    };

    /// Largest page side in points (the PDF user-space limit).
    pub const MAX_SIDE: f32 = 14400.0;

    /// Raster size at 1 pixel per point.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.ceil().max(1.0) as u32,
            self.height.ceil().max(1.0) as u32,
        )
    }
}

// ============================================================================
// TEMPLATE
// ============================================================================

/// A reusable page layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub orientation: Orientation,
    /// Page width in points, used when `page_size` is `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Page height in points, used when `page_size` is `custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Template {
    /// Create an empty A4 portrait template.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style element append (no id check; see [`Template::push_element`]).
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Parse a template from exported JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Export as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the template's structure.
    ///
    /// All problems are collected into a single [`ValidationError`].
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut issues = Vec::new();

        if let PageSize::Unrecognized(s) = &self.page_size {
            issues.push(format!("unrecognized page size '{}'", s));
        }
        if let Orientation::Unrecognized(s) = &self.orientation {
            issues.push(format!("unrecognized orientation '{}'", s));
        }
        if self.page_size == PageSize::Custom {
            match (self.width, self.height) {
                (Some(w), Some(h)) if w > 0.0 && h > 0.0 => {
                    if w > PageGeometry::MAX_SIDE || h > PageGeometry::MAX_SIDE {
                        issues.push(format!(
                            "custom page {}x{} exceeds the {}pt limit",
                            w,
                            h,
                            PageGeometry::MAX_SIDE
                        ));
                    }
                }
                _ => issues.push("custom page size requires positive width and height".into()),
            }
        }

        let mut seen = HashSet::new();
        for el in &self.elements {
            if !seen.insert(el.id.as_str()) {
                issues.push(format!("duplicate element id '{}'", el.id));
            }
            if el.position.width < 0.0 || el.position.height < 0.0 {
                issues.push(format!("element '{}' has negative size", el.id));
            }
            if let ElementKind::Image(img) = &el.kind
                && img.src.is_none()
                && el.data_mapping.is_none()
            {
                issues.push(format!("image element '{}' has no src and no data mapping", el.id));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Page geometry, or `None` if the size/orientation pair is not
    /// recognized or a custom size is out of range.
    pub fn try_page_geometry(&self) -> Option<PageGeometry> {
        let max = PageGeometry::MAX_SIDE;
        let (w, h) = match &self.page_size {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom => match (self.width, self.height) {
                (Some(w), Some(h)) if w > 0.0 && h > 0.0 && w <= max && h <= max => (w, h),
                _ => return None,
            },
            PageSize::Unrecognized(_) => return None,
        };
        match self.orientation {
            Orientation::Portrait => Some(PageGeometry { width: w, height: h }),
            Orientation::Landscape => Some(PageGeometry { width: h, height: w }),
            Orientation::Unrecognized(_) => None,
        }
    }

    /// Page geometry, falling back to A4 portrait for unrecognized pages.
    pub fn page_geometry(&self) -> PageGeometry {
        self.try_page_geometry().unwrap_or(PageGeometry::A4_PORTRAIT)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn position_of(&self, id: &str) -> Result<usize> {
        self.elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| FolioError::ElementNotFound(id.to_string()))
    }

    /// Append an element; its id must not already be in use.
    pub fn push_element(&mut self, element: Element) -> Result<()> {
        if self.element(&element.id).is_some() {
            return Err(FolioError::DuplicateElement(element.id));
        }
        self.elements.push(element);
        Ok(())
    }

    /// Replace the element with the same id, keeping its paint-order slot.
    ///
    /// Returns the previous element.
    pub fn replace_element(&mut self, element: Element) -> Result<Element> {
        let idx = self.position_of(&element.id)?;
        Ok(std::mem::replace(&mut self.elements[idx], element))
    }

    pub fn remove_element(&mut self, id: &str) -> Result<Element> {
        let idx = self.position_of(id)?;
        Ok(self.elements.remove(idx))
    }

    /// Bind an element to a data path.
    pub fn map_field(&mut self, id: &str, path: impl Into<String>) -> Result<()> {
        let idx = self.position_of(id)?;
        let mut element = self.elements[idx].clone();
        element.data_mapping = Some(path.into()).filter(|p: &String| !p.is_empty());
        self.replace_element(element).map(|_| ())
    }

    /// Remove an element's data binding.
    pub fn unmap_field(&mut self, id: &str) -> Result<()> {
        let idx = self.position_of(id)?;
        let mut element = self.elements[idx].clone();
        element.data_mapping = None;
        self.replace_element(element).map(|_| ())
    }

    /// Elements that carry a data mapping, in paint order.
    pub fn mapped_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.data_mapping.is_some())
    }
}
