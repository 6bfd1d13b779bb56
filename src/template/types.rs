//! Element struct types for the template model.
//!
//! Each element type has its own property struct. Every field carries a serde
//! default, so a partially specified element from the editor always renders.
//!
//! Each property struct implements [`ElementMeta`] to declare its display
//! label and editor starter value, used by the editor-facing API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata that every element property struct must provide.
pub trait ElementMeta: Sized {
    /// Human-readable display label (e.g. "Text", "Rectangle").
    fn label() -> &'static str;

    /// Starter value for a freshly created element in the editor.
    ///
    /// Distinct from `Default`: render defaults fill in missing fields,
    /// editor defaults give new elements visible content.
    fn editor_default() -> Self;
}

// ============================================================================
// POSITION
// ============================================================================

/// Placement of an element on the page, in points with a top-left origin.
///
/// `angle` is in degrees and rotates about the element's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub angle: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle: 0.0,
        }
    }

    pub fn rotated(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Zero-area elements occupy a node but paint nothing.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

// ============================================================================
// TEXT
// ============================================================================

fn default_font_size() -> f32 {
    14.0
}

fn default_font_family() -> String {
    "Arial".into()
}

fn default_text_align() -> String {
    "left".into()
}

fn default_font_weight() -> String {
    "normal".into()
}

fn default_black() -> String {
    "#000000".into()
}

/// Properties of `text` and `paragraph` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// "left", "center", "right" or "justify".
    #[serde(default = "default_text_align")]
    pub text_align: String,
    /// "normal", "bold", or a numeric CSS weight.
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default = "default_black")]
    pub color: String,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            text_align: default_text_align(),
            font_weight: default_font_weight(),
            color: default_black(),
        }
    }
}

impl ElementMeta for TextProps {
    fn label() -> &'static str { "Text" }
    fn editor_default() -> Self {
        Self {
            text: "Enter text here".into(),
            font_size: 16.0,
            ..Default::default()
        }
    }
}

impl TextProps {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Paragraph elements share the text property shape; only the label differs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParagraphProps(pub TextProps);

impl ElementMeta for ParagraphProps {
    fn label() -> &'static str { "Paragraph" }
    fn editor_default() -> Self {
        Self(TextProps::editor_default())
    }
}

// ============================================================================
// IMAGE
// ============================================================================

fn default_alt() -> String {
    "Image".into()
}

/// Properties of `image` elements. `src` has no default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default = "default_alt")]
    pub alt: String,
}

impl Default for ImageProps {
    fn default() -> Self {
        Self {
            src: None,
            alt: default_alt(),
        }
    }
}

impl ElementMeta for ImageProps {
    fn label() -> &'static str { "Image" }
    fn editor_default() -> Self {
        Self {
            src: Some("https://via.placeholder.com/200x100".into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// SHAPES
// ============================================================================

fn default_fill() -> String {
    "transparent".into()
}

fn default_stroke_width() -> f32 {
    1.0
}

fn default_radius() -> f32 {
    50.0
}

/// Properties of `rectangle` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleProps {
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_black")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    #[serde(default)]
    pub border_radius: f32,
}

impl Default for RectangleProps {
    fn default() -> Self {
        Self {
            fill: default_fill(),
            stroke: default_black(),
            stroke_width: default_stroke_width(),
            border_radius: 0.0,
        }
    }
}

impl ElementMeta for RectangleProps {
    fn label() -> &'static str { "Rectangle" }
    fn editor_default() -> Self {
        Self::default()
    }
}

/// Properties of `circle` elements.
///
/// `radius` is the unscaled radius; the circle is stretched to its frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleProps {
    #[serde(default = "default_fill")]
    pub fill: String,
    #[serde(default = "default_black")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

impl Default for CircleProps {
    fn default() -> Self {
        Self {
            fill: default_fill(),
            stroke: default_black(),
            stroke_width: default_stroke_width(),
            radius: default_radius(),
        }
    }
}

impl ElementMeta for CircleProps {
    fn label() -> &'static str { "Circle" }
    fn editor_default() -> Self {
        Self::default()
    }
}

// ============================================================================
// TABLE
// ============================================================================

fn default_grid_count() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

fn default_cell_padding() -> f32 {
    5.0
}

/// Properties of `table` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableProps {
    #[serde(default = "default_grid_count")]
    pub columns: u32,
    #[serde(default = "default_grid_count")]
    pub rows: u32,
    #[serde(default = "default_true")]
    pub header_row: bool,
    #[serde(default = "default_true")]
    pub bordered: bool,
    #[serde(default = "default_cell_padding")]
    pub cell_padding: f32,
}

impl Default for TableProps {
    fn default() -> Self {
        Self {
            columns: default_grid_count(),
            rows: default_grid_count(),
            header_row: true,
            bordered: true,
            cell_padding: default_cell_padding(),
        }
    }
}

impl ElementMeta for TableProps {
    fn label() -> &'static str { "Table" }
    fn editor_default() -> Self {
        Self::default()
    }
}

// ============================================================================
// ELEMENT KIND
// ============================================================================

/// Define the ElementKind enum and its dispatch methods from a single list.
///
/// Adding a new element type: add one line here, then define the property
/// struct above with `impl ElementMeta`.
macro_rules! define_elements {
    ($($variant:ident($inner:ty) = $tag:literal),+ $(,)?) => {
        /// Element type plus its type-specific properties.
        ///
        /// `Unknown` keeps the type name and raw properties of element types
        /// this version cannot render, so templates from newer editors still load.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ElementKind {
            $($variant($inner),)+
            Unknown { type_name: String, properties: Value },
        }

        impl ElementKind {
            /// Serialized `type` tag.
            pub fn type_name(&self) -> &str {
                match self {
                    $(ElementKind::$variant(_) => $tag,)+
                    ElementKind::Unknown { type_name, .. } => type_name,
                }
            }

            /// Human-readable display label (from [`ElementMeta::label`]).
            pub fn label(&self) -> &'static str {
                match self {
                    $(ElementKind::$variant(_) => <$inner>::label(),)+
                    ElementKind::Unknown { .. } => "Unknown",
                }
            }

            /// Editor starter values for every known element type.
            pub fn all_editor_defaults() -> Vec<Self> {
                vec![$(ElementKind::$variant(<$inner>::editor_default()),)+]
            }

            /// Parse properties for a given type tag.
            ///
            /// A `null` properties value is treated as an empty object so that
            /// every default applies.
            pub fn from_parts(type_name: &str, properties: Value) -> Result<Self, serde_json::Error> {
                let properties = match properties {
                    Value::Null => Value::Object(Default::default()),
                    other => other,
                };
                match type_name {
                    $($tag => Ok(ElementKind::$variant(serde_json::from_value(properties)?)),)+
                    other => Ok(ElementKind::Unknown {
                        type_name: other.to_string(),
                        properties,
                    }),
                }
            }

            /// Properties as a JSON value.
            pub fn properties_value(&self) -> Value {
                match self {
                    $(ElementKind::$variant(p) => serde_json::to_value(p).unwrap_or_default(),)+
                    ElementKind::Unknown { properties, .. } => properties.clone(),
                }
            }
        }
    };
}

define_elements! {
    Text(TextProps) = "text",
    Paragraph(ParagraphProps) = "paragraph",
    Image(ImageProps) = "image",
    Rectangle(RectangleProps) = "rectangle",
    Circle(CircleProps) = "circle",
    Table(TableProps) = "table",
}

// ============================================================================
// ELEMENT
// ============================================================================

/// One positioned, typed element of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawElement", into = "RawElement")]
pub struct Element {
    /// Unique within the template; the editor's join key.
    pub id: String,
    pub kind: ElementKind,
    pub position: Position,
    /// Path into the data context overriding the literal text/src.
    pub data_mapping: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data_mapping: None,
        }
    }

    /// Attach a data mapping path.
    pub fn mapped(mut self, path: impl Into<String>) -> Self {
        self.data_mapping = Some(path.into());
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }
}

/// Wire form of an element: type tag and properties side by side.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    id: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    properties: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_mapping: Option<String>,
}

impl TryFrom<RawElement> for Element {
    type Error = String;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let kind = ElementKind::from_parts(&raw.type_name, raw.properties)
            .map_err(|e| format!("element '{}' ({}): {}", raw.id, raw.type_name, e))?;
        Ok(Element {
            id: raw.id,
            kind,
            position: raw.position,
            // The editor clears a mapping by writing an empty string or null.
            data_mapping: raw.data_mapping.filter(|p| !p.is_empty()),
        })
    }
}

impl From<Element> for RawElement {
    fn from(el: Element) -> Self {
        RawElement {
            properties: el.kind.properties_value(),
            type_name: el.kind.type_name().to_string(),
            id: el.id,
            position: el.position,
            data_mapping: el.data_mapping,
        }
    }
}

/// Element type metadata for the editor.
#[derive(Debug, Clone, Serialize)]
pub struct ElementTypeMeta {
    #[serde(rename = "type")]
    pub type_name: String,
    pub label: String,
    pub properties: Value,
}

/// Every known element type with its label and editor starter properties.
pub fn element_types() -> Vec<ElementTypeMeta> {
    ElementKind::all_editor_defaults()
        .iter()
        .map(|k| ElementTypeMeta {
            type_name: k.type_name().to_string(),
            label: k.label().to_string(),
            properties: k.properties_value(),
        })
        .collect()
}

/// Create an element kind with editor starter properties by type name.
///
/// Returns `None` for unknown type names.
pub fn default_element_kind(type_name: &str) -> Option<ElementKind> {
    ElementKind::all_editor_defaults()
        .into_iter()
        .find(|k| k.type_name() == type_name)
}
