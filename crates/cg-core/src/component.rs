use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The closed set of component kinds a store knows about.
///
/// Each kind has exactly one record shape (see [`Component`]). Kinds are
/// ordered so that query keys have a canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position and size on the board.
    Transform,
    /// Appearance: colors, image and text payloads.
    Visual,
    /// Whether the entity can be dragged or selected.
    Interaction,
    /// Layout role, e.g. marking an entity as a slot.
    LayoutConfig,
    /// Human-facing metadata such as a display name.
    Meta,
    /// Current selection marker. Transient.
    Selection,
    /// Pointer hover marker. Transient.
    Hover,
}

impl ComponentKind {
    /// Every known kind, in canonical order.
    pub const ALL: [ComponentKind; 7] = [
        Self::Transform,
        Self::Visual,
        Self::Interaction,
        Self::LayoutConfig,
        Self::Meta,
        Self::Selection,
        Self::Hover,
    ];

    /// Kinds that describe UI state and are never written to a snapshot.
    pub const TRANSIENT: [ComponentKind; 2] = [Self::Selection, Self::Hover];

    /// Returns true if this kind is excluded from serialization.
    pub fn is_transient(self) -> bool {
        Self::TRANSIENT.contains(&self)
    }

    /// The kind's name as it appears in snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Visual => "Visual",
            Self::Interaction => "Interaction",
            Self::LayoutConfig => "LayoutConfig",
            Self::Meta => "Meta",
            Self::Selection => "Selection",
            Self::Hover => "Hover",
        }
    }

    /// Parse a kind name, ignoring case and `_`/`-` separators.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().to_lowercase() == normalized)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A component value: one variant per [`ComponentKind`].
///
/// Components are replace-only. Once handed to the store a value is never
/// mutated in place; a change writes a whole new value. Large payloads are
/// held behind `Arc`, so cloning a component copies its top-level fields and
/// shares the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Component {
    /// See [`Transform`].
    Transform(Transform),
    /// See [`Visual`].
    Visual(Visual),
    /// See [`Interaction`].
    Interaction(Interaction),
    /// See [`LayoutConfig`].
    LayoutConfig(LayoutConfig),
    /// See [`Meta`].
    Meta(Meta),
    /// See [`Selection`].
    Selection(Selection),
    /// See [`Hover`].
    Hover(Hover),
}

impl Component {
    /// The kind tag of this value.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Visual(_) => ComponentKind::Visual,
            Self::Interaction(_) => ComponentKind::Interaction,
            Self::LayoutConfig(_) => ComponentKind::LayoutConfig,
            Self::Meta(_) => ComponentKind::Meta,
            Self::Selection(_) => ComponentKind::Selection,
            Self::Hover(_) => ComponentKind::Hover,
        }
    }

    /// Decode the bare record of the given kind from JSON.
    pub fn from_json(kind: ComponentKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ComponentKind::Transform => Self::Transform(serde_json::from_value(value)?),
            ComponentKind::Visual => Self::Visual(serde_json::from_value(value)?),
            ComponentKind::Interaction => Self::Interaction(serde_json::from_value(value)?),
            ComponentKind::LayoutConfig => Self::LayoutConfig(serde_json::from_value(value)?),
            ComponentKind::Meta => Self::Meta(serde_json::from_value(value)?),
            ComponentKind::Selection => Self::Selection(serde_json::from_value(value)?),
            ComponentKind::Hover => Self::Hover(serde_json::from_value(value)?),
        })
    }

    /// Encode the bare record (without the kind tag) as JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Transform(c) => serde_json::to_value(c),
            Self::Visual(c) => serde_json::to_value(c),
            Self::Interaction(c) => serde_json::to_value(c),
            Self::LayoutConfig(c) => serde_json::to_value(c),
            Self::Meta(c) => serde_json::to_value(c),
            Self::Selection(c) => serde_json::to_value(c),
            Self::Hover(c) => serde_json::to_value(c),
        }
    }
}

/// Typed wrapper over [`Component`]: implemented by every record struct so
/// the store can keep one strongly typed table per kind.
pub trait ComponentData:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + 'static
{
    /// The kind tag this record is stored under.
    const KIND: ComponentKind;

    /// Wrap the record in the tagged union.
    fn into_component(self) -> Component;

    /// Borrow the record out of the tagged union if the variant matches.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Take the record out of the tagged union if the variant matches.
    fn try_from_component(component: Component) -> Result<Self, Component>;
}

macro_rules! component_data {
    ($($ty:ident),* $(,)?) => {
        $(
            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn into_component(self) -> Component {
                    Component::$ty(self)
                }

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$ty(c) => Some(c),
                        _ => None,
                    }
                }

                fn try_from_component(component: Component) -> Result<Self, Component> {
                    match component {
                        Component::$ty(c) => Ok(c),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$ty(value)
                }
            }
        )*
    };
}

component_data!(Transform, Visual, Interaction, LayoutConfig, Meta, Selection, Hover);

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Axis-aligned placement in board pixels. `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; higher draws on top.
    #[serde(default)]
    pub z_index: i32,
}

impl Transform {
    /// An unrotated transform at `(x, y)` with the given size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            z_index: 0,
        }
    }

    /// A copy of this transform moved to `(x, y)`, keeping size and rotation.
    pub fn with_position(self, x: f64, y: f64) -> Self {
        Self { x, y, ..self }
    }

    /// The center point `(x + w/2, y + h/2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Visual
// ---------------------------------------------------------------------------

/// How an entity is drawn. Image and text payloads can be large and are
/// shared between copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// Fill color, e.g. `"#ffcc00"`.
    pub fill: Option<String>,
    /// Stroke color.
    pub stroke: Option<String>,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Embedded image source (URL or data URI).
    pub image: Option<Arc<str>>,
    /// Text content.
    pub text: Option<Arc<str>>,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            opacity: 1.0,
            image: None,
            text: None,
        }
    }
}

impl Visual {
    /// A plain filled shape.
    pub fn filled(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// Pointer affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Can be picked up and moved.
    pub draggable: bool,
    /// Can be selected.
    pub selectable: bool,
    /// Locked entities ignore all gestures.
    #[serde(default)]
    pub locked: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            draggable: true,
            selectable: true,
            locked: false,
        }
    }
}

impl Interaction {
    /// Selectable but not draggable.
    pub fn fixed() -> Self {
        Self {
            draggable: false,
            ..Self::default()
        }
    }

    /// True if a drag gesture may start on this entity.
    pub fn can_drag(&self) -> bool {
        self.draggable && !self.locked
    }
}

// ---------------------------------------------------------------------------
// LayoutConfig
// ---------------------------------------------------------------------------

/// The role an entity plays in the board layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRole {
    /// Positioned freely.
    #[default]
    Free,
    /// A fixed drop target other entities snap into.
    Slot,
}

/// Layout settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Free item or slot.
    pub role: LayoutRole,
    /// Position of a slot within its template.
    #[serde(default)]
    pub slot_index: Option<u32>,
    /// Optional grouping label.
    #[serde(default)]
    pub group: Option<String>,
}

impl LayoutConfig {
    /// A slot with the given index.
    pub fn slot(index: u32) -> Self {
        Self {
            role: LayoutRole::Slot,
            slot_index: Some(index),
            group: None,
        }
    }

    /// Returns true if this entity is a drop target.
    pub fn is_slot(&self) -> bool {
        self.role == LayoutRole::Slot
    }
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// Descriptive metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Display name.
    pub name: String,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Arc<[String]>,
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
}

impl Meta {
    /// Metadata with a name, no tags, created now.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Arc::from(Vec::new()),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transient UI state
// ---------------------------------------------------------------------------

/// Marks an entity as currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// When the selection was made.
    pub selected_at: DateTime<Utc>,
}

impl Selection {
    /// Selected as of now.
    pub fn now() -> Self {
        Self {
            selected_at: Utc::now(),
        }
    }
}

/// Marks an entity as under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hover {
    /// When the pointer entered.
    pub since: DateTime<Utc>,
}

impl Hover {
    /// Hovered as of now.
    pub fn now() -> Self {
        Self { since: Utc::now() }
    }
}
