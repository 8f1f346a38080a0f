//! Block types and position helpers.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Closed enumeration of block kinds.
///
/// Unrecognized names round-trip through [`BlockType::Unknown`] so themes
/// built against a newer block set still load and render (as placeholders)
/// rather than failing. Adding a variant here forces the renderer's
/// exhaustive dispatch to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockType {
    Hero,
    Features,
    Cta,
    Testimonial,
    Stats,
    ImageText,
    Gallery,
    Button,
    Divider,
    Pricing,
    Newsletter,
    Card,
    ProductGrid,
    CourseGrid,
    Audio,
    Video,
    Timeline,
    Accordion,
    Tabs,
    LogoCloud,
    SocialProof,
    Countdown,
    Row,
    Header,
    FeaturedProduct,
    ProductCarousel,
    CourseCard,
    LoginForm,
    SaleBanner,
    /// Retired or future block kind; renders to an inert placeholder.
    Unknown(String),
}

impl BlockType {
    /// Wire name (camelCase, matching stored block records).
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Hero => "hero",
            BlockType::Features => "features",
            BlockType::Cta => "cta",
            BlockType::Testimonial => "testimonial",
            BlockType::Stats => "stats",
            BlockType::ImageText => "imageText",
            BlockType::Gallery => "gallery",
            BlockType::Button => "button",
            BlockType::Divider => "divider",
            BlockType::Pricing => "pricing",
            BlockType::Newsletter => "newsletter",
            BlockType::Card => "card",
            BlockType::ProductGrid => "productGrid",
            BlockType::CourseGrid => "courseGrid",
            BlockType::Audio => "audio",
            BlockType::Video => "video",
            BlockType::Timeline => "timeline",
            BlockType::Accordion => "accordion",
            BlockType::Tabs => "tabs",
            BlockType::LogoCloud => "logoCloud",
            BlockType::SocialProof => "socialProof",
            BlockType::Countdown => "countdown",
            BlockType::Row => "row",
            BlockType::Header => "header",
            BlockType::FeaturedProduct => "featuredProduct",
            BlockType::ProductCarousel => "productCarousel",
            BlockType::CourseCard => "courseCard",
            BlockType::LoginForm => "loginForm",
            BlockType::SaleBanner => "saleBanner",
            BlockType::Unknown(name) => name,
        }
    }

    /// Parse a wire name. Never fails: unrecognized names become `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "hero" => BlockType::Hero,
            "features" => BlockType::Features,
            "cta" => BlockType::Cta,
            "testimonial" => BlockType::Testimonial,
            "stats" => BlockType::Stats,
            "imageText" => BlockType::ImageText,
            "gallery" => BlockType::Gallery,
            "button" => BlockType::Button,
            "divider" => BlockType::Divider,
            "pricing" => BlockType::Pricing,
            "newsletter" => BlockType::Newsletter,
            "card" => BlockType::Card,
            "productGrid" => BlockType::ProductGrid,
            "courseGrid" => BlockType::CourseGrid,
            "audio" => BlockType::Audio,
            "video" => BlockType::Video,
            "timeline" => BlockType::Timeline,
            "accordion" => BlockType::Accordion,
            "tabs" => BlockType::Tabs,
            "logoCloud" => BlockType::LogoCloud,
            "socialProof" => BlockType::SocialProof,
            "countdown" => BlockType::Countdown,
            "row" => BlockType::Row,
            "header" => BlockType::Header,
            "featuredProduct" => BlockType::FeaturedProduct,
            "productCarousel" => BlockType::ProductCarousel,
            "courseCard" => BlockType::CourseCard,
            "loginForm" => BlockType::LoginForm,
            "saleBanner" => BlockType::SaleBanner,
            other => BlockType::Unknown(other.to_string()),
        }
    }

    /// Container blocks render a structural wrapper; nested children are
    /// inlined by the template assembler.
    pub fn is_container(&self) -> bool {
        matches!(self, BlockType::Row | BlockType::Header)
    }

    /// Dynamic blocks emit loop/conditional directives instead of literal
    /// values; data arrives at render-to-HTML time from the page context.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            BlockType::ProductGrid
                | BlockType::CourseGrid
                | BlockType::FeaturedProduct
                | BlockType::ProductCarousel
                | BlockType::CourseCard
        )
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(BlockType::from_name(&name))
    }
}

/// Per-breakpoint show/hide flags. All breakpoints visible by default.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visibility {
    pub desktop: bool,
    pub tablet: bool,
    pub mobile: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            desktop: true,
            tablet: true,
            mobile: true,
        }
    }
}

impl Visibility {
    /// CSS utility classes for hidden breakpoints, empty when fully visible.
    pub fn css_classes(&self) -> String {
        let mut classes = Vec::new();
        if !self.desktop {
            classes.push("bp-hide-desktop");
        }
        if !self.tablet {
            classes.push("bp-hide-tablet");
        }
        if !self.mobile {
            classes.push("bp-hide-mobile");
        }
        classes.join(" ")
    }
}

/// Entrance animation descriptor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animation {
    pub effect: String,
    pub duration_ms: u32,
    pub delay_ms: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            effect: "fade".to_string(),
            duration_ms: 400,
            delay_ms: 0,
        }
    }
}

/// One typed, positioned content unit within a page.
///
/// `order` is dense and zero-based within its (page, parent) scope. Editing
/// operations maintain that density; [`densify_orders`] restores it for
/// blocks arriving from outside sources.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub page_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Block {
    pub fn new(id: impl Into<String>, page_id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            page_id: page_id.into(),
            block_type,
            props: Map::new(),
            link: None,
            visibility: Visibility::default(),
            animation: None,
            order: 0,
            parent_id: None,
        }
    }

    pub fn with_prop(mut self, key: &str, value: Value) -> Self {
        self.props.insert(key.to_string(), value);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// One entry of a batch position update.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPosition {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub order: i32,
}

/// Rewrite `order` so each (parent) scope is dense, zero-based and
/// duplicate-free, preserving the relative ordering supplied.
pub fn densify_orders(blocks: &mut [Block]) {
    let mut scopes: Vec<Option<String>> = Vec::new();
    for block in blocks.iter() {
        if !scopes.contains(&block.parent_id) {
            scopes.push(block.parent_id.clone());
        }
    }

    for scope in scopes {
        let mut indices: Vec<usize> = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent_id == scope)
            .map(|(i, _)| i)
            .collect();
        indices.sort_by_key(|&i| blocks[i].order);
        for (next, &i) in indices.iter().enumerate() {
            blocks[i].order = next as i32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_type_round_trips_known_names() {
        for name in ["hero", "productGrid", "imageText", "saleBanner", "row"] {
            let ty = BlockType::from_name(name);
            assert!(!matches!(ty, BlockType::Unknown(_)));
            assert_eq!(ty.as_str(), name);
        }
    }

    #[test]
    fn block_type_preserves_unknown_names() {
        let ty = BlockType::from_name("unknown-future-block");
        assert_eq!(ty, BlockType::Unknown("unknown-future-block".to_string()));
        assert_eq!(ty.as_str(), "unknown-future-block");

        let json = serde_json::to_string(&ty).unwrap();
        let back: BlockType = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, back);
    }

    #[test]
    fn block_serde_uses_type_field() {
        let block = Block::new("b1", "p1", BlockType::Hero)
            .with_prop("title", json!("Welcome"))
            .with_order(3);

        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "hero");
        assert_eq!(value["pageId"], "p1");
        assert_eq!(value["props"]["title"], "Welcome");

        let back: Block = serde_json::from_value(value).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn densify_makes_orders_dense_per_scope() {
        let mut blocks = vec![
            Block::new("a", "p1", BlockType::Hero).with_order(7),
            Block::new("b", "p1", BlockType::Cta).with_order(2),
            Block::new("c", "p1", BlockType::Button)
                .with_order(9)
                .with_parent("row1"),
            Block::new("d", "p1", BlockType::Button)
                .with_order(-1)
                .with_parent("row1"),
            Block::new("row1", "p1", BlockType::Row).with_order(4),
        ];

        densify_orders(&mut blocks);

        let order_of = |id: &str| blocks.iter().find(|b| b.id == id).unwrap().order;
        assert_eq!(order_of("b"), 0);
        assert_eq!(order_of("row1"), 1);
        assert_eq!(order_of("a"), 2);
        assert_eq!(order_of("d"), 0);
        assert_eq!(order_of("c"), 1);
    }

    #[test]
    fn visibility_classes() {
        let all = Visibility::default();
        assert_eq!(all.css_classes(), "");

        let hidden = Visibility {
            desktop: true,
            tablet: false,
            mobile: false,
        };
        assert_eq!(hidden.css_classes(), "bp-hide-tablet bp-hide-mobile");
    }
}
