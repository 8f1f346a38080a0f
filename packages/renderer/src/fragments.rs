//! Per-type fragment templates.
//!
//! Each block type maps to one fixed fragment; props are interpolated after
//! defaulting (absent string → empty or a fixed placeholder, absent number
//! → the fixed default). Dispatch is an exhaustive match
//! so adding a `BlockType` variant is a compile-time event.

use blockpress_model::{Block, BlockType, Settings};
use serde_json::{Map, Value};

use crate::directives::{for_each, if_else, var};

/// Marker replaced by the template assembler with a container block's
/// rendered children.
pub const CHILD_SLOT: &str = "<!-- @children -->";

/// Minimal HTML/attribute escaping for prop values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn str_prop(props: &Map<String, Value>, key: &str, default: &str) -> String {
    match props.get(key) {
        Some(Value::String(s)) => escape_html(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => escape_html(default),
    }
}

fn num_prop(props: &Map<String, Value>, key: &str, default: f64) -> f64 {
    props.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn items_prop<'a>(props: &'a Map<String, Value>, key: &str) -> Vec<&'a Value> {
    match props.get(key) {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

fn item_str(item: &Value, key: &str, default: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => escape_html(s),
        Some(Value::Number(n)) => n.to_string(),
        _ => escape_html(default),
    }
}

fn link_of(block: &Block) -> String {
    if let Some(link) = &block.link {
        return escape_html(link);
    }
    str_prop(&block.props, "link", "#")
}

fn section_open(block: &Block) -> String {
    let type_name = escape_html(block.block_type.as_str());
    let mut classes = format!("block block-{type_name}");
    let visibility = block.visibility.css_classes();
    if !visibility.is_empty() {
        classes.push(' ');
        classes.push_str(&visibility);
    }

    let mut attrs = format!(
        "class=\"{classes}\" data-block-id=\"{}\" data-block-type=\"{type_name}\"",
        escape_html(&block.id)
    );
    if let Some(animation) = &block.animation {
        attrs.push_str(&format!(
            " data-animate=\"{}\" data-animate-duration=\"{}\" data-animate-delay=\"{}\"",
            escape_html(&animation.effect),
            animation.duration_ms,
            animation.delay_ms
        ));
    }
    format!("<section {attrs}>")
}

/// Render one block instance to a template fragment.
///
/// Pure and deterministic. Container types render a structural wrapper
/// holding [`CHILD_SLOT`]; the assembler inlines children. Unknown types
/// produce an inert placeholder, never an error.
pub fn render(block: &Block, settings: &Settings) -> String {
    let props = &block.props;
    let body = match &block.block_type {
        BlockType::Hero => hero(block, settings),
        BlockType::Features => features(props),
        BlockType::Cta => cta(block),
        BlockType::Testimonial => testimonial(props),
        BlockType::Stats => stats(props),
        BlockType::ImageText => image_text(props),
        BlockType::Gallery => gallery(props),
        BlockType::Button => button(block),
        BlockType::Divider => divider(props),
        BlockType::Pricing => pricing(props),
        BlockType::Newsletter => newsletter(props),
        BlockType::Card => card(block),
        BlockType::ProductGrid => product_grid(props),
        BlockType::CourseGrid => course_grid(props),
        BlockType::Audio => audio(props),
        BlockType::Video => video(props),
        BlockType::Timeline => timeline(props),
        BlockType::Accordion => accordion(props),
        BlockType::Tabs => tabs(props),
        BlockType::LogoCloud => logo_cloud(props),
        BlockType::SocialProof => social_proof(props),
        BlockType::Countdown => countdown(props),
        BlockType::Row => row(props),
        BlockType::Header => header_group(),
        BlockType::FeaturedProduct => featured_product(props),
        BlockType::ProductCarousel => product_carousel(props),
        BlockType::CourseCard => course_card(),
        BlockType::LoginForm => login_form(props),
        BlockType::SaleBanner => sale_banner(props, settings),
        BlockType::Unknown(name) => unknown_placeholder(name),
    };
    format!("{}{body}</section>", section_open(block))
}

fn hero(block: &Block, settings: &Settings) -> String {
    let props = &block.props;
    let title = str_prop(props, "title", "Welcome");
    let subtitle = str_prop(props, "subtitle", "");
    let image = str_prop(props, "image", "");

    let style = if image.is_empty() {
        // Token-derived gradient when no hero image is set.
        format!(
            " style=\"background:linear-gradient(135deg,{},{})\"",
            escape_html(&settings.colors.primary),
            escape_html(&settings.colors.secondary)
        )
    } else {
        format!(" style=\"background-image:url('{image}')\"")
    };

    let mut out = format!("<div class=\"hero\"{style}><div class=\"hero-content\"><h1>{title}</h1>");
    if !subtitle.is_empty() {
        out.push_str(&format!("<p class=\"hero-subtitle\">{subtitle}</p>"));
    }
    let button_text = str_prop(props, "buttonText", "");
    if !button_text.is_empty() {
        let button_link = str_prop(props, "buttonLink", "#");
        out.push_str(&format!(
            "<a class=\"btn btn-primary\" href=\"{button_link}\">{button_text}</a>"
        ));
    }
    out.push_str("</div></div>");
    out
}

fn features(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "");
    let mut out = String::new();
    if !title.is_empty() {
        out.push_str(&format!("<h2 class=\"section-title\">{title}</h2>"));
    }
    out.push_str("<div class=\"grid grid-3 features\">");
    for item in items_prop(props, "items") {
        out.push_str(&format!(
            "<div class=\"card feature\"><div class=\"feature-icon\">{}</div><h3>{}</h3><p>{}</p></div>",
            item_str(item, "icon", "★"),
            item_str(item, "title", "Feature"),
            item_str(item, "description", "")
        ));
    }
    out.push_str("</div>");
    out
}

fn cta(block: &Block) -> String {
    let props = &block.props;
    format!(
        "<div class=\"cta\"><h2>{}</h2><p>{}</p><a class=\"btn btn-primary\" href=\"{}\">{}</a></div>",
        str_prop(props, "title", "Ready to get started?"),
        str_prop(props, "text", ""),
        link_of(block),
        str_prop(props, "buttonText", "Get started")
    )
}

fn testimonial(props: &Map<String, Value>) -> String {
    let avatar = str_prop(props, "avatar", "");
    let avatar_html = if avatar.is_empty() {
        String::new()
    } else {
        format!("<img class=\"testimonial-avatar\" src=\"{avatar}\" alt=\"\">")
    };
    format!(
        "<blockquote class=\"testimonial\"><p>“{}”</p><footer>{avatar_html}<cite>{}</cite><span class=\"testimonial-role\">{}</span></footer></blockquote>",
        str_prop(props, "quote", ""),
        str_prop(props, "author", "Anonymous"),
        str_prop(props, "role", "")
    )
}

fn stats(props: &Map<String, Value>) -> String {
    let mut out = String::from("<div class=\"grid grid-4 stats\">");
    for item in items_prop(props, "items") {
        out.push_str(&format!(
            "<div class=\"stat\"><div class=\"stat-value\">{}</div><div class=\"stat-label\">{}</div></div>",
            item_str(item, "value", "0"),
            item_str(item, "label", "")
        ));
    }
    out.push_str("</div>");
    out
}

fn image_text(props: &Map<String, Value>) -> String {
    let side = match props.get("imagePosition").and_then(Value::as_str) {
        Some("right") => "image-right",
        _ => "image-left",
    };
    format!(
        "<div class=\"image-text {side}\"><img src=\"{}\" alt=\"{}\"><div class=\"image-text-body\"><h2>{}</h2><p>{}</p></div></div>",
        str_prop(props, "image", ""),
        str_prop(props, "imageAlt", ""),
        str_prop(props, "title", ""),
        str_prop(props, "text", "")
    )
}

fn gallery(props: &Map<String, Value>) -> String {
    let mut out = String::from("<div class=\"grid grid-3 gallery\">");
    for item in items_prop(props, "images") {
        let (src, alt) = match item {
            Value::String(src) => (escape_html(src), String::new()),
            other => (item_str(other, "src", ""), item_str(other, "alt", "")),
        };
        out.push_str(&format!(
            "<figure class=\"gallery-item\"><img src=\"{src}\" alt=\"{alt}\"></figure>"
        ));
    }
    out.push_str("</div>");
    out
}

fn button(block: &Block) -> String {
    let props = &block.props;
    let style = match props.get("style").and_then(Value::as_str) {
        Some("secondary") => "btn-secondary",
        Some("outline") => "btn-outline",
        _ => "btn-primary",
    };
    format!(
        "<a class=\"btn {style}\" href=\"{}\">{}</a>",
        link_of(block),
        str_prop(props, "label", "Learn more")
    )
}

fn divider(props: &Map<String, Value>) -> String {
    let style = match props.get("style").and_then(Value::as_str) {
        Some("dashed") => "divider-dashed",
        Some("dotted") => "divider-dotted",
        _ => "divider-solid",
    };
    format!("<hr class=\"divider {style}\">")
}

fn pricing(props: &Map<String, Value>) -> String {
    let mut out = String::from("<div class=\"grid grid-3 pricing\">");
    for plan in items_prop(props, "plans") {
        let mut features = String::new();
        if let Some(Value::Array(items)) = plan.get("features") {
            for feature in items {
                if let Value::String(text) = feature {
                    features.push_str(&format!("<li>{}</li>", escape_html(text)));
                }
            }
        }
        out.push_str(&format!(
            "<div class=\"card plan\"><h3>{}</h3><div class=\"plan-price\">{}<span class=\"plan-period\">/{}</span></div><ul>{features}</ul><a class=\"btn btn-primary\" href=\"{}\">{}</a></div>",
            item_str(plan, "name", "Plan"),
            item_str(plan, "price", "0"),
            item_str(plan, "period", "mo"),
            item_str(plan, "link", "#"),
            item_str(plan, "buttonText", "Choose plan")
        ));
    }
    out.push_str("</div>");
    out
}

fn newsletter(props: &Map<String, Value>) -> String {
    format!(
        "<div class=\"newsletter\"><h2>{}</h2><p>{}</p><form class=\"newsletter-form\" method=\"post\" action=\"/api/newsletter\"><input type=\"email\" name=\"email\" placeholder=\"{}\" required><button class=\"btn btn-primary\" type=\"submit\">{}</button></form></div>",
        str_prop(props, "title", "Stay in the loop"),
        str_prop(props, "text", ""),
        str_prop(props, "placeholder", "you@example.com"),
        str_prop(props, "buttonText", "Subscribe")
    )
}

fn card(block: &Block) -> String {
    let props = &block.props;
    let image = str_prop(props, "image", "");
    let image_html = if image.is_empty() {
        String::new()
    } else {
        format!("<img class=\"card-image\" src=\"{image}\" alt=\"\">")
    };
    format!(
        "<div class=\"card\">{image_html}<h3>{}</h3><p>{}</p><a class=\"card-link\" href=\"{}\">{}</a></div>",
        str_prop(props, "title", ""),
        str_prop(props, "text", ""),
        link_of(block),
        str_prop(props, "linkText", "Read more")
    )
}

fn product_grid(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "Products");
    let item = format!(
        "<div class=\"card product\"><img src=\"{}\" alt=\"{}\"><h3>{}</h3><div class=\"product-price\">{}</div><a class=\"btn btn-primary add-to-cart\" data-product-id=\"{}\" href=\"{}\">Add to cart</a></div>",
        var("product.image"),
        var("product.name"),
        var("product.name"),
        var("product.price"),
        var("product.id"),
        var("product.url")
    );
    format!(
        "<h2 class=\"section-title\">{title}</h2><div class=\"grid grid-3 product-grid\">{}</div>",
        for_each("product", "products", &item)
    )
}

fn course_grid(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "Courses");
    let item = format!(
        "<div class=\"card course\"><img src=\"{}\" alt=\"{}\"><h3>{}</h3><p>{}</p><a class=\"btn btn-secondary\" href=\"{}\">View course</a></div>",
        var("course.image"),
        var("course.title"),
        var("course.title"),
        var("course.summary"),
        var("course.url")
    );
    format!(
        "<h2 class=\"section-title\">{title}</h2><div class=\"grid grid-3 course-grid\">{}</div>",
        for_each("course", "courses", &item)
    )
}

fn audio(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "");
    let title_html = if title.is_empty() {
        String::new()
    } else {
        format!("<h3>{title}</h3>")
    };
    format!(
        "<div class=\"media-audio\">{title_html}<audio controls src=\"{}\"></audio></div>",
        str_prop(props, "src", "")
    )
}

fn video(props: &Map<String, Value>) -> String {
    format!(
        "<div class=\"media-video\"><video controls src=\"{}\" poster=\"{}\"></video></div>",
        str_prop(props, "src", ""),
        str_prop(props, "poster", "")
    )
}

fn timeline(props: &Map<String, Value>) -> String {
    let mut out = String::from("<ol class=\"timeline\">");
    for item in items_prop(props, "items") {
        out.push_str(&format!(
            "<li class=\"timeline-item\"><time>{}</time><h3>{}</h3><p>{}</p></li>",
            item_str(item, "date", ""),
            item_str(item, "title", ""),
            item_str(item, "description", "")
        ));
    }
    out.push_str("</ol>");
    out
}

fn accordion(props: &Map<String, Value>) -> String {
    let mut out = String::from("<div class=\"accordion\">");
    for item in items_prop(props, "items") {
        out.push_str(&format!(
            "<details class=\"accordion-item\"><summary>{}</summary><p>{}</p></details>",
            item_str(item, "title", ""),
            item_str(item, "content", "")
        ));
    }
    out.push_str("</div>");
    out
}

fn tabs(props: &Map<String, Value>) -> String {
    let items = items_prop(props, "items");
    let mut buttons = String::new();
    let mut panes = String::new();
    for (index, item) in items.iter().enumerate() {
        let active = if index == 0 { " active" } else { "" };
        buttons.push_str(&format!(
            "<button class=\"tab-button{active}\" data-tab=\"{index}\">{}</button>",
            item_str(item, "label", "Tab")
        ));
        panes.push_str(&format!(
            "<div class=\"tab-pane{active}\" data-tab=\"{index}\"><p>{}</p></div>",
            item_str(item, "content", "")
        ));
    }
    format!("<div class=\"tabs\"><div class=\"tab-buttons\">{buttons}</div><div class=\"tab-panes\">{panes}</div></div>")
}

fn logo_cloud(props: &Map<String, Value>) -> String {
    let mut out = String::from("<div class=\"logo-cloud\">");
    for item in items_prop(props, "logos") {
        let src = match item {
            Value::String(src) => escape_html(src),
            other => item_str(other, "src", ""),
        };
        out.push_str(&format!("<img class=\"logo\" src=\"{src}\" alt=\"\">"));
    }
    out.push_str("</div>");
    out
}

fn social_proof(props: &Map<String, Value>) -> String {
    let rating = num_prop(props, "rating", 5.0).clamp(0.0, 5.0);
    let stars = "★".repeat(rating.round() as usize);
    format!(
        "<div class=\"social-proof\"><span class=\"stars\">{stars}</span><p>{}</p></div>",
        str_prop(props, "text", "")
    )
}

fn countdown(props: &Map<String, Value>) -> String {
    format!(
        "<div class=\"countdown\" data-countdown=\"{}\"><h2>{}</h2><div class=\"countdown-timer\"></div></div>",
        str_prop(props, "target", ""),
        str_prop(props, "title", "")
    )
}

fn row(props: &Map<String, Value>) -> String {
    let columns = num_prop(props, "columns", 2.0).clamp(1.0, 6.0) as u32;
    format!("<div class=\"row grid grid-{columns}\">{CHILD_SLOT}</div>")
}

fn header_group() -> String {
    format!("<div class=\"header-group\">{CHILD_SLOT}</div>")
}

fn featured_product(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "Featured");
    let body = format!(
        "<div class=\"featured-product card\"><img src=\"{}\" alt=\"{}\"><div class=\"featured-product-body\"><h2>{title}</h2><h3>{}</h3><p>{}</p><div class=\"product-price\">{}</div><a class=\"btn btn-primary add-to-cart\" data-product-id=\"{}\" href=\"{}\">Add to cart</a></div></div>",
        var("featuredProduct.image"),
        var("featuredProduct.name"),
        var("featuredProduct.name"),
        var("featuredProduct.description"),
        var("featuredProduct.price"),
        var("featuredProduct.id"),
        var("featuredProduct.url")
    );
    if_else("featuredProduct", &body, None)
}

fn product_carousel(props: &Map<String, Value>) -> String {
    let title = str_prop(props, "title", "");
    let slide = format!(
        "<div class=\"carousel-slide card product\"><img src=\"{}\" alt=\"{}\"><h3>{}</h3><div class=\"product-price\">{}</div></div>",
        var("product.image"),
        var("product.name"),
        var("product.name"),
        var("product.price")
    );
    let mut out = String::new();
    if !title.is_empty() {
        out.push_str(&format!("<h2 class=\"section-title\">{title}</h2>"));
    }
    out.push_str(&format!(
        "<div class=\"carousel\" data-carousel><div class=\"carousel-track\">{}</div><button class=\"carousel-prev\">‹</button><button class=\"carousel-next\">›</button></div>",
        for_each("product", "products", &slide)
    ));
    out
}

fn course_card() -> String {
    let card = format!(
        "<div class=\"card course\"><img src=\"{}\" alt=\"{}\"><h3>{}</h3><p>{}</p><a class=\"btn btn-secondary\" href=\"{}\">View course</a></div>",
        var("course.image"),
        var("course.title"),
        var("course.title"),
        var("course.summary"),
        var("course.url")
    );
    format!(
        "<div class=\"grid grid-3 course-cards\">{}</div>",
        for_each("course", "featuredCourses", &card)
    )
}

fn login_form(props: &Map<String, Value>) -> String {
    format!(
        "<form class=\"auth-form login-form\" method=\"post\" action=\"/api/auth/login\"><h2>{}</h2><label>Email<input type=\"email\" name=\"email\" required></label><label>Password<input type=\"password\" name=\"password\" required></label><button class=\"btn btn-primary\" type=\"submit\">{}</button></form>",
        str_prop(props, "title", "Sign in"),
        str_prop(props, "buttonText", "Sign in")
    )
}

fn sale_banner(props: &Map<String, Value>, settings: &Settings) -> String {
    format!(
        "<div class=\"sale-banner\" style=\"background-color:{}\"><p>{}</p><a class=\"btn btn-secondary\" href=\"{}\">{}</a></div>",
        escape_html(&settings.colors.accent),
        str_prop(props, "text", "Sale on now"),
        str_prop(props, "link", "#"),
        str_prop(props, "buttonText", "Shop now")
    )
}

fn unknown_placeholder(name: &str) -> String {
    let name = escape_html(name);
    format!(
        "<!-- unknown block type \"{name}\" --><div class=\"block-placeholder\" data-missing-type=\"{name}\" hidden></div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpress_model::{Animation, Visibility};
    use serde_json::json;

    fn settings() -> Settings {
        Settings::default()
    }

    fn block(ty: BlockType) -> Block {
        Block::new("b1", "p1", ty)
    }

    #[test]
    fn render_is_deterministic() {
        let b = block(BlockType::Hero)
            .with_prop("title", json!("Welcome"))
            .with_prop("subtitle", json!("Hello there"));
        let first = render(&b, &settings());
        let second = render(&b, &settings());
        assert_eq!(first, second);
    }

    #[test]
    fn hero_interpolates_props_with_defaults() {
        let b = block(BlockType::Hero);
        let html = render(&b, &settings());
        // Absent title falls back to the documented placeholder phrase.
        assert!(html.contains("<h1>Welcome</h1>"));
        // Token-derived gradient when no image is set.
        assert!(html.contains(&settings().colors.primary));
    }

    #[test]
    fn props_are_escaped() {
        let b = block(BlockType::Hero).with_prop("title", json!("<script>alert(1)</script>"));
        let html = render(&b, &settings());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn wrapper_carries_identity_and_visibility() {
        let mut b = block(BlockType::Cta);
        b.visibility = Visibility {
            desktop: true,
            tablet: true,
            mobile: false,
        };
        b.animation = Some(Animation::default());
        let html = render(&b, &settings());
        assert!(html.contains("data-block-id=\"b1\""));
        assert!(html.contains("block-cta"));
        assert!(html.contains("bp-hide-mobile"));
        assert!(html.contains("data-animate=\"fade\""));
    }

    #[test]
    fn features_renders_each_item() {
        let b = block(BlockType::Features).with_prop(
            "items",
            json!([
                { "title": "Fast", "description": "Very fast" },
                { "title": "Safe", "description": "Very safe" },
                { "title": "Cheap", "description": "Very cheap" }
            ]),
        );
        let html = render(&b, &settings());
        assert_eq!(html.matches("class=\"card feature\"").count(), 3);
        assert!(html.contains("<h3>Fast</h3>"));
    }

    #[test]
    fn dynamic_blocks_emit_directives_not_values() {
        let b = block(BlockType::ProductGrid);
        let html = render(&b, &settings());
        assert!(html.contains("{% for product in products %}"));
        assert!(html.contains("{{ product.name }}"));
        assert!(html.contains("{% endfor %}"));
    }

    #[test]
    fn featured_product_is_conditional() {
        let b = block(BlockType::FeaturedProduct);
        let html = render(&b, &settings());
        assert!(html.contains("{% if featuredProduct %}"));
        assert!(html.contains("{% endif %}"));
    }

    #[test]
    fn containers_render_child_slot() {
        let b = block(BlockType::Row).with_prop("columns", json!(3));
        let html = render(&b, &settings());
        assert!(html.contains(CHILD_SLOT));
        assert!(html.contains("grid-3"));

        let b = block(BlockType::Header);
        assert!(render(&b, &settings()).contains(CHILD_SLOT));
    }

    #[test]
    fn unknown_type_renders_inert_placeholder() {
        let b = block(BlockType::Unknown("unknown-future-block".to_string()));
        let html = render(&b, &settings());
        assert!(html.contains("unknown block type"));
        assert!(html.contains("data-missing-type=\"unknown-future-block\""));
        assert!(html.contains("hidden"));
    }

    #[test]
    fn numeric_defaults_apply() {
        // Absent rating defaults to 5 stars.
        let b = block(BlockType::SocialProof);
        let html = render(&b, &settings());
        assert!(html.contains("★★★★★"));

        // Absent column count defaults to 2.
        let b = block(BlockType::Row);
        assert!(render(&b, &settings()).contains("grid-2"));
    }

    #[test]
    fn every_known_type_renders_nonempty() {
        for name in [
            "hero",
            "features",
            "cta",
            "testimonial",
            "stats",
            "imageText",
            "gallery",
            "button",
            "divider",
            "pricing",
            "newsletter",
            "card",
            "productGrid",
            "courseGrid",
            "audio",
            "video",
            "timeline",
            "accordion",
            "tabs",
            "logoCloud",
            "socialProof",
            "countdown",
            "row",
            "header",
            "featuredProduct",
            "productCarousel",
            "courseCard",
            "loginForm",
            "saleBanner",
        ] {
            let b = block(BlockType::from_name(name));
            let html = render(&b, &settings());
            assert!(
                html.starts_with("<section "),
                "{name} missing wrapper: {html}"
            );
            assert!(html.ends_with("</section>"), "{name} missing close");
        }
    }
}
