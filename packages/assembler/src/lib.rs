//! # Template Assembler
//!
//! Concatenates rendered blocks into full page templates.
//!
//! Every page template opens with the shared header include marker and
//! closes with the shared footer marker; the header and footer themselves
//! are emitted once per theme. Children of container blocks are inlined
//! into their parent's wrapper, recursively. A page with no blocks falls
//! back to a built-in default layout (hero + dynamic listings) so an empty
//! theme still renders a usable page.

use blockpress_model::{Block, BlockType, Page, Settings, Theme};
use blockpress_renderer::{render, CHILD_SLOT};

/// Include markers the page-render-time collaborator substitutes with the
/// shared header/footer templates (see [`compose`]).
pub const HEADER_INCLUDE: &str = "<!-- @include header -->";
pub const FOOTER_INCLUDE: &str = "<!-- @include footer -->";

/// Canonical template name for the home page.
pub const HOME_TEMPLATE: &str = "index.html";

/// One compiled template file.
#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    pub name: String,
    pub contents: String,
}

/// Deterministic template file name for a page. The home page always maps
/// to [`HOME_TEMPLATE`] regardless of its slug.
pub fn template_name(page: &Page) -> String {
    if page.is_home_page {
        HOME_TEMPLATE.to_string()
    } else {
        format!("{}.html", page.slug)
    }
}

/// Render a block and inline its children into the container slot.
fn render_tree(block: &Block, page: &Page, settings: &Settings) -> String {
    let html = render(block, settings);
    if !block.block_type.is_container() {
        return html;
    }

    let children: String = page
        .children_of(&block.id)
        .iter()
        .map(|child| render_tree(child, page, settings))
        .collect();
    html.replace(CHILD_SLOT, &children)
}

/// Built-in layout used when a page has no blocks.
fn default_layout(page: &Page, settings: &Settings) -> String {
    let hero = Block::new(format!("default-hero-{}", page.id), &page.id, BlockType::Hero)
        .with_prop("title", serde_json::json!("Welcome"))
        .with_prop(
            "subtitle",
            serde_json::json!("Discover our products and courses"),
        );
    let products = Block::new(
        format!("default-products-{}", page.id),
        &page.id,
        BlockType::ProductGrid,
    )
    .with_order(1);
    let courses = Block::new(
        format!("default-courses-{}", page.id),
        &page.id,
        BlockType::CourseGrid,
    )
    .with_order(2);

    [hero, products, courses]
        .iter()
        .map(|b| render(b, settings))
        .collect()
}

/// Assemble one page into a full template.
pub fn assemble_page(page: &Page, settings: &Settings) -> String {
    let body: String = if page.blocks.is_empty() {
        default_layout(page, settings)
    } else {
        page.top_level_blocks()
            .iter()
            .map(|block| render_tree(block, page, settings))
            .collect()
    };

    format!(
        "{HEADER_INCLUDE}\n<main class=\"page page-{}\">\n{body}\n</main>\n{FOOTER_INCLUDE}\n",
        page.slug
    )
}

/// The shared header template: site identity, menu navigation and
/// auth-state-aware actions, all resolved at page render time.
pub fn header_template(theme: &Theme) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{{{ site.name }}}}</title>
<meta name="generator" content="blockpress/{}">
<link rel="stylesheet" href="style.css">
</head>
<body>
<header class="site-header">
<a class="site-logo" href="/">{{{{ site.name }}}}</a>
<nav class="site-nav">{{% for item in menu %}}<a href="{{{{ item.url }}}}">{{{{ item.label }}}}</a>{{% endfor %}}</nav>
<div class="site-actions">
{{% if user %}}<a href="/account">{{{{ user.name }}}}</a><a href="/api/auth/logout">Sign out</a>{{% else %}}<a href="/login">Sign in</a><a class="btn btn-primary" href="/register">Sign up</a>{{% endif %}}
<a class="cart-link" href="/cart">Cart ({{{{ cart.count }}}})</a>
</div>
</header>
"#,
        theme.slug
    )
}

/// The shared footer template: copyright line with the current year,
/// script bundle references, document close.
pub fn footer_template(theme: &Theme) -> String {
    format!(
        r#"<footer class="site-footer">
<p>© {{{{ year }}}} {{{{ site.name }}}}. All rights reserved.</p>
<p class="footer-theme">Theme: {}</p>
</footer>
<script src="scripts/auth.js" defer></script>
<script src="scripts/cart.js" defer></script>
<script src="scripts/checkout.js" defer></script>
</body>
</html>
"#,
        theme.name
    )
}

/// Fixed auxiliary templates for system pages. Composed once from a small
/// static block set and reused for every theme.
pub fn system_templates(settings: &Settings) -> Vec<PageTemplate> {
    let login_block = Block::new("system-login", "system", BlockType::LoginForm);
    let login_body = render(&login_block, settings);

    let register_body = r#"<form class="auth-form register-form" method="post" action="/api/auth/register">
<h2>Create account</h2>
<label>Name<input type="text" name="name" required></label>
<label>Email<input type="email" name="email" required></label>
<label>Password<input type="password" name="password" required></label>
<button class="btn btn-primary" type="submit">Sign up</button>
</form>"#;

    let cart_body = r#"<h1>Your cart</h1>
{% if cart.items %}
<table class="cart-table">
{% for item in cart.items %}<tr data-cart-item="{{ item.id }}"><td>{{ item.name }}</td><td>{{ item.quantity }}</td><td>{{ item.subtotal }}</td><td><button class="cart-remove" data-item-id="{{ item.id }}">Remove</button></td></tr>{% endfor %}
</table>
<div class="cart-total">Total: {{ cart.total }}</div>
<a class="btn btn-primary" href="/checkout">Checkout</a>
{% else %}
<p class="cart-empty">Your cart is empty.</p>
{% endif %}"#;

    let checkout_body = r#"<h1>Checkout</h1>
<form class="checkout-form" method="post" action="/api/orders">
<label>Email<input type="email" name="email" required></label>
<label>Address<input type="text" name="address" required></label>
<label>Card number<input type="text" name="card" required></label>
<button class="btn btn-primary" type="submit">Place order ({{ cart.total }})</button>
</form>
<ul class="checkout-summary">{% for item in cart.items %}<li>{{ item.name }} × {{ item.quantity }}</li>{% endfor %}</ul>"#;

    [
        ("login.html", "login", login_body.as_str()),
        ("register.html", "register", register_body),
        ("cart.html", "cart", cart_body),
        ("checkout.html", "checkout", checkout_body),
    ]
    .iter()
    .map(|(name, slug, body)| PageTemplate {
        name: name.to_string(),
        contents: format!(
            "{HEADER_INCLUDE}\n<main class=\"page page-{slug}\">\n{body}\n</main>\n{FOOTER_INCLUDE}\n"
        ),
    })
    .collect()
}

/// Assemble every page of a theme, in page order.
pub fn assemble_theme(theme: &Theme) -> Vec<PageTemplate> {
    theme
        .pages
        .iter()
        .map(|page| PageTemplate {
            name: template_name(page),
            contents: assemble_page(page, &theme.settings),
        })
        .collect()
}

/// Substitute the shared include markers — how the page-render-time
/// collaborator builds the final document.
pub fn compose(page_template: &str, header: &str, footer: &str) -> String {
    page_template
        .replace(HEADER_INCLUDE, header)
        .replace(FOOTER_INCLUDE, footer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn theme() -> Theme {
        Theme {
            id: "t1".to_string(),
            name: "Aurora".to_string(),
            slug: "aurora".to_string(),
            settings: Settings::default(),
            custom_css: None,
            pages: vec![],
            is_active: false,
            is_default: false,
            owner_id: None,
        }
    }

    fn page(id: &str, slug: &str, home: bool, blocks: Vec<Block>) -> Page {
        Page {
            id: id.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            is_home_page: home,
            blocks,
        }
    }

    #[test]
    fn home_page_maps_to_canonical_name() {
        let home = page("p1", "landing", true, vec![]);
        assert_eq!(template_name(&home), "index.html");

        let about = page("p2", "about", false, vec![]);
        assert_eq!(template_name(&about), "about.html");
    }

    #[test]
    fn page_template_is_bracketed_by_includes() {
        let p = page(
            "p1",
            "home",
            true,
            vec![Block::new("b1", "p1", BlockType::Hero)],
        );
        let html = assemble_page(&p, &Settings::default());
        assert!(html.starts_with(HEADER_INCLUDE));
        assert!(html.trim_end().ends_with(FOOTER_INCLUDE));
    }

    #[test]
    fn blocks_appear_in_order() {
        let p = page(
            "p1",
            "home",
            true,
            vec![
                Block::new("second", "p1", BlockType::Cta).with_order(1),
                Block::new("first", "p1", BlockType::Hero).with_order(0),
            ],
        );
        let html = assemble_page(&p, &Settings::default());
        let first_at = html.find("data-block-id=\"first\"").unwrap();
        let second_at = html.find("data-block-id=\"second\"").unwrap();
        assert!(first_at < second_at);
    }

    #[test]
    fn container_children_are_inlined() {
        let p = page(
            "p1",
            "home",
            true,
            vec![
                Block::new("row1", "p1", BlockType::Row),
                Block::new("btn1", "p1", BlockType::Button)
                    .with_parent("row1")
                    .with_prop("label", json!("Go")),
                Block::new("btn2", "p1", BlockType::Button)
                    .with_parent("row1")
                    .with_order(1),
            ],
        );
        let html = assemble_page(&p, &Settings::default());
        assert!(!html.contains(CHILD_SLOT));

        let row_at = html.find("data-block-id=\"row1\"").unwrap();
        let btn1_at = html.find("data-block-id=\"btn1\"").unwrap();
        let btn2_at = html.find("data-block-id=\"btn2\"").unwrap();
        assert!(row_at < btn1_at && btn1_at < btn2_at);
        assert!(html.contains(">Go</a>"));
    }

    #[test]
    fn empty_page_gets_default_layout() {
        let p = page("p1", "home", true, vec![]);
        let html = assemble_page(&p, &Settings::default());
        assert!(html.contains("block-hero"));
        assert!(html.contains("{% for product in products %}"));
        assert!(html.contains("{% for course in courses %}"));
    }

    #[test]
    fn header_has_nav_and_auth_directives() {
        let header = header_template(&theme());
        assert!(header.contains("{% for item in menu %}"));
        assert!(header.contains("{% if user %}"));
        assert!(header.contains("{{ site.name }}"));
        assert!(header.contains("style.css"));
    }

    #[test]
    fn footer_has_year_and_scripts() {
        let footer = footer_template(&theme());
        assert!(footer.contains("{{ year }}"));
        assert!(footer.contains("scripts/cart.js"));
        assert!(footer.contains("</html>"));
    }

    #[test]
    fn system_templates_are_theme_independent() {
        let templates = system_templates(&Settings::default());
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["login.html", "register.html", "cart.html", "checkout.html"]
        );

        let cart = &templates[2];
        assert!(cart.contents.contains("{% for item in cart.items %}"));
        assert!(cart.contents.contains("{% else %}"));
    }

    #[test]
    fn compose_substitutes_includes() {
        let t = theme();
        let p = page("p1", "home", true, vec![]);
        let full = compose(
            &assemble_page(&p, &t.settings),
            &header_template(&t),
            &footer_template(&t),
        );
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.trim_end().ends_with("</html>"));
        assert!(!full.contains(HEADER_INCLUDE));
    }

    #[test]
    fn assemble_theme_emits_one_template_per_page() {
        let mut t = theme();
        t.pages = vec![
            page("p1", "home", true, vec![]),
            page("p2", "about", false, vec![]),
        ];
        let templates = assemble_theme(&t);
        let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["index.html", "about.html"]);
    }
}
