//! # Stylesheet Generator
//!
//! Maps design tokens to a complete base stylesheet.
//!
//! Output layers, in order:
//! 1. `:root` variable declarations, one per token
//! 2. fixed structural rules (reset, typography scale, navigation,
//!    buttons, cards, grids)
//! 3. a responsive override at a single breakpoint
//! 4. optional dark-mode variable overrides
//! 5. the theme's custom CSS, appended verbatim
//!
//! Custom CSS always wins by source order; no selector-specificity
//! arbitration is attempted.

use blockpress_model::Settings;
use serde_json::Value;
use tracing::debug;

/// Single responsive breakpoint, in px.
const BREAKPOINT: u32 = 768;

fn px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

fn root_variables(settings: &Settings, out: &mut String) {
    let colors = &settings.colors;
    let typography = &settings.typography;
    let spacing = &settings.spacing;
    let borders = &settings.borders;

    out.push_str(":root {\n");
    for (name, value) in [
        ("--color-primary", colors.primary.as_str()),
        ("--color-secondary", colors.secondary.as_str()),
        ("--color-accent", colors.accent.as_str()),
        ("--color-background", colors.background.as_str()),
        ("--color-surface", colors.surface.as_str()),
        ("--color-text", colors.text.as_str()),
        ("--color-text-muted", colors.text_muted.as_str()),
        ("--color-border", colors.border.as_str()),
        ("--color-success", colors.success.as_str()),
        ("--color-warning", colors.warning.as_str()),
        ("--color-error", colors.error.as_str()),
    ] {
        out.push_str(&format!("  {name}: {value};\n"));
    }

    out.push_str(&format!("  --font-body: {};\n", typography.font_family));
    out.push_str(&format!(
        "  --font-heading: {};\n",
        typography.heading_font_family
    ));
    out.push_str(&format!("  --font-size-base: {};\n", px(typography.base_size)));
    out.push_str(&format!("  --line-height: {};\n", typography.line_height));

    let unit = spacing.base_unit;
    out.push_str(&format!("  --space-xs: {};\n", px(unit * 0.5)));
    out.push_str(&format!("  --space-sm: {};\n", px(unit)));
    out.push_str(&format!("  --space-md: {};\n", px(unit * 2.0)));
    out.push_str(&format!("  --space-lg: {};\n", px(unit * 4.0)));
    out.push_str(&format!("  --space-xl: {};\n", px(unit * 8.0)));
    out.push_str(&format!("  --space-section: {};\n", px(spacing.section)));

    out.push_str(&format!("  --radius: {};\n", px(borders.radius)));
    out.push_str(&format!("  --border-width: {};\n", px(borders.width)));
    out.push_str(&format!("  --layout-max-width: {};\n", settings.layout.max_width));
    out.push_str(&format!("  --layout-gutter: {};\n", settings.layout.gutter));

    // Computed elevation ladder.
    for level in 1..=3u32 {
        let y = level * 2;
        let blur = level * 6;
        let alpha = 0.04 * level as f64;
        out.push_str(&format!(
            "  --shadow-{level}: 0 {y}px {blur}px rgba(0, 0, 0, {alpha:.2});\n"
        ));
    }
    out.push_str("}\n\n");
}

fn typography_scale(settings: &Settings, out: &mut String) {
    let base = settings.typography.base_size;
    let ratio = settings.typography.scale_ratio;
    // h6 = base, each level up multiplies by the scale ratio.
    for level in (1..=6u32).rev() {
        let size = base * ratio.powi((6 - level) as i32);
        out.push_str(&format!(
            "h{level} {{ font-family: var(--font-heading); font-size: {}; line-height: 1.2; margin-bottom: var(--space-sm); }}\n",
            px((size * 100.0).round() / 100.0)
        ));
    }
    out.push('\n');
}

fn structural_rules(out: &mut String) {
    out.push_str(
        r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

body {
  font-family: var(--font-body);
  font-size: var(--font-size-base);
  line-height: var(--line-height);
  color: var(--color-text);
  background: var(--color-background);
}

img, video { max-width: 100%; display: block; }
a { color: var(--color-primary); text-decoration: none; }

.container { max-width: var(--layout-max-width); margin: 0 auto; padding: 0 var(--layout-gutter); }
.block { padding: var(--space-section) 0; }

.site-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: var(--space-md) var(--layout-gutter);
  background: var(--color-surface);
  border-bottom: var(--border-width) solid var(--color-border);
}
.site-nav { display: flex; gap: var(--space-md); }
.site-nav a { color: var(--color-text); }
.site-nav a:hover { color: var(--color-primary); }

.btn {
  display: inline-block;
  padding: var(--space-sm) var(--space-md);
  border: none;
  border-radius: var(--radius);
  font-size: var(--font-size-base);
  cursor: pointer;
}
.btn-primary { background: var(--color-primary); color: #fff; }
.btn-secondary { background: var(--color-secondary); color: #fff; }
.btn-outline { background: transparent; color: var(--color-primary); border: var(--border-width) solid var(--color-primary); }

.card {
  background: var(--color-surface);
  border: var(--border-width) solid var(--color-border);
  border-radius: var(--radius);
  padding: var(--space-md);
  box-shadow: var(--shadow-1);
}

.grid { display: grid; gap: var(--space-md); }
.grid-1 { grid-template-columns: 1fr; }
.grid-2 { grid-template-columns: repeat(2, 1fr); }
.grid-3 { grid-template-columns: repeat(3, 1fr); }
.grid-4 { grid-template-columns: repeat(4, 1fr); }
.grid-5 { grid-template-columns: repeat(5, 1fr); }
.grid-6 { grid-template-columns: repeat(6, 1fr); }

.hero { padding: var(--space-xl) var(--layout-gutter); color: #fff; background-size: cover; background-position: center; }
.hero-content { max-width: var(--layout-max-width); margin: 0 auto; }

.auth-form { max-width: 420px; margin: 0 auto; display: grid; gap: var(--space-md); }
.auth-form input { padding: var(--space-sm); border: var(--border-width) solid var(--color-border); border-radius: var(--radius); width: 100%; }

.site-footer {
  padding: var(--space-lg) var(--layout-gutter);
  background: var(--color-secondary);
  color: #fff;
  text-align: center;
}

.divider { border: none; border-top: var(--border-width) solid var(--color-border); }
.divider-dashed { border-top-style: dashed; }
.divider-dotted { border-top-style: dotted; }

.block-placeholder { display: none; }
"#,
    );
    out.push('\n');
}

fn responsive_rules(out: &mut String) {
    out.push_str(&format!(
        r#"@media (min-width: {}px) {{
  .bp-hide-desktop {{ display: none; }}
}}

@media (max-width: {BREAKPOINT}px) {{
  .grid-2, .grid-3, .grid-4, .grid-5, .grid-6 {{ grid-template-columns: 1fr; }}
  .site-header {{ flex-direction: column; gap: var(--space-sm); }}
  .bp-hide-tablet, .bp-hide-mobile {{ display: none; }}
}}

"#,
        BREAKPOINT + 1
    ));
}

fn dark_mode_rules(settings: &Settings, out: &mut String) {
    let Some(Value::Object(dark)) = &settings.dark_mode else {
        return;
    };
    let Some(Value::Object(colors)) = dark.get("colors") else {
        return;
    };

    let mut keys: Vec<&String> = colors.keys().collect();
    keys.sort();

    out.push_str("[data-theme=\"dark\"] {\n");
    for key in keys {
        if let Some(Value::String(value)) = colors.get(key) {
            // camelCase token names become kebab-case variable suffixes.
            let mut name = String::new();
            for ch in key.chars() {
                if ch.is_ascii_uppercase() {
                    name.push('-');
                    name.push(ch.to_ascii_lowercase());
                } else {
                    name.push(ch);
                }
            }
            out.push_str(&format!("  --color-{name}: {value};\n"));
        }
    }
    out.push_str("}\n\n");
}

/// Generate the theme's full stylesheet.
///
/// Deterministic: identical settings and custom CSS yield byte-identical
/// output.
pub fn generate(settings: &Settings, custom_css: Option<&str>) -> String {
    let mut out = String::with_capacity(8 * 1024);

    out.push_str("/* Generated stylesheet. Edit theme settings, not this file. */\n\n");
    root_variables(settings, &mut out);
    structural_rules(&mut out);
    typography_scale(settings, &mut out);
    responsive_rules(&mut out);
    dark_mode_rules(settings, &mut out);

    if let Some(custom) = custom_css {
        if !custom.trim().is_empty() {
            out.push_str("/* Custom overrides (appended verbatim, wins by source order) */\n");
            out.push_str(custom);
            if !custom.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    debug!(bytes = out.len(), "generated stylesheet");
    out
}
