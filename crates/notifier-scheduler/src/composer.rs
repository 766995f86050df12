//! Notification text composition.

use notifier_core::Content;
use rand::RngCore;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};

/// Templates used when none are configured.
pub const DEFAULT_TEMPLATES: [&str; 3] = [
    "Check out this cool new %{ name } for just Rs %{ price }.",
    "%{ name } is trending in %{ category } right now. Check it out",
    "You should totally see this %{ name } in %{ category }. It's just for %{ price }",
];

/// Fills a randomly chosen template with content attributes.
///
/// Placeholders are `%{ name }`, `%{ category }` (categories joined by
/// commas) and `%{ price }`. Unknown placeholders are left as written.
pub struct MessageComposer {
    templates: Vec<String>,
    placeholder: Regex,
}

impl MessageComposer {
    pub fn new() -> Self {
        Self::with_templates(DEFAULT_TEMPLATES.iter().map(|t| t.to_string()).collect())
    }

    pub fn with_templates(templates: Vec<String>) -> Self {
        Self {
            templates,
            placeholder: Regex::new(r"%\{\s*(\w+)\s*\}").expect("placeholder pattern is valid"),
        }
    }

    /// `None` when no templates are configured.
    pub fn compose(&self, content: &Content, rng: &mut dyn RngCore) -> Option<String> {
        let template = self.templates.choose(rng)?;
        Some(self.fill(template, content))
    }

    fn fill(&self, template: &str, content: &Content) -> String {
        self.placeholder
            .replace_all(template, |caps: &Captures| match &caps[1] {
                "name" => content.name.clone(),
                "category" => content.categories.join(","),
                "price" => format_price(content.price),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Default for MessageComposer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        format!("{price:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifier_core::ContentId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn shoes() -> Content {
        Content {
            id: ContentId::new("p1"),
            name: "Running Shoes".to_string(),
            categories: vec!["Sports".to_string(), "Footwear".to_string()],
            tags: vec![],
            price: 1499.0,
        }
    }

    fn composer(template: &str) -> MessageComposer {
        MessageComposer::with_templates(vec![template.to_string()])
    }

    #[test]
    fn test_fills_all_placeholders() {
        let mut rng = StdRng::seed_from_u64(3);
        let text = composer(DEFAULT_TEMPLATES[2]).compose(&shoes(), &mut rng).unwrap();
        assert_eq!(
            text,
            "You should totally see this Running Shoes in Sports,Footwear. It's just for 1499"
        );
    }

    #[test]
    fn test_fractional_price() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut content = shoes();
        content.price = 99.5;
        let text = composer(DEFAULT_TEMPLATES[0]).compose(&content, &mut rng).unwrap();
        assert_eq!(text, "Check out this cool new Running Shoes for just Rs 99.50.");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let mut rng = StdRng::seed_from_u64(3);
        let text = composer("%{name} by %{ brand }").compose(&shoes(), &mut rng).unwrap();
        assert_eq!(text, "Running Shoes by %{ brand }");
    }

    #[test]
    fn test_default_templates_all_reachable() {
        let composer = MessageComposer::new();
        let mut rng = StdRng::seed_from_u64(9);
        let seen: std::collections::HashSet<String> = (0..100)
            .filter_map(|_| composer.compose(&shoes(), &mut rng))
            .collect();
        assert_eq!(seen.len(), DEFAULT_TEMPLATES.len());
    }

    #[test]
    fn test_no_templates() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(
            MessageComposer::with_templates(Vec::new())
                .compose(&shoes(), &mut rng)
                .is_none()
        );
    }
}
