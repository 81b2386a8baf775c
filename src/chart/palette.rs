use std::collections::HashMap;

pub const PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Append-only model-name to color mapping. Colors are handed out
/// round-robin in first-seen order and never change afterwards.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    assigned: HashMap<String, &'static str>,
}

impl ColorRegistry {
    pub fn color_for(&mut self, name: &str) -> &'static str {
        if let Some(color) = self.assigned.get(name) {
            return *color;
        }
        let color = PALETTE[self.assigned.len() % PALETTE.len()];
        self.assigned.insert(name.to_owned(), color);
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_in_palette_order_and_remembers() {
        let mut colors = ColorRegistry::default();
        assert_eq!(colors.color_for("a"), PALETTE[0]);
        assert_eq!(colors.color_for("b"), PALETTE[1]);
        assert_eq!(colors.color_for("a"), PALETTE[0]);
        assert_eq!(colors.assigned.len(), 2);
    }

    #[test]
    fn wraps_around_palette() {
        let mut colors = ColorRegistry::default();
        for i in 0..PALETTE.len() {
            colors.color_for(&format!("m{i}"));
        }
        assert_eq!(colors.color_for("overflow"), PALETTE[0]);
    }
}
