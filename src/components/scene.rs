use crate::components::colors::Rgb;

/// A run of same-coloured text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub color: Rgb,
}

impl Label {
    pub fn new(text: impl Into<String>, color: Rgb) -> Self {
        Self { text: text.into(), color }
    }

    pub fn white(text: impl Into<String>) -> Self {
        Self::new(text, Rgb::WHITE)
    }
}

/// What a screen hands to the display: a title and rows of coloured labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub title: String,
    pub rows: Vec<Vec<Label>>,
}

impl Scene {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), rows: Vec::new() }
    }

    pub fn row(mut self, labels: Vec<Label>) -> Self {
        self.rows.push(labels);
        self
    }

    pub fn line(self, label: Label) -> Self {
        self.row(vec![label])
    }

    /// Rows flattened to plain text.
    pub fn text(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|l| l.text.as_str()).collect())
            .collect()
    }
}
