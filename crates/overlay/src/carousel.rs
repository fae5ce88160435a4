/// Keyboard navigation understood by the result view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub url: String,
    /// The original page image shown alongside the results. Not counted
    /// in the header total.
    pub is_reference: bool,
}

/// Result carousel: every successful output, plus the source image
/// appended as a reference slide when available. Navigation wraps.
#[derive(Debug, Clone)]
pub struct Carousel {
    slides: Vec<Slide>,
    index: usize,
    result_count: usize,
}

impl Carousel {
    pub fn new(outputs: Vec<String>, reference: Option<String>) -> Self {
        let result_count = outputs.len();
        let mut slides: Vec<Slide> = outputs
            .into_iter()
            .map(|url| Slide {
                url,
                is_reference: false,
            })
            .collect();
        if let Some(url) = reference {
            slides.push(Slide {
                url,
                is_reference: true,
            });
        }
        Self {
            slides,
            index: 0,
            result_count,
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn current(&self) -> &Slide {
        &self.slides[self.index]
    }

    pub fn result_count(&self) -> usize {
        self.result_count
    }

    pub fn has_reference(&self) -> bool {
        self.slides.last().is_some_and(|s| s.is_reference)
    }

    /// 1-based position and total, for the "2 / 5" counter.
    pub fn counter(&self) -> (usize, usize) {
        (self.index + 1, self.slides.len())
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.slides.len();
    }

    pub fn prev(&mut self) {
        self.index = if self.index == 0 {
            self.slides.len() - 1
        } else {
            self.index - 1
        };
    }

    pub fn select(&mut self, index: usize) {
        if index < self.slides.len() {
            self.index = index;
        }
    }

    pub fn handle_key(&mut self, key: NavKey) {
        match key {
            NavKey::Left => self.prev(),
            NavKey::Right => self.next(),
        }
    }

    pub fn title(&self) -> String {
        if self.has_reference() {
            format!("Your Try-On Results ({} + Reference)", self.result_count)
        } else {
            format!("Your Try-On Results ({})", self.result_count)
        }
    }

    pub fn label(&self, index: usize) -> String {
        match self.slides.get(index) {
            Some(slide) if slide.is_reference => "Original Garment (Reference)".to_string(),
            Some(_) => format!("Try-On Result {}", index + 1),
            None => String::new(),
        }
    }
}
