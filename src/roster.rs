//! Selectable player characters

#[derive(Debug, Clone, Default)]
pub struct CharacterRoster {
    codes: Vec<String>,
    current: usize,
}

impl CharacterRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster; duplicate codes are kept once, in first-seen order
    pub fn load<I, S>(&mut self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.codes.clear();
        for code in codes {
            let code = code.into();
            if !self.codes.contains(&code) {
                self.codes.push(code);
            }
        }
        self.current = 0;
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        self.codes.get(self.current).map(String::as_str)
    }

    pub fn next(&mut self) -> Option<&str> {
        if self.codes.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.codes.len();
        self.current()
    }

    pub fn previous(&mut self) -> Option<&str> {
        if self.codes.is_empty() {
            return None;
        }
        self.current = (self.current + self.codes.len() - 1) % self.codes.len();
        self.current()
    }
}
