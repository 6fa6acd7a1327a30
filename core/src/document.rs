/// One line of the source corpus: `<doc id> <term> <term> ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub id: &'a str,
    pub text: &'a str,
}

impl<'a> Document<'a> {
    /// Split a raw line into id and text. Returns `None` for a blank line.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.trim();
        let mut split = line.splitn(2, char::is_whitespace);
        let id = split.next().filter(|id| !id.is_empty())?;
        let text = split.next().unwrap_or("").trim();
        Some(Self { id, text })
    }

    /// Whitespace-delimited terms, no normalization applied.
    pub fn terms(&self) -> impl Iterator<Item = &'a str> {
        self.text.split_whitespace()
    }
}
