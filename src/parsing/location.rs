/// A position in a character stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct TextPoint {
    /// The vertical position of the point (starting at 1)
    pub line: usize,
    /// The horizontal position of the point, counted in characters (starting at 1)
    pub column: usize,
    /// The byte index in the character stream (starting at 0)
    pub index: usize,
}

impl TextPoint {
    /// The point before the first character of any input.
    pub const START: TextPoint = TextPoint {
        line: 1,
        column: 1,
        index: 0,
    };

    /// The point right after `self` once `text` has been read, `text` starting at `self`.
    pub fn advanced_by(self, text: &str) -> TextPoint {
        let mut point = self;
        for character in text.chars() {
            if character == '\n' {
                point.line += 1;
                point.column = 1;
            } else {
                point.column += 1;
            }
            point.index += character.len_utf8();
        }
        point
    }
}

impl std::fmt::Display for TextPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A text region defined by a start point and an (inclusive) end point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub start: TextPoint,
    pub end: TextPoint,
}

impl Location {
    /// An empty region sitting at `point`, used for synthesized tokens.
    pub fn at(point: TextPoint) -> Self {
        Location {
            start: point,
            end: point,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_over_newlines() {
        let point = TextPoint::START.advanced_by("(5 A)\n  (");
        assert_eq!(
            point,
            TextPoint {
                line: 2,
                column: 4,
                index: 9
            }
        );
    }

    #[test]
    fn advance_counts_characters_not_bytes() {
        let point = TextPoint::START.advanced_by("ε ");
        assert_eq!(point.column, 3);
        assert_eq!(point.index, 3);
    }
}
