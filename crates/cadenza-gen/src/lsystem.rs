//! L-system melody generator.
//!
//! A Lindenmayer string-rewriting system with a hard growth bound: the
//! working string never exceeds 4096 characters, and an iteration that
//! would grow past the cap truncates there instead of growing silently.
//! The rewritten string is walked turtle-style into a melody: `F`/`G`
//! emit a note and move by the current step, `+`/`-` set the step
//! direction, `[`/`]` drop and raise an octave.

/// Maximum working-string length.
pub const MAX_STRING: usize = 4096;

/// Maximum number of rewrite rules.
pub const MAX_RULES: usize = 10;

/// String-rewriting melody source.
///
/// # Example
///
/// ```rust
/// use cadenza_gen::LSystem;
///
/// let mut lsys = LSystem::new("F");
/// lsys.add_rule('F', "F+G-F");
/// lsys.iterate();
/// let melody = lsys.to_melody(64);
/// assert!(!melody.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LSystem {
    axiom: String,
    current: String,
    rules: Vec<(char, String)>,
    iteration: u32,
    /// Base note the melody walk starts from.
    start_note: i32,
    /// Interval magnitude for each `F`/`G` step.
    step: i32,
}

impl LSystem {
    /// Create a system from an axiom (truncated to the cap).
    pub fn new(axiom: &str) -> Self {
        let mut axiom = axiom.to_owned();
        axiom.truncate(MAX_STRING);
        Self {
            current: axiom.clone(),
            axiom,
            rules: Vec::new(),
            iteration: 0,
            start_note: 60,
            step: 2,
        }
    }

    /// Add a rewrite rule `predecessor → successor`. Silently ignored
    /// past [`MAX_RULES`] rules; the first matching rule wins during
    /// rewriting.
    pub fn add_rule(&mut self, predecessor: char, successor: &str) {
        if self.rules.len() < MAX_RULES {
            self.rules.push((predecessor, successor.to_owned()));
        }
    }

    /// Set the starting note of the melody walk.
    pub fn set_start_note(&mut self, note: i32) {
        self.start_note = note.clamp(0, 127);
    }

    /// Set the step interval magnitude.
    pub fn set_step(&mut self, step: i32) {
        self.step = step;
    }

    /// The current working string.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Number of iterations applied.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Restore the axiom.
    pub fn reset(&mut self) {
        self.current = self.axiom.clone();
        self.iteration = 0;
    }

    /// Apply every rule once across the string.
    ///
    /// Output is capped at [`MAX_STRING`] characters; a rewrite that
    /// would overflow stops there, leaving a truncated (but valid)
    /// generation rather than growing without bound.
    pub fn iterate(&mut self) {
        let mut next = String::with_capacity(self.current.len().min(MAX_STRING));

        'outer: for c in self.current.chars() {
            let successor = self
                .rules
                .iter()
                .find(|(pred, _)| *pred == c)
                .map(|(_, succ)| succ.as_str());

            match successor {
                Some(succ) => {
                    for sc in succ.chars() {
                        if next.len() >= MAX_STRING {
                            break 'outer;
                        }
                        next.push(sc);
                    }
                }
                None => {
                    if next.len() >= MAX_STRING {
                        break;
                    }
                    next.push(c);
                }
            }
        }

        self.current = next;
        self.iteration += 1;
    }

    /// Walk the current string into a melody of at most `max_notes`.
    ///
    /// - `F` / `G`: emit the current note, then move by the step
    /// - `+`: make the step ascending
    /// - `-`: make the step descending
    /// - `[`: drop an octave
    /// - `]`: raise an octave
    ///
    /// Other characters are structural and emit nothing.
    pub fn to_melody(&self, max_notes: usize) -> Vec<i32> {
        let mut notes = Vec::new();
        let mut note = self.start_note;
        let mut step = self.step;

        for c in self.current.chars() {
            if notes.len() >= max_notes {
                break;
            }
            match c {
                'F' | 'G' => {
                    notes.push(note);
                    note += step;
                }
                '+' => step = step.abs(),
                '-' => step = -step.abs(),
                '[' => note -= 12,
                ']' => note += 12,
                _ => {}
            }
        }

        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_expands_rules() {
        let mut lsys = LSystem::new("F");
        lsys.add_rule('F', "FF");
        lsys.iterate();
        assert_eq!(lsys.current(), "FF");
        lsys.iterate();
        assert_eq!(lsys.current(), "FFFF");
    }

    #[test]
    fn unmatched_characters_pass_through() {
        let mut lsys = LSystem::new("F+X");
        lsys.add_rule('F', "FG");
        lsys.iterate();
        assert_eq!(lsys.current(), "FG+X");
    }

    #[test]
    fn growth_is_capped() {
        let mut lsys = LSystem::new("F");
        lsys.add_rule('F', "FFFF");
        for _ in 0..20 {
            lsys.iterate();
        }
        assert!(lsys.current().len() <= MAX_STRING);
        // Still usable after hitting the cap.
        assert!(!lsys.to_melody(16).is_empty());
    }

    #[test]
    fn melody_walk_follows_turtle_commands() {
        let mut lsys = LSystem::new("FF-F]F");
        lsys.set_start_note(60);
        lsys.set_step(2);
        let melody = lsys.to_melody(16);
        // F: 60, step to 62. F: 62, step to 64. '-' flips down.
        // F: 64, step to 62. ']' up an octave. F: 74.
        assert_eq!(melody, vec![60, 62, 64, 74]);
    }

    #[test]
    fn bracket_octaves() {
        let mut lsys = LSystem::new("[F]F");
        lsys.set_start_note(60);
        lsys.set_step(0);
        assert_eq!(lsys.to_melody(8), vec![48, 60]);
    }

    #[test]
    fn melody_length_is_bounded() {
        let mut lsys = LSystem::new("F");
        lsys.add_rule('F', "FFFFFFFF");
        lsys.iterate();
        lsys.iterate();
        assert_eq!(lsys.to_melody(10).len(), 10);
    }

    #[test]
    fn reset_restores_axiom() {
        let mut lsys = LSystem::new("F+G");
        lsys.add_rule('F', "GG");
        lsys.iterate();
        lsys.reset();
        assert_eq!(lsys.current(), "F+G");
        assert_eq!(lsys.iteration(), 0);
    }

    #[test]
    fn rule_count_is_bounded() {
        let mut lsys = LSystem::new("A");
        for i in 0..20 {
            lsys.add_rule(char::from(b'A' + i), "B");
        }
        assert!(lsys.rules.len() <= MAX_RULES);
    }
}
