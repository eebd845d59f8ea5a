//! Presenter commands typed on stdin.

/// One navigation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Next,
    Prev,
    /// 1-based slide number.
    Goto(usize),
    Home,
    End,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    /// Parse a line. An empty line means "next".
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Input::Next;
        };

        match command.to_lowercase().as_str() {
            "n" | "next" | "j" => Input::Next,
            "p" | "prev" | "previous" | "k" => Input::Prev,
            "home" | "first" => Input::Home,
            "end" | "last" => Input::End,
            "h" | "help" | "?" => Input::Help,
            "q" | "quit" | "exit" => Input::Quit,
            "g" | "goto" => match words.next().map(str::parse) {
                Some(Ok(n)) => Input::Goto(n),
                _ => Input::Unknown(line.trim().to_string()),
            },
            other => match other.parse() {
                Ok(n) => Input::Goto(n),
                Err(_) => Input::Unknown(line.trim().to_string()),
            },
        }
    }
}

pub const HELP: &str = "\
Commands:
  n, next, <enter>   reveal the next step or go to the next slide
  p, prev            hide the last step or go back a slide
  g N, goto N, N     jump to slide N
  home, end          jump to the first slide or the end of the deck
  q, quit            stop presenting";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_line_is_next() {
        assert_eq!(Input::parse(""), Input::Next);
        assert_eq!(Input::parse("   "), Input::Next);
    }

    #[test]
    fn test_navigation_words() {
        assert_eq!(Input::parse("n"), Input::Next);
        assert_eq!(Input::parse("PREV"), Input::Prev);
        assert_eq!(Input::parse("home"), Input::Home);
        assert_eq!(Input::parse("end"), Input::End);
        assert_eq!(Input::parse("q"), Input::Quit);
        assert_eq!(Input::parse("?"), Input::Help);
    }

    #[test]
    fn test_goto() {
        assert_eq!(Input::parse("g 5"), Input::Goto(5));
        assert_eq!(Input::parse("goto 12"), Input::Goto(12));
        assert_eq!(Input::parse("7"), Input::Goto(7));
    }

    #[test]
    fn test_unknown() {
        assert_eq!(Input::parse("g x"), Input::Unknown("g x".to_string()));
        assert_eq!(Input::parse("g"), Input::Unknown("g".to_string()));
        assert_eq!(Input::parse("dance"), Input::Unknown("dance".to_string()));
    }
}
