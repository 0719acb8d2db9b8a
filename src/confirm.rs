use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use log::debug;

pub const DEFAULT_ITEM_NAME: &str = "This item";

/// Source of yes/no answers for destructive or mutating actions
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<C: Confirmer + ?Sized> Confirmer for Box<C> {
    fn confirm(&mut self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

pub fn delete_prompt(name: Option<&str>) -> String {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or(DEFAULT_ITEM_NAME);
    format!(
        "Are you sure you want to delete {}? This cannot be undone.",
        name
    )
}

/// Only `active` reads as active; every other status reads as passive.
pub fn status_label(status: &str) -> &'static str {
    if status == "active" {
        "active"
    } else {
        "passive"
    }
}

pub fn status_prompt(status: &str) -> String {
    format!(
        "Are you sure you want to set this item to {}?",
        status_label(status)
    )
}

/// Answers every prompt the same way (`--yes`, or non-interactive runs)
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirmer for AutoConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        debug!("Auto-answering '{}' with {}", prompt, self.0);
        self.0
    }
}

/// Prompts on stdout and reads `y`/`yes` from stdin
#[derive(Debug, Default)]
pub struct StdinConfirmer;

impl Confirmer for StdinConfirmer {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Replays a fixed list of answers and records the prompts it was shown.
/// Declines once the answers run out.
#[derive(Debug, Default)]
pub struct ScriptedConfirmer {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirmer {
    pub fn new<I: IntoIterator<Item = bool>>(answers: I) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_prompt_names_item() {
        assert_eq!(
            delete_prompt(Some("Dune")),
            "Are you sure you want to delete Dune? This cannot be undone."
        );
        assert_eq!(
            delete_prompt(None),
            "Are you sure you want to delete This item? This cannot be undone."
        );
        assert_eq!(delete_prompt(Some("  ")), delete_prompt(None));
    }

    #[test]
    fn test_status_prompt() {
        assert_eq!(
            status_prompt("active"),
            "Are you sure you want to set this item to active?"
        );
        assert_eq!(status_label("inactive"), "passive");
        assert_eq!(status_label(""), "passive");
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("no"));
        assert!(!is_yes(""));
    }

    #[test]
    fn test_scripted_confirmer() {
        let mut confirmer = ScriptedConfirmer::new([true, false]);
        assert!(confirmer.confirm("one"));
        assert!(!confirmer.confirm("two"));
        assert!(!confirmer.confirm("three"));
        assert_eq!(confirmer.prompts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("x"));
        assert!(!AutoConfirm(false).confirm("x"));
    }
}
