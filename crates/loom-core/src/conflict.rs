//! Per-file conflict resolution.
//!
//! [`resolve`] decides what happens to one destination file given whether it
//! exists, who owns it, which thread is writing and the operation mode. It
//! holds no state between calls; declined files are asked about again on the
//! next run.

use std::fmt;

use thiserror::Error;

/// The operation a file is being written for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// `add`: full walk of a newly added (or re-added) thread.
    Add,
    /// `weave` with no target: every thread re-applied in order.
    WeaveAll,
    /// `weave <thread>`: only the named thread is re-applied.
    WeaveTarget(String),
}

/// An answer from a [`Decide`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
    Skip,
}

impl Decision {
    /// Parse a typed answer. Empty input means yes.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            "s" | "skip" => Some(Self::Skip),
            _ => None,
        }
    }
}

/// Failure to obtain a decision.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before an answer was given")]
    Eof,

    #[error("failed to read answer: {0}")]
    Io(#[from] std::io::Error),

    #[error("no scripted answer left for '{0}'")]
    Exhausted(String),
}

/// The question put to a [`Decide`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Destination path relative to the project root.
    pub path: String,
    /// Thread that wants to write the file.
    pub thread: String,
    /// Current owner, if the file is owned.
    pub owner: Option<String>,
}

impl Prompt {
    /// Line describing the current state of the file.
    pub fn context(&self) -> String {
        match &self.owner {
            Some(owner) => format!(
                "File '{}' is currently owned by thread '{}'.",
                self.path, owner
            ),
            None => format!(
                "File '{}' exists but is not currently owned by any Loom thread.",
                self.path
            ),
        }
    }

    pub fn question(&self) -> String {
        format!(
            "Do you want thread '{}' to take ownership of '{}' and overwrite it?",
            self.thread, self.path
        )
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.context(), self.question())
    }
}

/// Source of yes/no/skip answers for ownership conflicts.
pub trait Decide {
    fn decide(&mut self, prompt: &Prompt) -> Result<Decision, PromptError>;
}

/// Answers every prompt the same way (`--yes` / `--no`).
#[derive(Debug, Clone, Copy)]
pub struct FixedDecision(pub Decision);

impl Decide for FixedDecision {
    fn decide(&mut self, _prompt: &Prompt) -> Result<Decision, PromptError> {
        Ok(self.0)
    }
}

/// What happens to one destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file does not exist yet; write it and acquire it.
    Create,
    /// Already owned by this thread; overwrite, ownership unchanged.
    Reapply,
    /// Exists unowned; overwrite and acquire.
    Adopt,
    /// Owned by another thread; revoke from `from`, overwrite, acquire.
    Transfer { from: String },
    /// The user refused; leave the file and the ledger alone.
    Declined,
    /// A targeted weave for another thread; leave it alone.
    OutOfScope,
}

impl Outcome {
    /// Whether the file gets written.
    pub fn writes(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Reapply | Self::Adopt | Self::Transfer { .. }
        )
    }
}

/// Classify one destination file.
///
/// `exists` is whether anything is at the destination; `owner` is the thread
/// the manifest currently credits with it. A missing file claimed by another
/// thread is taken over without asking, so two threads never claim it.
pub fn resolve(
    path: &str,
    thread: &str,
    exists: bool,
    owner: Option<&str>,
    mode: &Mode,
    decider: &mut dyn Decide,
) -> Result<Outcome, PromptError> {
    if !exists {
        return Ok(match owner {
            Some(owner) if owner != thread => Outcome::Transfer {
                from: owner.to_string(),
            },
            _ => Outcome::Create,
        });
    }

    if owner == Some(thread) {
        return Ok(Outcome::Reapply);
    }

    let accepted = match mode {
        Mode::WeaveTarget(target) if target != thread => return Ok(Outcome::OutOfScope),
        Mode::WeaveTarget(_) => true,
        Mode::Add | Mode::WeaveAll => {
            let prompt = Prompt {
                path: path.to_string(),
                thread: thread.to_string(),
                owner: owner.map(str::to_string),
            };
            decider.decide(&prompt)? == Decision::Yes
        }
    };

    Ok(match (accepted, owner) {
        (false, _) => Outcome::Declined,
        (true, Some(owner)) => Outcome::Transfer {
            from: owner.to_string(),
        },
        (true, None) => Outcome::Adopt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        answer: Decision,
        asked: Vec<Prompt>,
    }

    impl Counting {
        fn new(answer: Decision) -> Self {
            Self {
                answer,
                asked: Vec::new(),
            }
        }
    }

    impl Decide for Counting {
        fn decide(&mut self, prompt: &Prompt) -> Result<Decision, PromptError> {
            self.asked.push(prompt.clone());
            Ok(self.answer)
        }
    }

    struct Closed;

    impl Decide for Closed {
        fn decide(&mut self, _prompt: &Prompt) -> Result<Decision, PromptError> {
            Err(PromptError::Eof)
        }
    }

    fn target(name: &str) -> Mode {
        Mode::WeaveTarget(name.to_string())
    }

    #[test]
    fn test_missing_file_is_created_in_every_mode() {
        for mode in [Mode::Add, Mode::WeaveAll, target("a"), target("b")] {
            let mut d = Counting::new(Decision::No);
            assert_eq!(resolve("x", "a", false, None, &mode, &mut d).unwrap(), Outcome::Create);
            assert_eq!(resolve("x", "a", false, Some("a"), &mode, &mut d).unwrap(), Outcome::Create);
            assert!(d.asked.is_empty());
        }
    }

    #[test]
    fn test_missing_file_owned_elsewhere_transfers_silently() {
        let mut d = Counting::new(Decision::No);
        assert_eq!(
            resolve("x", "a", false, Some("b"), &Mode::Add, &mut d).unwrap(),
            Outcome::Transfer { from: "b".into() }
        );
        assert!(d.asked.is_empty());
    }

    #[test]
    fn test_own_file_is_reapplied_without_prompt() {
        for mode in [Mode::Add, Mode::WeaveAll, target("a")] {
            let mut d = Closed;
            assert_eq!(resolve("x", "a", true, Some("a"), &mode, &mut d).unwrap(), Outcome::Reapply);
        }
    }

    #[test]
    fn test_unowned_existing_file_prompts() {
        for mode in [Mode::Add, Mode::WeaveAll] {
            let mut yes = Counting::new(Decision::Yes);
            assert_eq!(resolve("x", "a", true, None, &mode, &mut yes).unwrap(), Outcome::Adopt);
            assert_eq!(yes.asked.len(), 1);
            assert_eq!(
                yes.asked[0].context(),
                "File 'x' exists but is not currently owned by any Loom thread."
            );

            let mut no = Counting::new(Decision::No);
            assert_eq!(resolve("x", "a", true, None, &mode, &mut no).unwrap(), Outcome::Declined);

            let mut skip = Counting::new(Decision::Skip);
            assert_eq!(resolve("x", "a", true, None, &mode, &mut skip).unwrap(), Outcome::Declined);
        }
    }

    #[test]
    fn test_file_owned_by_other_prompts() {
        let mut yes = Counting::new(Decision::Yes);
        assert_eq!(
            resolve("src/x", "a", true, Some("b"), &Mode::WeaveAll, &mut yes).unwrap(),
            Outcome::Transfer { from: "b".into() }
        );
        assert_eq!(
            yes.asked[0].context(),
            "File 'src/x' is currently owned by thread 'b'."
        );
        assert_eq!(
            yes.asked[0].question(),
            "Do you want thread 'a' to take ownership of 'src/x' and overwrite it?"
        );

        let mut no = Counting::new(Decision::No);
        assert_eq!(
            resolve("src/x", "a", true, Some("b"), &Mode::Add, &mut no).unwrap(),
            Outcome::Declined
        );
    }

    #[test]
    fn test_targeted_weave_never_prompts() {
        let mut d = Closed;
        assert_eq!(resolve("x", "a", true, None, &target("a"), &mut d).unwrap(), Outcome::Adopt);
        assert_eq!(
            resolve("x", "a", true, Some("b"), &target("a"), &mut d).unwrap(),
            Outcome::Transfer { from: "b".into() }
        );
        assert_eq!(resolve("x", "a", true, None, &target("b"), &mut d).unwrap(), Outcome::OutOfScope);
        assert_eq!(
            resolve("x", "a", true, Some("c"), &target("b"), &mut d).unwrap(),
            Outcome::OutOfScope
        );
    }

    #[test]
    fn test_decider_failure_propagates() {
        let mut d = Closed;
        assert!(matches!(
            resolve("x", "a", true, None, &Mode::Add, &mut d),
            Err(PromptError::Eof)
        ));
    }

    #[test]
    fn test_decision_parse() {
        assert_eq!(Decision::parse(""), Some(Decision::Yes));
        assert_eq!(Decision::parse(" Y "), Some(Decision::Yes));
        assert_eq!(Decision::parse("yes"), Some(Decision::Yes));
        assert_eq!(Decision::parse("N"), Some(Decision::No));
        assert_eq!(Decision::parse("no"), Some(Decision::No));
        assert_eq!(Decision::parse("s"), Some(Decision::Skip));
        assert_eq!(Decision::parse("SKIP"), Some(Decision::Skip));
        assert_eq!(Decision::parse("maybe"), None);
    }

    #[test]
    fn test_outcome_writes() {
        assert!(Outcome::Create.writes());
        assert!(Outcome::Transfer { from: "b".into() }.writes());
        assert!(!Outcome::Declined.writes());
        assert!(!Outcome::OutOfScope.writes());
    }
}
