//! Prompt builder for the review call.
//!
//! The output is a pure function of the request and options: the same input
//! always renders the same bytes.

use std::fmt::Write as _;

use git_context_engine::ChangedFile;

use crate::review::ReviewRequest;

/// Default per-file patch cap, in characters.
pub const DEFAULT_MAX_PATCH_CHARS: usize = 16_000;

/// Rendered in place of the patch when GitHub did not inline one.
pub const NO_DIFF: &str = "No diff available";

const ROLE: &str = "You are a code reviewer posting your comments to GitHub.
Provide a very concise review **only for the files affected**.
Split your feedback into these categories:
- Code Quality & Best Practices
- Potential Bugs or Issues
- Security Concerns
- Performance Improvements
- Style & Readability
";

const VERDICT: &str = "The last line of your review must be exactly \"Good to Ship 🚀\" if and only if there are no issues or alterations suggested in any category.
The last line of your review must be exactly \"Needs Fix 🛠️\" if there are considerable issues in any of the categories, especially \"Security Concerns\" or \"Potential Bugs or Issues\".
";

/// Rendering knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    /// Per-file patch cap in characters; `None` keeps patches whole.
    pub max_patch_chars: Option<usize>,
}

impl PromptOptions {
    /// `0` disables the cap.
    pub fn with_max_patch_chars(limit: usize) -> Self {
        Self {
            max_patch_chars: (limit > 0).then_some(limit),
        }
    }
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self::with_max_patch_chars(DEFAULT_MAX_PATCH_CHARS)
    }
}

/// Builds the review prompt.
///
/// Layout: role and categories, verdict rule, `Commit message: ...`, then
/// `File changes:` followed by one `## File:` section per file in
/// collection order (no sections at all for an empty PR).
pub fn build_prompt(request: &ReviewRequest, opts: &PromptOptions) -> String {
    let mut s = String::new();
    s.push_str(ROLE);
    s.push('\n');
    s.push_str(VERDICT);
    s.push('\n');
    let _ = writeln!(s, "Commit message: {}", request.commit_message);
    s.push('\n');
    s.push_str("File changes:\n");

    for file in &request.files {
        push_file_section(&mut s, file, opts);
    }
    s
}

/// [`build_prompt`] with [`PromptOptions::default`].
pub fn build_prompt_default(request: &ReviewRequest) -> String {
    build_prompt(request, &PromptOptions::default())
}

fn push_file_section(s: &mut String, file: &ChangedFile, opts: &PromptOptions) {
    let _ = writeln!(s, "\n## File: {} ({})", file.filename, file.status);
    let _ = writeln!(s, "Changes: +{} -{}", file.additions, file.deletions);
    s.push('\n');
    match file.patch.as_deref() {
        Some(patch) => s.push_str(&cap_patch(patch, opts.max_patch_chars)),
        None => s.push_str(NO_DIFF),
    }
    s.push('\n');
}

/// Keeps the first `limit` chars and appends a marker line with the number
/// of dropped chars.
fn cap_patch(patch: &str, limit: Option<usize>) -> String {
    let Some(limit) = limit else {
        return patch.to_string();
    };
    match patch.char_indices().nth(limit) {
        None => patch.to_string(),
        Some((cut, _)) => {
            let dropped = patch[cut..].chars().count();
            format!("{}\n... [patch truncated: {dropped} more characters]", &patch[..cut])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git_context_engine::FileStatus;

    fn file(name: &str, status: FileStatus, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            filename: name.into(),
            status,
            additions: 3,
            deletions: 1,
            patch: patch.map(str::to_string),
            previous_filename: None,
        }
    }

    #[test]
    fn renders_file_section() {
        let req = ReviewRequest::new(
            vec![file("a.ts", FileStatus::Modified, Some("+x=1"))],
            "fix bug",
        );
        let p = build_prompt_default(&req);

        assert!(p.contains("Commit message: fix bug\n"));
        assert!(p.contains("## File: a.ts (modified)\nChanges: +3 -1\n\n+x=1\n"));
    }

    #[test]
    fn categories_and_verdicts_in_order() {
        let p = build_prompt_default(&ReviewRequest::default());
        let order = [
            "Code Quality & Best Practices",
            "Potential Bugs or Issues",
            "Security Concerns",
            "Performance Improvements",
            "Style & Readability",
            "Good to Ship 🚀",
            "Needs Fix 🛠️",
            "Commit message:",
            "File changes:",
        ];
        let positions: Vec<usize> = order.iter().map(|needle| p.find(needle).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn one_section_per_file_and_missing_patch_marker() {
        let req = ReviewRequest::new(
            vec![
                file("a.rs", FileStatus::Added, Some("+fn a() {}")),
                file("logo.png", FileStatus::Added, None),
                file("old.rs", FileStatus::Removed, Some("-gone")),
            ],
            "msg",
        );
        let p = build_prompt_default(&req);

        assert_eq!(p.matches("## File: ").count(), 3);
        assert!(p.contains("## File: logo.png (added)\nChanges: +3 -1\n\nNo diff available\n"));
        assert!(p.find("a.rs").unwrap() < p.find("logo.png").unwrap());
        assert!(p.find("logo.png").unwrap() < p.find("old.rs").unwrap());
    }

    #[test]
    fn empty_pr_has_header_only() {
        let p = build_prompt_default(&ReviewRequest::new(vec![], ""));
        assert!(p.ends_with("File changes:\n"));
        assert!(!p.contains("## File:"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let req = ReviewRequest::new(
            vec![
                file("a.ts", FileStatus::Modified, Some("+x=1")),
                file("b.ts", FileStatus::Renamed, None),
            ],
            "fix bug",
        );
        assert_eq!(build_prompt_default(&req), build_prompt_default(&req.clone()));
    }

    #[test]
    fn long_patch_is_truncated_with_marker() {
        let patch = "é".repeat(10);
        let req = ReviewRequest::new(vec![file("a.txt", FileStatus::Modified, Some(&patch))], "m");

        let p = build_prompt(&req, &PromptOptions::with_max_patch_chars(4));
        assert!(p.contains("\n\néééé\n... [patch truncated: 6 more characters]\n"));

        let p = build_prompt(&req, &PromptOptions::with_max_patch_chars(10));
        assert!(p.contains(&format!("\n\n{patch}\n")));
        assert!(!p.contains("truncated"));

        let p = build_prompt(&req, &PromptOptions::with_max_patch_chars(0));
        assert!(!p.contains("truncated"));
    }
}
