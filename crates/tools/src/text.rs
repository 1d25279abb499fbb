//! Line-level editing that preserves each line's original ending.

use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use std::io::Write;
use std::path::Path;
use tokio::fs;

/// File content split into lines, each keeping its own terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lines {
    lines: Vec<String>,
    ending: &'static str,
}

impl Lines {
    pub fn parse(content: &str) -> Self {
        let lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
        let crlf = lines.iter().filter(|l| l.ends_with("\r\n")).count();
        let lf = lines.iter().filter(|l| l.ends_with('\n')).count() - crlf;
        let ending = if crlf > lf { "\r\n" } else { "\n" };
        Self { lines, ending }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Validate a 1-based inclusive range and return zero-based bounds.
    pub fn range(&self, start: i64, end: i64) -> Result<(usize, usize), ToolError> {
        if start < 1 {
            return Err(ToolError::RangeError(format!("line_start must be >= 1, got {}", start)));
        }
        if start > end {
            return Err(ToolError::RangeError(format!(
                "line_start {} is after line_end {}",
                start, end
            )));
        }
        if end as u64 > self.len() as u64 {
            return Err(ToolError::RangeError(format!(
                "line_end {} exceeds file length of {} lines",
                end,
                self.len()
            )));
        }
        Ok((start as usize - 1, end as usize))
    }

    /// Replace `lines[start..end]` with `content` split on line boundaries.
    /// Returns the removed lines without terminators.
    pub fn splice(&mut self, start: usize, end: usize, content: &str) -> Vec<String> {
        let at_eof = end == self.lines.len();
        let last_unterminated = at_eof && self.lines.last().is_some_and(|l| !l.ends_with('\n'));

        let mut replacement = self.terminate(content);
        if last_unterminated {
            if let Some(last) = replacement.last_mut() {
                let trimmed = last.trim_end_matches(['\r', '\n']).len();
                last.truncate(trimmed);
            }
        }

        self.lines
            .splice(start..end, replacement)
            .map(|l| strip_ending(&l).to_string())
            .collect()
    }

    /// Insert `content` after zero-based line `index` (or at the top for `None`).
    pub fn insert_after(&mut self, index: Option<usize>, content: &str) -> usize {
        let at = index.map_or(0, |i| i + 1);
        if at == self.lines.len() {
            self.terminate_last();
        }
        let replacement = self.terminate(content);
        let added = replacement.len();
        self.lines.splice(at..at, replacement);
        added
    }

    pub fn append(&mut self, content: &str) -> usize {
        let at = self.lines.len();
        self.insert_after(at.checked_sub(1), content)
    }

    pub fn position(&self, exact: &str) -> Option<usize> {
        self.lines.iter().position(|l| strip_ending(l) == exact)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(|l| strip_ending(l))
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }

    fn terminate(&self, content: &str) -> Vec<String> {
        content
            .lines()
            .map(|line| format!("{}{}", line, self.ending))
            .collect()
    }

    fn terminate_last(&mut self) {
        let ending = self.ending;
        if let Some(last) = self.lines.last_mut() {
            if !last.ends_with('\n') {
                last.push_str(ending);
            }
        }
    }
}

fn strip_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Write via a sibling temp file, fsync, then rename over `path`.
///
/// The whole sequence runs as one blocking job that holds the invocation's
/// root lock, so it finishes under the lock even if the tool task is aborted.
pub(crate) async fn write_atomic(ctx: &ExecutionContext, path: &Path, contents: &str) -> Result<(), ToolError> {
    let parent = path
        .parent()
        .ok_or_else(|| ToolError::ExecutionFailed("Path has no parent directory".into()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));
    let target = path.to_path_buf();
    let contents = contents.to_string();
    let lock = ctx.root_lock();

    let job = tokio::task::spawn_blocking(move || {
        let _lock = lock;
        let result = replace_file(&temp_path, &target, contents.as_bytes());
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
        }
        result
    });

    match job.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ToolError::ExecutionFailed(format!("Atomic write failed: {}", e))),
        Err(e) => Err(ToolError::ExecutionFailed(format!("Atomic write failed: {}", e))),
    }
}

fn replace_file(temp_path: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    if let Ok(meta) = std::fs::metadata(target) {
        std::fs::set_permissions(temp_path, meta.permissions())?;
    }
    std::fs::rename(temp_path, target)
}

pub(crate) async fn read_text(path: &Path, display: &str) -> Result<String, ToolError> {
    let bytes = fs::read(path).await.map_err(|e| ToolError::io(display, e))?;
    String::from_utf8(bytes).map_err(|_| ToolError::ExecutionFailed(format!("{} is not valid UTF-8", display)))
}

/// Render a numbered before/after listing of a change.
pub(crate) fn change_summary(header: &str, start_line: usize, removed: &[String], added: &[&str]) -> String {
    let mut out = vec![header.to_string()];
    for (i, line) in removed.iter().enumerate() {
        out.push(format!("-{:>4} | {}", start_line + i, line));
    }
    for (i, line) in added.iter().enumerate() {
        out.push(format!("+{:>4} | {}", start_line + i, line));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_checks() {
        let lines = Lines::parse("a\nb\nc\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.range(1, 3), Ok((0, 3)));
        assert!(matches!(lines.range(5, 3), Err(ToolError::RangeError(_))));
        assert!(matches!(lines.range(0, 1), Err(ToolError::RangeError(_))));
        assert!(matches!(lines.range(2, 4), Err(ToolError::RangeError(_))));
    }

    #[test]
    fn test_splice_keeps_crlf() {
        let mut lines = Lines::parse("one\r\ntwo\r\nthree\r\n");
        let removed = lines.splice(1, 2, "TWO\nTWO-B");
        assert_eq!(removed, vec!["two".to_string()]);
        assert_eq!(lines.render(), "one\r\nTWO\r\nTWO-B\r\nthree\r\n");
    }

    #[test]
    fn test_splice_last_line_without_newline() {
        let mut lines = Lines::parse("a\nb");
        lines.splice(1, 2, "B\n");
        assert_eq!(lines.render(), "a\nB");
    }

    #[test]
    fn test_splice_empty_content_deletes() {
        let mut lines = Lines::parse("a\nb\nc\n");
        lines.splice(0, 2, "");
        assert_eq!(lines.render(), "c\n");
    }

    #[test]
    fn test_mixed_endings_untouched_outside_range() {
        let mut lines = Lines::parse("a\r\nb\nc\r\n");
        lines.splice(1, 2, "x");
        assert_eq!(lines.render(), "a\r\nx\r\nc\r\n");
    }

    #[test]
    fn test_insert_and_append() {
        let mut lines = Lines::parse("fn a() {}\nfn b() {}");
        let idx = lines.position("fn a() {}");
        assert_eq!(lines.insert_after(idx, "// between"), 1);
        lines.append("fn c() {}");
        assert_eq!(lines.render(), "fn a() {}\n// between\nfn b() {}\nfn c() {}\n");
    }

    #[test]
    fn test_empty_file() {
        let mut lines = Lines::parse("");
        assert_eq!(lines.len(), 0);
        assert!(lines.range(1, 1).is_err());
        lines.append("first");
        assert_eq!(lines.render(), "first\n");
    }
}
