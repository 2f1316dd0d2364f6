use hcl_edit::repr::Decor;

/// Comment that suppresses the declaration starting on the next line.
pub const IGNORE_DIRECTIVE: &str = "#tf-latest-version:ignore";

/// A comment in front of a declaration and how many lines above its first
/// line the comment sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub content: String,
    pub lines_above: usize,
}

impl Annotation {
    pub fn is_ignore_directive(&self) -> bool {
        self.content == IGNORE_DIRECTIVE
    }
}

/// Collects the comments the parser attached to the front of a node.
///
/// hcl-edit keeps the whitespace and comments between two structures in the
/// prefix decor of the second one, so the last line of the prefix is the
/// node's own line and every earlier line sits above it.
pub fn scan(decor: &Decor) -> Vec<Annotation> {
    let Some(prefix) = decor.prefix() else {
        return Vec::new();
    };
    scan_prefix(&prefix.to_string())
}

fn scan_prefix(prefix: &str) -> Vec<Annotation> {
    let lines: Vec<&str> = prefix.split('\n').collect();
    let own_line = lines.len() - 1;

    let mut annotations = Vec::new();
    let mut in_block_comment = false;
    for (index, line) in lines[..own_line].iter().enumerate() {
        let text = line.trim();
        if in_block_comment {
            in_block_comment = !text.contains("*/");
            continue;
        }
        if text.starts_with('#') || text.starts_with("//") || text.starts_with("/*") {
            in_block_comment = text.starts_with("/*") && !text[2..].contains("*/");
            annotations.push(Annotation {
                content: text.to_string(),
                lines_above: own_line - index,
            });
        }
    }
    annotations
}

/// True when the line right above the declaration holds exactly the ignore
/// directive.
pub fn should_skip(annotations: &[Annotation]) -> bool {
    annotations
        .iter()
        .any(|a| a.lines_above == 1 && a.is_ignore_directive())
}
