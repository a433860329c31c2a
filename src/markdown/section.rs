//! Heading-scoped slices of a markdown body.
//!
//! A section starts at a heading whose title matches (case-insensitively) and
//! runs until the next heading of the same or a higher level. Lines inside
//! fenced code blocks are never treated as headings.

/// Parse an ATX heading line into `(level, title)`.
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let title = rest.trim().trim_end_matches('#').trim_end();
    Some((level, title))
}

/// Extract the section titled `title` from `markdown`.
///
/// The returned text includes the heading line. Returns `None` when no
/// heading matches.
pub fn extract_section(markdown: &str, title: &str) -> Option<String> {
    let wanted = title.trim().to_lowercase();
    let mut in_fence = false;
    let mut start: Option<(usize, usize)> = None;
    let mut collected = Vec::new();

    for line in markdown.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }

        let parsed = if in_fence { None } else { heading(line) };

        match (start, parsed) {
            (None, Some((level, text))) if text.to_lowercase() == wanted => {
                start = Some((level, collected.len()));
                collected.push(line);
            }
            (None, _) => {}
            (Some((level, _)), Some((next_level, _))) if next_level <= level => break,
            (Some(_), _) => collected.push(line),
        }
    }

    start.map(|_| collected.concat())
}

/// Split `path#Section` into the file path and optional section title.
pub fn split_section(path: &str) -> (&str, Option<&str>) {
    match path.split_once('#') {
        Some((file, section)) if !section.trim().is_empty() => (file, Some(section.trim())),
        Some((file, _)) => (file, None),
        None => (path, None),
    }
}
