//! Textual MDX rewriting against the current dimension filter state.
//!
//! No MDX parsing happens here: each filtered dimension's `<path>.Members` text is replaced
//! by an `Except(...)` or `Intersect(...)` call, and dimensions the query does not mention
//! are appended as a `where` slicer.

use crate::dimension_filter_model::DimensionFilterModel;
use crate::filter_dimension::FilterDimension;
use crate::member_selection::MemberPartition;

impl DimensionFilterModel {
    /// Restrict `mdx` to the included members of every dimension not in `excluded_dimensions`.
    ///
    /// Always pass the canonical, unfiltered query text; a rewritten query fed back in is
    /// not recognised as already filtered.
    pub fn apply_to<S: AsRef<str>>(&self, mdx: &str, excluded_dimensions: &[S]) -> String {
        let mut mdx = mdx.to_string();
        let mut wheres: Vec<String> = Vec::new();

        for (dimension, level_values) in self.iter() {
            if excluded_dimensions.iter().any(|d| d.as_ref() == dimension.path) {
                continue;
            }
            let partition = level_values.partition();
            if partition.all_selected() {
                continue;
            }
            let members_text = dimension.members_expression();
            let filter_expression = filter_expression(dimension, &partition);
            if mdx.contains(&members_text) {
                mdx = mdx.replace(&members_text, &filter_expression);
            } else {
                wheres.push(filter_expression);
            }
        }

        if !wheres.is_empty() {
            let slicer = wheres.join("*");
            let trimmed = mdx.trim_end();
            if ends_with_where_keyword(trimmed) {
                mdx = format!("{} {}", trimmed, slicer);
            } else if has_trailing_where_clause(&mdx) {
                mdx = format!("{}*{}", trimmed, slicer);
            } else {
                mdx = format!("{} where {}", mdx, slicer);
            }
        }

        mdx
    }

    /// Placeholder expansion plus rewrite, the form every issued query goes through.
    ///
    /// Dimensions addressed by a `#<path>#` placeholder are filtered by the expansion alone.
    pub fn filter_query<S: AsRef<str>>(&self, mdx: &str, excluded_dimensions: &[S]) -> String {
        let mut excluded: Vec<&str> = excluded_dimensions.iter().map(|d| d.as_ref()).collect();
        for dimension in self.filter_dimensions() {
            if mdx.contains(&format!("#{}#", dimension.path)) {
                excluded.push(&dimension.path);
            }
        }
        let rewritten = self.apply_to(mdx, &excluded);
        self.replace_dimension_placeholders(&rewritten)
    }

    /// One line per filtered dimension, naming whichever member list is shorter.
    pub fn dimension_state_descriptions(&self) -> Vec<String> {
        self.iter()
            .filter_map(|(dimension, level_values)| {
                let partition = level_values.partition();
                if partition.all_selected() {
                    return None;
                }
                if partition.prefers_included() {
                    Some(format!("{}: {}", dimension.label, partition.included.join(",")))
                } else {
                    Some(format!("Excluding {}: {}", dimension.label, partition.excluded.join(",")))
                }
            })
            .collect()
    }

    /// Expand `#<path>#` placeholders into the selected members of that dimension.
    ///
    /// Fully selected dimensions expand to `<path>.Members`.
    pub fn replace_dimension_placeholders(&self, mdx: &str) -> String {
        let mut mdx = mdx.to_string();
        for (dimension, level_values) in self.iter() {
            let placeholder = format!("#{}#", dimension.path);
            if !mdx.contains(&placeholder) {
                continue;
            }
            let partition = level_values.partition();
            let replacement = if partition.all_selected() {
                dimension.members_expression()
            } else {
                partition
                    .included
                    .iter()
                    .map(|member| dimension.member_expression(member))
                    .collect::<Vec<_>>()
                    .join(",")
            };
            mdx = mdx.replace(&placeholder, &replacement);
        }
        mdx
    }
}

fn filter_expression(dimension: &FilterDimension, partition: &MemberPartition) -> String {
    let (mdx_function, filter_members) = if partition.prefers_included() {
        ("Intersect", &partition.included)
    } else {
        ("Except", &partition.excluded)
    };
    let member_list = filter_members
        .iter()
        .map(|member| dimension.member_expression(member))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}({}, {{{}}})", mdx_function, dimension.members_expression(), member_list)
}

/// Whether the query has a `where` keyword outside any bracket, brace or parenthesis.
///
/// In MDX the slicer is the last clause, so a top-level `where` ends the query.
fn has_trailing_where_clause(mdx: &str) -> bool {
    let bytes = mdx.as_bytes();
    let mut depth: i32 = 0;
    let mut in_identifier = false;
    let mut in_string: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }
        if in_identifier {
            // `]]` escapes a bracket inside an identifier
            if c == b']' {
                if bytes.get(i + 1) == Some(&b']') {
                    i += 2;
                    continue;
                }
                in_identifier = false;
            }
            i += 1;
            continue;
        }
        match c {
            b'[' => in_identifier = true,
            b'"' | b'\'' => in_string = Some(c),
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth -= 1,
            _ => {
                if depth == 0 && is_keyword_at(bytes, i, b"where") {
                    return true;
                }
            }
        }
        i += 1;
    }
    false
}

/// A bare trailing `where` still waiting for its slicer.
fn ends_with_where_keyword(mdx: &str) -> bool {
    let bytes = mdx.as_bytes();
    bytes.len() >= 5 && is_keyword_at(bytes, bytes.len() - 5, b"where")
}

fn is_keyword_at(bytes: &[u8], at: usize, keyword: &[u8]) -> bool {
    let end = at + keyword.len();
    if end > bytes.len() || !bytes[at..end].eq_ignore_ascii_case(keyword) {
        return false;
    }
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let before_ok = at == 0 || !is_word(bytes[at - 1]);
    let after_ok = end == bytes.len() || !is_word(bytes[end]);
    before_ok && after_ok
}
