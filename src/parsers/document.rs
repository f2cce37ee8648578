/// Opening of the first HTML block; everything before it is the JSON payload.
pub const HTML_BLOCK_MARKER: &str = "<div";

/// A raw document cut into its JSON and HTML regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitDocument<'a> {
    pub json_candidate: &'a str,
    pub html_fragment: &'a str,
}

/// Split at the first `<div`. The HTML side keeps the marker and is not trimmed.
pub fn split_document(doc: &str) -> SplitDocument<'_> {
    match doc.find(HTML_BLOCK_MARKER) {
        Some(idx) => SplitDocument {
            json_candidate: doc[..idx].trim(),
            html_fragment: &doc[idx..],
        },
        None => SplitDocument {
            json_candidate: doc.trim(),
            html_fragment: "",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_at_first_div() {
        let doc = "{\"a\":1}<div>x</div>";
        let split = split_document(doc);
        assert_eq!(split.json_candidate, "{\"a\":1}");
        assert_eq!(split.html_fragment, "<div>x</div>");
    }

    #[test]
    fn no_marker_keeps_whole_document() {
        let doc = "  \n{\"items\": []}\n\n";
        let split = split_document(doc);
        assert_eq!(split.json_candidate, "{\"items\": []}");
        assert_eq!(split.html_fragment, "");
    }

    #[test]
    fn only_first_marker_counts() {
        let doc = "payload\n<div class=\"a\"><div class=\"b\"></div></div>  ";
        let split = split_document(doc);
        assert_eq!(split.json_candidate, "payload");
        assert_eq!(split.html_fragment, "<div class=\"a\"><div class=\"b\"></div></div>  ");
    }

    #[test]
    fn marker_at_start_leaves_empty_candidate() {
        let split = split_document("<div>only html</div>");
        assert_eq!(split.json_candidate, "");
        assert_eq!(split.html_fragment, "<div>only html</div>");
    }
}
