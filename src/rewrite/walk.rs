//! Streaming document walk with byte-fidelity splicing.
//!
//! The walker never re-serializes the document. It tokenizes the input with
//! quick-xml, and for every start tag matching a configured target it locates
//! the attribute value span in the original bytes and splices the rewritten
//! value in. Every byte outside a rewritten value is copied through verbatim,
//! so element order, attribute order, quoting, and whitespace survive
//! untouched.
//!
//! Attribute values are entity-decoded before classification and re-escaped
//! on write-back. A value whose rewrite is identical to its decoded form
//! keeps its original bytes.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::utils::html::{attr_value_span, escape_attr, unescape};

use super::{RewriteOutcome, Rewriter};

pub(crate) fn rewrite_html(input: &str, rewriter: &Rewriter) -> RewriteOutcome {
    let mut reader = Reader::from_str(input);
    // Generated HTML is not well-formed XML; unmatched end tags must not
    // abort the walk
    reader.config_mut().check_end_names = false;

    let mut out = String::with_capacity(input.len() + input.len() / 8);
    let mut last = 0usize;
    let mut rewritten = 0usize;
    // Value spans (absolute) and replacements within the current tag
    let mut changes: Vec<(Range<usize>, String)> = Vec::new();

    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let Some(attrs) = rewriter.attrs_for(e.name().as_ref()) else {
                    continue;
                };

                let end = reader.buffer_position() as usize;
                let tag_src = &input[start..end];

                changes.clear();
                for attr in attrs {
                    let Some(span) = attr_value_span(tag_src, attr) else {
                        continue;
                    };
                    let decoded = unescape(&tag_src[span.clone()]);
                    let Some(new_value) = rewriter.rewrite_url(&decoded) else {
                        continue;
                    };
                    if new_value == decoded.as_ref() {
                        continue;
                    }
                    changes.push((start + span.start..start + span.end, new_value));
                }

                // Attribute order in the tag need not match target order
                changes.sort_by_key(|(range, _)| range.start);
                for (range, new_value) in changes.drain(..) {
                    out.push_str(&input[last..range.start]);
                    out.push_str(&escape_attr(&new_value));
                    last = range.end;
                    rewritten += 1;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // Tolerate malformed markup: stop rewriting at the failure point
            // and pass the remainder through unchanged
            Err(_) => break,
        }
    }

    out.push_str(&input[last..]);
    RewriteOutcome {
        html: out,
        rewritten,
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::rewrite::{
        FORMAT_VERSION, RewriteKind, RewriteRule, RewriteSettings, Rewriter, RuleSet, Target,
        default_targets,
    };

    fn rewriter(rules: Vec<RewriteRule>, whitelist: &[&str]) -> Rewriter {
        Rewriter::new(RewriteSettings {
            version: FORMAT_VERSION.to_string(),
            base: Url::parse("https://blog.example.com").unwrap(),
            rules: RuleSet::new(rules),
            whitelist: whitelist.iter().map(|s| s.to_string()).collect(),
            targets: default_targets(),
        })
    }

    fn host_rule(suffix: &str, replacement: &str) -> RewriteRule {
        RewriteRule {
            kind: RewriteKind::HostOnly,
            suffix: suffix.to_string(),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_rewrites_img_src() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        let outcome = r.rewrite_with_stats(r#"<img src="https://blog.example.com/a.png">"#);
        assert_eq!(outcome.html, r#"<img src="https://cdn.example.net/a.png">"#);
        assert_eq!(outcome.rewritten, 1);
    }

    #[test]
    fn test_markup_outside_values_is_untouched() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        // Doctype, comments, odd spacing, attribute order, and quote styles
        // all survive byte-for-byte
        let input = concat!(
            "<!DOCTYPE html>\n",
            "<!-- header -->\n",
            "<body >\n",
            "  <a  title='x'   href='/pic.png' >go</a>\n",
            "  <p class=\"wide\">text &amp; more</p>\n",
            "</body>\n",
        );
        let expected = concat!(
            "<!DOCTYPE html>\n",
            "<!-- header -->\n",
            "<body >\n",
            "  <a  title='x'   href='https://cdn.example.net/pic.png' >go</a>\n",
            "  <p class=\"wide\">text &amp; more</p>\n",
            "</body>\n",
        );
        assert_eq!(r.rewrite(input), expected);
    }

    #[test]
    fn test_identity_document_is_byte_identical() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        // Nothing qualifies: external host, fragment, relative path
        let input = concat!(
            "<a href=\"http://untrusted.com/x.png\">a</a>",
            "<a href=\"#top\">b</a>",
            "<img src=\"local.png\">",
        );
        let outcome = r.rewrite_with_stats(input);
        assert_eq!(outcome.html, input);
        assert_eq!(outcome.rewritten, 0);
    }

    #[test]
    fn test_malformed_href_does_not_abort_pass() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        let input = concat!(
            r#"<a href="http://">broken</a>"#,
            r#"<img src="/ok.png">"#,
        );
        let outcome = r.rewrite_with_stats(input);
        assert_eq!(
            outcome.html,
            concat!(
                r#"<a href="http://">broken</a>"#,
                r#"<img src="https://cdn.example.net/ok.png">"#,
            )
        );
        assert_eq!(outcome.rewritten, 1);
    }

    #[test]
    fn test_non_target_elements_skipped() {
        let r = rewriter(vec![host_rule("css", "cdn.example.net")], &["blog.example.com"]);
        // link/script carry URLs but are not configured targets
        let input = concat!(
            r#"<link rel="stylesheet" href="/style.css">"#,
            r#"<script src="/app.css"></script>"#,
        );
        assert_eq!(r.rewrite(input), input);
    }

    #[test]
    fn test_custom_targets() {
        let mut targets = default_targets();
        targets.push(Target::new("script", "src"));
        let r = Rewriter::new(RewriteSettings {
            version: FORMAT_VERSION.to_string(),
            base: Url::parse("https://blog.example.com").unwrap(),
            rules: RuleSet::new(vec![host_rule("js", "cdn.example.net")]),
            whitelist: std::iter::once("blog.example.com".to_string()).collect(),
            targets,
        });
        assert_eq!(
            r.rewrite(r#"<script src="/app.js"></script>"#),
            r#"<script src="https://cdn.example.net/app.js"></script>"#
        );
    }

    #[test]
    fn test_uppercase_tags_and_attributes() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        let outcome = r.rewrite_with_stats(r#"<IMG SRC="/a.png"/>"#);
        assert_eq!(outcome.html, r#"<IMG SRC="https://cdn.example.net/a.png"/>"#);
        assert_eq!(outcome.rewritten, 1);
    }

    #[test]
    fn test_entity_escaped_value() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["old.example.com"]);
        // &amp; decodes to & before classification; the rewritten value is
        // re-escaped on write-back
        let input = r#"<a href="http://old.example.com/a.png?x=1&amp;y=2">a</a>"#;
        assert_eq!(
            r.rewrite(input),
            r#"<a href="http://cdn.example.net/a.png?x=1&amp;y=2">a</a>"#
        );
    }

    #[test]
    fn test_multiple_rewrites_in_one_document() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        let input = concat!(
            r#"<a href="/one.png">1</a>"#,
            r#"<span>gap</span>"#,
            r#"<img src="/two.png">"#,
        );
        let outcome = r.rewrite_with_stats(input);
        assert_eq!(outcome.rewritten, 2);
        assert!(outcome.html.contains("https://cdn.example.net/one.png"));
        assert!(outcome.html.contains("https://cdn.example.net/two.png"));
        assert!(outcome.html.contains("<span>gap</span>"));
    }

    #[test]
    fn test_malformed_tag_region_left_untouched() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        // The stray `<` swallows the anchor into one unrecognized tag; that
        // region passes through verbatim while the rest still rewrites
        let input = r#"<img src="/a.png"><broken <<tag <a href="/b.png">x</a>"#;
        let expected =
            r#"<img src="https://cdn.example.net/a.png"><broken <<tag <a href="/b.png">x</a>"#;
        assert_eq!(r.rewrite(input), expected);
    }

    #[test]
    fn test_empty_document() {
        let r = rewriter(vec![], &["blog.example.com"]);
        let outcome = r.rewrite_with_stats("");
        assert_eq!(outcome.html, "");
        assert_eq!(outcome.rewritten, 0);
    }

    #[test]
    fn test_boolean_and_empty_attributes() {
        let r = rewriter(vec![host_rule("png", "cdn.example.net")], &["blog.example.com"]);
        let input = r#"<a href>x</a><a href="">y</a>"#;
        assert_eq!(r.rewrite(input), input);
    }
}
