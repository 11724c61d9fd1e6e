use super::Markers;

/// Split one bounded author segment into individual names, keeping
/// bracketed nationality annotations (e.g. "[美]") glued to the name they
/// annotate. Whitespace inside a bracket pair is OCR noise, never a name
/// boundary; a bracket pair with no real name around it is dropped rather
/// than emitted on its own.
pub fn split_authors(segment: &str, markers: &Markers) -> Vec<String> {
    let mut names = Vec::new();
    let mut buf = String::new();
    let mut in_bracket = false;
    // Whether `buf` holds non-bracket content since the last flush.
    let mut has_name = false;

    for ch in segment.chars() {
        if markers.open_brackets.contains(&ch) {
            in_bracket = true;
            buf.push('[');
        } else if markers.close_brackets.contains(&ch) {
            buf.push(']');
            in_bracket = false;
        } else if ch.is_whitespace() {
            if in_bracket {
                continue;
            }
            if has_name {
                names.push(std::mem::take(&mut buf));
                has_name = false;
            }
            // Otherwise a leading/repeated separator, or a gap between a
            // bracket annotation and its name: keep the buffer as-is.
        } else {
            buf.push(ch);
            if !in_bracket {
                has_name = true;
            }
        }
    }

    if has_name {
        names.push(buf);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Markers;

    fn split(segment: &str) -> Vec<String> {
        split_authors(segment, &Markers::standard())
    }

    #[test]
    fn nationality_stays_attached() {
        assert_eq!(split("张三 [美]约翰·史密斯"), vec!["张三", "[美]约翰·史密斯"]);
    }

    #[test]
    fn whitespace_inside_brackets_never_splits() {
        assert_eq!(split("[ 美 ]约翰"), vec!["[美]约翰"]);
    }

    #[test]
    fn fullwidth_and_cjk_brackets_normalize() {
        assert_eq!(split("［英］柯南 〔法〕凡尔纳"), vec!["[英]柯南", "[法]凡尔纳"]);
    }

    #[test]
    fn empty_segment_yields_no_authors() {
        assert_eq!(split(""), Vec::<String>::new());
        assert_eq!(split("   "), Vec::<String>::new());
        assert_eq!(split("\u{3000}\u{3000}"), Vec::<String>::new());
    }

    #[test]
    fn repeated_separators_collapse() {
        assert_eq!(split("  张三   李四  "), vec!["张三", "李四"]);
    }

    #[test]
    fn fullwidth_space_separates_names() {
        assert_eq!(split("张三\u{3000}李四"), vec!["张三", "李四"]);
    }

    #[test]
    fn bracket_annotation_alone_is_not_an_author() {
        assert_eq!(split("[美]"), Vec::<String>::new());
    }

    #[test]
    fn detached_annotation_joins_following_name() {
        assert_eq!(split("[美] 史密斯"), vec!["[美]史密斯"]);
    }

    #[test]
    fn trailing_nationality_suffix_kept() {
        assert_eq!(split("史密斯[美] 张三"), vec!["史密斯[美]", "张三"]);
    }

    #[test]
    fn single_name() {
        assert_eq!(split("鲁迅"), vec!["鲁迅"]);
    }
}
