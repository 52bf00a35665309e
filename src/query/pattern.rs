use crate::index::rbtree::NumKind;

/// 通配符位置决定查询模式：无 `*` 精确，尾 `*` 前缀，头 `*` 后缀，两头 infix。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Exact,
    Prefix,
    Suffix,
    Infix,
}

/// 剥掉通配符，返回 (模式, 裸 token)。
pub fn classify(token: &str) -> (PatternKind, String) {
    let leading = token.starts_with('*');
    let trailing = token.ends_with('*') && token.len() > 1;
    match (leading, trailing) {
        (true, true) => (PatternKind::Infix, token[1..token.len() - 1].to_string()),
        (true, false) => (PatternKind::Suffix, token[1..].to_string()),
        (false, true) => (PatternKind::Prefix, token[..token.len() - 1].to_string()),
        (false, false) => (PatternKind::Exact, token.to_string()),
    }
}

/// 查询串按第一个 `=` 切成 key 模式与 value 模式。
/// 没有 `=` 即畸形查询：返回 None，上层按零结果处理。
pub fn split_kv(query: &str) -> Option<(&str, &str)> {
    let pos = query.find('=')?;
    Some((&query[..pos], &query[pos + 1..]))
}

/// value token 带引号 -> 按字符串模式求值；否则尝试数字/范围。
pub fn is_quoted(token: &str) -> bool {
    token.starts_with('"') || token.ends_with('"')
}

pub fn strip_quotes(token: &str) -> &str {
    let t = token.strip_prefix('"').unwrap_or(token);
    t.strip_suffix('"').unwrap_or(t)
}

/// 数值范围表达式。key 为 8 字节 little-endian 编码，类型由所属
/// 数值子索引决定。
///
/// 文法（v 为字面数字）：
///   `v` / `|v|`        精确
///   `~v` / `~|v`       x < v / x <= v
///   `v~` / `v|~`       x > v / x >= v
///   `v1~v2`            v1 < x < v2，`|` 贴在 `~` 两侧表示相应端闭区间
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeExpr {
    Exact([u8; 8]),
    Range {
        lo: Option<([u8; 8], bool)>,
        hi: Option<([u8; 8], bool)>,
    },
}

fn parse_num(s: &str, kind: NumKind) -> Option<[u8; 8]> {
    let s = s.trim();
    match kind {
        NumKind::Uint64 => s.parse::<u64>().ok().map(u64::to_le_bytes),
        NumKind::Int64 => s.parse::<i64>().ok().map(i64::to_le_bytes),
        NumKind::Double => s.parse::<f64>().ok().map(f64::to_le_bytes),
    }
}

/// 解析 value token 为范围表达式；解析失败返回 None（零结果，不报错）。
pub fn parse_range(token: &str, kind: NumKind) -> Option<RangeExpr> {
    match token.find('~') {
        None => {
            let t = token.trim();
            let t = if t.len() >= 2 && t.starts_with('|') && t.ends_with('|') {
                &t[1..t.len() - 1]
            } else {
                t
            };
            parse_num(t, kind).map(RangeExpr::Exact)
        }
        Some(pos) => {
            let mut left = &token[..pos];
            let mut right = &token[pos + 1..];

            let lo_inclusive = left.ends_with('|');
            if lo_inclusive {
                left = &left[..left.len() - 1];
            }
            let hi_inclusive = right.starts_with('|');
            if hi_inclusive {
                right = &right[1..];
            }

            let lo = if left.trim().is_empty() {
                None
            } else {
                Some((parse_num(left, kind)?, lo_inclusive))
            };
            let hi = if right.trim().is_empty() {
                None
            } else {
                Some((parse_num(right, kind)?, hi_inclusive))
            };
            if lo.is_none() && hi.is_none() {
                return None;
            }
            Some(RangeExpr::Range { lo, hi })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_wildcard_position() {
        assert_eq!(classify("abc"), (PatternKind::Exact, "abc".to_string()));
        assert_eq!(classify("ab*"), (PatternKind::Prefix, "ab".to_string()));
        assert_eq!(classify("*bc"), (PatternKind::Suffix, "bc".to_string()));
        assert_eq!(classify("*b*"), (PatternKind::Infix, "b".to_string()));
        assert_eq!(classify("*"), (PatternKind::Suffix, String::new()));
    }

    #[test]
    fn split_on_first_equals_only() {
        assert_eq!(split_kv("k=v"), Some(("k", "v")));
        assert_eq!(split_kv("k=1|~|2"), Some(("k", "1|~|2")));
        assert_eq!(split_kv("no_delimiter"), None);
    }

    #[test]
    fn quote_detection_and_stripping() {
        assert!(is_quoted("\"abc\""));
        assert!(!is_quoted("42"));
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("\"*33val\""), "*33val");
    }

    fn i64k(v: i64) -> [u8; 8] {
        v.to_le_bytes()
    }

    #[test]
    fn range_grammar_all_forms() {
        let k = NumKind::Int64;
        assert_eq!(parse_range("5", k), Some(RangeExpr::Exact(i64k(5))));
        assert_eq!(parse_range("|5|", k), Some(RangeExpr::Exact(i64k(5))));
        assert_eq!(
            parse_range("~5", k),
            Some(RangeExpr::Range {
                lo: None,
                hi: Some((i64k(5), false))
            })
        );
        assert_eq!(
            parse_range("~|5", k),
            Some(RangeExpr::Range {
                lo: None,
                hi: Some((i64k(5), true))
            })
        );
        assert_eq!(
            parse_range("5~", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(5), false)),
                hi: None
            })
        );
        assert_eq!(
            parse_range("5|~", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(5), true)),
                hi: None
            })
        );
        assert_eq!(
            parse_range("1~9", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(1), false)),
                hi: Some((i64k(9), false))
            })
        );
        assert_eq!(
            parse_range("1|~9", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(1), true)),
                hi: Some((i64k(9), false))
            })
        );
        assert_eq!(
            parse_range("1~|9", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(1), false)),
                hi: Some((i64k(9), true))
            })
        );
        assert_eq!(
            parse_range("1|~|9", k),
            Some(RangeExpr::Range {
                lo: Some((i64k(1), true)),
                hi: Some((i64k(9), true))
            })
        );
    }

    #[test]
    fn malformed_range_tokens_parse_to_none() {
        assert_eq!(parse_range("abc", NumKind::Int64), None);
        assert_eq!(parse_range("~", NumKind::Int64), None);
        assert_eq!(parse_range("x~y", NumKind::Int64), None);
    }

    #[test]
    fn range_numbers_follow_index_kind() {
        assert_eq!(
            parse_range("42", NumKind::Uint64),
            Some(RangeExpr::Exact(42u64.to_le_bytes()))
        );
        assert_eq!(
            parse_range("-1", NumKind::Uint64),
            None,
            "negative literal cannot index an unsigned sub-index"
        );
        assert_eq!(
            parse_range("2.5", NumKind::Double),
            Some(RangeExpr::Exact(2.5f64.to_le_bytes()))
        );
    }
}
