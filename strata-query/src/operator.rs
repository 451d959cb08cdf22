//! The catalog of binary predicates.
//!
//! Each [`SqlOperator`] evaluates a pair of [`Value`]s in memory and knows how
//! to render itself. Operators are plain `Copy` values: two operators are the
//! same operator exactly when they are the same variant.
//!
//! ```rust
//! use strata_query::SqlOperator;
//!
//! assert_eq!(SqlOperator::Eq.negate(), Some(SqlOperator::Neq));
//! assert_eq!(SqlOperator::Gt.negate(), Some(SqlOperator::Leq));
//! assert_eq!(SqlOperator::Like { escape: None }.negate(), None);
//! ```

use std::fmt;

use crate::value::Value;

/// A named binary predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlOperator {
    /// `l = r`
    Eq,
    /// `l <> r`
    Neq,
    /// `l > r`
    Gt,
    /// `l >= r`
    Geq,
    /// `l < r`
    Lt,
    /// `l <= r`
    Leq,
    /// `l LIKE r`, with `%` and `_` wildcards in `r`.
    Like {
        /// Character that makes the next wildcard literal.
        escape: Option<char>,
    },
    /// `l IN r`
    In,
    /// `l NOT IN r`
    NotIn,
    /// `l IS NULL`; the right operand is ignored.
    IsNull,
    /// `l IS NOT NULL`; the right operand is ignored.
    IsNotNull,
    /// `l IS EMPTY`; the right operand is ignored.
    IsEmpty,
    /// `l IS NOT EMPTY`; the right operand is ignored.
    IsNotEmpty,
}

impl SqlOperator {
    /// The logical inverse of this operator.
    ///
    /// `Like` has no inverse operator; negating a `like` predicate wraps the
    /// whole predicate instead.
    pub const fn negate(self) -> Option<SqlOperator> {
        match self {
            Self::Eq => Some(Self::Neq),
            Self::Neq => Some(Self::Eq),
            Self::Gt => Some(Self::Leq),
            Self::Leq => Some(Self::Gt),
            Self::Geq => Some(Self::Lt),
            Self::Lt => Some(Self::Geq),
            Self::In => Some(Self::NotIn),
            Self::NotIn => Some(Self::In),
            Self::IsNull => Some(Self::IsNotNull),
            Self::IsNotNull => Some(Self::IsNull),
            Self::IsEmpty => Some(Self::IsNotEmpty),
            Self::IsNotEmpty => Some(Self::IsEmpty),
            Self::Like { .. } => None,
        }
    }

    /// Whether the right operand takes part in the predicate.
    pub const fn is_unary(self) -> bool {
        matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty
        )
    }

    /// Evaluate the predicate.
    ///
    /// Ordering comparisons involving null or incomparable values are false,
    /// and so is `like` on anything but two strings.
    pub fn evaluate(self, left: &Value, right: &Value) -> bool {
        use std::cmp::Ordering;

        match self {
            Self::Eq => left.matches(right),
            Self::Neq => !left.matches(right),
            Self::Gt => left.compare(right) == Some(Ordering::Greater),
            Self::Geq => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Lt => left.compare(right) == Some(Ordering::Less),
            Self::Leq => matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal)),
            Self::Like { escape } => match (left, right) {
                (Value::String(s), Value::String(pattern)) => like_match(s, pattern, escape),
                _ => false,
            },
            Self::In => contains(right, left),
            Self::NotIn => !contains(right, left),
            Self::IsNull => left.is_null(),
            Self::IsNotNull => !left.is_null(),
            Self::IsEmpty => left.is_empty_collection(),
            Self::IsNotEmpty => !left.is_empty_collection(),
        }
    }

    /// SQL keyword (or symbol) for this operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Geq => ">=",
            Self::Lt => "<",
            Self::Leq => "<=",
            Self::Like { .. } => "LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::IsEmpty => "IS EMPTY",
            Self::IsNotEmpty => "IS NOT EMPTY",
        }
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    if needle.is_null() {
        return false;
    }
    match haystack {
        Value::List(items) => items.iter().any(|item| item.matches(needle)),
        _ => false,
    }
}

/// SQL LIKE pattern matching.
///
/// Supports:
/// - `%` matches any sequence of characters (including empty)
/// - `_` matches exactly one character
/// - `escape` followed by any character matches that character literally
pub fn like_match(s: &str, pattern: &str, escape: Option<char>) -> bool {
    let s_chars: Vec<char> = s.chars().collect();
    let tokens = tokenize_pattern(pattern, escape);

    let s_len = s_chars.len();
    let p_len = tokens.len();

    // dp[i][j] = true if s[0..i] matches tokens[0..j]
    let mut dp = vec![vec![false; p_len + 1]; s_len + 1];
    dp[0][0] = true;

    for j in 1..=p_len {
        if tokens[j - 1] == LikeToken::AnySequence {
            dp[0][j] = dp[0][j - 1];
        } else {
            break;
        }
    }

    for i in 1..=s_len {
        for j in 1..=p_len {
            dp[i][j] = match tokens[j - 1] {
                LikeToken::AnySequence => dp[i][j - 1] || dp[i - 1][j],
                LikeToken::AnyChar => dp[i - 1][j - 1],
                LikeToken::Literal(c) => dp[i - 1][j - 1] && s_chars[i - 1] == c,
            };
        }
    }

    dp[s_len][p_len]
}

/// Escape `%`, `_` and the escape character itself so `text` matches literally.
pub fn escape_like(text: &str, escape: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        if c == '%' || c == '_' || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeToken {
    AnySequence,
    AnyChar,
    Literal(char),
}

fn tokenize_pattern(pattern: &str, escape: Option<char>) -> Vec<LikeToken> {
    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            // A trailing escape matches itself.
            tokens.push(LikeToken::Literal(chars.next().unwrap_or(c)));
            continue;
        }
        tokens.push(match c {
            '%' => LikeToken::AnySequence,
            '_' => LikeToken::AnyChar,
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SqlOperator; 13] = [
        SqlOperator::Eq,
        SqlOperator::Neq,
        SqlOperator::Gt,
        SqlOperator::Geq,
        SqlOperator::Lt,
        SqlOperator::Leq,
        SqlOperator::Like { escape: None },
        SqlOperator::In,
        SqlOperator::NotIn,
        SqlOperator::IsNull,
        SqlOperator::IsNotNull,
        SqlOperator::IsEmpty,
        SqlOperator::IsNotEmpty,
    ];

    #[test]
    fn test_negation_pairs() {
        assert_eq!(SqlOperator::Eq.negate(), Some(SqlOperator::Neq));
        assert_eq!(SqlOperator::Neq.negate(), Some(SqlOperator::Eq));
        assert_eq!(SqlOperator::Gt.negate(), Some(SqlOperator::Leq));
        assert_eq!(SqlOperator::Leq.negate(), Some(SqlOperator::Gt));
        assert_eq!(SqlOperator::Geq.negate(), Some(SqlOperator::Lt));
        assert_eq!(SqlOperator::Lt.negate(), Some(SqlOperator::Geq));
        assert_eq!(SqlOperator::IsNull.negate(), Some(SqlOperator::IsNotNull));
        assert_eq!(SqlOperator::In.negate(), Some(SqlOperator::NotIn));
        assert_eq!(SqlOperator::IsEmpty.negate(), Some(SqlOperator::IsNotEmpty));
    }

    #[test]
    fn test_negation_is_involution() {
        for op in ALL {
            if let Some(negated) = op.negate() {
                assert_eq!(negated.negate(), Some(op), "{:?}", op);
            }
        }
    }

    #[test]
    fn test_negation_is_complement() {
        let samples = [
            Value::Int(1),
            Value::Int(2),
            Value::Float(1.5),
            Value::String("a".into()),
            Value::List(vec![Value::Int(1)]),
            Value::List(vec![]),
        ];
        for op in ALL {
            let Some(negated) = op.negate() else { continue };
            for l in &samples {
                for r in &samples {
                    // Ordering operators are not complements on incomparable pairs.
                    if l.compare(r).is_none()
                        && matches!(
                            op,
                            SqlOperator::Gt | SqlOperator::Geq | SqlOperator::Lt | SqlOperator::Leq
                        )
                    {
                        continue;
                    }
                    assert_ne!(op.evaluate(l, r), negated.evaluate(l, r), "{:?} {:?} {:?}", op, l, r);
                }
            }
        }
    }

    #[test]
    fn test_ordering_with_null_is_false() {
        assert!(!SqlOperator::Gt.evaluate(&Value::Null, &Value::Int(1)));
        assert!(!SqlOperator::Leq.evaluate(&Value::Null, &Value::Int(1)));
    }

    #[test]
    fn test_in() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert!(SqlOperator::In.evaluate(&Value::Int(2), &list));
        assert!(!SqlOperator::In.evaluate(&Value::Int(3), &list));
        assert!(SqlOperator::NotIn.evaluate(&Value::Int(3), &list));
        assert!(!SqlOperator::In.evaluate(&Value::Int(1), &Value::List(vec![])));
    }

    #[test]
    fn like_match_percent_wildcard() {
        assert!(like_match("John", "J%n", None));
        assert!(like_match("Jordan", "J%n", None));
        assert!(!like_match("Ann", "J%n", None));
        assert!(like_match("", "%", None));
    }

    #[test]
    fn like_match_underscore_wildcard() {
        assert!(like_match("cat", "c_t", None));
        assert!(!like_match("cart", "c_t", None));
    }

    #[test]
    fn like_match_escape() {
        assert!(like_match("100%", "100!%", Some('!')));
        assert!(!like_match("1000", "100!%", Some('!')));
        assert!(like_match("a_b", "a!_b", Some('!')));
        assert!(!like_match("axb", "a!_b", Some('!')));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off!", '!'), "50!%!_off!!");
        let pattern = format!("%{}%", escape_like("50%", '\\'));
        assert!(like_match("save 50% now", &pattern, Some('\\')));
        assert!(!like_match("save 500 now", &pattern, Some('\\')));
    }
}
