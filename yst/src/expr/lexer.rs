//! Tokenizer for template expressions

use super::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    Str(String),
    Punct(&'static str),
}

/// Operators and delimiters, longest first so `===` wins over `==` and `=`
const PUNCTUATION: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!", "?", ":", ".", ",",
    "(", ")", "[", "]", "{", "}", "=",
];

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut index = 0usize;

    while index < chars.len() {
        let ch = chars[index];

        if ch.is_whitespace() {
            index += 1;
            continue;
        }

        if is_ident_start(ch) {
            let start = index;
            while index < chars.len() && is_ident_char(chars[index]) {
                index += 1;
            }
            tokens.push(Token::Ident(chars[start..index].iter().collect()));
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && chars.get(index + 1).is_some_and(|c| c.is_ascii_digit())) {
            let (number, next) = lex_number(source, &chars, index)?;
            tokens.push(Token::Number(number));
            index = next;
            continue;
        }

        if ch == '"' || ch == '\'' {
            let (text, next) = lex_string(source, &chars, index)?;
            tokens.push(Token::Str(text));
            index = next;
            continue;
        }

        let rest: String = chars[index..chars.len().min(index + 3)].iter().collect();
        match PUNCTUATION.iter().find(|p| rest.starts_with(**p)) {
            Some(punct) => {
                tokens.push(Token::Punct(*punct));
                index += punct.len();
            }
            None => {
                return Err(ExprError::syntax(source, format!("unexpected character '{}'", ch)));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(source: &str, chars: &[char], start: usize) -> Result<(f64, usize), ExprError> {
    let mut index = start;
    while index < chars.len() && (chars[index].is_ascii_digit() || chars[index] == '.') {
        index += 1;
    }
    if index < chars.len() && (chars[index] == 'e' || chars[index] == 'E') {
        let mut exp = index + 1;
        if exp < chars.len() && (chars[exp] == '+' || chars[exp] == '-') {
            exp += 1;
        }
        if exp < chars.len() && chars[exp].is_ascii_digit() {
            index = exp;
            while index < chars.len() && chars[index].is_ascii_digit() {
                index += 1;
            }
        }
    }

    let text: String = chars[start..index].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, index))
        .map_err(|_| ExprError::syntax(source, format!("invalid number '{}'", text)))
}

fn lex_string(source: &str, chars: &[char], start: usize) -> Result<(String, usize), ExprError> {
    let quote = chars[start];
    let mut text = String::new();
    let mut index = start + 1;

    while index < chars.len() {
        match chars[index] {
            c if c == quote => return Ok((text, index + 1)),
            '\\' => {
                index += 1;
                match chars.get(index) {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some(other) => text.push(*other),
                    None => break,
                }
            }
            c => text.push(c),
        }
        index += 1;
    }

    Err(ExprError::syntax(source, "unterminated string literal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_member_comparison() {
        let tokens = tokenize("e.price >= 10").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("e".into()),
                Token::Punct("."),
                Token::Ident("price".into()),
                Token::Punct(">="),
                Token::Number(10.0),
            ]
        );
    }

    #[test]
    fn test_longest_operator_wins() {
        let tokens = tokenize("a===b").unwrap();
        assert_eq!(tokens[1], Token::Punct("==="));
    }

    #[test]
    fn test_string_escapes_and_quotes() {
        let tokens = tokenize(r#"'it\'s' + "a\"b""#).unwrap();
        assert_eq!(tokens[0], Token::Str("it's".into()));
        assert_eq!(tokens[2], Token::Str("a\"b".into()));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("1.5 .25 2e3").unwrap();
        assert_eq!(tokens, vec![Token::Number(1.5), Token::Number(0.25), Token::Number(2000.0)]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("'open").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(tokenize("a # b").is_err());
    }
}
