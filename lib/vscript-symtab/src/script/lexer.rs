use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+", skip r"#[^\n]*")]
pub enum Token<'a> {
    #[token("fn")]
    Func,
    #[token("extern")]
    Extern,
    #[token("call")]
    Call,
    #[token("var")]
    Var,
    #[token("ref")]
    Ref,
    #[token("label")]
    Label,
    #[token("undef")]
    Undef,
    #[token("temp")]
    Temp,
    #[token("slot")]
    Slot,
    #[token("release")]
    Release,

    #[token("$")]
    Dollar,
    #[token("@")]
    At,
    #[token("%")]
    Percent,
    #[token("->")]
    Arrow,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Identifier(&'a str),

    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Integer(u32),

    /// Stand-in for input the lexer could not match.
    Error,
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Func => f.write_str("fn"),
            Token::Extern => f.write_str("extern"),
            Token::Call => f.write_str("call"),
            Token::Var => f.write_str("var"),
            Token::Ref => f.write_str("ref"),
            Token::Label => f.write_str("label"),
            Token::Undef => f.write_str("undef"),
            Token::Temp => f.write_str("temp"),
            Token::Slot => f.write_str("slot"),
            Token::Release => f.write_str("release"),
            Token::Dollar => f.write_str("$"),
            Token::At => f.write_str("@"),
            Token::Percent => f.write_str("%"),
            Token::Arrow => f.write_str("->"),
            Token::Comma => f.write_str(","),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Identifier(ident) => f.write_str(ident),
            Token::Integer(n) => write!(f, "{n}"),
            Token::Error => f.write_str("<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token<'_>> {
        Token::lexer(src)
            .map(|tok| tok.unwrap_or(Token::Error))
            .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(
            lex("fn fnord call"),
            vec![Token::Func, Token::Identifier("fnord"), Token::Call]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            lex("var $x # a scalar\nref @y"),
            vec![
                Token::Var,
                Token::Dollar,
                Token::Identifier("x"),
                Token::Ref,
                Token::At,
                Token::Identifier("y"),
            ]
        );
    }

    #[test]
    fn release_takes_a_number() {
        assert_eq!(lex("release 16777214"), vec![Token::Release, Token::Integer(16_777_214)]);
    }

    #[test]
    fn unknown_characters_become_errors() {
        assert_eq!(lex("var !x")[1], Token::Error);
    }
}
