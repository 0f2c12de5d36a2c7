use tapec::grammer::token::TokenKind;

fn case(code: &str, expects: Vec<TokenKind>) {
    use tapec::Lexer;
    let tokens = Lexer::new(code).parse();

    println!(" {code}");
    for token in &tokens {
        print!("\r\x1b[{}C^", token.pos.col);
    }
    println!();
    for (idx, token) in tokens.iter().enumerate() {
        println!("{:>2}: {:?}", idx, token.kind);
    }

    assert_eq!(tokens.len(), expects.len());
    for (idx, expect) in expects.iter().enumerate() {
        assert_eq!(tokens[idx].kind, *expect);
    }
}

#[test]
fn function() {
    use TokenKind::*;
    case(
        "func add(u8 a, b) -> u8 { return a + b; } // sum",
        vec![
            KwFunc,
            Ident(format!("add")),
            LParen,
            KwU8,
            Ident(format!("a")),
            Comma,
            Ident(format!("b")),
            RParen,
            Arrow,
            KwU8,
            LCurly,
            KwReturn,
            Ident(format!("a")),
            Plus,
            Ident(format!("b")),
            Semicolon,
            RCurly,
            Comment(format!("sum")),
        ],
    );
}

#[test]
fn operators() {
    use TokenKind::*;
    case(
        "a<<b >> c - -d*~e/f%g&h|i^j",
        vec![
            Ident(format!("a")),
            LAngleLAngle,
            Ident(format!("b")),
            RAngleRAngle,
            Ident(format!("c")),
            Minus,
            Minus,
            Ident(format!("d")),
            Star,
            Tilde,
            Ident(format!("e")),
            Slash,
            Ident(format!("f")),
            Percent,
            Ident(format!("g")),
            Ampasand,
            Ident(format!("h")),
            Pipe,
            Ident(format!("i")),
            Caret,
            Ident(format!("j")),
        ],
    );
}

#[test]
fn keywords() {
    use TokenKind::*;
    case(
        "if else while type func return asm u8 void as iff _x1",
        vec![
            KwIf,
            KwElse,
            KwWhile,
            KwType,
            KwFunc,
            KwReturn,
            KwAsm,
            KwU8,
            KwVoid,
            KwAs,
            Ident(format!("iff")),
            Ident(format!("_x1")),
        ],
    );
}

#[test]
fn asm_body() {
    use TokenKind::*;
    case(
        "asm(x) -> u8 { [->+<] . , }",
        vec![
            KwAsm,
            LParen,
            Ident(format!("x")),
            RParen,
            Arrow,
            KwU8,
            LCurly,
            LBracket,
            Arrow,
            Plus,
            LAngle,
            RBracket,
            Period,
            Comma,
            RCurly,
        ],
    );
}

#[test]
fn numbers() {
    use TokenKind::*;
    case(
        "0 255 256 99999999999999999999",
        vec![
            Number(format!("0"), 0),
            Number(format!("255"), 255),
            Number(format!("256"), 256),
            Error(format!("99999999999999999999")),
        ],
    );
}

#[test]
fn unknown_character() {
    use TokenKind::*;
    case(
        "x = 1 @ 2;",
        vec![
            Ident(format!("x")),
            Equal,
            Number(format!("1"), 1),
            Error(format!("@")),
            Number(format!("2"), 2),
            Semicolon,
        ],
    );
}

#[test]
fn positions() {
    let tokens = tapec::Lexer::new("u8 x;\n  x = 1;").parse();
    let pos: Vec<String> = tokens.iter().map(|t| t.pos.to_string()).collect();
    assert_eq!(pos, ["1:1", "1:4", "1:5", "2:3", "2:5", "2:7", "2:8"]);
}

#[test]
fn positions_count_characters() {
    let tokens = tapec::Lexer::new("é; x\n\"ü\" y").parse();
    let pos: Vec<String> = tokens.iter().map(|t| t.pos.to_string()).collect();
    assert_eq!(pos.first().map(String::as_str), Some("1:1"));
    assert_eq!(tokens[1].pos.to_string(), "1:2");
    let x = tokens.iter().find(|t| t.kind == TokenKind::Ident("x".to_string())).unwrap();
    assert_eq!(x.pos.to_string(), "1:4");
    let y = tokens.iter().find(|t| t.kind == TokenKind::Ident("y".to_string())).unwrap();
    assert_eq!(y.pos.to_string(), "2:5");
}
