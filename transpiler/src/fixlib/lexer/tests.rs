use super::*;

#[test]
fn test_empty_input() {
    assert_eq!(tokenize(""), Vec::new());
}

#[test]
fn test_whitespace_only() {
    assert_eq!(tokenize(" \t  \r\n"), Vec::new());
}

#[test]
fn test_instruction_line() {
    assert_eq!(
        tokenize("2ba:\t30 f4       \tbrcc\t.+12     \t; 0x2c8 <main+0x1a>"),
        vec![
            Token::Word("2ba:"),
            Token::Word("30"),
            Token::Word("f4"),
            Token::Word("brcc"),
            Token::Word(".+12"),
            Token::Semicolon,
            Token::Word("0x2c8"),
            Token::Word("<main+0x1a>"),
        ]
    );
}

#[test]
fn test_lone_semicolon() {
    assert_eq!(tokenize(";"), vec![Token::Semicolon]);
    assert_eq!(
        tokenize("rjmp .-2\t;\t0x7c"),
        vec![
            Token::Word("rjmp"),
            Token::Word(".-2"),
            Token::Semicolon,
            Token::Word("0x7c"),
        ]
    );
}

#[test]
fn test_semicolon_only_when_alone() {
    assert_eq!(
        tokenize("; ;x x;"),
        vec![Token::Semicolon, Token::Word(";x"), Token::Word("x;")]
    );
}

#[test]
fn test_commas_stay_attached() {
    assert_eq!(
        tokenize("ldd r24, Y+1"),
        vec![Token::Word("ldd"), Token::Word("r24,"), Token::Word("Y+1")]
    );
}

#[test]
fn test_display_round_trips_token_text() {
    let rendered: Vec<String> = tokenize("ca: 08 00 .word 0x0008 ; ????")
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(
        rendered,
        vec!["ca:", "08", "00", ".word", "0x0008", ";", "????"]
    );
}
