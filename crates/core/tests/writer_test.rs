use untext_core::codec::{self, Compression, ContentWriter, flate};
use untext_core::model::{Operand, Token};

/// Serialize without compression and read the result back.
fn reparse(tokens: &[Token]) -> Vec<Token> {
    let encoded = codec::serialize(tokens, Compression::None).expect("serialize");
    codec::lex(&encoded.data).expect("lex")
}

#[test]
fn test_writer_output_reads_back_unchanged() {
    let data: &[u8] = b"q 1 0 0 1 72 720 cm\n\
        /GS0 gs 0.5 0 0 rg\n\
        BT /F1 12 Tf [(Hel) -20 (lo)] TJ ET\n\
        /Span << /MCID 3 /ActualText (a\\)b) >> BDC EMC\n\
        0 0 m 10 10 l S\n\
        BI /W 2 /H 1 /BPC 8 /CS /G /D [1 0] ID \x00\x0d EI\n\
        /Odd#20Name sh Q";
    let tokens = codec::lex(data).unwrap();
    assert_eq!(reparse(&tokens), tokens);
}

#[test]
fn test_writer_hex_and_binary_strings() {
    let tokens = vec![
        Token::from(Operand::hex_string(vec![0x00, 0x0d, 0xff])),
        Token::from(Operand::string(vec![b'(', 0x0d, b'\\', 0x80])),
        Token::operator("x"),
    ];
    assert_eq!(reparse(&tokens), tokens);
}

#[test]
fn test_writer_reals_keep_their_kind() {
    let tokens = vec![
        Token::from(Operand::Real(3.0)),
        Token::from(Operand::Real(-0.001)),
        Token::from(Operand::Int(-7)),
        Token::operator("d0"),
    ];
    assert_eq!(reparse(&tokens), tokens);
}

#[test]
fn test_inline_image_data_ending_in_cr() {
    let data: &[u8] = b"BI /W 1 ID \x01\x0d EI Q";
    let tokens = codec::lex(data).unwrap();
    let Token::Operand(Operand::InlineImage(image)) = &tokens[0] else {
        panic!("expected inline image");
    };
    assert_eq!(image.data, vec![0x01, 0x0d]);
    assert_eq!(reparse(&tokens), tokens);
}

#[test]
fn test_flate_serialize_decompresses_to_plain() {
    let tokens = codec::lex(b"BT (x) Tj ET").unwrap();
    let plain = codec::serialize(&tokens, Compression::None).unwrap();
    let packed = codec::serialize(&tokens, Compression::Flate).unwrap();
    assert_eq!(flate::decompress(&packed.data).unwrap(), plain.data);
}

#[test]
fn test_writer_one_operator_per_line() {
    let tokens = codec::lex(b"q 1 w 0 0 m 5 5 l S Q").unwrap();
    let mut writer = ContentWriter::new();
    writer.write_all(&tokens).unwrap();
    assert_eq!(
        String::from_utf8(writer.into_bytes()).unwrap(),
        "q\n1 w\n0 0 m\n5 5 l\nS\nQ\n"
    );
}
