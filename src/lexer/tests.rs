#[cfg(test)]
mod lexer_tests {
    use crate::error::DiagnosticKind;
    use crate::lexer::token::TokenKind;
    use crate::lexer::tokenize;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn program_header() {
        assert_eq!(
            kinds("program Echo"),
            vec![TokenKind::Program, TokenKind::Name("Echo".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn bilingual_keywords_recognized() {
        assert_eq!(kinds("dictionary"), vec![TokenKind::Dict, TokenKind::Eof]);
        assert_eq!(kinds("kamus"), vec![TokenKind::Dict, TokenKind::Eof]);
        assert_eq!(kinds("dan"), vec![TokenKind::And, TokenKind::Eof]);
        assert_eq!(kinds("benar"), vec![TokenKind::True, TokenKind::Eof]);
    }

    #[test]
    fn negative_number_lexed_whole() {
        assert_eq!(kinds("-5"), vec![TokenKind::Number("-5".into()), TokenKind::Eof]);
    }

    #[test]
    fn minus_operator_when_not_followed_by_digit() {
        assert_eq!(
            kinds("x-y"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Minus,
                TokenKind::Name("y".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn assignment_arrow() {
        assert_eq!(kinds("x<-5"), vec![
            TokenKind::Name("x".into()),
            TokenKind::Assign,
            TokenKind::Number("5".into()),
            TokenKind::Eof
        ]);
    }

    #[test]
    fn assignment_colon_eq() {
        assert_eq!(
            kinds("x:=5"),
            vec![
                TokenKind::Name("x".into()),
                TokenKind::Assign,
                TokenKind::Number("5".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn const_meq_allowed() {
        assert_eq!(
            kinds("const PI = 3"),
            vec![
                TokenKind::Const,
                TokenKind::Name("PI".into()),
                TokenKind::MEq,
                TokenKind::Number("3".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn mixed_assignment_styles_warn() {
        let result = tokenize("x<-1\ny:=2\n");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MixedAssignmentStyle));
    }

    #[test]
    fn mixed_comment_styles_warn() {
        let result = tokenize("{brace}\n// slash\n");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MixedCommentStyle));
    }

    #[test]
    fn single_comment_style_is_clean() {
        let result = tokenize("// one\n// two\n");
        assert!(!result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MixedCommentStyle));
    }

    #[test]
    fn mixed_quote_styles_warn() {
        let result = tokenize("\"a\" 'b'");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::MixedQuoteStyle));
    }

    #[test]
    fn inconsistent_keyword_spelling_warns() {
        let result = tokenize("output x\ntulis y\n");
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::InconsistentKeywordSpelling));
    }

    #[test]
    fn first_on_line_flag() {
        let result = tokenize("a b\nc");
        assert!(result.tokens[0].first_on_line);
        assert!(!result.tokens[1].first_on_line);
        assert!(result.tokens[2].first_on_line);
    }

    #[test]
    fn tab_expands_indent_to_multiple_of_eight() {
        let result = tokenize("\tx");
        assert_eq!(result.tokens[0].indent, 9);
    }

    #[test]
    fn char_array_literal_body() {
        assert_eq!(
            kinds("\"hi there\""),
            vec![TokenKind::CharArray("hi there".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn relational_operators() {
        assert_eq!(
            kinds("<= >= <> < > ="),
            vec![
                TokenKind::Leq,
                TokenKind::Geq,
                TokenKind::Neq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::MEq,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn brace_comment_skipped() {
        assert_eq!(kinds("{ this is ignored }\nx"), vec![TokenKind::Name("x".into()), TokenKind::Eof]);
    }

    #[test]
    fn paren_star_comment_skipped() {
        assert_eq!(kinds("(* ignored *)\nx"), vec![TokenKind::Name("x".into()), TokenKind::Eof]);
    }
}
