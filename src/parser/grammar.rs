//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::MarkupError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse a visual format string into its syntax tree
///
/// Only syntax is checked here. Names are resolved against metrics and view
/// ids by the layout stage.
pub fn parse(input: &str) -> Result<VisualFormat, MarkupError> {
    let len = input.len();

    let tokens = lexer::lex(input).map_err(|span| {
        let found = input.get(span.clone()).unwrap_or_default();
        MarkupError::format_error(input, span, format!("unexpected character '{}'", found))
    })?;
    if tokens.is_empty() {
        return Err(MarkupError::format_error(input, 0..len, "empty format string"));
    }

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    format_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => syntax_error(input, &err),
            None => MarkupError::format_error(input, 0..len, "invalid format string"),
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn syntax_error(input: &str, err: &Rich<'_, Token>) -> MarkupError {
    let message = match err.found() {
        Some(token) => format!("unexpected {}", token),
        None => "unexpected end of format string".to_string(),
    };
    MarkupError::format_error(input, span_range(err.span()), message)
}

fn format_parser<'a, I>() -> impl Parser<'a, I, VisualFormat, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let number = select! {
        Token::Number(n) => n,
    };

    let name = select! {
        Token::Ident(s) => s,
    };

    // Predicate operands may be negative numbers: `-(>=-10)-`
    let operand = choice((
        number.clone().map(Operand::Number),
        just(Token::Dash)
            .ignore_then(number.clone())
            .map(|n| Operand::Number(-n)),
        name.clone().map(Operand::Name),
    ))
    .map_with(|op, e| Spanned::new(op, span_range(&e.span())));

    // Simple spacers and priorities are never negative
    let simple = choice((
        number.clone().map(Operand::Number),
        name.clone().map(Operand::Name),
    ))
    .map_with(|op, e| Spanned::new(op, span_range(&e.span())));

    let relation = choice((
        just(Token::Equal).to(Relation::Equal),
        just(Token::GreaterOrEqual).to(Relation::GreaterOrEqual),
        just(Token::LessOrEqual).to(Relation::LessOrEqual),
    ));

    let predicate = relation
        .or_not()
        .then(operand)
        .then(just(Token::At).ignore_then(simple.clone()).or_not())
        .map_with(|((relation, object), priority), e| {
            Spanned::new(
                Predicate {
                    relation: relation.unwrap_or_default(),
                    object,
                    priority,
                },
                span_range(&e.span()),
            )
        });

    let predicate_list = predicate
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>()
        .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

    // `-30-`, `-(>=8)-`, `-`, or nothing at all
    let connection = choice((
        just(Token::Dash).ignore_then(
            choice((
                simple
                    .then_ignore(just(Token::Dash))
                    .map(Connection::Spacer),
                predicate_list
                    .clone()
                    .then_ignore(just(Token::Dash))
                    .map(Connection::Predicates),
            ))
            .or_not()
            .map(|c| c.unwrap_or(Connection::Standard)),
        ),
        empty().to(Connection::Flush),
    ));

    let view = name
        .map_with(|n, e| Spanned::new(n, span_range(&e.span())))
        .then(predicate_list.or_not())
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
        .map_with(|(name, predicates), e| ViewTerm {
            name,
            predicates: predicates.unwrap_or_default(),
            span: span_range(&e.span()),
        });

    let orientation = choice((
        just(Token::Horizontal).to(Axis::Horizontal),
        just(Token::Vertical).to(Axis::Vertical),
    ))
    .or_not()
    .map(|axis| axis.unwrap_or_default());

    orientation
        .then(just(Token::Pipe).ignore_then(connection.clone()).or_not())
        .then(view.clone())
        .then(
            connection
                .clone()
                .then(view)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then(connection.then_ignore(just(Token::Pipe)).or_not())
        .then_ignore(end())
        .map(|((((axis, leading), first), rest), trailing)| {
            let mut views = vec![first];
            let mut gaps = Vec::with_capacity(rest.len());
            for (gap, view) in rest {
                gaps.push(gap);
                views.push(view);
            }
            VisualFormat {
                axis,
                leading,
                views,
                gaps,
                trailing,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn spacer(format: &VisualFormat, i: usize) -> &Operand {
        match &format.gaps[i] {
            Connection::Spacer(op) => &op.node,
            other => panic!("expected spacer, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_metric_spacers_and_sizes() {
        let format = parse("H:|-margin-[l1(140)]-margin-[l2(80)]").expect("Should parse");
        assert_eq!(format.axis, Axis::Horizontal);
        assert_eq!(
            format.leading,
            Some(Connection::Spacer(Spanned::new(
                Operand::Name("margin".to_string()),
                4..10
            )))
        );
        assert_eq!(format.views.len(), 2);
        assert_eq!(format.views[0].name.node, "l1");
        assert_eq!(format.views[0].span, 11..20);
        assert_eq!(
            format.views[0].predicates[0].node.object.node,
            Operand::Number(140.0)
        );
        assert_eq!(spacer(&format, 0), &Operand::Name("margin".to_string()));
        assert_eq!(format.trailing, None);
    }

    #[test]
    fn test_default_axis_is_horizontal() {
        let format = parse("[a]").expect("Should parse");
        assert_eq!(format.axis, Axis::Horizontal);
        assert!(!format.touches_superview());
    }

    #[test]
    fn test_vertical_with_standard_connections() {
        let format = parse("V:|-[l1(50)]-|").expect("Should parse");
        assert_eq!(format.axis, Axis::Vertical);
        assert_eq!(format.leading, Some(Connection::Standard));
        assert_eq!(format.trailing, Some(Connection::Standard));
    }

    #[test]
    fn test_flush_views() {
        let format = parse("|[a][b]|").expect("Should parse");
        assert_eq!(format.leading, Some(Connection::Flush));
        assert_eq!(format.gaps, vec![Connection::Flush]);
        assert_eq!(format.trailing, Some(Connection::Flush));
    }

    #[test]
    fn test_predicate_list() {
        let format = parse("[a]-(>=20@750,<=-4)-[b(==a@high)]").expect("Should parse");
        let Connection::Predicates(predicates) = &format.gaps[0] else {
            panic!("expected predicate list");
        };
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].node.relation, Relation::GreaterOrEqual);
        assert_eq!(
            predicates[0].node.priority.as_ref().map(|p| &p.node),
            Some(&Operand::Number(750.0))
        );
        assert_eq!(predicates[1].node.relation, Relation::LessOrEqual);
        assert_eq!(predicates[1].node.object.node, Operand::Number(-4.0));

        let size = &format.views[1].predicates[0].node;
        assert_eq!(size.object.node, Operand::Name("a".to_string()));
        assert_eq!(
            size.priority.as_ref().map(|p| &p.node),
            Some(&Operand::Name("high".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_bracket() {
        let err = parse("H:|-[l1(140)-[l2]").unwrap_err();
        match err {
            MarkupError::MalformedConstraintFormat { span, .. } => assert_eq!(span, Some(12..13)),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_missing_closing_bracket_at_end() {
        let err = parse("[a").unwrap_err();
        assert!(err.to_string().contains("end of format string"));
    }

    #[test]
    fn test_spacer_needs_closing_dash() {
        assert!(parse("[a]-30[b]").is_err());
    }

    #[test]
    fn test_bad_character() {
        let err = parse("[a]+[b]").unwrap_err();
        match err {
            MarkupError::MalformedConstraintFormat { span, message, .. } => {
                assert_eq!(span, Some(3..4));
                assert!(message.contains("'+'"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_format() {
        assert!(parse("  ").is_err());
    }

    #[test]
    fn test_pipe_alone_is_not_a_format() {
        assert!(parse("H:|-|").is_err());
    }
}
