//! The grammar layer: recursive descent over a [`TokenStream`] cursor.

use derive_more::{Display, Error};

use crate::ast::{
    Arguments, Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment,
    InputValue, Operation, OperationType, Selection, Type, VariableDefinition, VariableDefinitions,
};
use crate::parser::tokens::{Punct, Scanner, SpannedToken, Token};
use crate::parser::Spanning;

/// Why a document failed to parse, covering both the lexical and the
/// grammatical level.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum ParseError {
    /// A character that cannot begin any token.
    #[display("Unexpected character \"{_0}\"")]
    UnexpectedCharacter(#[error(not(source))] char),

    /// A string literal that never closes, or breaks across a line.
    #[display("Unterminated string literal")]
    UnterminatedString,

    /// An escape sequence the string grammar does not define.
    #[display("Unknown escape sequence \"{_0}\" in string")]
    UnknownEscapeSequence(#[error(not(source))] String),

    /// A numeric literal outside the lexical grammar or its value range.
    #[display("Invalid number literal")]
    InvalidNumber,

    /// A well-formed token in a position the grammar does not allow.
    #[display("Unexpected \"{_0}\"")]
    UnexpectedToken(#[error(not(source))] String),

    /// The document ended in the middle of a construct.
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,
}

type Parsed<T> = Result<T, Spanning<ParseError>>;

/// A one-token-lookahead cursor over the scanner.
///
/// Tokens are scanned on demand; nothing is buffered beyond the single
/// peeked token. Past the end of the source the cursor sits on
/// [`Token::Eof`], which the grammar turns into
/// [`ParseError::UnexpectedEndOfFile`] wherever a construct is left open.
struct TokenStream<'s> {
    scanner: Scanner<'s>,
    lookahead: Option<SpannedToken<'s>>,
}

impl<'s> TokenStream<'s> {
    fn new(source: &'s str) -> TokenStream<'s> {
        TokenStream {
            scanner: Scanner::new(source),
            lookahead: None,
        }
    }

    /// The upcoming token, scanned if not already at hand.
    fn peek(&mut self) -> Parsed<&SpannedToken<'s>> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scanner.next_token()?);
        }
        Ok(self.lookahead.as_ref().expect("lookahead was just filled"))
    }

    /// Take the upcoming token, advancing the cursor.
    fn bump(&mut self) -> Parsed<SpannedToken<'s>> {
        self.peek()?;
        Ok(self.lookahead.take().expect("lookahead was just filled"))
    }

    fn peek_is(&mut self, punct: Punct) -> Parsed<bool> {
        Ok(matches!(self.peek()?.item, Token::Punct(p) if p == punct))
    }

    fn peek_is_name(&mut self, word: Option<&str>) -> Parsed<bool> {
        Ok(match (&self.peek()?.item, word) {
            (Token::Name(_), None) => true,
            (Token::Name(n), Some(w)) => *n == w,
            _ => false,
        })
    }

    /// Take the upcoming token if it is the given punctuator.
    fn eat(&mut self, punct: Punct) -> Parsed<Option<SpannedToken<'s>>> {
        if self.peek_is(punct)? {
            Ok(Some(self.bump()?))
        } else {
            Ok(None)
        }
    }

    /// Require the given punctuator as the next token.
    fn expect(&mut self, punct: Punct) -> Parsed<SpannedToken<'s>> {
        let token = self.bump()?;
        match token.item {
            Token::Punct(p) if p == punct => Ok(token),
            _ => Err(reject(token)),
        }
    }

    /// Require a name as the next token.
    fn name(&mut self) -> Parsed<Spanning<&'s str>> {
        let token = self.bump()?;
        match token.item {
            Token::Name(name) => Ok(Spanning::new(name, token.start, token.end)),
            _ => Err(reject(token)),
        }
    }
}

/// Turn a token the grammar cannot use at this point into an error.
fn reject(token: SpannedToken<'_>) -> Spanning<ParseError> {
    let error = match &token.item {
        Token::Eof => ParseError::UnexpectedEndOfFile,
        other => ParseError::UnexpectedToken(other.to_string()),
    };
    Spanning::new(error, token.start, token.end)
}

/// Parse an executable GraphQL document from its source text.
pub fn parse_document_source(source: &str) -> Result<Document, Spanning<ParseError>> {
    let mut stream = TokenStream::new(source);

    let mut definitions = vec![definition(&mut stream)?];
    while stream.peek()?.item != Token::Eof {
        definitions.push(definition(&mut stream)?);
    }

    Ok(definitions)
}

fn definition(stream: &mut TokenStream<'_>) -> Parsed<Definition> {
    if stream.peek_is_name(Some("fragment"))? {
        Ok(Definition::Fragment(fragment_definition(stream)?))
    } else {
        Ok(Definition::Operation(operation(stream)?))
    }
}

fn operation(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Operation>> {
    // The shorthand form: a bare selection set is a query.
    if stream.peek_is(Punct::LBrace)? {
        let selection_set = selection_set(stream)?;
        return Ok(Spanning::new(
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: None,
                directives: None,
                selection_set: selection_set.item,
            },
            selection_set.start,
            selection_set.end,
        ));
    }

    let kind = operation_kind(stream)?;
    let name = if stream.peek_is_name(None)? {
        Some(stream.name()?.map(str::to_owned))
    } else {
        None
    };
    let variable_definitions = variable_definitions(stream)?;
    let directives = directives(stream)?;
    let selection_set = selection_set(stream)?;

    Ok(Spanning::new(
        Operation {
            operation_type: kind.item,
            name,
            variable_definitions,
            directives,
            selection_set: selection_set.item,
        },
        kind.start,
        selection_set.end,
    ))
}

fn operation_kind(stream: &mut TokenStream<'_>) -> Parsed<Spanning<OperationType>> {
    let token = stream.bump()?;
    let kind = match token.item {
        Token::Name("query") => OperationType::Query,
        Token::Name("mutation") => OperationType::Mutation,
        Token::Name("subscription") => OperationType::Subscription,
        _ => return Err(reject(token)),
    };
    Ok(Spanning::new(kind, token.start, token.end))
}

fn fragment_definition(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Fragment>> {
    let keyword = stream.name()?;

    // `on` is the one name a fragment cannot have.
    let name = stream.name()?;
    if name.item == "on" {
        return Err(Spanning::new(
            ParseError::UnexpectedToken("on".into()),
            name.start,
            name.end,
        ));
    }

    let on = stream.name()?;
    if on.item != "on" {
        return Err(Spanning::new(
            ParseError::UnexpectedToken(on.item.into()),
            on.start,
            on.end,
        ));
    }

    let type_condition = stream.name()?;
    let directives = directives(stream)?;
    let selection_set = selection_set(stream)?;

    Ok(Spanning::new(
        Fragment {
            name: name.map(str::to_owned),
            type_condition: type_condition.map(str::to_owned),
            directives,
            selection_set: selection_set.item,
        },
        keyword.start,
        selection_set.end,
    ))
}

fn selection_set(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Vec<Selection>>> {
    let open = stream.expect(Punct::LBrace)?;

    // At least one selection is required.
    let mut selections = Vec::new();
    let close = loop {
        selections.push(selection(stream)?);
        if let Some(close) = stream.eat(Punct::RBrace)? {
            break close;
        }
    };

    Ok(Spanning::new(selections, open.start, close.end))
}

fn selection(stream: &mut TokenStream<'_>) -> Parsed<Selection> {
    if stream.peek_is(Punct::Spread)? {
        fragment_selection(stream)
    } else {
        Ok(Selection::Field(field(stream)?))
    }
}

fn field(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Field>> {
    let first = stream.name()?;
    let (alias, name) = if stream.eat(Punct::Colon)?.is_some() {
        (Some(first), stream.name()?)
    } else {
        (None, first)
    };

    let arguments = arguments(stream)?;
    let directives = directives(stream)?;
    let selection_set = if stream.peek_is(Punct::LBrace)? {
        Some(selection_set(stream)?)
    } else {
        None
    };

    let start = alias.as_ref().unwrap_or(&name).start;
    let end = selection_set
        .as_ref()
        .map(|s| s.end)
        .or_else(|| directives.as_ref().and_then(|d| d.last()).map(|d| d.end))
        .or_else(|| arguments.as_ref().map(|a| a.end))
        .unwrap_or(name.end);

    Ok(Spanning::new(
        Field {
            alias: alias.map(|a| a.map(str::to_owned)),
            name: name.map(str::to_owned),
            arguments,
            directives,
            selection_set: selection_set.map(|s| s.item),
        },
        start,
        end,
    ))
}

/// Everything a `...` can start: a named spread, a conditioned inline
/// fragment, or an anonymous inline fragment with optional directives.
fn fragment_selection(stream: &mut TokenStream<'_>) -> Parsed<Selection> {
    let spread = stream.expect(Punct::Spread)?;

    if stream.peek_is_name(Some("on"))? {
        stream.name()?;
        let type_condition = stream.name()?;
        let directives = directives(stream)?;
        let selection_set = selection_set(stream)?;

        return Ok(Selection::InlineFragment(Spanning::new(
            InlineFragment {
                type_condition: Some(type_condition.map(str::to_owned)),
                directives,
                selection_set: selection_set.item,
            },
            spread.start,
            selection_set.end,
        )));
    }

    if stream.peek_is_name(None)? {
        let name = stream.name()?;
        let directives = directives(stream)?;
        let end = directives
            .as_ref()
            .and_then(|d| d.last())
            .map_or(name.end, |d| d.end);

        return Ok(Selection::FragmentSpread(Spanning::new(
            FragmentSpread {
                name: name.map(str::to_owned),
                directives,
            },
            spread.start,
            end,
        )));
    }

    let directives = directives(stream)?;
    let selection_set = selection_set(stream)?;

    Ok(Selection::InlineFragment(Spanning::new(
        InlineFragment {
            type_condition: None,
            directives,
            selection_set: selection_set.item,
        },
        spread.start,
        selection_set.end,
    )))
}

fn arguments(stream: &mut TokenStream<'_>) -> Parsed<Option<Spanning<Arguments>>> {
    let Some(open) = stream.eat(Punct::LParen)? else {
        return Ok(None);
    };

    let mut items = Vec::new();
    let close = loop {
        let name = stream.name()?;
        stream.expect(Punct::Colon)?;
        let value = input_value(stream, false)?;
        items.push((name.map(str::to_owned), value));

        if let Some(close) = stream.eat(Punct::RParen)? {
            break close;
        }
    };

    Ok(Some(Spanning::new(
        Arguments { items },
        open.start,
        close.end,
    )))
}

fn variable_definitions(
    stream: &mut TokenStream<'_>,
) -> Parsed<Option<Spanning<VariableDefinitions>>> {
    let Some(open) = stream.eat(Punct::LParen)? else {
        return Ok(None);
    };

    let mut items = Vec::new();
    let close = loop {
        items.push(variable_definition(stream)?);
        if let Some(close) = stream.eat(Punct::RParen)? {
            break close;
        }
    };

    Ok(Some(Spanning::new(
        VariableDefinitions { items },
        open.start,
        close.end,
    )))
}

fn variable_definition(
    stream: &mut TokenStream<'_>,
) -> Parsed<(Spanning<String>, VariableDefinition)> {
    let dollar = stream.expect(Punct::Dollar)?;
    let name = stream.name()?;
    stream.expect(Punct::Colon)?;
    let var_type = type_reference(stream)?;

    let default_value = if stream.eat(Punct::Eq)?.is_some() {
        Some(input_value(stream, true)?)
    } else {
        None
    };

    Ok((
        // The variable's name range covers the `$` sigil.
        Spanning::new(name.item.to_owned(), dollar.start, name.end),
        VariableDefinition {
            var_type,
            default_value,
        },
    ))
}

fn directives(stream: &mut TokenStream<'_>) -> Parsed<Option<Vec<Spanning<Directive>>>> {
    let mut items = Vec::new();
    while stream.peek_is(Punct::At)? {
        items.push(directive(stream)?);
    }

    Ok(if items.is_empty() { None } else { Some(items) })
}

fn directive(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Directive>> {
    let at = stream.expect(Punct::At)?;
    let name = stream.name()?;
    let arguments = arguments(stream)?;
    let end = arguments.as_ref().map_or(name.end, |a| a.end);

    Ok(Spanning::new(
        Directive {
            name: name.map(str::to_owned),
            arguments,
        },
        at.start,
        end,
    ))
}

fn type_reference(stream: &mut TokenStream<'_>) -> Parsed<Spanning<Type>> {
    let inner = if let Some(open) = stream.eat(Punct::LBracket)? {
        let item = type_reference(stream)?;
        let close = stream.expect(Punct::RBracket)?;
        Spanning::new(Type::List(Box::new(item.item)), open.start, close.end)
    } else {
        let name = stream.name()?;
        Spanning::new(Type::Named(name.item.to_owned()), name.start, name.end)
    };

    Ok(match stream.eat(Punct::Bang)? {
        Some(bang) => Spanning::new(
            match inner.item {
                Type::Named(name) => Type::NonNullNamed(name),
                Type::List(of) => Type::NonNullList(of),
                wrapped => wrapped,
            },
            inner.start,
            bang.end,
        ),
        None => inner,
    })
}

/// A value literal. In const position (variable defaults) variable
/// references are not allowed and fall through to the rejection below.
fn input_value(stream: &mut TokenStream<'_>, constant: bool) -> Parsed<Spanning<InputValue>> {
    if stream.peek_is(Punct::LBracket)? {
        return list_value(stream, constant);
    }
    if stream.peek_is(Punct::LBrace)? {
        return object_value(stream, constant);
    }
    if !constant && stream.peek_is(Punct::Dollar)? {
        let dollar = stream.expect(Punct::Dollar)?;
        let name = stream.name()?;
        return Ok(Spanning::new(
            InputValue::variable(name.item),
            dollar.start,
            name.end,
        ));
    }

    let token = stream.bump()?;
    let value = match token.item {
        Token::Int(i) => InputValue::Int(i),
        Token::Float(f) => InputValue::Float(f),
        Token::Str(s) => InputValue::String(s),
        Token::Name("true") => InputValue::Boolean(true),
        Token::Name("false") => InputValue::Boolean(false),
        Token::Name("null") => InputValue::Null,
        Token::Name(name) => InputValue::enum_value(name),
        _ => return Err(reject(token)),
    };

    Ok(Spanning::new(value, token.start, token.end))
}

fn list_value(stream: &mut TokenStream<'_>, constant: bool) -> Parsed<Spanning<InputValue>> {
    let open = stream.expect(Punct::LBracket)?;

    let mut items = Vec::new();
    let close = loop {
        if let Some(close) = stream.eat(Punct::RBracket)? {
            break close;
        }
        items.push(input_value(stream, constant)?);
    };

    Ok(Spanning::new(
        InputValue::List(items),
        open.start,
        close.end,
    ))
}

fn object_value(stream: &mut TokenStream<'_>, constant: bool) -> Parsed<Spanning<InputValue>> {
    let open = stream.expect(Punct::LBrace)?;

    let mut fields = Vec::new();
    let close = loop {
        if let Some(close) = stream.eat(Punct::RBrace)? {
            break close;
        }
        let key = stream.name()?;
        stream.expect(Punct::Colon)?;
        let value = input_value(stream, constant)?;
        fields.push((key.map(str::to_owned), value));
    };

    Ok(Spanning::new(
        InputValue::Object(fields),
        open.start,
        close.end,
    ))
}
