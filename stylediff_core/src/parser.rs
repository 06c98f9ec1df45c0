//! Lenient stylesheet parsing.
//!
//! Rule lists are driven by [`cssparser::StyleSheetParser`] and `{}` blocks
//! by [`cssparser::RuleBodyParser`]. Blocks may mix declarations with nested
//! rules. Problems inside a block are recorded as [`ParseWarning`]s and
//! parsing continues; a top-level rule that cannot be parsed at all (no
//! block, no selector) is a [`ParseError`].
//!
//! `cssparser` drops comments between rules and a leading `@charset`, so both
//! are recovered separately.

use std::fmt;

use camino::Utf8Path;
use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseErrorKind, Parser,
    ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    SourceLocation, SourcePosition, StyleSheetParser, ToCss, Token,
};
use tracing::debug;

use crate::{
    AtRule, AtRuleBody, Comment, Declaration, Error, ParseWarning, Result, Rule, StyleRule,
    Stylesheet,
};

type CssParseError<'i> = cssparser::ParseError<'i, SyntaxIssue>;

/// Unrecoverable syntax error found while parsing a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", line_suffix(.line))]
pub struct ParseError {
    /// Description of the failure.
    pub message: String,
    /// 1-based line of the failure, when known.
    pub line: Option<u32>,
}

fn line_suffix(line: &Option<u32>) -> String {
    line.map(|line| format!(" (line {line})")).unwrap_or_default()
}

/// Parse stylesheet text.
///
/// # Errors
///
/// Returns the first rule-level syntax error. Problems inside blocks are
/// reported through [`Stylesheet::warnings`] instead.
pub fn parse(text: &str) -> std::result::Result<Stylesheet, ParseError> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut rule_parser = RuleListParser::default();

    let mut rules: Vec<Rule> = leading_charset(&mut parser).into_iter().collect();
    rules.extend(parse_rule_list(&mut parser, &mut rule_parser));
    if let Some(error) = rule_parser.errors.into_iter().next() {
        return Err(error);
    }

    debug!(
        rules = rules.len(),
        warnings = rule_parser.warnings.len(),
        "parsed stylesheet"
    );
    Ok(Stylesheet {
        rules,
        warnings: rule_parser.warnings,
    })
}

/// Read and parse a stylesheet file.
///
/// # Errors
///
/// Returns [`Error::FileRead`] when the file cannot be read and
/// [`Error::Parse`] when its contents fail to parse.
pub fn parse_file(path: impl AsRef<Utf8Path>) -> Result<Stylesheet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
        path: path.to_string(),
        source,
    })?;
    debug!(%path, bytes = text.len(), "read stylesheet");

    parse(&text).map_err(|source| Error::Parse {
        path: path.to_string(),
        source,
    })
}

/// Custom failures raised by the rule and block parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SyntaxIssue {
    MissingSelector,
    MissingBlock(String),
    EmptyValue(String),
    BlockInValue(String),
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSelector => f.write_str("selector missing"),
            Self::MissingBlock(name) => write!(f, "@{name} requires a block"),
            Self::EmptyValue(property) => write!(f, "property `{property}` has no value"),
            Self::BlockInValue(property) => write!(f, "property `{property}` contains a block"),
        }
    }
}

/// `@charset` is only valid as the very first bytes of a stylesheet.
fn leading_charset(input: &mut Parser<'_, '_>) -> Option<Rule> {
    input
        .try_parse(|input| {
            let name = match input.next_including_whitespace_and_comments() {
                Ok(Token::AtKeyword(name)) if name.eq_ignore_ascii_case("charset") => {
                    name.to_string()
                }
                _ => return Err(()),
            };

            let start = input.position();
            let end = loop {
                let end = input.position();
                match input.next_including_whitespace_and_comments() {
                    Ok(Token::Semicolon) | Err(_) => break end,
                    Ok(_) => {}
                }
            };

            Ok(Rule::At(AtRule {
                name,
                prelude: collapse_whitespace(input.slice(start..end)),
                body: AtRuleBody::None,
                line: 1,
            }))
        })
        .ok()
}

#[derive(Debug, Default)]
struct RuleListParser {
    warnings: Vec<ParseWarning>,
    errors: Vec<ParseError>,
    /// Start of the rule most recently produced, used to find the comment gap.
    last_rule_start: Option<SourcePosition>,
    /// Reason for a failure `cssparser` reports without a custom error.
    pending_issue: Option<SyntaxIssue>,
}

fn parse_rule_list(input: &mut Parser<'_, '_>, parser: &mut RuleListParser) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut iter = StyleSheetParser::new(input, parser);

    loop {
        let gap_start = iter.input.position();
        let gap_location = iter.input.current_source_location();
        iter.parser.last_rule_start = None;
        iter.parser.pending_issue = None;

        let Some(result) = iter.next() else {
            rules.extend(collect_comments(
                iter.input.slice_from(gap_start),
                gap_location,
            ));
            break;
        };

        match result {
            Ok(rule) => {
                if let Some(start) = iter.parser.last_rule_start {
                    rules.extend(collect_comments(
                        iter.input.slice(gap_start..start),
                        gap_location,
                    ));
                }
                rules.push(rule);
            }
            Err((error, source)) => {
                let pending = iter.parser.pending_issue.take();
                let line = first_token_line(
                    iter.input.slice_from(gap_start),
                    gap_location,
                    Context::Rule,
                );
                iter.parser
                    .errors
                    .push(rule_error(&error, source, pending, line));
            }
        }
    }

    rules
}

fn collect_comments(gap: &str, origin: SourceLocation) -> Vec<Rule> {
    if !gap.contains("/*") {
        return Vec::new();
    }

    let mut input = ParserInput::new(gap);
    let mut parser = Parser::new(&mut input);
    let mut comments = Vec::new();

    loop {
        let line = origin.line + parser.current_source_location().line + 1;
        match parser.next_including_whitespace_and_comments() {
            Ok(Token::Comment(text)) => comments.push(Rule::Comment(Comment {
                text: (*text).to_owned(),
                line,
            })),
            Ok(_) => {}
            Err(_) => break,
        }
    }

    comments
}

/// 1-based line of the first significant token in `consumed`, which starts at
/// `origin`.
fn first_token_line(consumed: &str, origin: SourceLocation, context: Context) -> u32 {
    let mut input = ParserInput::new(consumed);
    let mut parser = Parser::new(&mut input);

    loop {
        let line = parser.current_source_location().line;
        match parser.next_including_whitespace_and_comments() {
            Ok(Token::WhiteSpace(_) | Token::Comment(_) | Token::CDO | Token::CDC) => {}
            Ok(Token::Semicolon) if matches!(context, Context::Block) => {}
            Ok(_) | Err(_) => return origin.line + line + 1,
        }
    }
}

impl<'i> QualifiedRuleParser<'i> for RuleListParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Rule;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, CssParseError<'i>> {
        parse_selectors(input)
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::QualifiedRule, CssParseError<'i>> {
        let block = parse_block_contents(input, &mut self.warnings, true);
        self.last_rule_start = Some(start.position());
        Ok(style_rule(selectors, block, start))
    }
}

impl<'i> AtRuleParser<'i> for RuleListParser {
    type Prelude = AtPrelude;
    type AtRule = Rule;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, CssParseError<'i>> {
        Ok(AtPrelude::parse(&name, input))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        match prelude.into_statement(start) {
            Ok(rule) => {
                self.last_rule_start = Some(start.position());
                Ok(rule)
            }
            Err(issue) => {
                self.pending_issue = Some(issue);
                Err(())
            }
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::AtRule, CssParseError<'i>> {
        let body = match prelude.block() {
            BlockKind::Declarations => {
                parse_block_contents(input, &mut self.warnings, false).into_at_rule_body()
            }
            BlockKind::RequiredRules | BlockKind::OptionalRules => {
                AtRuleBody::Rules(parse_rule_list(input, self))
            }
        };

        self.last_rule_start = Some(start.position());
        Ok(prelude.into_rule(body, start))
    }
}

/// Name and prelude text of an at-rule.
#[derive(Debug)]
struct AtPrelude {
    name: String,
    prelude: String,
}

impl AtPrelude {
    fn parse(name: &str, input: &mut Parser<'_, '_>) -> Self {
        Self {
            name: name.to_owned(),
            prelude: consume_text(input),
        }
    }

    fn block(&self) -> BlockKind {
        let name = self.name.to_ascii_lowercase();
        match unprefixed(&name) {
            "font-face" | "page" | "counter-style" | "property" | "viewport"
            | "font-palette-values" => BlockKind::Declarations,
            // @page margin boxes
            "top-left-corner" | "top-left" | "top-center" | "top-right" | "top-right-corner"
            | "bottom-left-corner" | "bottom-left" | "bottom-center" | "bottom-right"
            | "bottom-right-corner" | "left-top" | "left-middle" | "left-bottom"
            | "right-top" | "right-middle" | "right-bottom" => BlockKind::Declarations,
            // @font-feature-values feature blocks
            "swash" | "annotation" | "ornaments" | "stylistic" | "styleset"
            | "character-variant" | "historical-forms" => BlockKind::Declarations,
            "media" | "supports" | "document" | "container" | "keyframes" | "scope"
            | "starting-style" | "font-feature-values" => BlockKind::RequiredRules,
            _ => BlockKind::OptionalRules,
        }
    }

    fn into_statement(self, start: &ParserState) -> std::result::Result<Rule, SyntaxIssue> {
        if self.block() != BlockKind::OptionalRules {
            return Err(SyntaxIssue::MissingBlock(self.name));
        }
        Ok(self.into_rule(AtRuleBody::None, start))
    }

    fn into_rule(self, body: AtRuleBody, start: &ParserState) -> Rule {
        Rule::At(AtRule {
            name: self.name,
            prelude: self.prelude,
            body,
            line: start.source_location().line + 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Declarations,
    RequiredRules,
    OptionalRules,
}

fn unprefixed(name: &str) -> &str {
    name.strip_prefix('-')
        .and_then(|rest| rest.split_once('-'))
        .map_or(name, |(_, bare)| bare)
}

fn style_rule(selectors: Vec<String>, block: Block, start: &ParserState) -> Rule {
    Rule::Style(StyleRule {
        selectors,
        declarations: block.declarations,
        rules: block.rules,
        line: start.source_location().line + 1,
    })
}

/// Contents of a `{}` block.
#[derive(Debug, Default)]
struct Block {
    declarations: Vec<Declaration>,
    rules: Vec<Rule>,
}

impl Block {
    fn into_at_rule_body(self) -> AtRuleBody {
        match (self.declarations.is_empty(), self.rules.is_empty()) {
            (_, true) => AtRuleBody::Declarations(self.declarations),
            (true, false) => AtRuleBody::Rules(self.rules),
            (false, false) => AtRuleBody::Block {
                declarations: self.declarations,
                rules: self.rules,
            },
        }
    }
}

enum BlockItem {
    Declaration(Declaration),
    Rule(Rule),
}

/// Parses the inside of a block. Nested qualified rules are only accepted
/// when `nested_rules` is set; at-rules are always accepted.
struct BlockParser<'w> {
    warnings: &'w mut Vec<ParseWarning>,
    nested_rules: bool,
    pending_issue: Option<SyntaxIssue>,
}

fn parse_block_contents(
    input: &mut Parser<'_, '_>,
    warnings: &mut Vec<ParseWarning>,
    nested_rules: bool,
) -> Block {
    let mut block = Block::default();
    let mut parser = BlockParser {
        warnings,
        nested_rules,
        pending_issue: None,
    };
    let mut iter = RuleBodyParser::new(input, &mut parser);

    loop {
        let item_start = iter.input.position();
        let item_location = iter.input.current_source_location();
        iter.parser.pending_issue = None;

        let Some(result) = iter.next() else {
            break;
        };

        match result {
            Ok(BlockItem::Declaration(declaration)) => block.declarations.push(declaration),
            Ok(BlockItem::Rule(rule)) => block.rules.push(rule),
            Err((error, source)) => {
                let reason = iter.parser.pending_issue.take().map_or_else(
                    || describe(&error.kind, Context::Block),
                    |issue| issue.to_string(),
                );
                let warning = ParseWarning {
                    message: format!("skipped `{}`: {reason}", excerpt(source)),
                    line: first_token_line(
                        iter.input.slice_from(item_start),
                        item_location,
                        Context::Block,
                    ),
                };
                debug!(line = warning.line, message = %warning.message, "skipped block item");
                iter.parser.warnings.push(warning);
            }
        }
    }

    block
}

impl<'i> DeclarationParser<'i> for BlockParser<'_> {
    type Declaration = BlockItem;
    type Error = SyntaxIssue;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Declaration, CssParseError<'i>> {
        let line = input.current_source_location().line + 1;
        let start = input.position();
        let mut has_block = false;
        while let Ok(token) = input.next_including_whitespace_and_comments() {
            has_block |= matches!(token, Token::CurlyBracketBlock);
        }

        // `a:hover { ... }` inside a block reads like a declaration until its
        // block; failing here lets it be parsed as a nested rule.
        if has_block && self.nested_rules && !name.starts_with("--") {
            return Err(input.new_custom_error(SyntaxIssue::BlockInValue(name.to_string())));
        }

        let value = collapse_whitespace(input.slice_from(start));
        if value.is_empty() {
            return Err(input.new_custom_error(SyntaxIssue::EmptyValue(name.to_string())));
        }

        Ok(BlockItem::Declaration(Declaration {
            property: name.to_string(),
            value,
            line,
        }))
    }
}

impl<'i> QualifiedRuleParser<'i> for BlockParser<'_> {
    type Prelude = Vec<String>;
    type QualifiedRule = BlockItem;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, CssParseError<'i>> {
        parse_selectors(input)
    }

    fn parse_block<'t>(
        &mut self,
        selectors: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::QualifiedRule, CssParseError<'i>> {
        let block = parse_block_contents(input, self.warnings, true);
        Ok(BlockItem::Rule(style_rule(selectors, block, start)))
    }
}

impl<'i> AtRuleParser<'i> for BlockParser<'_> {
    type Prelude = AtPrelude;
    type AtRule = BlockItem;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::Prelude, CssParseError<'i>> {
        Ok(AtPrelude::parse(&name, input))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        prelude
            .into_statement(start)
            .map(BlockItem::Rule)
            .map_err(|issue| self.pending_issue = Some(issue))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> std::result::Result<Self::AtRule, CssParseError<'i>> {
        let nested_rules = prelude.block() != BlockKind::Declarations;
        let body = parse_block_contents(input, self.warnings, nested_rules).into_at_rule_body();
        Ok(BlockItem::Rule(prelude.into_rule(body, start)))
    }
}

impl<'i> RuleBodyItemParser<'i, BlockItem, SyntaxIssue> for BlockParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        self.nested_rules
    }
}

/// Consume the rest of `input` and return its whitespace-collapsed source text.
fn consume_text(input: &mut Parser<'_, '_>) -> String {
    let start = input.position();
    while input.next_including_whitespace_and_comments().is_ok() {}
    collapse_whitespace(input.slice_from(start))
}

fn parse_selectors<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<String>, CssParseError<'i>> {
    let selectors = split_selectors(input)?;
    if selectors.is_empty() {
        return Err(input.new_custom_error(SyntaxIssue::MissingSelector));
    }
    Ok(selectors)
}

/// Split a selector prelude on commas that are not nested in a block.
fn split_selectors<'i>(
    input: &mut Parser<'i, '_>,
) -> std::result::Result<Vec<String>, CssParseError<'i>> {
    let mut selectors = Vec::new();
    let mut start = input.position();

    loop {
        let end = input.position();
        match input.next_including_whitespace_and_comments().cloned() {
            Ok(Token::Comma) => {
                push_selector(&mut selectors, input.slice(start..end));
                start = input.position();
            }
            Ok(Token::Semicolon) => {
                return Err(input.new_unexpected_token_error(Token::Semicolon));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }

    push_selector(&mut selectors, input.slice_from(start));
    Ok(selectors)
}

fn push_selector(selectors: &mut Vec<String>, text: &str) {
    let selector = collapse_whitespace(text);
    if !selector.is_empty() {
        selectors.push(selector);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn excerpt(source: &str) -> String {
    const MAX_CHARS: usize = 40;

    let text = collapse_whitespace(source);
    if text.chars().count() <= MAX_CHARS {
        return text;
    }
    let mut short: String = text.chars().take(MAX_CHARS).collect();
    short.push_str("...");
    short
}

#[derive(Debug, Clone, Copy)]
enum Context {
    Rule,
    Block,
}

fn describe(kind: &ParseErrorKind<'_, SyntaxIssue>, context: Context) -> String {
    match kind {
        ParseErrorKind::Custom(issue) => issue.to_string(),
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => match context {
            Context::Rule => "missing '{'".to_owned(),
            Context::Block => "missing ':' or value".to_owned(),
        },
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected `{}`", token.to_css_string())
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
            format!("unsupported at-rule @{name}")
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleBodyInvalid) => {
            "at-rule not allowed here".to_owned()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::QualifiedRuleInvalid) => {
            "nested rule not allowed here".to_owned()
        }
    }
}

fn rule_error(
    error: &CssParseError<'_>,
    source: &str,
    pending: Option<SyntaxIssue>,
    line: u32,
) -> ParseError {
    let reason = pending.map_or_else(
        || describe(&error.kind, Context::Rule),
        |issue| issue.to_string(),
    );
    ParseError {
        message: format!("{reason} in `{}`", excerpt(source)),
        line: Some(line),
    }
}
