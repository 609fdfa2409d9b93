//! One-pass scan of a tex file into structural tokens.

use super::TexFile;
use crate::mmdtex::settings::Markers;

/// A structural boundary recognised on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    DocumentBegin,
    DocumentEnd,
    Insertion,
    FigureBegin,
    FigureEnd,
    Label,
    ChapterBegin,
}

/// A token and the index of the line it was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub line: usize,
    pub token: Token,
}

/// Scans every line once and records each marker it contains.
///
/// A line may carry several tokens, e.g. `\chapter{Intro}\label{chapter-intro}`.
/// Tokens on the same line keep the order of the `Token` variants.
pub fn tokenize(tex: &TexFile, markers: &Markers) -> Vec<Located> {
    let table = [
        (Token::DocumentBegin, &markers.document_begin),
        (Token::DocumentEnd, &markers.document_end),
        (Token::Insertion, &markers.insertion),
        (Token::FigureBegin, &markers.figure_begin),
        (Token::FigureEnd, &markers.figure_end),
        (Token::Label, &markers.label),
        (Token::ChapterBegin, &markers.chapter),
    ];

    let mut tokens = Vec::new();

    for (line, text) in tex.lines().iter().enumerate() {
        for (token, marker) in table.iter() {
            if text.contains(marker.as_str()) {
                tokens.push(Located {
                    line,
                    token: *token,
                });
            }
        }
    }

    tokens
}

/// Line indices of every occurrence of `token`.
pub fn lines_of(tokens: &[Located], token: Token) -> Vec<usize> {
    tokens
        .iter()
        .filter(|located| located.token == token)
        .map(|located| located.line)
        .collect()
}
