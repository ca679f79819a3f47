use std::collections::HashMap;

use crate::foundation::core::Vec2;
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::scene::payload::{Fragment, FragmentKey, Payload};
use crate::typeset::{Typesetter, glyph_advance, glyph_height};

/// Typesetter that splits TeX-like markup into visible tokens laid out on one baseline.
///
/// Tokens are commands that render a glyph (`\sqrt`, `\leq`, ...), identifier runs,
/// numbers, and single symbols. Grouping braces, sub/superscript markers, and spacing or
/// structural commands (`\frac`, `\left`, `\quad`, ...) shape the layout but never become
/// fragments. Keys are `token#n` where `n` counts earlier occurrences of the same token.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenTypesetter;

impl Typesetter for TokenTypesetter {
    fn layout_formula(&self, source: &str, font_size: f64) -> KinetexResult<Payload> {
        validate_font_size(font_size)?;
        let tokens = formula_tokens(source)?;
        if tokens.is_empty() {
            return Err(KinetexError::validation(format!(
                "formula '{source}' has no visible tokens"
            )));
        }
        Ok(Payload::formula_from_parts(
            source,
            font_size,
            layout_tokens(&tokens, font_size),
        ))
    }
}

pub(crate) fn validate_font_size(font_size: f64) -> KinetexResult<()> {
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(KinetexError::validation(format!(
            "font size must be finite and > 0 (got {font_size})"
        )));
    }
    Ok(())
}

/// One visible token before layout.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub(crate) text: String,
    /// Width in glyph advances.
    pub(crate) glyphs: f64,
    /// Extra space before the token, in glyph advances.
    pub(crate) space_before: f64,
}

/// Split plain text into word tokens separated by single spaces.
pub(crate) fn word_tokens(content: &str) -> Vec<Token> {
    content
        .split_whitespace()
        .enumerate()
        .map(|(i, w)| Token {
            text: w.to_string(),
            glyphs: w.chars().count() as f64,
            space_before: if i == 0 { 0.0 } else { 0.6 },
        })
        .collect()
}

/// Lay tokens out left to right, centred on the origin, with occurrence-numbered keys.
pub(crate) fn layout_tokens(tokens: &[Token], font_size: f64) -> Vec<Fragment> {
    let adv = glyph_advance(font_size);
    let h = glyph_height(font_size);

    let mut cursor = 0.0;
    let mut placed = Vec::with_capacity(tokens.len());
    for tok in tokens {
        cursor += tok.space_before * adv;
        let w = tok.glyphs * adv;
        placed.push((cursor + w * 0.5, w));
        cursor += w;
    }
    let half = cursor * 0.5;

    let mut seen = HashMap::<&str, usize>::new();
    tokens
        .iter()
        .zip(placed)
        .map(|(tok, (centre, w))| {
            let n = seen.entry(tok.text.as_str()).or_insert(0);
            let key = FragmentKey(format!("{}#{}", tok.text, n));
            *n += 1;
            Fragment {
                key,
                text: tok.text.clone(),
                offset: Vec2::new(centre - half, 0.0),
                width: w,
                height: h,
            }
        })
        .collect()
}

/// Commands that render one glyph.
const GLYPH_COMMANDS: &[&str] = &[
    "sqrt", "leq", "geq", "approx", "cdot", "times", "pm", "infty", "sum", "int", "alpha",
    "beta", "gamma", "delta", "Delta", "pi", "sigma", "lambda", "mu", "theta", "neq", "to",
];

/// Commands that only add horizontal space, measured in glyph advances.
fn spacing_command(name: &str) -> Option<f64> {
    match name {
        "quad" => Some(2.0),
        "qquad" => Some(4.0),
        "," | ";" | ":" | "!" | " " => Some(0.3),
        _ => None,
    }
}

pub(crate) fn formula_tokens(source: &str) -> KinetexResult<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut out = Vec::<Token>::new();
    let mut depth = 0i32;
    let mut pending_space = 0.0;
    let mut i = 0;

    let push = |out: &mut Vec<Token>, text: String, glyphs: f64, pending: &mut f64| {
        out.push(Token {
            text,
            glyphs,
            space_before: *pending,
        });
        *pending = 0.0;
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return Err(KinetexError::validation(format!(
                        "unbalanced '}}' in formula '{source}'"
                    )));
                }
                i += 1;
            }
            '^' | '_' | '$' | '&' => i += 1,
            c if c.is_whitespace() => i += 1,
            '\\' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].is_ascii_alphabetic() {
                    end += 1;
                }
                if end == start {
                    // Single-character command such as `\,` or `\{`.
                    let Some(&sym) = chars.get(start) else {
                        return Err(KinetexError::validation(format!(
                            "dangling '\\' in formula '{source}'"
                        )));
                    };
                    let name = sym.to_string();
                    if let Some(space) = spacing_command(&name) {
                        pending_space += space;
                    } else {
                        push(&mut out, name, 1.0, &mut pending_space);
                    }
                    i = start + 1;
                    continue;
                }
                let name: String = chars[start..end].iter().collect();
                if let Some(space) = spacing_command(&name) {
                    pending_space += space;
                } else if GLYPH_COMMANDS.contains(&name.as_str()) {
                    push(&mut out, format!("\\{name}"), 1.0, &mut pending_space);
                }
                // Anything else (`\frac`, `\left`, `\right`, `\mathrm`, ...) is structural.
                i = end;
            }
            c if c.is_ascii_alphanumeric() || c == '.' => {
                let start = i;
                let numeric = c.is_ascii_digit() || c == '.';
                let mut end = i + 1;
                while end < chars.len() {
                    let n = chars[end];
                    let cont = if numeric {
                        n.is_ascii_digit() || n == '.'
                    } else {
                        n.is_ascii_alphanumeric()
                    };
                    if !cont {
                        break;
                    }
                    end += 1;
                }
                let text: String = chars[start..end].iter().collect();
                let glyphs = (end - start) as f64;
                push(&mut out, text, glyphs, &mut pending_space);
                i = end;
            }
            other => {
                let spaced = matches!(other, '=' | '+' | '-' | '<' | '>');
                if spaced {
                    pending_space += 0.4;
                }
                push(&mut out, other.to_string(), 1.0, &mut pending_space);
                if spaced {
                    pending_space += 0.4;
                }
                i += 1;
            }
        }
    }

    if depth != 0 {
        return Err(KinetexError::validation(format!(
            "unbalanced '{{' in formula '{source}'"
        )));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/typeset/tokens.rs"]
mod tests;
