//! Splitting values into number/text chunks and comparing chunk pairs.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// A leading signed decimal (optionally scientific) number, or any later digit run.
static NUMBER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+\-]?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?|\d+")
        .expect("number token regex should compile")
});

/// Longest numeric prefix a lenient float parse accepts.
static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+\-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+\-]?\d+)?)")
        .expect("float prefix regex should compile")
});

/// A whole string that converts to a number.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+\-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+\-]?\d+)?)$")
        .expect("numeric regex should compile")
});

static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^0x([0-9a-f]+)$").expect("hex regex should compile"));

/// Split `value` into alternating number and text chunks.
///
/// Numbers are delimited but not interpreted here. An empty value yields one
/// empty chunk.
pub fn tokenize(value: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut last = 0;
    for token in NUMBER_TOKEN.find_iter(value) {
        if token.start() > last {
            chunks.push(&value[last..token.start()]);
        }
        chunks.push(token.as_str());
        last = token.end();
    }
    if last < value.len() || chunks.is_empty() {
        chunks.push(&value[last..]);
    }
    chunks
}

/// Value of a whole-string `0x` hex literal.
pub fn hex_value(value: &str) -> Option<f64> {
    let digits = HEX.captures(value)?.get(1)?.as_str();
    Some(digits.chars().fold(0.0, |acc, c| {
        acc * 16.0 + f64::from(c.to_digit(16).unwrap_or(0))
    }))
}

/// A chunk after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Number(f64),
    Text(String),
}

impl Chunk {
    /// Normalize one chunk of a value that has `chunk_count` chunks.
    ///
    /// A chunk becomes a number when it parses to a non-zero float and either
    /// has no leading zero or is the value's only chunk. Otherwise whitespace
    /// runs collapse to one space; a chunk left empty reads as zero.
    pub fn normalize(chunk: &str, chunk_count: usize) -> Self {
        if !chunk.starts_with('0') || chunk_count == 1 {
            let number = parse_float(chunk);
            if number != 0.0 && !number.is_nan() {
                return Self::Number(number);
            }
        }
        let collapsed = chunk.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            Self::Number(0.0)
        } else {
            Self::Text(collapsed)
        }
    }

    /// Numeric reading; NaN for text that is not a number.
    fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => to_number(s),
        }
    }

    fn is_nan(&self) -> bool {
        self.as_number().is_nan()
    }

    fn has_non_ascii(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(s) => s.chars().any(|c| c > '\u{80}'),
        }
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", super::format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Compare two chunks at the same position.
///
/// `Some(Equal)` from the collation path is final for the whole comparison;
/// `None` means the chunks tie and the next position decides.
pub fn compare(a: &Chunk, b: &Chunk) -> Option<Ordering> {
    match (a.is_nan(), b.is_nan()) {
        (true, false) => return Some(Ordering::Greater),
        (false, true) => return Some(Ordering::Less),
        _ => {}
    }

    if let Chunk::Text(text) = a
        && (a.has_non_ascii() || b.has_non_ascii())
    {
        return Some(collate(text, &b.to_string()));
    }

    let ordering = match (a, b) {
        (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        _ => a
            .as_number()
            .partial_cmp(&b.as_number())
            .unwrap_or(Ordering::Equal),
    };
    (ordering != Ordering::Equal).then_some(ordering)
}

/// Lenient float parse of the longest numeric prefix; NaN if there is none.
pub fn parse_float(s: &str) -> f64 {
    FLOAT_PREFIX
        .find(s.trim_start())
        .map_or(f64::NAN, |m| parse_decimal(m.as_str()))
}

/// Strict whole-string numeric conversion. Blank strings are zero.
pub fn to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    if NUMERIC.is_match(s) {
        return parse_decimal(s);
    }
    hex_value(s).unwrap_or(f64::NAN)
}

fn parse_decimal(s: &str) -> f64 {
    match s {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => s.parse().unwrap_or(f64::NAN),
    }
}

/// Base letters for U+00C0..=U+00FF. `*` marks characters with no base letter.
const LATIN_1: &str = "AAAAAAACEEEEIIIIDNOOOOO*OUUUUY*saaaaaaaceeeeiiiidnooooo*ouuuuy*y";

/// Base letters for U+0100..=U+017F.
const LATIN_EXTENDED_A: &str = concat!(
    "AaAaAaCcCcCcCcDdDdEeEeEeEeEeGgGgGgGgHhHhIiIiIiIiIiIiJjKkk",
    "LlLlLlLlLlNnNnNnnNnOoOoOoOoRrRrRrSsSsSsSsTtTtTtUuUuUuUuUuUuWwYyYZzZzZzs"
);

/// One character's collation weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Weight {
    class: u8,
    base: char,
}

struct Folded {
    primary: Weight,
    accented: bool,
    upper: bool,
}

fn fold(c: char) -> Folded {
    let table = match u32::from(c) {
        0xC0..=0xFF => LATIN_1.chars().nth((u32::from(c) - 0xC0) as usize),
        0x100..=0x17F => LATIN_EXTENDED_A.chars().nth((u32::from(c) - 0x100) as usize),
        _ => None,
    };
    let (base, accented, upper) = match table {
        Some(mapped) if mapped != '*' => {
            (mapped.to_ascii_lowercase(), true, mapped.is_ascii_uppercase())
        }
        _ => {
            let lower = c.to_lowercase().next().unwrap_or(c);
            (lower, false, lower != c)
        }
    };
    let class = if base.is_alphabetic() {
        2
    } else if base.is_numeric() {
        1
    } else {
        0
    };
    Folded {
        primary: Weight { class, base },
        accented,
        upper,
    }
}

/// Accent- and case-aware comparison: base letters first, then accents, then
/// case with lowercase first. Punctuation sorts before digits, digits before
/// letters.
pub fn collate(a: &str, b: &str) -> Ordering {
    let a: Vec<Folded> = a.chars().map(fold).collect();
    let b: Vec<Folded> = b.chars().map(fold).collect();
    a.iter()
        .map(|f| f.primary)
        .cmp(b.iter().map(|f| f.primary))
        .then_with(|| a.iter().map(|f| f.accented).cmp(b.iter().map(|f| f.accented)))
        .then_with(|| a.iter().map(|f| f.upper).cmp(b.iter().map(|f| f.upper)))
}
