//! Built-in RPL vocabulary
//!
//! Fixed keyword, operator and macro tables. In the default vocabulary mode
//! these are offered as completions regardless of document content.

/// Keywords of the pattern language itself
pub const RPL_KEYWORDS: &[&str] = &["pattern", "patt", "util", "import"];

/// Host-language keywords that commonly appear inside pattern bodies
pub const RUST_KEYWORDS: &[&str] = &[
    "fn", "let", "mut", "struct", "impl", "enum", "const", "use", "pub", "unsafe",
];

/// MIR operation names usable in pattern bodies
pub const OPERATORS: &[&str] = &[
    "Transmute",
    "PtrToPtr",
    "raw",
    "copy",
    "move",
    "SizeOf",
    "switchInt",
    "discriminant",
    "Add",
    "Sub",
    "Mul",
    "Div",
    "Rem",
    "Lt",
    "Le",
    "Eq",
    "Ne",
    "Ge",
    "Gt",
];

/// Pattern macros and attributes
pub const MACROS: &[&str] = &["without!", "or!", "[mir]"];

/// Keywords that open a brace-delimited block
pub const BLOCK_KEYWORDS: &[&str] = &["patt", "util", "import"];

const SYMBOL_TRIGGERS: &[char] = &[':', '$', '@', '#', '(', ')', '|'];

/// Merged keyword list: RPL keywords first, then the host-language subset
pub fn keywords() -> impl Iterator<Item = &'static str> {
    RPL_KEYWORDS.iter().chain(RUST_KEYWORDS.iter()).copied()
}

/// Characters that should make the editor request completions
///
/// The symbol triggers followed by `A`..=`Z`.
pub fn trigger_characters() -> Vec<char> {
    SYMBOL_TRIGGERS
        .iter()
        .copied()
        .chain('A'..='Z')
        .collect()
}
