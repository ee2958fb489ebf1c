//! Template and string file parsers.
//!
//! This module turns raw template strings and `.strings` files into an AST
//! that the builder, external tooling and the CLI consume.

pub mod ast;
pub mod error;
mod strings_file;
mod template;

pub use ast::*;
pub use error::ParseError;
pub use strings_file::parse_strings_file;
pub use template::parse_template;

/// Calculate line and column from original input and remaining input.
fn calculate_position(original: &str, remaining: &str) -> (usize, usize) {
    let consumed = original.len() - remaining.len();
    let consumed_str = &original[..consumed];
    let line = consumed_str.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = consumed_str.rfind('\n');
    let column = match last_newline {
        Some(pos) => consumed - pos,
        None => consumed + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::calculate_position;

    #[test]
    fn position_counts_lines_and_columns_from_one() {
        let input = "ab\ncd";
        assert_eq!(calculate_position(input, input), (1, 1));
        assert_eq!(calculate_position(input, "b\ncd"), (1, 2));
        assert_eq!(calculate_position(input, "cd"), (2, 1));
        assert_eq!(calculate_position(input, ""), (2, 3));
    }
}
