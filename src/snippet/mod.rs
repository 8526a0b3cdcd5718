//! The translated snippet.
//!
//! [`R_CODE`] is an R program produced by an early version of the
//! translator, kept verbatim: it still adds strings with `+`, leaves Ruby
//! `#{}` interpolation untouched and writes `while !(...)` without the
//! parentheses R requires. [`RUBY_SOURCE`] is the program it came from;
//! feeding it to [`crate::translate`] today yields runnable R.
//!
//! [`run`] is a direct port of the snippet's constructs, keeping every loop
//! bound and inclusive/exclusive range exactly as written.

/// The R text, byte for byte.
pub const R_CODE: &str = include_str!("translated.R");

/// The Ruby program the snippet was translated from.
pub const RUBY_SOURCE: &str = include_str!("source.rb");

const NAME: &str = "John";
const AGE: i64 = 30;

fn describe_age(name: &str, age: i64) -> String {
    if age >= 18 {
        format!("{} is an adult", name)
    } else {
        format!("{} is underage", name)
    }
}

fn count_up() -> Vec<String> {
    let mut lines = Vec::new();
    let mut i = 0;
    while i < 5 {
        lines.push(i.to_string());
        i += 1;
    }
    lines
}

fn count_down() -> Vec<String> {
    let mut lines = Vec::new();
    let mut j = 5;
    while j != 0 {
        lines.push(j.to_string());
        j -= 1;
    }
    lines
}

fn range_inclusive() -> Vec<String> {
    (0..=5).map(|k| k.to_string()).collect()
}

fn print_name(n: &str) -> String {
    format!("Hello, {}!", n)
}

/// Run the snippet's constructs in order and collect what they print.
pub fn run() -> Vec<String> {
    let mut lines = vec![describe_age(NAME, AGE)];
    lines.extend(count_up());
    lines.extend(count_down());
    lines.extend(range_inclusive());
    lines.push(print_name(NAME));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_is_preserved_verbatim() {
        assert!(R_CODE.starts_with("# Переменные\nname <- \"John\"\n"));
        assert!(R_CODE.contains("print(name + \" is an adult\")"));
        assert!(R_CODE.contains("while !(j == 0) {"));
        assert!(R_CODE.contains("for (k in 0:5) {"));
        assert!(R_CODE.contains("print_name <- function(n) {"));
        assert!(R_CODE.ends_with("print(\"Hi #{input_name}!\")\n"));
    }

    #[test]
    fn ruby_source_uses_ruby_syntax() {
        assert!(RUBY_SOURCE.contains("until j == 0"));
        assert!(RUBY_SOURCE.contains("for k in 0..5"));
        assert!(RUBY_SOURCE.contains("def print_name(n)"));
    }

    #[test]
    fn adult_branch_is_taken() {
        assert_eq!(describe_age("John", 30), "John is an adult");
        assert_eq!(describe_age("Ann", 17), "Ann is underage");
        assert_eq!(describe_age("Bo", 18), "Bo is an adult");
    }

    #[test]
    fn while_loop_counts_zero_to_four() {
        assert_eq!(count_up(), vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn until_loop_counts_five_to_one() {
        assert_eq!(count_down(), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn range_loop_includes_both_ends() {
        assert_eq!(range_inclusive(), vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[test]
    fn run_prints_every_construct() {
        let lines = run();
        assert_eq!(lines.len(), 1 + 5 + 5 + 6 + 1);
        assert_eq!(lines[0], "John is an adult");
        assert_eq!(lines.last().map(String::as_str), Some("Hello, John!"));
        assert_eq!(run(), lines);
    }
}
