//! The greeting demo: a constant greeting, a threshold branch and a sum.

/// The greeting printed first.
pub const HELLO: &str = "Hello, world!";

/// Value checked against the thresholds.
pub const DEMO_VALUE: i64 = 5;

/// Values that get summed.
pub const DEMO_VALUES: [i64; 5] = [1, 2, 3, 4, 5];

/// Return the greeting.
pub fn say_hello() -> &'static str {
    HELLO
}

/// Describe where `x` falls relative to 5 and 10.
pub fn classify(x: i64) -> &'static str {
    if x > 10 {
        "x is greater than 10"
    } else if x > 5 {
        "x is greater than 5 but less than or equal to 10"
    } else {
        "x is less than or equal to 5"
    }
}

/// Sum a slice of integers.
pub fn sum(values: &[i64]) -> i64 {
    values.iter().sum()
}

/// Produce the demo's output lines in order.
pub fn run() -> Vec<String> {
    vec![
        say_hello().to_string(),
        classify(DEMO_VALUE).to_string(),
        sum(&DEMO_VALUES).to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_exact() {
        assert_eq!(say_hello(), "Hello, world!");
    }

    #[test]
    fn demo_value_takes_else_branch() {
        assert_eq!(classify(DEMO_VALUE), "x is less than or equal to 5");
    }

    #[test]
    fn classify_thresholds_are_exclusive() {
        assert_eq!(classify(11), "x is greater than 10");
        assert_eq!(
            classify(10),
            "x is greater than 5 but less than or equal to 10"
        );
        assert_eq!(
            classify(6),
            "x is greater than 5 but less than or equal to 10"
        );
        assert_eq!(classify(5), "x is less than or equal to 5");
        assert_eq!(classify(-3), "x is less than or equal to 5");
    }

    #[test]
    fn sums_demo_values() {
        assert_eq!(sum(&DEMO_VALUES), 15);
        assert_eq!(sum(&[]), 0);
    }

    #[test]
    fn run_produces_three_lines() {
        assert_eq!(
            run(),
            vec![
                "Hello, world!".to_string(),
                "x is less than or equal to 5".to_string(),
                "15".to_string(),
            ]
        );
    }

    #[test]
    fn run_is_repeatable() {
        assert_eq!(run(), run());
    }
}
