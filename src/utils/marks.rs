use rust_decimal::Decimal;

/// Upper bound of a single question's marks (`NUMERIC(6, 2)`).
pub const MAX_QUESTION_MARKS: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// Upper bound of an exam's total marks (`NUMERIC(8, 2)`).
pub const MAX_TOTAL_MARKS: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Checks that `marks` is positive, at most `max` and has no more than two
/// decimal places. The error names `field`.
pub fn check_marks(field: &str, marks: Decimal, max: Decimal) -> Result<(), String> {
    if marks <= Decimal::ZERO {
        return Err(format!("{} must be greater than zero", field));
    }
    if marks > max {
        return Err(format!("{} must not exceed {}", field, max));
    }
    if marks.normalize().scale() > 2 {
        return Err(format!("{} can have at most two decimal places", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_match_the_column_types() {
        assert_eq!(MAX_QUESTION_MARKS.to_string(), "9999.99");
        assert_eq!(MAX_TOTAL_MARKS.to_string(), "999999.99");
    }

    #[test]
    fn accepts_positive_marks_with_two_places() {
        assert!(check_marks("marks", Decimal::new(25, 1), MAX_QUESTION_MARKS).is_ok());
        assert!(check_marks("marks", Decimal::new(1500, 3), MAX_QUESTION_MARKS).is_ok());
        assert!(check_marks("marks", MAX_QUESTION_MARKS, MAX_QUESTION_MARKS).is_ok());
    }

    #[test]
    fn rejects_out_of_range_or_too_precise_marks() {
        let err = check_marks("marks", Decimal::ZERO, MAX_QUESTION_MARKS).unwrap_err();
        assert!(err.contains("greater than zero"));
        let err = check_marks("marks", Decimal::new(10_000, 0), MAX_QUESTION_MARKS).unwrap_err();
        assert!(err.contains("9999.99"));
        let err = check_marks("marks", Decimal::MAX, MAX_TOTAL_MARKS).unwrap_err();
        assert!(err.contains("must not exceed"));
        let err = check_marks("marks", Decimal::new(1234, 3), MAX_QUESTION_MARKS).unwrap_err();
        assert!(err.contains("two decimal places"));
    }
}
