use crate::errors::AppError;
use crate::script::payload::Personalization;

/// Fails listing every required field that is absent or empty, in the
/// lesson's declared order.
pub fn ensure_personalization_coverage(
    required_fields: &[String],
    personalization: &Personalization,
) -> Result<(), AppError> {
    let missing: Vec<&str> = required_fields
        .iter()
        .filter(|field| {
            personalization
                .get(field.as_str())
                .map_or(true, |value| value.is_empty())
        })
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(AppError::InvalidArgument(format!(
        "Missing personalization fields: {}",
        missing.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn personalization(pairs: &[(&str, &str)]) -> Personalization {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_names_missing_field() {
        let err = ensure_personalization_coverage(
            &fields(&["user_name", "user_city"]),
            &personalization(&[("user_name", "Alex")]),
        )
        .unwrap_err();

        match err {
            AppError::InvalidArgument(msg) => {
                assert!(msg.contains("user_city"));
                assert!(!msg.contains("user_name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing_and_order_is_declared_order() {
        let err = ensure_personalization_coverage(
            &fields(&["user_job", "user_city", "user_name"]),
            &personalization(&[("user_name", ""), ("user_city", "Berlin")]),
        )
        .unwrap_err();

        match err {
            AppError::InvalidArgument(msg) => {
                assert_eq!(msg, "Missing personalization fields: user_job, user_name")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_passes_when_covered_or_nothing_required() {
        assert!(ensure_personalization_coverage(&[], &Personalization::new()).is_ok());
        assert!(ensure_personalization_coverage(
            &fields(&["user_name"]),
            &personalization(&[("user_name", "Alex"), ("extra", "")]),
        )
        .is_ok());
    }
}
