//! Answer selection and aggregation.
//!
//! An endpoint's answer is the first element of the JSON array it returns,
//! kept only when that element is truthy. Falsy values (`null`, `false`,
//! `0`, `""`, `[]`, `{}`) count as no answer at all.

use serde_json::Value;

use super::Failure;
use crate::error::EndpointError;

/// Answers in configured endpoint order; endpoints without an answer are absent.
pub type AnswerSet = Vec<Value>;

#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        // Out-of-range literals such as 1e400 have no f64 and are non-zero.
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Pick the answer out of an endpoint response body.
pub fn first_answer(body: &[u8]) -> Result<Option<Value>, EndpointError> {
    let parsed: Value = serde_json::from_slice(body).map_err(EndpointError::NotJson)?;
    let Value::Array(items) = parsed else {
        return Err(EndpointError::NotAnArray);
    };
    Ok(items.into_iter().next().filter(is_truthy))
}

/// Build the response payload, or [`Failure::NoAnswers`] when nothing came back.
pub fn aggregate(answers: AnswerSet) -> Result<Value, Failure> {
    if answers.is_empty() {
        return Err(Failure::NoAnswers);
    }
    Ok(Value::Array(answers))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn falsy_values() {
        for v in [
            json!(null),
            json!(false),
            json!(0),
            json!(0.0),
            json!(""),
            json!([]),
            json!({}),
        ] {
            assert!(!is_truthy(&v), "{v} should be falsy");
        }
    }

    #[test]
    fn truthy_values() {
        for v in [
            json!(true),
            json!(1),
            json!(-0.5),
            json!("0"),
            json!([null]),
            json!({"a": null}),
        ] {
            assert!(is_truthy(&v), "{v} should be truthy");
        }
    }

    #[test]
    fn large_numbers_keep_their_text() {
        let answer = first_answer(b"[123456789012345678901234567890, 0]").unwrap().unwrap();
        assert_eq!(answer.to_string(), "123456789012345678901234567890");
        let huge: Value = serde_json::from_str("1e400").unwrap();
        assert!(is_truthy(&huge));
    }

    #[test]
    fn first_element_is_the_answer() {
        let answer = first_answer(br#"[{"status":"ok"}, {"ignored":true}]"#).unwrap();
        assert_eq!(answer, Some(json!({"status": "ok"})));
    }

    #[test]
    fn empty_or_falsy_first_element_gives_no_answer() {
        assert_eq!(first_answer(b"[]").unwrap(), None);
        assert_eq!(first_answer(b"[null, 1]").unwrap(), None);
        assert_eq!(first_answer(b"[0]").unwrap(), None);
        assert_eq!(first_answer(br#"[""]"#).unwrap(), None);
    }

    #[test]
    fn non_json_body_is_an_error() {
        assert!(matches!(
            first_answer(b"<html>oops</html>"),
            Err(EndpointError::NotJson(_))
        ));
    }

    #[test]
    fn non_array_body_is_an_error() {
        assert!(matches!(
            first_answer(br#"{"status":"ok"}"#),
            Err(EndpointError::NotAnArray)
        ));
    }

    #[test]
    fn aggregate_keeps_order() {
        let body = aggregate(vec![json!("a"), json!({"b": 2})]).unwrap();
        assert_eq!(body, json!(["a", {"b": 2}]));
    }

    #[test]
    fn aggregate_of_nothing_is_a_server_failure() {
        assert_eq!(aggregate(Vec::new()).unwrap_err(), Failure::NoAnswers);
    }
}
