use std::error::Error;
use lucidlayer::errors::BotError;

#[test]
fn test_bot_error_implements_error_trait() {
    // Verify BotError implements the Error trait
    fn assert_error<T: Error>(_: &T) {}

    let error = BotError::ParseError("test error".to_string());
    assert_error(&error);
}

#[test]
fn test_bot_error_display() {
    let error = BotError::ApiError("API failed".to_string());
    assert_eq!(format!("{error}"), "Failed to access Slack API: API failed");

    let error = BotError::ModelError("Model unavailable".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to access watsonx API: Model unavailable"
    );

    let error = BotError::HttpError("Connection error".to_string());
    assert_eq!(
        format!("{error}"),
        "Failed to send HTTP request: Connection error"
    );

    let error = BotError::ConfigError("PROJECT_ID is not set".to_string());
    assert_eq!(
        format!("{error}"),
        "Invalid configuration: PROJECT_ID is not set"
    );
}

#[test]
fn test_bot_error_from_conversions() {
    let err = anyhow::anyhow!("test error");
    let bot_err: BotError = err.into();
    match bot_err {
        BotError::GeneralError(msg) => assert_eq!(msg, "test error"),
        other => panic!("Unexpected error type: {other:?}"),
    }

    let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
    let bot_err: BotError = json_err.into();
    assert!(matches!(bot_err, BotError::ParseError(_)));

    // We can't easily build a reqwest::Error directly, but this confirms
    // the conversion exists.
    #[allow(unused)]
    #[allow(clippy::items_after_statements)]
    fn _check_reqwest_conversion(err: reqwest::Error) -> BotError {
        BotError::from(err)
    }
}
