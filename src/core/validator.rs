use crate::core::selector::truncate_chars;
use crate::domain::model::{StatusReport, Verdict};
use crate::domain::ports::LanguageModel;
use crate::utils::error::Result;

const JUDGE_OUTPUT_CHARS: usize = 2000;

/// Finds the last JSON object in the output. Lines are tried from the end
/// first; otherwise the widest `{...}` span is attempted.
pub fn parse_last_json_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    for line in text.lines().rev() {
        let line = line.trim();
        if line.starts_with('{') && line.ends_with('}') {
            if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(line) {
                return Some(map);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// 規則判定：http_status == 200 且 status_code == 200
pub fn validate_output(output: &str) -> Verdict {
    let Some(data) = parse_last_json_object(output) else {
        return Verdict {
            success: false,
            reasons: vec!["output contains no JSON report".to_string()],
            ..Default::default()
        };
    };

    let http_status = data.get("http_status").and_then(serde_json::Value::as_i64);
    let status_code = data.get("status_code").and_then(serde_json::Value::as_i64);

    let mut reasons = Vec::new();
    if http_status != Some(200) {
        reasons.push(format!("http_status is {}", describe(http_status)));
    }
    if status_code != Some(200) {
        reasons.push(format!("status_code is {}", describe(status_code)));
    }
    if let Some(error) = data.get("error").and_then(serde_json::Value::as_str) {
        reasons.push(format!("client error: {}", error));
    }

    Verdict {
        success: http_status == Some(200) && status_code == Some(200),
        reasons,
        patch_hint: String::new(),
        http_status,
        status_code,
    }
}

fn describe(value: Option<i64>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| v.to_string())
}

/// The report to persist, when the output holds one.
pub fn parse_report(output: &str) -> Option<StatusReport> {
    let data = parse_last_json_object(output)?;
    serde_json::from_value(serde_json::Value::Object(data)).ok()
}

/// 請模型判定。呼叫失敗回傳 Err；回覆無法解析時回傳 Ok(None)
pub async fn judge_with_model<L: LanguageModel>(
    model: &L,
    output: &str,
) -> Result<Option<Verdict>> {
    let prompt = format!(
        "Return JSON only with keys: \
         {{\"success\": true|false, \"reasons\": [], \"patch_hint\": \"\"}}. \
         Success criteria: http_status==200 AND status_code==200. Output:\n{}",
        truncate_chars(output, JUDGE_OUTPUT_CHARS)
    );

    let raw = model.respond(&prompt, 0.0, 500).await?;

    let Some(data) = parse_last_json_object(&raw) else {
        tracing::debug!("Model verdict is not JSON: {}", raw);
        return Ok(None);
    };
    if !data.get("success").is_some_and(serde_json::Value::is_boolean) {
        tracing::debug!("Model verdict without a boolean success field: {}", raw);
        return Ok(None);
    }
    Ok(serde_json::from_value(serde_json::Value::Object(data)).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TrackError;
    use async_trait::async_trait;

    #[test]
    fn test_success_requires_both_statuses() {
        let verdict = validate_output(r#"{"http_status": 200, "status_code": 200, "result": {}}"#);
        assert!(verdict.success);
        assert!(verdict.reasons.is_empty());

        let verdict = validate_output(r#"{"http_status": 200, "status_code": null}"#);
        assert!(!verdict.success);
        assert_eq!(verdict.reasons, vec!["status_code is missing"]);

        let verdict = validate_output(r#"{"http_status": 401, "status_code": 401}"#);
        assert!(!verdict.success);
        assert_eq!(verdict.http_status, Some(401));
    }

    #[test]
    fn test_malformed_output_fails() {
        let verdict = validate_output("Traceback (most recent call last):\n  boom");
        assert!(!verdict.success);
        assert_eq!(verdict.reasons, vec!["output contains no JSON report"]);

        assert!(!validate_output("{not json}").success);
    }

    #[test]
    fn test_last_report_line_wins() {
        let output = "debug: starting\n\
                      {\"http_status\": -1, \"error\": \"x\"}\n\
                      {\"http_status\": 200, \"status_code\": 200}\n";
        assert!(validate_output(output).success);
    }

    #[test]
    fn test_multiline_json_is_parsed() {
        let output = "noise\n{\n  \"http_status\": 200,\n  \"status_code\": 200\n}\n";
        let data = parse_last_json_object(output).unwrap();
        assert_eq!(data["http_status"], 200);
    }

    #[test]
    fn test_transport_error_is_reported() {
        let verdict = validate_output(r#"{"http_status": -1, "error": "connection refused"}"#);
        assert!(!verdict.success);
        assert!(verdict
            .reasons
            .contains(&"client error: connection refused".to_string()));
    }

    #[test]
    fn test_parse_report() {
        let report =
            parse_report(r#"{"http_status": 200, "status_code": 200, "url": "http://x"}"#).unwrap();
        assert_eq!(report.http_status, 200);
        assert_eq!(report.url.as_deref(), Some("http://x"));
        assert!(parse_report("no report").is_none());
    }

    struct FixedModel(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl LanguageModel for FixedModel {
        async fn respond(
            &self,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String> {
            self.0.map(str::to_string).map_err(|m| TrackError::ModelError {
                message: m.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_model_verdict_is_used_when_well_formed() {
        let model = FixedModel(Ok(
            r#"{"success": false, "reasons": ["wrong reference"], "patch_hint": "use maxDays"}"#,
        ));
        let verdict = judge_with_model(&model, "{}").await.unwrap().unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.reasons, vec!["wrong reference"]);
        assert_eq!(verdict.patch_hint, "use maxDays");
    }

    #[tokio::test]
    async fn test_unusable_model_verdict_yields_none() {
        let not_json = judge_with_model(&FixedModel(Ok("looks fine to me")), "{}").await;
        assert!(not_json.unwrap().is_none());

        let no_success = judge_with_model(&FixedModel(Ok(r#"{"reasons": []}"#)), "{}").await;
        assert!(no_success.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_model_call_failure_is_reported() {
        match judge_with_model(&FixedModel(Err("quota exceeded")), "{}").await {
            Err(TrackError::ModelError { message }) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
